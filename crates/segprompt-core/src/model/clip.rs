//! CLIP region scoring for text prompts.
//!
//! Two ONNX encoders (image and text) plus a HuggingFace `tokenizer.json`.
//! Crops and text are embedded separately and compared by cosine similarity.

use std::time::Instant;

use image::imageops::{self, FilterType};
use image::RgbImage;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::config::TextModelConfig;
use crate::consts::{
    CLIP_CONTEXT_LENGTH, CLIP_EOT_TOKEN, CLIP_INPUT_SIZE, CLIP_LOGIT_SCALE, CLIP_MEAN, CLIP_STD,
};
use crate::error::{Result, SegError};

use super::device::{load_session, DevicePreference};
use super::{inference_err, RegionScorer};

/// Crops encoded per image-encoder call.
const IMAGE_BATCH: usize = 32;

pub struct ClipScorer {
    image_session: Session,
    text_session: Session,
    tokenizer: Tokenizer,
    image_input: String,
    image_output: usize,
    text_input: String,
    text_output: usize,
    text_takes_mask: bool,
}

impl ClipScorer {
    pub fn load(
        config: &TextModelConfig,
        device: DevicePreference,
        intra_threads: usize,
    ) -> Result<Self> {
        let tokenizer =
            Tokenizer::from_file(&config.tokenizer).map_err(|e| SegError::ModelLoad {
                path: config.tokenizer.clone(),
                reason: e.to_string(),
            })?;
        let image_session = load_session(&config.image_encoder, device, intra_threads)?;
        let text_session = load_session(&config.text_encoder, device, intra_threads)?;

        let first_input = |session: &Session, path: &std::path::Path| {
            session
                .inputs
                .first()
                .map(|i| i.name.clone())
                .ok_or_else(|| SegError::ModelLoad {
                    path: path.to_path_buf(),
                    reason: "model has no inputs".into(),
                })
        };
        let image_input = first_input(&image_session, &config.image_encoder)?;
        let text_input = text_session
            .inputs
            .iter()
            .find(|i| i.name == "input_ids")
            .map(|i| i.name.clone())
            .map_or_else(|| first_input(&text_session, &config.text_encoder), Ok)?;
        let text_takes_mask = text_session
            .inputs
            .iter()
            .any(|i| i.name == "attention_mask");

        let image_output = embedding_output(&image_session, "image_embeds");
        let text_output = embedding_output(&text_session, "text_embeds");
        debug!(
            "CLIP inputs: image '{image_input}', text '{text_input}' (attention mask: {text_takes_mask})"
        );

        Ok(Self {
            image_session,
            text_session,
            tokenizer,
            image_input,
            image_output,
            text_input,
            text_output,
            text_takes_mask,
        })
    }

    fn encode_text(&mut self, text: &str) -> Result<Vec<f32>> {
        let encoding = self.tokenizer.encode(text, true).map_err(inference_err)?;
        let (ids, mask) = pad_token_ids(encoding.get_ids(), CLIP_CONTEXT_LENGTH);
        let shape = vec![1_i64, CLIP_CONTEXT_LENGTH as i64];

        let ids = Tensor::from_array((shape.clone(), ids)).map_err(inference_err)?;
        let outputs = if self.text_takes_mask {
            let mask = Tensor::from_array((shape, mask)).map_err(inference_err)?;
            self.text_session.run(ort::inputs![
                self.text_input.as_str() => ids,
                "attention_mask" => mask
            ])
        } else {
            self.text_session
                .run(ort::inputs![self.text_input.as_str() => ids])
        }
        .map_err(inference_err)?;

        let (_, data) = outputs[self.text_output]
            .try_extract_tensor::<f32>()
            .map_err(inference_err)?;
        Ok(data.to_vec())
    }

    fn encode_images(&mut self, crops: &[RgbImage]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(crops.len());
        let side = CLIP_INPUT_SIZE as i64;
        for batch in crops.chunks(IMAGE_BATCH) {
            let input = Tensor::from_array((
                vec![batch.len() as i64, 3, side, side],
                clip_pixels(batch),
            ))
            .map_err(inference_err)?;
            let outputs = self
                .image_session
                .run(ort::inputs![self.image_input.as_str() => input])
                .map_err(inference_err)?;
            let (_, data) = outputs[self.image_output]
                .try_extract_tensor::<f32>()
                .map_err(inference_err)?;
            let dim = data.len() / batch.len();
            if dim == 0 {
                return Err(SegError::Inference("image encoder returned no embeddings".into()));
            }
            embeddings.extend(data.chunks(dim).map(<[f32]>::to_vec));
        }
        Ok(embeddings)
    }
}

impl RegionScorer for ClipScorer {
    fn score(&mut self, crops: &[RgbImage], text: &str) -> Result<Vec<f32>> {
        if crops.is_empty() {
            return Ok(Vec::new());
        }
        let start = Instant::now();
        let text_embedding = self.encode_text(text)?;
        let image_embeddings = self.encode_images(crops)?;
        let probs = similarity_probs(&image_embeddings, &text_embedding);
        info!(
            "Scored {} regions against \"{}\" in {:.2}s",
            crops.len(),
            text,
            start.elapsed().as_secs_f32()
        );
        Ok(probs)
    }
}

fn embedding_output(session: &Session, preferred: &str) -> usize {
    session
        .outputs
        .iter()
        .position(|o| o.name == preferred)
        .unwrap_or(0)
}

/// CLIP preprocessing for a batch of crops: shortest side to 224, centre
/// crop, mean/std normalization, NCHW.
pub fn clip_pixels(crops: &[RgbImage]) -> Vec<f32> {
    let side = CLIP_INPUT_SIZE;
    let plane = (side * side) as usize;
    let mut data = vec![0.0f32; crops.len() * 3 * plane];

    for (n, crop) in crops.iter().enumerate() {
        let (w, h) = crop.dimensions();
        let scale = side as f32 / w.min(h).max(1) as f32;
        let rw = ((w as f32 * scale).round() as u32).max(side);
        let rh = ((h as f32 * scale).round() as u32).max(side);
        let resized = imageops::resize(crop, rw, rh, FilterType::CatmullRom);
        let left = (rw - side) / 2;
        let top = (rh - side) / 2;
        let square = imageops::crop_imm(&resized, left, top, side, side).to_image();

        let base = n * 3 * plane;
        for (x, y, pixel) in square.enumerate_pixels() {
            let idx = (y * side + x) as usize;
            for c in 0..3 {
                data[base + c * plane + idx] = (pixel[c] as f32 / 255.0 - CLIP_MEAN[c]) / CLIP_STD[c];
            }
        }
    }
    data
}

/// Fit token ids to the CLIP context, returning `(input_ids, attention_mask)`.
///
/// Long sequences are truncated with the end-of-text token kept last;
/// short ones are padded with the end-of-text token.
pub fn pad_token_ids(ids: &[u32], length: usize) -> (Vec<i64>, Vec<i64>) {
    let mut out: Vec<i64> = ids.iter().take(length).map(|&id| id as i64).collect();
    if ids.len() > length {
        if let Some(last) = out.last_mut() {
            *last = CLIP_EOT_TOKEN;
        }
    }
    let used = out.len();
    out.resize(length, CLIP_EOT_TOKEN);
    let mut mask = vec![1_i64; used];
    mask.resize(length, 0);
    (out, mask)
}

/// `softmax(100 · cos(image_i, text))` over all images.
pub fn similarity_probs(image_embeddings: &[Vec<f32>], text_embedding: &[f32]) -> Vec<f32> {
    let text = normalized(text_embedding);
    let logits: Vec<f32> = image_embeddings
        .iter()
        .map(|e| {
            let e = normalized(e);
            CLIP_LOGIT_SCALE * e.iter().zip(&text).map(|(a, b)| a * b).sum::<f32>()
        })
        .collect();

    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn normalized(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| x / norm).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_sequences_are_padded() {
        let (ids, mask) = pad_token_ids(&[49406, 320, 49407], 8);
        assert_eq!(ids.len(), 8);
        assert_eq!(&ids[..3], &[49406, 320, 49407]);
        assert!(ids[3..].iter().all(|&t| t == CLIP_EOT_TOKEN));
        assert_eq!(mask, vec![1, 1, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn long_sequences_keep_end_token() {
        let long: Vec<u32> = (0..100).collect();
        let (ids, mask) = pad_token_ids(&long, 77);
        assert_eq!(ids.len(), 77);
        assert_eq!(ids[76], CLIP_EOT_TOKEN);
        assert!(mask.iter().all(|&m| m == 1));
    }

    #[test]
    fn matching_embedding_gets_highest_probability() {
        let images = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]];
        let probs = similarity_probs(&images, &[0.0, 2.0]);
        assert_eq!(probs.len(), 3);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(probs[1] > probs[2] && probs[2] > probs[0]);
    }

    #[test]
    fn pixels_have_batch_layout() {
        let crops = vec![RgbImage::new(50, 300), RgbImage::new(400, 224)];
        let data = clip_pixels(&crops);
        assert_eq!(data.len(), 2 * 3 * 224 * 224);
        // Black pixels normalize to -mean/std.
        assert!((data[0] + CLIP_MEAN[0] / CLIP_STD[0]).abs() < 1e-5);
    }
}
