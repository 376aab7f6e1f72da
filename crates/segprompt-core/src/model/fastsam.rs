use std::time::Instant;

use image::RgbImage;
use ort::session::Session;
use ort::value::Tensor;
use tracing::{debug, info};

use crate::config::ModelConfig;
use crate::error::{Result, SegError};
use crate::mask::Mask;

use super::device::load_session;
use super::letterbox::Letterbox;
use super::postprocess::{decode, DecodeParams};
use super::{inference_err, MaskGenerator};

/// FastSAM "segment everything" running on an ONNX export of the network.
pub struct FastSam {
    session: Session,
    input_name: String,
    config: ModelConfig,
}

impl FastSam {
    pub fn load(config: &ModelConfig) -> Result<Self> {
        config.validate()?;
        let session = load_session(&config.weights, config.device, config.intra_threads)?;
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| SegError::ModelLoad {
                path: config.weights.clone(),
                reason: "model has no inputs".into(),
            })?;
        if session.outputs.len() < 2 {
            return Err(SegError::ModelLoad {
                path: config.weights.clone(),
                reason: format!(
                    "expected detection and prototype outputs, found {}",
                    session.outputs.len()
                ),
            });
        }
        Ok(Self {
            session,
            input_name,
            config: config.clone(),
        })
    }
}

impl MaskGenerator for FastSam {
    fn generate(&mut self, image: &RgbImage) -> Result<Vec<Mask>> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        let size = self.config.imgsz;
        let letterbox = Letterbox::new(width, height, size);

        let input = Tensor::from_array((
            vec![1_i64, 3, size as i64, size as i64],
            letterbox.to_tensor(image),
        ))
        .map_err(inference_err)?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(inference_err)?;

        let (det_shape, det_data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(inference_err)?;
        let (proto_shape, proto_data) = outputs[1]
            .try_extract_tensor::<f32>()
            .map_err(inference_err)?;
        let det_dims: Vec<usize> = det_shape.iter().map(|&d| d as usize).collect();
        let proto_dims: Vec<usize> = proto_shape.iter().map(|&d| d as usize).collect();
        debug!("FastSAM outputs: detections {det_dims:?}, prototypes {proto_dims:?}");

        let params = DecodeParams {
            conf: self.config.conf,
            iou: self.config.iou,
            max_det: self.config.max_det,
            retina_masks: self.config.retina_masks,
        };
        let masks = decode(&det_dims, det_data, &proto_dims, proto_data, &letterbox, params)?;

        info!(
            "FastSAM produced {} masks for {}x{} image in {:.2}s",
            masks.len(),
            width,
            height,
            start.elapsed().as_secs_f32()
        );
        Ok(masks)
    }
}
