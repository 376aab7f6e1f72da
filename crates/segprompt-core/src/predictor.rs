//! The segmentation adapter.
//!
//! [`SegPredictor`] owns the model handles and, for the currently loaded
//! image, the cached "segment everything" masks. Every prompt is answered by
//! selecting from that cache, so only the first call per image runs the
//! mask generator.

use std::path::Path;
use std::time::Instant;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{Result, SegError};
use crate::geometry::ImageBox;
use crate::io::{load_source_image, SourceImage};
use crate::mask::select::{best_candidate, select_by_box, select_by_points, text_candidates};
use crate::mask::Mask;
use crate::model::{ClipScorer, FastSam, MaskGenerator, RegionScorer};
use crate::prompt::{LabeledPoint, Prompt};
use crate::render::{OverlayRenderer, Renderer};

struct LoadedImage {
    source: SourceImage,
    base_masks: Vec<Mask>,
}

pub struct SegPredictor {
    generator: Option<Box<dyn MaskGenerator>>,
    scorer: Option<Box<dyn RegionScorer>>,
    renderer: Box<dyn Renderer>,
    image: Option<LoadedImage>,
}

impl SegPredictor {
    /// A predictor without any model attached.
    pub fn new(renderer: Box<dyn Renderer>) -> Self {
        Self {
            generator: None,
            scorer: None,
            renderer,
            image: None,
        }
    }

    /// Load the models named in `config`.
    ///
    /// A failing FastSAM load is returned as an error. A failing text encoder
    /// only disables text prompts.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let renderer = Box::new(OverlayRenderer::new(config.render.clone()));
        let generator = FastSam::load(&config.model)?;
        let mut predictor = Self::new(renderer).with_generator(Box::new(generator));

        if let Some(text) = &config.text {
            match ClipScorer::load(text, config.model.device, config.model.intra_threads) {
                Ok(scorer) => predictor = predictor.with_scorer(Box::new(scorer)),
                Err(e) => warn!("Text prompts disabled: {e}"),
            }
        }
        Ok(predictor)
    }

    pub fn with_generator(mut self, generator: Box<dyn MaskGenerator>) -> Self {
        self.generator = Some(generator);
        self.image = None;
        self
    }

    pub fn with_scorer(mut self, scorer: Box<dyn RegionScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn has_model(&self) -> bool {
        self.generator.is_some()
    }

    pub fn has_text_model(&self) -> bool {
        self.scorer.is_some()
    }

    /// Decode `path` and run the base inference pass on it.
    pub fn load_image(&mut self, path: &Path) -> Result<&SourceImage> {
        let source = load_source_image(path)?;
        self.set_image(source)
    }

    /// Replace the current image and compute its base masks.
    ///
    /// On failure the previous image is dropped, so later prompts report
    /// [`SegError::NoImageSelected`] instead of answering for a stale image.
    pub fn set_image(&mut self, source: SourceImage) -> Result<&SourceImage> {
        self.image = None;
        let generator = self.generator.as_mut().ok_or(SegError::NoModelLoaded)?;

        let start = Instant::now();
        let base_masks = generator.generate(&source.pixels)?;
        let expected = (source.size.height as usize, source.size.width as usize);
        if let Some(bad) = base_masks.iter().find(|m| m.data().dim() != expected) {
            return Err(SegError::Inference(format!(
                "mask shape {:?} does not match image {}",
                bad.data().dim(),
                source.size
            )));
        }
        info!(
            "Base pass for {}: {} masks in {:.2}s",
            source.file_name(),
            base_masks.len(),
            start.elapsed().as_secs_f32()
        );

        let loaded = self.image.insert(LoadedImage { source, base_masks });
        Ok(&loaded.source)
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.image.as_ref().map(|i| &i.source)
    }

    pub fn base_masks(&self) -> &[Mask] {
        self.image
            .as_ref()
            .map(|i| i.base_masks.as_slice())
            .unwrap_or_default()
    }

    fn loaded(&self) -> Result<&LoadedImage> {
        if self.generator.is_none() {
            return Err(SegError::NoModelLoaded);
        }
        let loaded = self.image.as_ref().ok_or(SegError::NoImageSelected)?;
        if loaded.base_masks.is_empty() {
            return Err(SegError::NoMasks);
        }
        Ok(loaded)
    }

    fn render(&self, source: &SourceImage, masks: &[Mask]) -> RgbImage {
        self.renderer.render(&source.pixels, masks)
    }

    /// Every base mask, each in its own colour.
    pub fn segment_everything(&self) -> Result<RgbImage> {
        let loaded = self.loaded()?;
        Ok(self.render(&loaded.source, &loaded.base_masks))
    }

    /// The union of masks hit by foreground points minus those hit by
    /// background points.
    pub fn segment_with_points(&self, points: &[LabeledPoint]) -> Result<RgbImage> {
        if points.is_empty() {
            return Err(SegError::EmptyPrompt(crate::prompt::PromptMode::Point));
        }
        let loaded = self.loaded()?;
        let mask = select_by_points(&loaded.base_masks, points, loaded.source.size);
        debug!("{} points selected {} pixels", points.len(), mask.area());
        Ok(self.render(&loaded.source, &[mask]))
    }

    /// The base mask that best matches `bbox`.
    pub fn segment_with_box(&self, bbox: ImageBox) -> Result<RgbImage> {
        let loaded = self.loaded()?;
        let index = select_by_box(&loaded.base_masks, bbox, loaded.source.size)
            .ok_or(SegError::NoMasks)?;
        debug!("Box {bbox} selected mask {index}");
        Ok(self.render(&loaded.source, &loaded.base_masks[index..=index]))
    }

    /// The base mask whose cut-out best matches `text`.
    pub fn segment_with_text(&mut self, text: &str) -> Result<RgbImage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SegError::EmptyPrompt(crate::prompt::PromptMode::Text));
        }
        self.loaded()?;
        let scorer = self.scorer.as_mut().ok_or(SegError::TextModelUnavailable)?;
        let loaded = self.image.as_ref().ok_or(SegError::NoImageSelected)?;

        let candidates = text_candidates(&loaded.source.pixels, &loaded.base_masks);
        if candidates.is_empty() {
            return Err(SegError::NoMasks);
        }
        let crops: Vec<RgbImage> = candidates.iter().map(|c| c.crop.clone()).collect();
        let scores = scorer.score(&crops, text)?;
        if scores.len() != candidates.len() {
            return Err(SegError::Inference(format!(
                "scorer returned {} scores for {} regions",
                scores.len(),
                candidates.len()
            )));
        }
        let index = best_candidate(&candidates, &scores).ok_or(SegError::NoMasks)?;
        debug!("Text \"{text}\" selected mask {index}");
        Ok(self
            .renderer
            .render(&loaded.source.pixels, &loaded.base_masks[index..=index]))
    }

    /// Dispatch a resolved prompt to the matching entry point.
    pub fn segment(&mut self, prompt: &Prompt) -> Result<RgbImage> {
        match prompt {
            Prompt::Everything => self.segment_everything(),
            Prompt::Points(points) => self.segment_with_points(points),
            Prompt::Box(bbox) => self.segment_with_box(*bbox),
            Prompt::Text(text) => self.segment_with_text(text),
        }
    }
}
