#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{Rgb, RgbImage};

use segprompt_core::config::RenderConfig;
use segprompt_core::error::{Result, SegError};
use segprompt_core::geometry::{ImageBox, ImageSize};
use segprompt_core::io::SourceImage;
use segprompt_core::mask::Mask;
use segprompt_core::model::{MaskGenerator, RegionScorer};
use segprompt_core::predictor::SegPredictor;
use segprompt_core::render::OverlayRenderer;

pub const SCENE_WIDTH: u32 = 120;
pub const SCENE_HEIGHT: u32 = 80;

/// Horizontal red / vertical green ramp, so every pixel is distinct enough
/// to tell resized and overlaid images apart.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            64,
        ])
    })
}

pub fn scene_size() -> ImageSize {
    ImageSize::new(SCENE_WIDTH, SCENE_HEIGHT).unwrap()
}

pub fn box_mask(x1: u32, y1: u32, x2: u32, y2: u32) -> Mask {
    Mask::from_box(scene_size(), ImageBox::new(x1, y1, x2, y2))
}

/// Masks over the synthetic scene:
/// 0. large region `[0, 0, 80, 80)`
/// 1. medium region nested in it `[10, 10, 50, 50)`
/// 2. small region nested in that `[20, 20, 30, 30)`
/// 3. separate region `[90, 10, 115, 40)`
pub fn scene_masks() -> Vec<Mask> {
    vec![
        box_mask(0, 0, 80, 80),
        box_mask(10, 10, 50, 50),
        box_mask(20, 20, 30, 30),
        box_mask(90, 10, 115, 40),
    ]
}

pub fn scene_source() -> SourceImage {
    SourceImage::from_pixels("scene.png", gradient_image(SCENE_WIDTH, SCENE_HEIGHT)).unwrap()
}

/// Flat fill, no smoothing, no contours: each covered pixel is a plain
/// blend of the source and the fixed mask colour.
pub fn plain_render_config() -> RenderConfig {
    RenderConfig {
        random_color: false,
        alpha: 1.0,
        better_quality: false,
        with_contours: false,
        seed: 0,
    }
}

/// Returns a fixed set of masks and counts how often it is called.
pub struct StubGenerator {
    pub masks: Vec<Mask>,
    pub calls: Arc<AtomicUsize>,
}

impl StubGenerator {
    pub fn new(masks: Vec<Mask>) -> Self {
        Self {
            masks,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MaskGenerator for StubGenerator {
    fn generate(&mut self, _image: &RgbImage) -> Result<Vec<Mask>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.masks.clone())
    }
}

/// Always fails, like a model that cannot run.
pub struct FailingGenerator;

impl MaskGenerator for FailingGenerator {
    fn generate(&mut self, _image: &RgbImage) -> Result<Vec<Mask>> {
        Err(SegError::Inference("stub failure".into()))
    }
}

/// Scores crops by how many pixels they have, preferring larger crops, and
/// records the text it was asked about.
pub struct AreaScorer {
    pub last_text: Arc<std::sync::Mutex<Option<String>>>,
}

impl AreaScorer {
    pub fn new() -> Self {
        Self {
            last_text: Arc::new(std::sync::Mutex::new(None)),
        }
    }
}

impl RegionScorer for AreaScorer {
    fn score(&mut self, crops: &[RgbImage], text: &str) -> Result<Vec<f32>> {
        *self.last_text.lock().unwrap() = Some(text.to_string());
        Ok(crops
            .iter()
            .map(|c| (c.width() * c.height()) as f32)
            .collect())
    }
}

/// Predictor over the synthetic scene with the scene image already loaded.
pub fn scene_predictor() -> SegPredictor {
    let mut predictor = SegPredictor::new(Box::new(OverlayRenderer::new(plain_render_config())))
        .with_generator(Box::new(StubGenerator::new(scene_masks())));
    predictor.set_image(scene_source()).unwrap();
    predictor
}

/// Count pixels that differ between two images of the same size.
pub fn changed_pixels(a: &RgbImage, b: &RgbImage) -> usize {
    a.pixels().zip(b.pixels()).filter(|(p, q)| p != q).count()
}
