//! Segmentation model backends.
//!
//! The rest of the crate only sees the two traits below; the ONNX Runtime
//! implementations can be swapped for any other source of masks and scores.

mod clip;
mod device;
mod fastsam;
pub mod letterbox;
pub mod postprocess;

pub use clip::{clip_pixels, pad_token_ids, similarity_probs, ClipScorer};
pub use device::DevicePreference;
pub use fastsam::FastSam;

use image::RgbImage;

use crate::error::{Result, SegError};
use crate::mask::Mask;

/// Proposes every segment in an image ("segment everything").
pub trait MaskGenerator: Send {
    /// Masks at the image's own resolution.
    fn generate(&mut self, image: &RgbImage) -> Result<Vec<Mask>>;
}

/// Scores image regions against a free-text description.
pub trait RegionScorer: Send {
    /// One score per crop; higher means a better match.
    fn score(&mut self, crops: &[RgbImage], text: &str) -> Result<Vec<f32>>;
}

pub(crate) fn inference_err(e: impl std::fmt::Display) -> SegError {
    SegError::Inference(e.to_string())
}
