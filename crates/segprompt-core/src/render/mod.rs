mod overlay;

pub use overlay::OverlayRenderer;

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::geometry::Viewport;
use crate::mask::Mask;

/// Turns the selected masks into a display-ready composite of the source image.
pub trait Renderer: Send {
    fn render(&self, image: &RgbImage, masks: &[Mask]) -> RgbImage;
}

/// Scale an image to exactly fill the viewport. Aspect ratio is not preserved.
pub fn fit_to_viewport(image: &RgbImage, viewport: Viewport) -> RgbImage {
    if image.dimensions() == (viewport.width, viewport.height) {
        return image.clone();
    }
    imageops::resize(image, viewport.width, viewport.height, FilterType::Lanczos3)
}
