//! Aspect-preserving resize into the square model input.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::consts::LETTERBOX_FILL;

/// Mapping between source pixels and the padded square model input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Letterbox {
    /// Side of the square input.
    pub size: u32,
    pub src_width: u32,
    pub src_height: u32,
    /// Source → input scale factor.
    pub scale: f32,
    pub scaled_width: u32,
    pub scaled_height: u32,
    /// Left padding in input pixels.
    pub pad_x: u32,
    /// Top padding in input pixels.
    pub pad_y: u32,
}

impl Letterbox {
    pub fn new(src_width: u32, src_height: u32, size: u32) -> Self {
        let scale = (size as f32 / src_width as f32).min(size as f32 / src_height as f32);
        let scaled_width = ((src_width as f32 * scale).round() as u32).clamp(1, size);
        let scaled_height = ((src_height as f32 * scale).round() as u32).clamp(1, size);
        Self {
            size,
            src_width,
            src_height,
            scale,
            scaled_width,
            scaled_height,
            pad_x: (size - scaled_width) / 2,
            pad_y: (size - scaled_height) / 2,
        }
    }

    /// Resize `image` and centre it on a grey square canvas.
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        let resized = imageops::resize(
            image,
            self.scaled_width,
            self.scaled_height,
            FilterType::Triangle,
        );
        let mut canvas = RgbImage::from_pixel(self.size, self.size, Rgb([LETTERBOX_FILL; 3]));
        imageops::replace(&mut canvas, &resized, self.pad_x as i64, self.pad_y as i64);
        canvas
    }

    /// Letterboxed image as a CHW `f32` buffer scaled to `[0, 1]`.
    pub fn to_tensor(&self, image: &RgbImage) -> Vec<f32> {
        let boxed = self.apply(image);
        let plane = (self.size * self.size) as usize;
        let mut data = vec![0.0f32; 3 * plane];
        for (x, y, pixel) in boxed.enumerate_pixels() {
            let idx = (y * self.size + x) as usize;
            for c in 0..3 {
                data[c * plane + idx] = pixel[c] as f32 / 255.0;
            }
        }
        data
    }

    /// Input coordinates → source coordinates (unclamped).
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.pad_x as f32) / self.scale,
            (y - self.pad_y as f32) / self.scale,
        )
    }

    /// Source coordinates → input coordinates.
    pub fn to_input(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.scale + self.pad_x as f32,
            y * self.scale + self.pad_y as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_image_is_padded_vertically() {
        let lb = Letterbox::new(2000, 1000, 1024);
        assert_eq!(lb.scaled_width, 1024);
        assert_eq!(lb.scaled_height, 512);
        assert_eq!(lb.pad_x, 0);
        assert_eq!(lb.pad_y, 256);
    }

    #[test]
    fn source_input_mapping_is_inverse() {
        let lb = Letterbox::new(640, 480, 1024);
        let (ix, iy) = lb.to_input(320.0, 240.0);
        let (sx, sy) = lb.to_source(ix, iy);
        assert!((sx - 320.0).abs() < 1e-3);
        assert!((sy - 240.0).abs() < 1e-3);
    }

    #[test]
    fn tensor_has_fill_in_padding() {
        let img = RgbImage::from_pixel(64, 32, Rgb([255, 0, 0]));
        let lb = Letterbox::new(64, 32, 64);
        let t = lb.to_tensor(&img);
        assert_eq!(t.len(), 3 * 64 * 64);
        // Top-left corner is padding.
        assert!((t[0] - LETTERBOX_FILL as f32 / 255.0).abs() < 1e-6);
        // Centre row is the red image.
        let centre = (32 * 64 + 32) as usize;
        assert!((t[centre] - 1.0).abs() < 1e-6);
        assert!(t[64 * 64 + centre].abs() < 1e-6);
    }
}
