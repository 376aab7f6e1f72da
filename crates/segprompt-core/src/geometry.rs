//! Coordinate spaces of the display canvas and the source image.
//!
//! The canvas has a fixed size while the source image can have any
//! resolution, so every prompt coordinate collected on screen has to be
//! rescaled before it reaches the model, and every model-space coordinate
//! has to be rescaled back before it is drawn.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use crate::error::{Result, SegError};

/// Fixed-size display canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SegError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Resolution of a loaded source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SegError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A pointer position on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayPoint {
    pub x: f32,
    pub y: f32,
}

impl DisplayPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A pixel position in the source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImagePoint {
    pub x: u32,
    pub y: u32,
}

impl ImagePoint {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box on the canvas with `x1 <= x2` and `y1 <= y2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl DisplayBox {
    /// Build a normalized box from two drag endpoints in any order.
    pub fn from_corners(a: DisplayPoint, b: DisplayPoint) -> Self {
        Self {
            x1: a.x.min(b.x),
            y1: a.y.min(b.y),
            x2: a.x.max(b.x),
            y2: a.y.max(b.y),
        }
    }

    pub fn min(&self) -> DisplayPoint {
        DisplayPoint::new(self.x1, self.y1)
    }

    pub fn max(&self) -> DisplayPoint {
        DisplayPoint::new(self.x2, self.y2)
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

/// Axis-aligned box in source image pixels, `[x1, x2) × [y1, y2)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl ImageBox {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Clip the box to the image bounds.
    pub fn clamp_to(&self, size: ImageSize) -> Self {
        Self {
            x1: self.x1.min(size.width),
            y1: self.y1.min(size.height),
            x2: self.x2.min(size.width),
            y2: self.y2.min(size.height),
        }
    }

    pub fn as_array(&self) -> [u32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl fmt::Display for ImageBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Rescale one coordinate and round it, clamped to `[0, max]`.
fn scale_axis(value: f32, from: u32, to: u32, max: u32) -> u32 {
    let scaled = (value as f64 * to as f64 / from as f64).round();
    scaled.clamp(0.0, max as f64) as u32
}

/// Map a canvas position to the source pixel it covers, clamped to the image.
pub fn to_image_space(p: DisplayPoint, viewport: Viewport, source: ImageSize) -> ImagePoint {
    ImagePoint {
        x: scale_axis(p.x, viewport.width, source.width, source.width - 1),
        y: scale_axis(p.y, viewport.height, source.height, source.height - 1),
    }
}

/// Map a source pixel to its position on the canvas.
pub fn to_display_space(p: ImagePoint, viewport: Viewport, source: ImageSize) -> DisplayPoint {
    DisplayPoint {
        x: p.x as f32 * viewport.width as f32 / source.width as f32,
        y: p.y as f32 * viewport.height as f32 / source.height as f32,
    }
}

/// Map a normalized canvas box to image space. Corners are transformed
/// independently, so `x1 <= x2` and `y1 <= y2` still hold afterwards.
///
/// The far edge is exclusive, so it may reach `W_s` / `H_s`: a box drawn over
/// the whole canvas covers the whole image.
pub fn box_to_image_space(b: DisplayBox, viewport: Viewport, source: ImageSize) -> ImageBox {
    let min = to_image_space(b.min(), viewport, source);
    ImageBox {
        x1: min.x,
        y1: min.y,
        x2: scale_axis(b.x2, viewport.width, source.width, source.width),
        y2: scale_axis(b.y2, viewport.height, source.height, source.height),
    }
}
