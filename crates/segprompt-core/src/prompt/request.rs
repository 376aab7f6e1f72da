use crate::geometry::{ImageBox, ImagePoint};

use super::mode::{PointLabel, PromptMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabeledPoint {
    pub point: ImagePoint,
    pub label: PointLabel,
}

impl LabeledPoint {
    pub fn foreground(x: u32, y: u32) -> Self {
        Self {
            point: ImagePoint::new(x, y),
            label: PointLabel::Foreground,
        }
    }

    pub fn background(x: u32, y: u32) -> Self {
        Self {
            point: ImagePoint::new(x, y),
            label: PointLabel::Background,
        }
    }
}

/// A fully resolved, image-space prompt ready for the segmentation adapter.
#[derive(Clone, Debug, PartialEq)]
pub enum Prompt {
    Everything,
    Points(Vec<LabeledPoint>),
    Box(ImageBox),
    Text(String),
}

impl Prompt {
    pub fn mode(&self) -> PromptMode {
        match self {
            Self::Everything => PromptMode::Everything,
            Self::Points(_) => PromptMode::Point,
            Self::Box(_) => PromptMode::Box,
            Self::Text(_) => PromptMode::Text,
        }
    }
}
