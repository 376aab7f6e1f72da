use std::path::PathBuf;

use thiserror::Error;

use crate::prompt::PromptMode;

#[derive(Error, Debug)]
pub enum SegError {
    #[error("No segmentation model loaded")]
    NoModelLoaded,

    #[error("No image selected")]
    NoImageSelected,

    #[error("No prompt input for {0} mode")]
    EmptyPrompt(PromptMode),

    #[error("Model inference failed: {0}")]
    Inference(String),

    #[error("Failed to load model {}: {reason}", path.display())]
    ModelLoad { path: PathBuf, reason: String },

    #[error("Text prompts need a text encoder; none is configured")]
    TextModelUnavailable,

    #[error("The model produced no masks for this image")]
    NoMasks,

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(String),
}

impl SegError {
    /// Errors that are expected during normal interactive use and should
    /// leave the canvas untouched without telling the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::EmptyPrompt(_) | Self::NoImageSelected)
    }
}

pub type Result<T> = std::result::Result<T, SegError>;
