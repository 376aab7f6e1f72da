use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CONF, DEFAULT_IMGSZ, DEFAULT_IOU, DEFAULT_MASK_ALPHA, DEFAULT_MAX_DET,
    DEFAULT_WEIGHTS_PATH,
};
use crate::error::{Result, SegError};
use crate::geometry::Viewport;
use crate::model::DevicePreference;
use crate::prompt::ModeSwitchPolicy;

/// Application configuration, stored as TOML.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelConfig,
    /// Text encoder for text prompts. Text prompts are unavailable without it.
    #[serde(default)]
    pub text: Option<TextModelConfig>,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub mode_switch: ModeSwitchPolicy,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| SegError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SegError::Config(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        Viewport::new(self.viewport.width, self.viewport.height)?;
        self.model.validate()?;
        if !(0.0..=1.0).contains(&self.render.alpha) {
            return Err(SegError::Config(format!(
                "render.alpha must be in [0, 1], got {}",
                self.render.alpha
            )));
        }
        Ok(())
    }
}

/// FastSAM inference parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// ONNX export of the FastSAM weights.
    pub weights: PathBuf,
    /// Square model input size; must be a multiple of 32.
    pub imgsz: u32,
    /// Minimum detection confidence.
    pub conf: f32,
    /// NMS IoU threshold.
    pub iou: f32,
    pub max_det: usize,
    /// Upsample masks to source resolution before cropping.
    pub retina_masks: bool,
    pub device: DevicePreference,
    pub intra_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights: PathBuf::from(DEFAULT_WEIGHTS_PATH),
            imgsz: DEFAULT_IMGSZ,
            conf: DEFAULT_CONF,
            iou: DEFAULT_IOU,
            max_det: DEFAULT_MAX_DET,
            retina_masks: true,
            device: DevicePreference::default(),
            intra_threads: 4,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.imgsz == 0 || self.imgsz % 32 != 0 {
            return Err(SegError::Config(format!(
                "model.imgsz must be a positive multiple of 32, got {}",
                self.imgsz
            )));
        }
        for (name, value) in [("conf", self.conf), ("iou", self.iou)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SegError::Config(format!(
                    "model.{name} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// CLIP encoders used to score mask crops against a text prompt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextModelConfig {
    pub image_encoder: PathBuf,
    pub text_encoder: PathBuf,
    /// HuggingFace `tokenizer.json` for the text encoder.
    pub tokenizer: PathBuf,
}

/// Overlay appearance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Random colour per mask instead of one fixed colour.
    pub random_color: bool,
    pub alpha: f32,
    /// Smooth masks (closing then opening) before drawing.
    pub better_quality: bool,
    pub with_contours: bool,
    /// Seed for the mask colour generator.
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            random_color: true,
            alpha: DEFAULT_MASK_ALPHA,
            better_quality: true,
            with_contours: true,
            seed: 0,
        }
    }
}
