use std::fmt;
use std::path::Path;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SegError};

/// Which ONNX Runtime execution provider to run the models on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// Best compiled-in accelerator, CPU otherwise.
    #[default]
    Auto,
    Cpu,
    Cuda,
    CoreMl,
}

impl DevicePreference {
    pub const ALL: &[Self] = &[Self::Auto, Self::Cpu, Self::Cuda, Self::CoreMl];

    /// Whether this build can honour the preference without falling back.
    pub fn is_available(&self) -> bool {
        match self {
            Self::Auto | Self::Cpu => true,
            Self::Cuda => cfg!(feature = "cuda"),
            Self::CoreMl => cfg!(feature = "coreml"),
        }
    }
}

impl fmt::Display for DevicePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "Auto"),
            Self::Cpu => write!(f, "CPU"),
            Self::Cuda => write!(f, "CUDA"),
            Self::CoreMl => write!(f, "CoreML"),
        }
    }
}

fn execution_providers(device: DevicePreference) -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[allow(unused_mut)]
    let mut providers = Vec::new();

    if !device.is_available() {
        warn!("{device} support not compiled in, falling back to CPU");
        return providers;
    }

    #[cfg(feature = "cuda")]
    if matches!(device, DevicePreference::Auto | DevicePreference::Cuda) {
        providers.push(ort::execution_providers::CUDAExecutionProvider::default().build());
    }

    #[cfg(feature = "coreml")]
    if matches!(device, DevicePreference::Auto | DevicePreference::CoreMl) {
        providers.push(ort::execution_providers::CoreMLExecutionProvider::default().build());
    }

    providers
}

/// Build an ONNX Runtime session for the model at `path`.
pub(crate) fn load_session(
    path: &Path,
    device: DevicePreference,
    intra_threads: usize,
) -> Result<Session> {
    let load_err = |reason: String| SegError::ModelLoad {
        path: path.to_path_buf(),
        reason,
    };

    if !path.is_file() {
        return Err(load_err("file not found".into()));
    }

    let providers = execution_providers(device);
    let mut builder = Session::builder()
        .map_err(|e| load_err(e.to_string()))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| load_err(e.to_string()))?
        .with_intra_threads(intra_threads.max(1))
        .map_err(|e| load_err(e.to_string()))?;
    if !providers.is_empty() {
        builder = builder
            .with_execution_providers(providers)
            .map_err(|e| load_err(e.to_string()))?;
    }

    let session = builder
        .commit_from_file(path)
        .map_err(|e| load_err(e.to_string()))?;
    info!("Loaded model {} (device: {device})", path.display());
    Ok(session)
}
