use std::path::PathBuf;
use std::time::Duration;

use image::RgbImage;
use segprompt_core::config::AppConfig;
use segprompt_core::io::SourceImage;
use segprompt_core::prompt::Prompt;

use crate::states::Busy;

/// Commands sent from UI thread to worker thread.
pub enum WorkerCommand {
    /// Replace the configuration. Models are reloaded lazily on next use.
    Configure { config: AppConfig },

    /// Decode an image and run the base "segment everything" pass on it.
    /// Loads the model first if it is not loaded yet.
    LoadImage { path: PathBuf },

    /// Apply a prompt to the image at `path`. Superseded by any newer
    /// `Segment` still waiting in the queue.
    Segment { path: PathBuf, prompt: Prompt },

    /// Save the last segmentation result at source resolution.
    SaveResult { path: PathBuf },
}

/// Results sent from worker thread back to UI thread.
pub enum WorkerResult {
    ModelLoaded {
        text_prompts: bool,
    },

    /// The worker picked up a long-running command.
    Started {
        busy: Busy,
    },

    /// Base pass finished; the UI starts a new session for this image.
    ImageLoaded {
        source: SourceImage,
        masks: usize,
        elapsed: Duration,
    },

    /// The base pass failed and the worker no longer holds an image. The
    /// UI drops its session.
    ImageUnloaded {
        message: String,
    },

    SegmentComplete {
        path: PathBuf,
        image: RgbImage,
        elapsed: Duration,
    },

    ResultSaved {
        path: PathBuf,
    },

    ConfigImported {
        config: AppConfig,
    },

    /// The worker finished a command without anything to report.
    Idle,

    Error {
        message: String,
    },

    Log {
        message: String,
    },
}
