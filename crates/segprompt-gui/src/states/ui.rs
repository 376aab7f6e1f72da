use std::fmt;

/// What the worker is currently doing on behalf of the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Busy {
    LoadingImage,
    Segmenting,
    Saving,
    Configuring,
}

impl fmt::Display for Busy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadingImage => write!(f, "Loading image"),
            Self::Segmenting => write!(f, "Segmenting"),
            Self::Saving => write!(f, "Saving"),
            Self::Configuring => write!(f, "Applying configuration"),
        }
    }
}

/// Overall UI state.
#[derive(Default)]
pub struct UIState {
    /// Which worker task is running (None = idle).
    pub busy: Option<Busy>,

    pub model_loaded: bool,
    pub text_prompts: bool,
    /// Number of base masks for the loaded image.
    pub base_masks: Option<usize>,

    /// Log messages.
    pub log_messages: Vec<String>,
}

impl UIState {
    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
    }
}
