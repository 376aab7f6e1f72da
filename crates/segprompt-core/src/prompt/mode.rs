use std::fmt;

use serde::{Deserialize, Serialize};

/// Which kind of prompt the user is supplying.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    #[default]
    Everything,
    Point,
    Box,
    Text,
}

impl PromptMode {
    pub const ALL: &[Self] = &[Self::Everything, Self::Point, Self::Box, Self::Text];
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Everything => write!(f, "Everything"),
            Self::Point => write!(f, "Point"),
            Self::Box => write!(f, "Box"),
            Self::Text => write!(f, "Text"),
        }
    }
}

/// What happens to collected points and boxes when the prompt mode changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeSwitchPolicy {
    /// Points and box survive a mode switch and are reused when switching back.
    #[default]
    Keep,
    /// Every actual mode change discards points, box and any drag in progress.
    Reset,
}

impl ModeSwitchPolicy {
    pub const ALL: &[Self] = &[Self::Keep, Self::Reset];
}

impl fmt::Display for ModeSwitchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keep => write!(f, "Keep input"),
            Self::Reset => write!(f, "Reset input"),
        }
    }
}

/// Point prompt label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum PointLabel {
    #[default]
    Foreground,
    Background,
}

impl fmt::Display for PointLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Foreground => write!(f, "foreground"),
            Self::Background => write!(f, "background"),
        }
    }
}
