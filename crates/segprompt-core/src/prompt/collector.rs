use tracing::debug;

use crate::error::{Result, SegError};
use crate::geometry::{
    box_to_image_space, to_image_space, DisplayBox, DisplayPoint, ImageSize, Viewport,
};

use super::mode::{ModeSwitchPolicy, PointLabel, PromptMode};
use super::request::{LabeledPoint, Prompt};

/// Drags smaller than this (display pixels, either axis) do not produce a box.
const MIN_BOX_EXTENT: f32 = 1.0;

/// Interaction state, derived from the active mode and the collected input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectorState {
    Idle,
    CollectingPoints,
    DraggingBox,
    BoxReady,
    EnteringText,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BoxDrag {
    anchor: DisplayPoint,
    current: DisplayPoint,
}

/// Accumulates canvas input for the active prompt mode.
///
/// All coordinates are kept in display space; they are converted to image
/// space only when the prompt is resolved.
#[derive(Clone, Debug)]
pub struct PromptCollector {
    mode: PromptMode,
    policy: ModeSwitchPolicy,
    points: Vec<DisplayPoint>,
    bbox: Option<DisplayBox>,
    drag: Option<BoxDrag>,
    text: String,
}

impl Default for PromptCollector {
    fn default() -> Self {
        Self::new(ModeSwitchPolicy::default())
    }
}

impl PromptCollector {
    pub fn new(policy: ModeSwitchPolicy) -> Self {
        Self {
            mode: PromptMode::default(),
            policy,
            points: Vec::new(),
            bbox: None,
            drag: None,
            text: String::new(),
        }
    }

    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    pub fn policy(&self) -> ModeSwitchPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ModeSwitchPolicy) {
        self.policy = policy;
    }

    /// Switch the active mode. Returns `true` if the mode actually changed.
    pub fn set_mode(&mut self, mode: PromptMode) -> bool {
        if mode == self.mode {
            return false;
        }
        debug!("Prompt mode {} -> {} ({})", self.mode, mode, self.policy);
        self.mode = mode;
        // An unfinished drag never survives a mode change.
        self.drag = None;
        if self.policy == ModeSwitchPolicy::Reset {
            self.points.clear();
            self.bbox = None;
        }
        true
    }

    pub fn state(&self) -> CollectorState {
        match self.mode {
            PromptMode::Everything => CollectorState::Idle,
            PromptMode::Point => CollectorState::CollectingPoints,
            PromptMode::Box => {
                if self.drag.is_some() {
                    CollectorState::DraggingBox
                } else if self.bbox.is_some() {
                    CollectorState::BoxReady
                } else {
                    CollectorState::Idle
                }
            }
            PromptMode::Text => CollectorState::EnteringText,
        }
    }

    pub fn points(&self) -> &[DisplayPoint] {
        &self.points
    }

    pub fn bbox(&self) -> Option<DisplayBox> {
        self.bbox
    }

    /// Live rectangle while a box drag is in progress.
    pub fn drag_preview(&self) -> Option<DisplayBox> {
        self.drag.map(|d| DisplayBox::from_corners(d.anchor, d.current))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn pointer_down(&mut self, p: DisplayPoint) {
        match self.mode {
            PromptMode::Point => self.points.push(p),
            PromptMode::Box => {
                self.drag = Some(BoxDrag {
                    anchor: p,
                    current: p,
                })
            }
            PromptMode::Everything | PromptMode::Text => {}
        }
    }

    pub fn pointer_drag(&mut self, p: DisplayPoint) {
        if self.mode != PromptMode::Box {
            return;
        }
        if let Some(ref mut drag) = self.drag {
            drag.current = p;
        }
    }

    pub fn pointer_up(&mut self, p: DisplayPoint) {
        if self.mode != PromptMode::Box {
            return;
        }
        let Some(drag) = self.drag.take() else {
            return;
        };
        let bbox = DisplayBox::from_corners(drag.anchor, p);
        if bbox.width() < MIN_BOX_EXTENT || bbox.height() < MIN_BOX_EXTENT {
            debug!("Ignoring degenerate box drag {:?}", bbox);
            return;
        }
        self.bbox = Some(bbox);
    }

    /// Drop points, box and any drag in progress. The text and mode are kept.
    pub fn clear(&mut self) {
        self.points.clear();
        self.bbox = None;
        self.drag = None;
    }

    /// Turn the collected input for the active mode into an image-space prompt.
    ///
    /// Missing input for the active mode yields [`SegError::EmptyPrompt`].
    pub fn resolve(&self, viewport: Viewport, source: ImageSize) -> Result<Prompt> {
        match self.mode {
            PromptMode::Everything => Ok(Prompt::Everything),
            PromptMode::Point => {
                if self.points.is_empty() {
                    return Err(SegError::EmptyPrompt(self.mode));
                }
                let points = self
                    .points
                    .iter()
                    .map(|&p| LabeledPoint {
                        point: to_image_space(p, viewport, source),
                        label: PointLabel::Foreground,
                    })
                    .collect();
                Ok(Prompt::Points(points))
            }
            PromptMode::Box => match self.bbox {
                Some(b) => Ok(Prompt::Box(box_to_image_space(b, viewport, source))),
                None => Err(SegError::EmptyPrompt(self.mode)),
            },
            PromptMode::Text => {
                let text = self.text.trim();
                if text.is_empty() {
                    return Err(SegError::EmptyPrompt(self.mode));
                }
                Ok(Prompt::Text(text.to_string()))
            }
        }
    }
}
