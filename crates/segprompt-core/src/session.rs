//! Per-image interaction state, independent of any UI toolkit.

use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::debug;

use crate::error::{Result, SegError};
use crate::geometry::{to_display_space, DisplayPoint, ImageSize, Viewport};
use crate::io::SourceImage;
use crate::predictor::SegPredictor;
use crate::prompt::{ModeSwitchPolicy, Prompt, PromptCollector};
use crate::render::fit_to_viewport;

/// Everything the canvas needs for one loaded image: the prompt input
/// collected so far and what is currently shown.
///
/// Created when an image is loaded and replaced on the next load.
pub struct SegmentationSession {
    path: PathBuf,
    size: ImageSize,
    viewport: Viewport,
    collector: PromptCollector,
    base_display: RgbImage,
    current_display: RgbImage,
    showing_result: bool,
    revision: u64,
}

impl SegmentationSession {
    pub fn new(source: &SourceImage, viewport: Viewport, policy: ModeSwitchPolicy) -> Self {
        let base_display = fit_to_viewport(&source.pixels, viewport);
        Self {
            path: source.path.clone(),
            size: source.size,
            viewport,
            collector: PromptCollector::new(policy),
            current_display: base_display.clone(),
            base_display,
            showing_result: false,
            revision: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn collector(&self) -> &PromptCollector {
        &self.collector
    }

    pub fn collector_mut(&mut self) -> &mut PromptCollector {
        &mut self.collector
    }

    /// The image currently shown on the canvas, at viewport size.
    pub fn display(&self) -> &RgbImage {
        &self.current_display
    }

    /// Bumped whenever [`Self::display`] changes, so callers can re-upload
    /// textures only when needed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the canvas shows a segmentation result rather than the plain image.
    pub fn showing_result(&self) -> bool {
        self.showing_result
    }

    /// Image-space prompt for the active mode.
    pub fn resolve_prompt(&self) -> Result<Prompt> {
        self.collector.resolve(self.viewport, self.size)
    }

    /// Point markers in display space, for drawing.
    pub fn markers(&self) -> &[DisplayPoint] {
        self.collector.points()
    }

    /// Canvas position of a source pixel.
    pub fn display_position(&self, p: crate::geometry::ImagePoint) -> DisplayPoint {
        to_display_space(p, self.viewport, self.size)
    }

    /// Replace the canvas with a source-resolution result.
    pub fn show_result(&mut self, result: &RgbImage) {
        self.current_display = fit_to_viewport(result, self.viewport);
        self.showing_result = true;
        self.revision += 1;
    }

    /// Drop all collected input and restore the plain image. Idempotent.
    pub fn clear(&mut self) {
        self.collector.clear();
        if self.showing_result() {
            self.current_display = self.base_display.clone();
            self.showing_result = false;
            self.revision += 1;
        }
    }

    /// Resolve the active prompt, run it and show the result.
    ///
    /// On error the canvas is left untouched.
    pub fn run(&mut self, predictor: &mut SegPredictor) -> Result<()> {
        if predictor.source().map(|s| s.path.as_path()) != Some(self.path.as_path()) {
            return Err(SegError::NoImageSelected);
        }
        let prompt = self.resolve_prompt()?;
        debug!("Running {} prompt on {}", prompt.mode(), self.path.display());
        let result = predictor.segment(&prompt)?;
        self.show_result(&result);
        Ok(())
    }
}

/// Segment the active session, if there is one.
pub fn segment_session(
    predictor: &mut SegPredictor,
    session: Option<&mut SegmentationSession>,
) -> Result<()> {
    session
        .ok_or(SegError::NoImageSelected)?
        .run(predictor)
}
