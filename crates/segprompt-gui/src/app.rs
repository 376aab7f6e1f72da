use std::sync::mpsc;

use segprompt_core::config::AppConfig;
use segprompt_core::error::SegError;
use segprompt_core::prompt::PromptMode;
use segprompt_core::session::SegmentationSession;
use tracing::debug;

use crate::convert::rgb_to_color_image;
use crate::messages::{WorkerCommand, WorkerResult};
use crate::panels;
use crate::states::{Busy, CanvasState, UIState};
use crate::worker;

pub struct SegPromptApp {
    pub cmd_tx: mpsc::Sender<WorkerCommand>,
    pub result_tx: mpsc::Sender<WorkerResult>,
    pub result_rx: mpsc::Receiver<WorkerResult>,
    pub ui_state: UIState,
    pub canvas: CanvasState,
    pub config: AppConfig,
    /// Prompt input and display state for the loaded image.
    pub session: Option<SegmentationSession>,
    pub show_about: bool,
}

impl SegPromptApp {
    pub fn new(ctx: &egui::Context) -> Self {
        let (result_tx, result_rx) = mpsc::channel();
        let cmd_tx = worker::spawn_worker(result_tx.clone(), ctx.clone());

        Self {
            cmd_tx,
            result_tx,
            result_rx,
            ui_state: UIState::default(),
            canvas: CanvasState::default(),
            config: AppConfig::default(),
            session: None,
            show_about: false,
        }
    }

    /// Drain all pending results from the worker.
    fn poll_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                WorkerResult::ModelLoaded { text_prompts } => {
                    self.ui_state.model_loaded = true;
                    self.ui_state.text_prompts = text_prompts;
                    self.ui_state.add_log(if text_prompts {
                        "Model loaded (text prompts enabled)".into()
                    } else {
                        "Model loaded (no text encoder configured)".into()
                    });
                }
                WorkerResult::Started { busy } => {
                    self.ui_state.busy = Some(busy);
                }
                WorkerResult::ImageLoaded {
                    source,
                    masks,
                    elapsed,
                } => {
                    self.ui_state.busy = None;
                    self.ui_state.base_masks = Some(masks);
                    self.ui_state.add_log(format!(
                        "Opened: {} ({}, {} segments, {})",
                        source.path.display(),
                        source.size,
                        masks,
                        format_duration(elapsed)
                    ));
                    self.session = Some(SegmentationSession::new(
                        &source,
                        self.config.viewport,
                        self.config.mode_switch,
                    ));
                    self.canvas.reset();
                    self.canvas.viewing_label = source.file_name();
                }
                WorkerResult::ImageUnloaded { message } => {
                    self.ui_state.busy = None;
                    self.ui_state.base_masks = None;
                    self.ui_state.add_log(format!("ERROR: {message}"));
                    self.session = None;
                    self.canvas.reset();
                }
                WorkerResult::SegmentComplete {
                    path,
                    image,
                    elapsed,
                } => {
                    self.ui_state.busy = None;
                    // A result for an image that has since been replaced is stale.
                    match self.session.as_mut() {
                        Some(session) if session.path() == path => {
                            session.show_result(&image);
                            self.ui_state.add_log(format!(
                                "{} segmentation in {}",
                                session.collector().mode(),
                                format_duration(elapsed)
                            ));
                        }
                        _ => debug!("Discarding result for {}", path.display()),
                    }
                }
                WorkerResult::ResultSaved { path } => {
                    self.ui_state.busy = None;
                    self.ui_state.add_log(format!("Saved: {}", path.display()));
                }
                WorkerResult::ConfigImported { config } => {
                    self.ui_state.add_log("Config imported".into());
                    self.apply_config(config);
                }
                WorkerResult::Idle => {
                    self.ui_state.busy = None;
                }
                WorkerResult::Error { message } => {
                    self.ui_state.busy = None;
                    self.ui_state.add_log(format!("ERROR: {message}"));
                }
                WorkerResult::Log { message } => {
                    self.ui_state.add_log(message);
                }
            }
        }
    }

    /// Re-upload the canvas texture when the session display changed.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let Some(ref session) = self.session else {
            return;
        };
        if self.canvas.revision == Some(session.revision()) && self.canvas.texture.is_some() {
            return;
        }
        let image = rgb_to_color_image(session.display());
        self.canvas.texture = Some(ctx.load_texture(
            "canvas",
            image,
            egui::TextureOptions::LINEAR,
        ));
        self.canvas.revision = Some(session.revision());
    }

    pub fn send_command(&self, cmd: WorkerCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    /// Resolve the active prompt and hand it to the worker.
    pub fn run_segmentation(&mut self) {
        let request = self
            .session
            .as_ref()
            .ok_or(SegError::NoImageSelected)
            .and_then(|s| Ok((s.path().to_path_buf(), s.resolve_prompt()?)));

        match request {
            Ok((path, prompt)) => {
                self.ui_state.busy = Some(Busy::Segmenting);
                self.send_command(WorkerCommand::Segment { path, prompt });
            }
            Err(e) if e.is_silent() => debug!("Nothing to segment: {e}"),
            Err(e) => self.ui_state.add_log(format!("ERROR: {e}")),
        }
    }

    pub fn clear(&mut self) {
        if let Some(ref mut session) = self.session {
            session.clear();
        }
    }

    pub fn set_mode(&mut self, mode: PromptMode) {
        if let Some(ref mut session) = self.session {
            session.collector_mut().set_mode(mode);
        }
    }

    pub fn mode(&self) -> PromptMode {
        self.session
            .as_ref()
            .map(|s| s.collector().mode())
            .unwrap_or_default()
    }

    pub fn apply_config(&mut self, config: AppConfig) {
        if config.viewport != self.config.viewport && self.session.is_some() {
            self.ui_state
                .add_log(format!("Canvas size {} applies to the next image", config.viewport));
        }
        if let Some(ref mut session) = self.session {
            session.collector_mut().set_policy(config.mode_switch);
        }
        self.config = config.clone();
        self.ui_state.busy = Some(Busy::Configuring);
        self.send_command(WorkerCommand::Configure { config });
    }
}

impl eframe::App for SegPromptApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results();
        self.sync_texture(ctx);

        panels::menu_bar::show(ctx, self);
        panels::status::show(ctx, self);
        panels::controls::show(ctx, self);
        panels::canvas::show(ctx, self);

        if self.show_about {
            egui::Window::new("About SegPrompt")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("SegPrompt");
                        ui.label("Prompted segmentation with FastSAM");
                        ui.add_space(8.0);
                        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        if ui.button("Close").clicked() {
                            self.show_about = false;
                        }
                    });
                });
        }
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        let mins = secs / 60.0;
        format!("{mins:.1}min")
    }
}
