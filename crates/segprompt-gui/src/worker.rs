use std::path::Path;
use std::sync::mpsc;
use std::time::Instant;

use image::RgbImage;
use segprompt_core::config::AppConfig;
use segprompt_core::error::SegError;
use segprompt_core::io::{load_source_image, save_rgb, SourceImage};
use segprompt_core::predictor::SegPredictor;
use segprompt_core::prompt::Prompt;
use tracing::debug;

use crate::messages::{WorkerCommand, WorkerResult};
use crate::states::Busy;

/// Spawn the worker thread. Returns the command sender.
pub fn spawn_worker(
    result_tx: mpsc::Sender<WorkerResult>,
    ctx: egui::Context,
) -> mpsc::Sender<WorkerCommand> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCommand>();

    std::thread::Builder::new()
        .name("segprompt-worker".into())
        .spawn(move || {
            worker_loop(cmd_rx, result_tx, ctx);
        })
        .expect("Failed to spawn worker thread");

    cmd_tx
}

fn send(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, result: WorkerResult) {
    let _ = tx.send(result);
    ctx.request_repaint();
}

fn send_log(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, msg: impl Into<String>) {
    send(
        tx,
        ctx,
        WorkerResult::Log {
            message: msg.into(),
        },
    );
}

fn send_error(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, msg: impl Into<String>) {
    send(
        tx,
        ctx,
        WorkerResult::Error {
            message: msg.into(),
        },
    );
}

fn send_unloaded(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, msg: impl Into<String>) {
    send(
        tx,
        ctx,
        WorkerResult::ImageUnloaded {
            message: msg.into(),
        },
    );
}

/// Report a failed segmentation. Expected interactive errors only end the
/// busy state.
fn send_seg_error(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, err: SegError) {
    if err.is_silent() {
        debug!("Ignoring silent error: {err}");
        send(tx, ctx, WorkerResult::Idle);
    } else {
        send_error(tx, ctx, err.to_string());
    }
}

/// Drop every `Segment` command that a later `Segment` in the same batch
/// supersedes. Other commands are kept in order.
pub(crate) fn coalesce(batch: Vec<WorkerCommand>) -> Vec<WorkerCommand> {
    let last_segment = batch
        .iter()
        .rposition(|cmd| matches!(cmd, WorkerCommand::Segment { .. }));
    let before = batch.len();

    let kept: Vec<WorkerCommand> = batch
        .into_iter()
        .enumerate()
        .filter(|(i, cmd)| {
            !matches!(cmd, WorkerCommand::Segment { .. }) || Some(*i) == last_segment
        })
        .map(|(_, cmd)| cmd)
        .collect();

    if kept.len() < before {
        debug!("Dropped {} superseded segmentation requests", before - kept.len());
    }
    kept
}

struct WorkerState {
    config: AppConfig,
    predictor: Option<SegPredictor>,
    last_result: Option<RgbImage>,
}

impl WorkerState {
    /// Load the models on first use. Failure is reported and leaves the
    /// worker without a predictor; the next image load tries again.
    fn ensure_predictor(
        &mut self,
        tx: &mpsc::Sender<WorkerResult>,
        ctx: &egui::Context,
    ) -> Option<&mut SegPredictor> {
        if self.predictor.is_none() {
            send_log(
                tx,
                ctx,
                format!("Loading model {}...", self.config.model.weights.display()),
            );
            match SegPredictor::from_config(&self.config) {
                Ok(predictor) => {
                    send(
                        tx,
                        ctx,
                        WorkerResult::ModelLoaded {
                            text_prompts: predictor.has_text_model(),
                        },
                    );
                    self.predictor = Some(predictor);
                }
                Err(e) => {
                    send_error(tx, ctx, e.to_string());
                    return None;
                }
            }
        }
        self.predictor.as_mut()
    }
}

fn worker_loop(
    cmd_rx: mpsc::Receiver<WorkerCommand>,
    tx: mpsc::Sender<WorkerResult>,
    ctx: egui::Context,
) {
    let mut state = WorkerState {
        config: AppConfig::default(),
        predictor: None,
        last_result: None,
    };

    while let Ok(first) = cmd_rx.recv() {
        let mut batch = vec![first];
        batch.extend(cmd_rx.try_iter());

        for cmd in coalesce(batch) {
            match cmd {
                WorkerCommand::Configure { config } => {
                    handle_configure(config, &mut state, &tx, &ctx);
                }
                WorkerCommand::LoadImage { path } => {
                    handle_load_image(&path, &mut state, &tx, &ctx);
                }
                WorkerCommand::Segment { path, prompt } => {
                    handle_segment(&path, &prompt, &mut state, &tx, &ctx);
                }
                WorkerCommand::SaveResult { path } => {
                    handle_save_result(&path, &state, &tx, &ctx);
                }
            }
        }
    }
}

fn handle_configure(
    config: AppConfig,
    state: &mut WorkerState,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let retained = state
        .predictor
        .take()
        .and_then(|p| p.source().cloned());
    state.config = config;
    state.last_result = None;

    // Keep the current image usable with the new models.
    if let Some(source) = retained {
        let Some(predictor) = state.ensure_predictor(tx, ctx) else {
            send_unloaded(tx, ctx, "Model unavailable, image closed");
            return;
        };
        if let Err(e) = predictor.set_image(source) {
            send_unloaded(tx, ctx, e.to_string());
            return;
        }
        send_log(tx, ctx, "Configuration applied, base pass recomputed");
    } else {
        send_log(tx, ctx, "Configuration applied");
    }
    send(tx, ctx, WorkerResult::Idle);
}

fn handle_load_image(
    path: &Path,
    state: &mut WorkerState,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    send(
        tx,
        ctx,
        WorkerResult::Started {
            busy: Busy::LoadingImage,
        },
    );
    let source: SourceImage = match load_source_image(path) {
        Ok(s) => s,
        Err(e) => {
            send_error(tx, ctx, format!("Failed to open {}: {e}", path.display()));
            return;
        }
    };
    apply_source(source, state, tx, ctx);
}

/// Run the base pass on a decoded image. On failure the predictor holds no
/// image any more, so the UI is told to drop its session too.
fn apply_source(
    source: SourceImage,
    state: &mut WorkerState,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    state.last_result = None;

    let Some(predictor) = state.ensure_predictor(tx, ctx) else {
        return;
    };

    let start = Instant::now();
    match predictor.set_image(source) {
        Ok(source) => {
            let source = source.clone();
            let masks = predictor.base_masks().len();
            send(
                tx,
                ctx,
                WorkerResult::ImageLoaded {
                    source,
                    masks,
                    elapsed: start.elapsed(),
                },
            );
        }
        Err(e) => send_unloaded(tx, ctx, e.to_string()),
    }
}

fn handle_segment(
    path: &Path,
    prompt: &Prompt,
    state: &mut WorkerState,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let Some(predictor) = state.predictor.as_mut() else {
        send_seg_error(tx, ctx, SegError::NoModelLoaded);
        return;
    };
    if predictor.source().map(|s| s.path.as_path()) != Some(path) {
        send_error(
            tx,
            ctx,
            format!("{} is no longer loaded, open it again", path.display()),
        );
        return;
    }

    let start = Instant::now();
    match predictor.segment(prompt) {
        Ok(image) => {
            state.last_result = Some(image.clone());
            send(
                tx,
                ctx,
                WorkerResult::SegmentComplete {
                    path: path.to_path_buf(),
                    image,
                    elapsed: start.elapsed(),
                },
            );
        }
        Err(e) => send_seg_error(tx, ctx, e),
    }
}

fn handle_save_result(
    path: &Path,
    state: &WorkerState,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let Some(ref image) = state.last_result else {
        send_error(tx, ctx, "No segmentation result to save");
        return;
    };
    send(tx, ctx, WorkerResult::Started { busy: Busy::Saving });
    match save_rgb(image, path) {
        Ok(()) => send(
            tx,
            ctx,
            WorkerResult::ResultSaved {
                path: path.to_path_buf(),
            },
        ),
        Err(e) => send_error(tx, ctx, format!("Failed to save {}: {e}", path.display())),
    }
}
