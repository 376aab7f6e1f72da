use anyhow::Context;
use segprompt_core::config::AppConfig;
use segprompt_core::consts::SUPPORTED_EXTENSIONS;

use crate::app::SegPromptApp;
use crate::messages::{WorkerCommand, WorkerResult};

pub fn show(ctx: &egui::Context, app: &mut SegPromptApp) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                let open_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O);
                if ui.add(egui::Button::new("Open Image...").shortcut_text(ctx.format_shortcut(&open_shortcut))).clicked() {
                    ui.close();
                    open_image(app);
                }

                let save_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S);
                let can_save = app.session.as_ref().is_some_and(|s| s.showing_result());
                if ui
                    .add_enabled(can_save, egui::Button::new("Save Result...").shortcut_text(ctx.format_shortcut(&save_shortcut)))
                    .clicked()
                {
                    ui.close();
                    save_result(app);
                }

                ui.separator();

                if ui.button("Import Config...").clicked() {
                    ui.close();
                    import_config(app);
                }

                if ui.button("Export Config...").clicked() {
                    ui.close();
                    export_config(app);
                }

                ui.separator();

                let quit_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q);
                if ui.add(egui::Button::new("Quit").shortcut_text(ctx.format_shortcut(&quit_shortcut))).clicked() {
                    ui.close();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                if ui.button("Clear Prompt").clicked() {
                    ui.close();
                    app.clear();
                }
                if ui.button("Reset Defaults").clicked() {
                    ui.close();
                    app.ui_state.add_log("Config reset to defaults".into());
                    app.apply_config(AppConfig::default());
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    ui.close();
                    app.show_about = true;
                }
            });
        });

        // Keyboard shortcuts (consumed outside menus)
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O))) {
            open_image(app);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S))) {
            save_result(app);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q))) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

/// Pick an image on a helper thread and ask the worker to load it.
pub(crate) fn open_image(app: &mut SegPromptApp) {
    let cmd_tx = app.cmd_tx.clone();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", SUPPORTED_EXTENSIONS)
            .add_filter("All files", &["*"])
            .pick_file()
        {
            let _ = cmd_tx.send(WorkerCommand::LoadImage { path });
        }
    });
}

pub(crate) fn save_result(app: &mut SegPromptApp) {
    let Some(ref session) = app.session else {
        return;
    };
    if !session.showing_result() {
        app.ui_state.add_log("Run a segmentation before saving".into());
        return;
    }
    let file_name = format!(
        "{}_{}.png",
        session
            .path()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "result".into()),
        session.collector().mode().to_string().to_lowercase()
    );

    let cmd_tx = app.cmd_tx.clone();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .add_filter("JPEG", &["jpg", "jpeg"])
            .set_file_name(file_name)
            .save_file()
        {
            let _ = cmd_tx.send(WorkerCommand::SaveResult { path });
        }
    });
}

fn import_config(app: &mut SegPromptApp) {
    let result_tx = app.result_tx.clone();
    std::thread::spawn(move || {
        let Some(path) = rfd::FileDialog::new().add_filter("TOML", &["toml"]).pick_file() else {
            return;
        };
        let result = AppConfig::load(&path)
            .with_context(|| format!("Failed to import {}", path.display()));
        let message = match result {
            Ok(config) => WorkerResult::ConfigImported { config },
            Err(e) => WorkerResult::Error {
                message: format!("{e:#}"),
            },
        };
        let _ = result_tx.send(message);
    });
}

fn export_config(app: &mut SegPromptApp) {
    let config = app.config.clone();
    let result_tx = app.result_tx.clone();

    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("TOML", &["toml"])
            .set_file_name("segprompt.toml")
            .save_file()
        {
            let message = match config.save(&path) {
                Ok(()) => WorkerResult::Log {
                    message: format!("Config exported to {}", path.display()),
                },
                Err(e) => WorkerResult::Error {
                    message: format!("Failed to export config: {e}"),
                },
            };
            let _ = result_tx.send(message);
        }
    });
}
