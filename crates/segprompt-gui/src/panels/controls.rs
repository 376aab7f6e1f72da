use segprompt_core::prompt::{CollectorState, ModeSwitchPolicy, PromptMode};

use crate::app::SegPromptApp;
use crate::panels::{menu_bar, section_header};

const LEFT_PANEL_WIDTH: f32 = 240.0;

pub fn show(ctx: &egui::Context, app: &mut SegPromptApp) {
    egui::SidePanel::left("controls")
        .default_width(LEFT_PANEL_WIDTH)
        .resizable(true)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.set_min_width(LEFT_PANEL_WIDTH - 20.0);

                file_section(ui, app);
                ui.separator();
                mode_section(ui, app);
                ui.separator();
                prompt_section(ui, app);
                ui.separator();
                options_section(ui, app);
                ui.separator();
                actions_section(ui, app);
            });
        });
}

fn file_section(ui: &mut egui::Ui, app: &mut SegPromptApp) {
    let status = app.ui_state.model_loaded.then_some("model ready");
    section_header(ui, "Image", status);
    ui.add_space(4.0);

    if ui.button("Open...").clicked() {
        menu_bar::open_image(app);
    }

    if let Some(ref session) = app.session {
        ui.label(
            session
                .path()
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        ui.small(format!("{} px", session.size()));
        if let Some(masks) = app.ui_state.base_masks {
            ui.small(format!("{masks} segments found"));
        }
    }
}

fn mode_section(ui: &mut egui::Ui, app: &mut SegPromptApp) {
    section_header(ui, "Prompt Mode", None);
    ui.add_space(4.0);

    let current = app.mode();
    let enabled = app.session.is_some();
    ui.add_enabled_ui(enabled, |ui| {
        for &mode in PromptMode::ALL {
            let text_disabled = mode == PromptMode::Text && !app.ui_state.text_prompts;
            let response = ui.add_enabled(
                !text_disabled,
                egui::RadioButton::new(current == mode, mode.to_string()),
            );
            let response = if text_disabled {
                response.on_disabled_hover_text("No text encoder configured")
            } else {
                response
            };
            if response.clicked() {
                app.set_mode(mode);
            }
        }
    });
}

fn prompt_section(ui: &mut egui::Ui, app: &mut SegPromptApp) {
    section_header(ui, "Prompt", None);
    ui.add_space(4.0);

    let Some(ref mut session) = app.session else {
        ui.small("Open an image to begin");
        return;
    };

    let mut run = false;
    let collector = session.collector_mut();
    match collector.state() {
        CollectorState::Idle if collector.mode() == PromptMode::Everything => {
            ui.small("Segments the whole image");
        }
        CollectorState::Idle => {
            ui.small("Drag a rectangle on the image");
        }
        CollectorState::CollectingPoints => {
            ui.small(format!(
                "{} point(s). Click the image to add more",
                collector.points().len()
            ));
        }
        CollectorState::DraggingBox => {
            ui.small("Release to finish the box");
        }
        CollectorState::BoxReady => {
            if let Some(b) = collector.bbox() {
                ui.small(format!(
                    "Box {:.0},{:.0} to {:.0},{:.0}",
                    b.min().x,
                    b.min().y,
                    b.max().x,
                    b.max().y
                ));
            }
        }
        CollectorState::EnteringText => {
            let response = ui.add(
                egui::TextEdit::singleline(collector.text_mut())
                    .hint_text("Describe the object")
                    .desired_width(f32::INFINITY),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                run = true;
            }
        }
    }

    if run {
        app.run_segmentation();
    }
}

fn options_section(ui: &mut egui::Ui, app: &mut SegPromptApp) {
    section_header(ui, "Options", None);
    ui.add_space(4.0);

    let mut policy = app.config.mode_switch;
    egui::ComboBox::from_label("On mode switch")
        .selected_text(policy.to_string())
        .show_ui(ui, |ui| {
            for &p in ModeSwitchPolicy::ALL {
                ui.selectable_value(&mut policy, p, p.to_string());
            }
        });
    if policy != app.config.mode_switch {
        app.config.mode_switch = policy;
        if let Some(ref mut session) = app.session {
            session.collector_mut().set_policy(policy);
        }
    }

    ui.small(format!("Device: {}", app.config.model.device));
}

fn actions_section(ui: &mut egui::Ui, app: &mut SegPromptApp) {
    ui.add_space(4.0);
    let has_session = app.session.is_some();

    let run_label = if app.ui_state.is_busy() {
        "Run (queued)"
    } else {
        "Run"
    };
    let run_button = egui::Button::new(egui::RichText::new(run_label).strong())
        .min_size(egui::vec2(ui.available_width(), 28.0));
    if ui.add_enabled(has_session, run_button).clicked() {
        app.run_segmentation();
    }

    ui.horizontal(|ui| {
        if ui.add_enabled(has_session, egui::Button::new("Clear")).clicked() {
            app.clear();
        }
        let can_save = app.session.as_ref().is_some_and(|s| s.showing_result());
        if ui.add_enabled(can_save, egui::Button::new("Save...")).clicked() {
            menu_bar::save_result(app);
        }
    });
}
