use crate::app::SegPromptApp;

pub fn show(ctx: &egui::Context, app: &mut SegPromptApp) {
    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.add_space(2.0);

        // Inference time is unknown up front, so the bar only animates.
        if let Some(busy) = app.ui_state.busy {
            ui.add(
                egui::ProgressBar::new(0.0)
                    .text(format!("{busy}..."))
                    .animate(true),
            );
        } else {
            ui.add(egui::ProgressBar::new(0.0).text(""));
        }

        // Log area, fixed height for 4 lines, scrollable.
        let line_height = ui.text_style_height(&egui::TextStyle::Body);
        let spacing = ui.spacing().item_spacing.y;
        let log_height = line_height * 4.0 + spacing * 3.0;

        egui::ScrollArea::vertical()
            .max_height(log_height)
            .min_scrolled_height(log_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if app.ui_state.log_messages.is_empty() {
                    for _ in 0..4 {
                        ui.label("");
                    }
                } else {
                    for msg in &app.ui_state.log_messages {
                        ui.label(msg);
                    }
                }
            });

        ui.horizontal(|ui| {
            if let Some(ref session) = app.session {
                ui.label(format!("{}", session.size()));
                ui.separator();
                ui.label(format!("Canvas: {}", session.viewport()));
                ui.separator();
                ui.label(format!("Mode: {}", session.collector().mode()));
                ui.separator();
            }
            ui.label(format!("Device: {}", app.config.model.device));
        });

        ui.add_space(2.0);
    });
}
