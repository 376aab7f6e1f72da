use segprompt_core::geometry::{DisplayBox, DisplayPoint};
use segprompt_core::session::SegmentationSession;

use crate::app::SegPromptApp;

const MARKER_RADIUS: f32 = 5.0;

pub fn show(ctx: &egui::Context, app: &mut SegPromptApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let panel = ui.available_rect_before_wrap();
        paint_background(ui, panel);

        let texture_id = app.canvas.texture.as_ref().map(|t| t.id());
        let (Some(texture_id), Some(session)) = (texture_id, app.session.as_mut()) else {
            show_placeholder(ui);
            return;
        };

        // The canvas is drawn at exactly viewport size so display-space
        // coordinates map 1:1 to logical points.
        let viewport = session.viewport();
        let size = egui::vec2(viewport.width as f32, viewport.height as f32);
        let canvas = egui::Rect::from_center_size(panel.center(), size);
        let response = ui.allocate_rect(canvas, egui::Sense::click_and_drag());

        handle_pointer(ui, &response, canvas, session);

        draw_image(ui, texture_id, canvas);
        draw_prompt(ui, canvas, session);
        draw_viewing_label(ui, panel, &app.canvas.viewing_label);
    });
}

/// Position relative to the canvas origin, clamped to its extent.
fn to_canvas(pos: egui::Pos2, canvas: egui::Rect) -> DisplayPoint {
    let rel = canvas.clamp(pos) - canvas.min;
    DisplayPoint::new(rel.x, rel.y)
}

fn to_screen(p: DisplayPoint, canvas: egui::Rect) -> egui::Pos2 {
    canvas.min + egui::vec2(p.x, p.y)
}

fn handle_pointer(
    ui: &egui::Ui,
    response: &egui::Response,
    canvas: egui::Rect,
    session: &mut SegmentationSession,
) {
    let collector = session.collector_mut();

    if response.clicked_by(egui::PointerButton::Primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            let p = to_canvas(pos, canvas);
            collector.pointer_down(p);
            collector.pointer_up(p);
        }
        return;
    }

    if response.drag_started_by(egui::PointerButton::Primary) {
        let origin = ui
            .input(|i| i.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos());
        if let Some(pos) = origin {
            collector.pointer_down(to_canvas(pos, canvas));
        }
    }

    if response.dragged_by(egui::PointerButton::Primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            collector.pointer_drag(to_canvas(pos, canvas));
        }
    }

    if response.drag_stopped_by(egui::PointerButton::Primary) {
        let last = response
            .interact_pointer_pos()
            .or_else(|| ui.input(|i| i.pointer.latest_pos()));
        if let Some(pos) = last {
            collector.pointer_up(to_canvas(pos, canvas));
        }
    }
}

fn paint_background(ui: &egui::Ui, rect: egui::Rect) {
    ui.painter()
        .rect_filled(rect, 0.0, egui::Color32::from_gray(30));
}

fn draw_image(ui: &egui::Ui, texture_id: egui::TextureId, canvas: egui::Rect) {
    ui.painter().image(
        texture_id,
        canvas,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
}

fn draw_prompt(ui: &egui::Ui, canvas: egui::Rect, session: &SegmentationSession) {
    let painter = ui.painter_at(canvas);
    let collector = session.collector();

    for &p in session.markers() {
        let center = to_screen(p, canvas);
        painter.circle_filled(center, MARKER_RADIUS, egui::Color32::from_rgb(230, 40, 40));
        painter.circle_stroke(center, MARKER_RADIUS, egui::Stroke::new(1.0, egui::Color32::WHITE));
    }

    if let Some(b) = collector.bbox() {
        draw_box(&painter, canvas, b, egui::Color32::from_rgb(40, 220, 80));
    }
    if let Some(b) = collector.drag_preview() {
        draw_box(&painter, canvas, b, egui::Color32::from_rgb(255, 255, 0));
    }
}

fn draw_box(painter: &egui::Painter, canvas: egui::Rect, b: DisplayBox, color: egui::Color32) {
    let rect = egui::Rect::from_min_max(to_screen(b.min(), canvas), to_screen(b.max(), canvas));
    painter.rect_stroke(
        rect,
        0.0,
        egui::Stroke::new(1.5, color),
        egui::epaint::StrokeKind::Outside,
    );
}

fn draw_viewing_label(ui: &egui::Ui, rect: egui::Rect, label: &str) {
    if label.is_empty() {
        return;
    }
    let label_pos = rect.left_top() + egui::vec2(8.0, 8.0);
    ui.painter().text(
        label_pos,
        egui::Align2::LEFT_TOP,
        label,
        egui::FontId::proportional(14.0),
        egui::Color32::from_white_alpha(200),
    );
}

fn show_placeholder(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.label(
            egui::RichText::new("Open an image to begin")
                .size(18.0)
                .color(egui::Color32::from_gray(100)),
        );
    });
}
