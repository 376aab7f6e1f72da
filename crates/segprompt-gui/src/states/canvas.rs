/// Texture for the fixed-size segmentation canvas.
#[derive(Default)]
pub struct CanvasState {
    pub texture: Option<egui::TextureHandle>,
    /// Session revision the texture was built from.
    pub revision: Option<u64>,
    pub viewing_label: String,
}

impl CanvasState {
    pub fn reset(&mut self) {
        self.texture = None;
        self.revision = None;
        self.viewing_label.clear();
    }
}
