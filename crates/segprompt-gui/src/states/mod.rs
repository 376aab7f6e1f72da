mod canvas;
mod ui;

pub use canvas::CanvasState;
pub use ui::{Busy, UIState};
