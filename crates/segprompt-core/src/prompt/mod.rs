mod collector;
mod mode;
mod request;

pub use collector::{CollectorState, PromptCollector};
pub use mode::{ModeSwitchPolicy, PointLabel, PromptMode};
pub use request::{LabeledPoint, Prompt};
