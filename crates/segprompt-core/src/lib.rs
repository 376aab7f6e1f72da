pub mod config;
pub mod consts;
pub mod error;
pub mod geometry;
pub mod io;
pub mod mask;
pub mod model;
pub mod predictor;
pub mod prompt;
pub mod render;
pub mod session;
