pub mod image_io;

pub use image_io::{is_supported, load_source_image, save_rgb, SourceImage};
