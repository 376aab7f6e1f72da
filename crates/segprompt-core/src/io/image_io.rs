use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use tracing::debug;

use crate::consts::SUPPORTED_EXTENSIONS;
use crate::error::{Result, SegError};
use crate::geometry::ImageSize;

/// A decoded source image. Immutable once loaded.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub path: PathBuf,
    pub pixels: RgbImage,
    pub size: ImageSize,
}

impl SourceImage {
    /// Wrap already-decoded pixels, e.g. synthetic images in tests.
    pub fn from_pixels(path: impl Into<PathBuf>, pixels: RgbImage) -> Result<Self> {
        let size = ImageSize::new(pixels.width(), pixels.height())?;
        Ok(Self {
            path: path.into(),
            pixels,
            size,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Whether the file extension is one of the accepted raster formats.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}

/// Load an image file as 8-bit RGB.
pub fn load_source_image(path: &Path) -> Result<SourceImage> {
    if !is_supported(path) {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "<none>".to_string());
        return Err(SegError::UnsupportedFormat(ext));
    }

    let pixels = image::open(path)?.to_rgb8();
    debug!(
        "Loaded {} ({}x{})",
        path.display(),
        pixels.width(),
        pixels.height()
    );
    SourceImage::from_pixels(path, pixels)
}

/// Save an RGB image, choosing format from file extension (PNG when there is none).
pub fn save_rgb(image: &RgbImage, path: &Path) -> Result<()> {
    let format = match path.extension().and_then(|e| e.to_str()) {
        None => ImageFormat::Png,
        Some(ext) if is_supported(path) => ImageFormat::from_extension(ext)
            .ok_or_else(|| SegError::UnsupportedFormat(ext.to_string()))?,
        Some(ext) => return Err(SegError::UnsupportedFormat(ext.to_string())),
    };
    image.save_with_format(path, format)?;
    Ok(())
}
