use image::RgbImage;

/// Convert an 8-bit RGB image to an egui ColorImage.
pub fn rgb_to_color_image(image: &RgbImage) -> egui::ColorImage {
    let size = [image.width() as usize, image.height() as usize];
    egui::ColorImage::from_rgb(size, image.as_raw())
}
