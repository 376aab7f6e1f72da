mod common;

use segprompt_core::error::SegError;
use segprompt_core::io::{is_supported, load_source_image, save_rgb};

use common::gradient_image;

#[test]
fn test_supported_extensions_case_insensitive() {
    for name in ["a.jpg", "b.JPEG", "c.Png", "d.bmp", "e.gif", "f.TIFF", "g.tif"] {
        assert!(is_supported(name.as_ref()), "{name}");
    }
    for name in ["a.webp", "b.ser", "noext"] {
        assert!(!is_supported(name.as_ref()), "{name}");
    }
}

#[test]
fn test_png_roundtrip() {
    let image = gradient_image(32, 24);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.png");

    save_rgb(&image, &path).unwrap();
    let loaded = load_source_image(&path).unwrap();
    assert_eq!((loaded.size.width, loaded.size.height), (32, 24));
    assert_eq!(loaded.pixels, image);
    assert_eq!(loaded.file_name(), "scene.png");
}

#[test]
fn test_uppercase_extension_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("SCENE.BMP");
    save_rgb(&gradient_image(8, 8), &path).unwrap();
    assert!(load_source_image(&path).is_ok());
}

#[test]
fn test_unsupported_format_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"not an image").unwrap();
    assert!(matches!(
        load_source_image(&path),
        Err(SegError::UnsupportedFormat(ext)) if ext == "txt"
    ));
}

#[test]
fn test_save_without_extension_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result");
    save_rgb(&gradient_image(4, 4), &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

#[test]
fn test_save_unsupported_extension_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.xyz");
    assert!(matches!(
        save_rgb(&gradient_image(4, 4), &path),
        Err(SegError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_corrupt_image_is_an_image_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"definitely not png").unwrap();
    assert!(matches!(load_source_image(&path), Err(SegError::Image(_))));
}
