use approx::assert_relative_eq;

use segprompt_core::error::SegError;
use segprompt_core::geometry::{
    box_to_image_space, to_display_space, to_image_space, DisplayBox, DisplayPoint, ImageBox,
    ImagePoint, ImageSize, Viewport,
};

fn viewport() -> Viewport {
    Viewport::default()
}

fn source() -> ImageSize {
    ImageSize::new(1200, 800).unwrap()
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn test_default_viewport_is_600x400() {
    let v = Viewport::default();
    assert_eq!((v.width, v.height), (600, 400));
}

#[test]
fn test_zero_sized_viewport_rejected() {
    assert!(matches!(
        Viewport::new(0, 400),
        Err(SegError::InvalidDimensions { width: 0, height: 400 })
    ));
}

#[test]
fn test_zero_sized_image_rejected() {
    assert!(matches!(
        ImageSize::new(640, 0),
        Err(SegError::InvalidDimensions { .. })
    ));
}

// ---------------------------------------------------------------------------
// Display -> image
// ---------------------------------------------------------------------------

#[test]
fn test_centre_maps_to_centre() {
    let p = to_image_space(DisplayPoint::new(300.0, 200.0), viewport(), source());
    assert_eq!(p, ImagePoint::new(600, 400));
}

#[test]
fn test_viewport_corners_map_to_image_corners() {
    let top_left = to_image_space(DisplayPoint::new(0.0, 0.0), viewport(), source());
    let bottom_right = to_image_space(DisplayPoint::new(600.0, 400.0), viewport(), source());
    assert_eq!(top_left, ImagePoint::new(0, 0));
    assert_eq!(bottom_right, ImagePoint::new(1199, 799));
}

#[test]
fn test_out_of_canvas_points_are_clamped() {
    let p = to_image_space(DisplayPoint::new(-15.0, 900.0), viewport(), source());
    assert_eq!(p, ImagePoint::new(0, 799));
}

#[test]
fn test_smaller_source_rounds_to_nearest_pixel() {
    let small = ImageSize::new(300, 200).unwrap();
    // 301 * 0.5 = 150.5 -> 151, 99 * 0.5 = 49.5 -> 50
    let p = to_image_space(DisplayPoint::new(301.0, 99.0), viewport(), small);
    assert_eq!(p, ImagePoint::new(151, 50));
}

#[test]
fn test_non_uniform_scaling() {
    // Width is scaled by 2, height by 0.5.
    let wide = ImageSize::new(1200, 200).unwrap();
    let p = to_image_space(DisplayPoint::new(100.0, 100.0), viewport(), wide);
    assert_eq!(p, ImagePoint::new(200, 50));
}

// ---------------------------------------------------------------------------
// Image -> display
// ---------------------------------------------------------------------------

#[test]
fn test_forward_transform() {
    let d = to_display_space(ImagePoint::new(600, 400), viewport(), source());
    assert_relative_eq!(d.x, 300.0);
    assert_relative_eq!(d.y, 200.0);
}

#[test]
fn test_forward_then_inverse_is_stable() {
    for &(x, y) in &[(0, 0), (17, 311), (1199, 799), (640, 2)] {
        let p = ImagePoint::new(x, y);
        let d = to_display_space(p, viewport(), source());
        assert_eq!(to_image_space(d, viewport(), source()), p);
    }
}

// ---------------------------------------------------------------------------
// Boxes
// ---------------------------------------------------------------------------

#[test]
fn test_box_normalized_for_all_drag_directions() {
    let a = DisplayPoint::new(100.0, 50.0);
    let b = DisplayPoint::new(500.0, 350.0);
    let corners = [
        (a, b),
        (b, a),
        (DisplayPoint::new(100.0, 350.0), DisplayPoint::new(500.0, 50.0)),
        (DisplayPoint::new(500.0, 50.0), DisplayPoint::new(100.0, 350.0)),
    ];
    for (start, end) in corners {
        let bx = DisplayBox::from_corners(start, end);
        assert_eq!((bx.x1, bx.y1, bx.x2, bx.y2), (100.0, 50.0, 500.0, 350.0));
    }
}

#[test]
fn test_reverse_drag_box_in_image_space() {
    let same = ImageSize::new(600, 400).unwrap();
    let bx = DisplayBox::from_corners(
        DisplayPoint::new(500.0, 350.0),
        DisplayPoint::new(100.0, 50.0),
    );
    let ib = box_to_image_space(bx, viewport(), same);
    assert_eq!(ib.as_array(), [100, 50, 500, 350]);
}

#[test]
fn test_box_corners_transformed_independently() {
    let bx = DisplayBox::from_corners(
        DisplayPoint::new(10.0, 20.0),
        DisplayPoint::new(300.0, 200.0),
    );
    let ib = box_to_image_space(bx, viewport(), source());
    assert_eq!(ib, ImageBox::new(20, 40, 600, 400));
    assert!(ib.x1 <= ib.x2 && ib.y1 <= ib.y2);
}

#[test]
fn test_full_canvas_drag_covers_whole_image() {
    let bx = DisplayBox::from_corners(DisplayPoint::new(0.0, 0.0), DisplayPoint::new(600.0, 400.0));
    let ib = box_to_image_space(bx, viewport(), source());
    assert_eq!(ib.as_array(), [0, 0, 1200, 800]);
    assert_eq!(ib.area(), 1200 * 800);
}

#[test]
fn test_box_far_edge_clamped_to_image_extent() {
    let bx = DisplayBox::from_corners(DisplayPoint::new(-20.0, -5.0), DisplayPoint::new(900.0, 450.0));
    let ib = box_to_image_space(bx, viewport(), source());
    assert_eq!(ib.as_array(), [0, 0, 1200, 800]);

    // Points at the same position still land on the last pixel.
    let corner = to_image_space(DisplayPoint::new(900.0, 450.0), viewport(), source());
    assert_eq!(corner, ImagePoint::new(1199, 799));
}

#[test]
fn test_image_box_display_format() {
    assert_eq!(ImageBox::new(5, 6, 1, 2).to_string(), "[1, 2, 5, 6]");
}

#[test]
fn test_image_box_clamp() {
    let size = ImageSize::new(50, 40).unwrap();
    let b = ImageBox::new(10, 10, 80, 90).clamp_to(size);
    assert_eq!(b.as_array(), [10, 10, 50, 40]);
    assert_eq!(b.area(), 40 * 30);
}
