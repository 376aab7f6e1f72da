mod common;

use image::Rgb;
use ndarray::Array2;

use segprompt_core::geometry::{
    box_to_image_space, DisplayBox, DisplayPoint, ImageBox, ImageSize, Viewport,
};
use segprompt_core::mask::morphology::{boundary, smooth};
use segprompt_core::mask::select::{
    best_candidate, box_mask_iou, select_by_box, select_by_points, text_candidates,
};
use segprompt_core::mask::Mask;
use segprompt_core::prompt::LabeledPoint;

use common::{box_mask, gradient_image, scene_masks, scene_size};

// ---------------------------------------------------------------------------
// Mask basics
// ---------------------------------------------------------------------------

#[test]
fn test_mask_bbox_is_exclusive() {
    let m = box_mask(10, 20, 30, 25);
    assert_eq!(m.bbox(), Some(ImageBox::new(10, 20, 30, 25)));
    assert_eq!(m.area(), 20 * 5);
}

#[test]
fn test_empty_mask_has_no_bbox() {
    let m = Mask::empty(scene_size());
    assert!(m.is_empty());
    assert_eq!(m.bbox(), None);
}

#[test]
fn test_out_of_range_lookup_is_false() {
    let m = box_mask(0, 0, 120, 80);
    assert!(m.get(119, 79));
    assert!(!m.get(120, 0));
    assert!(!m.get(0, 80));
}

// ---------------------------------------------------------------------------
// Points
// ---------------------------------------------------------------------------

#[test]
fn test_foreground_point_selects_all_covering_masks() {
    let masks = scene_masks();
    let result = select_by_points(&masks, &[LabeledPoint::foreground(25, 25)], scene_size());
    // Union of the nested masks is the largest one.
    assert_eq!(result, masks[0]);
}

#[test]
fn test_background_point_carves_out_larger_mask() {
    let masks = scene_masks();
    let points = [LabeledPoint::foreground(25, 25), LabeledPoint::background(5, 5)];
    let result = select_by_points(&masks, &points, scene_size());
    assert_eq!(result, masks[1]);
}

#[test]
fn test_points_in_separate_masks_are_combined() {
    let masks = scene_masks();
    let points = [LabeledPoint::foreground(25, 25), LabeledPoint::foreground(100, 20)];
    let result = select_by_points(&masks, &points, scene_size());
    assert_eq!(result.area(), masks[0].area() + masks[3].area());
}

#[test]
fn test_point_outside_every_mask_selects_nothing() {
    let masks = scene_masks();
    let result = select_by_points(&masks, &[LabeledPoint::foreground(100, 70)], scene_size());
    assert!(result.is_empty());
}

// ---------------------------------------------------------------------------
// Box
// ---------------------------------------------------------------------------

#[test]
fn test_exact_box_selects_matching_mask() {
    let masks = scene_masks();
    assert_eq!(select_by_box(&masks, ImageBox::new(10, 10, 50, 50), scene_size()), Some(1));
    assert_eq!(select_by_box(&masks, ImageBox::new(90, 10, 115, 40), scene_size()), Some(3));
}

#[test]
fn test_whole_image_box_selects_largest_mask() {
    let masks = scene_masks();
    let whole = ImageBox::new(0, 0, 500, 500);
    assert_eq!(select_by_box(&masks, whole, scene_size()), Some(0));
}

#[test]
fn test_full_canvas_box_prefers_full_image_mask() {
    let masks = vec![box_mask(0, 0, 120, 80), box_mask(0, 0, 119, 79)];
    let drag = DisplayBox::from_corners(DisplayPoint::new(0.0, 0.0), DisplayPoint::new(600.0, 400.0));
    let bbox = box_to_image_space(drag, Viewport::default(), scene_size());

    assert_eq!(bbox.as_array(), [0, 0, 120, 80]);
    assert_eq!(select_by_box(&masks, bbox, scene_size()), Some(0));
}

#[test]
fn test_box_iou_value() {
    let m = box_mask(0, 0, 10, 10);
    let iou = box_mask_iou(&m, ImageBox::new(5, 0, 15, 10));
    // 50 inside, union 100 + 100 - 50.
    assert!((iou - 50.0 / 150.0).abs() < 1e-6);
}

#[test]
fn test_box_without_masks() {
    assert_eq!(select_by_box(&[], ImageBox::new(0, 0, 5, 5), scene_size()), None);
}

// ---------------------------------------------------------------------------
// Text candidates
// ---------------------------------------------------------------------------

#[test]
fn test_small_masks_are_not_text_candidates() {
    let image = gradient_image(120, 80);
    let candidates = text_candidates(&image, &scene_masks());
    let indices: Vec<usize> = candidates.iter().map(|c| c.index).collect();
    // Mask 2 has exactly 100 pixels.
    assert_eq!(indices, vec![0, 1, 3]);
}

#[test]
fn test_candidate_crop_whitens_outside_mask() {
    let size = ImageSize::new(120, 80).unwrap();
    let mut data = Array2::from_elem((80, 120), false);
    // L shape: a 20x20 square with its top-right 10x10 quadrant missing.
    for row in 10..30 {
        for col in 10..30 {
            data[[row, col]] = !(row < 20 && col >= 20);
        }
    }
    let mask = Mask::new(data);
    assert_eq!(mask.bbox(), Some(ImageBox::new(10, 10, 30, 30)));

    let image = gradient_image(size.width, size.height);
    let candidates = text_candidates(&image, &[mask]);
    let crop = &candidates[0].crop;
    assert_eq!(crop.dimensions(), (20, 20));
    assert_eq!(*crop.get_pixel(15, 5), Rgb([255, 255, 255]));
    assert_eq!(crop.get_pixel(5, 15), image.get_pixel(15, 25));
}

#[test]
fn test_best_candidate_prefers_first_on_ties() {
    let image = gradient_image(120, 80);
    let candidates = text_candidates(&image, &scene_masks());
    assert_eq!(best_candidate(&candidates, &[0.2, 0.7, 0.1]), Some(1));
    assert_eq!(best_candidate(&candidates, &[0.5, 0.5, 0.5]), Some(0));
    assert_eq!(best_candidate(&[], &[]), None);
}

// ---------------------------------------------------------------------------
// Morphology
// ---------------------------------------------------------------------------

#[test]
fn test_smoothing_removes_specks_and_fills_holes() {
    let mut data = Array2::from_elem((40, 40), false);
    for row in 10..20 {
        for col in 10..20 {
            data[[row, col]] = true;
        }
    }
    data[[15, 15]] = false;
    data[[35, 35]] = true;

    let smoothed = smooth(&data, 1);
    assert!(smoothed[[15, 15]]);
    assert!(!smoothed[[35, 35]]);
    assert_eq!(smoothed.iter().filter(|&&v| v).count(), 100);
}

#[test]
fn test_smoothing_keeps_border_touching_masks() {
    let m = box_mask(0, 0, 80, 80);
    let smoothed = smooth(m.data(), 2);
    assert_eq!(smoothed.iter().filter(|&&v| v).count(), m.area());
}

#[test]
fn test_boundary_ring() {
    let mut data = Array2::from_elem((40, 40), false);
    for row in 10..20 {
        for col in 10..20 {
            data[[row, col]] = true;
        }
    }
    let edge = boundary(&data, 1);
    assert_eq!(edge.iter().filter(|&&v| v).count(), 36);
    assert!(edge[[10, 10]]);
    assert!(!edge[[15, 15]]);
}
