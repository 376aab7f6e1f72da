//! Prompt-conditioned selection over the cached "everything" masks.

use image::{Rgb, RgbImage};

use crate::consts::TEXT_MIN_MASK_AREA;
use crate::geometry::{ImageBox, ImageSize};
use crate::prompt::{LabeledPoint, PointLabel};

use super::Mask;

/// Combine every mask hit by a point into one mask.
///
/// Masks are visited from largest to smallest, so a smaller mask hit by a
/// background point can carve itself out of a larger foreground mask.
pub fn select_by_points(masks: &[Mask], points: &[LabeledPoint], size: ImageSize) -> Mask {
    let mut order: Vec<(usize, usize)> = masks.iter().map(Mask::area).enumerate().collect();
    order.sort_by(|a, b| b.1.cmp(&a.1));

    let mut result = Mask::empty(size);
    for (index, _) in order {
        let mask = &masks[index];
        for p in points {
            if !mask.contains(p.point) {
                continue;
            }
            match p.label {
                PointLabel::Foreground => result.union_with(mask),
                PointLabel::Background => result.subtract(mask),
            }
        }
    }
    result
}

/// IoU between a box and a mask, where the intersection counts mask pixels
/// inside the box.
pub fn box_mask_iou(mask: &Mask, bbox: ImageBox) -> f32 {
    let inside = mask.count_in_box(bbox);
    let union = bbox.area() + mask.area() - inside;
    if union == 0 {
        return 0.0;
    }
    inside as f32 / union as f32
}

/// Index of the mask with the highest IoU against `bbox` (first wins on ties).
pub fn select_by_box(masks: &[Mask], bbox: ImageBox, size: ImageSize) -> Option<usize> {
    let bbox = bbox.clamp_to(size);
    let mut best: Option<(usize, f32)> = None;
    for (index, mask) in masks.iter().enumerate() {
        let iou = box_mask_iou(mask, bbox);
        if best.map_or(true, |(_, b)| iou > b) {
            best = Some((index, iou));
        }
    }
    best.map(|(index, _)| index)
}

/// One mask cut out of the image for text scoring.
pub struct TextCandidate {
    /// Index into the original mask list.
    pub index: usize,
    /// Bounding-box crop with every pixel outside the mask painted white.
    pub crop: RgbImage,
}

/// Build scoring crops for every mask large enough to be worth describing.
pub fn text_candidates(image: &RgbImage, masks: &[Mask]) -> Vec<TextCandidate> {
    masks
        .iter()
        .enumerate()
        .filter(|(_, mask)| mask.area() > TEXT_MIN_MASK_AREA)
        .filter_map(|(index, mask)| {
            let bbox = mask.bbox()?;
            Some(TextCandidate {
                index,
                crop: cut_out(image, mask, bbox),
            })
        })
        .collect()
}

fn cut_out(image: &RgbImage, mask: &Mask, bbox: ImageBox) -> RgbImage {
    RgbImage::from_fn(bbox.width(), bbox.height(), |x, y| {
        let sx = bbox.x1 + x;
        let sy = bbox.y1 + y;
        if mask.get(sx as usize, sy as usize) {
            *image.get_pixel(sx, sy)
        } else {
            Rgb([255, 255, 255])
        }
    })
}

/// Mask index of the highest-scoring candidate.
pub fn best_candidate(candidates: &[TextCandidate], scores: &[f32]) -> Option<usize> {
    candidates
        .iter()
        .zip(scores)
        .fold(None, |best: Option<(usize, f32)>, (c, &score)| match best {
            Some((_, s)) if s >= score => best,
            _ => Some((c.index, score)),
        })
        .map(|(index, _)| index)
}
