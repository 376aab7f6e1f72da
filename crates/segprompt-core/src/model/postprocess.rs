//! Decoding of YOLOv8-seg style outputs into per-segment masks.
//!
//! `output0` is `[1, 4 + classes + coefficients, anchors]` with boxes as
//! `cx, cy, w, h` in model input pixels; `output1` is
//! `[1, coefficients, mh, mw]` prototype masks.

use std::cmp::Ordering;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;

use crate::consts::{BORDER_SNAP_THRESHOLD, MASK_COEFFICIENTS, MASK_THRESHOLD};
use crate::error::{Result, SegError};
use crate::mask::Mask;

use super::letterbox::Letterbox;

/// One candidate segment in model input coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// `[x1, y1, x2, y2]`.
    pub bbox: [f32; 4],
    pub score: f32,
    pub coefficients: Vec<f32>,
}

#[derive(Clone, Copy, Debug)]
pub struct DecodeParams {
    pub conf: f32,
    pub iou: f32,
    pub max_det: usize,
    pub retina_masks: bool,
}

/// Parse the raw detection head, keeping anchors scoring at least `conf`.
pub fn parse_detections(dims: &[usize], data: &[f32], conf: f32) -> Result<Vec<Detection>> {
    let [_, channels, anchors] = dims else {
        return Err(SegError::Inference(format!(
            "expected a 3-D detection tensor, got shape {dims:?}"
        )));
    };
    let (channels, anchors) = (*channels, *anchors);
    if channels < 4 + 1 + MASK_COEFFICIENTS || data.len() < channels * anchors {
        return Err(SegError::Inference(format!(
            "detection tensor shape {dims:?} does not fit a segmentation head"
        )));
    }
    let classes = channels - 4 - MASK_COEFFICIENTS;
    let view = ArrayView2::from_shape((channels, anchors), &data[..channels * anchors])
        .map_err(|e| SegError::Inference(e.to_string()))?;

    let detections = (0..anchors)
        .filter_map(|i| {
            let column = view.column(i);
            let score = (0..classes)
                .map(|c| column[4 + c])
                .fold(f32::NEG_INFINITY, f32::max);
            if score < conf {
                return None;
            }
            let (cx, cy, w, h) = (column[0], column[1], column[2], column[3]);
            Some(Detection {
                bbox: [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0],
                score,
                coefficients: column
                    .iter()
                    .skip(4 + classes)
                    .copied()
                    .collect(),
            })
        })
        .collect();
    Ok(detections)
}

/// Intersection over union of two `[x1, y1, x2, y2]` boxes.
pub fn box_iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let iw = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
    let ih = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
    let inter = iw * ih;
    let area_a = (a[2] - a[0]).max(0.0) * (a[3] - a[1]).max(0.0);
    let area_b = (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0);
    let union = area_a + area_b - inter;
    if union <= 0.0 {
        0.0
    } else {
        inter / union
    }
}

/// Greedy class-agnostic NMS. Output is sorted by score, highest first.
pub fn non_max_suppression(
    mut detections: Vec<Detection>,
    iou_threshold: f32,
    max_det: usize,
) -> Vec<Detection> {
    detections.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut kept: Vec<Detection> = Vec::new();
    for det in detections {
        if kept.len() >= max_det {
            break;
        }
        if kept.iter().all(|k| box_iou(&k.bbox, &det.bbox) <= iou_threshold) {
            kept.push(det);
        }
    }
    kept
}

/// Snap box edges lying within `threshold` pixels of the image border onto it.
pub fn snap_to_border(bbox: [f32; 4], width: f32, height: f32, threshold: f32) -> [f32; 4] {
    let [mut x1, mut y1, mut x2, mut y2] = bbox;
    if x1 < threshold {
        x1 = 0.0;
    }
    if y1 < threshold {
        y1 = 0.0;
    }
    if x2 > width - threshold {
        x2 = width;
    }
    if y2 > height - threshold {
        y2 = height;
    }
    [x1, y1, x2, y2]
}

/// Map a box from model input space to clamped source space.
pub fn box_to_source(bbox: [f32; 4], letterbox: &Letterbox) -> [f32; 4] {
    let (x1, y1) = letterbox.to_source(bbox[0], bbox[1]);
    let (x2, y2) = letterbox.to_source(bbox[2], bbox[3]);
    let w = letterbox.src_width as f32;
    let h = letterbox.src_height as f32;
    [x1.clamp(0.0, w), y1.clamp(0.0, h), x2.clamp(0.0, w), y2.clamp(0.0, h)]
}

/// Full decode: threshold, NMS, then one source-resolution mask per survivor.
pub fn decode(
    det_dims: &[usize],
    det_data: &[f32],
    proto_dims: &[usize],
    proto_data: &[f32],
    letterbox: &Letterbox,
    params: DecodeParams,
) -> Result<Vec<Mask>> {
    let candidates = parse_detections(det_dims, det_data, params.conf)?;
    let kept = non_max_suppression(candidates, params.iou, params.max_det);

    let [_, coeffs, mh, mw] = proto_dims else {
        return Err(SegError::Inference(format!(
            "expected a 4-D prototype tensor, got shape {proto_dims:?}"
        )));
    };
    let (coeffs, mh, mw) = (*coeffs, *mh, *mw);
    if proto_data.len() < coeffs * mh * mw {
        return Err(SegError::Inference(format!(
            "prototype tensor shape {proto_dims:?} does not match its data"
        )));
    }
    let protos = ArrayView2::from_shape((coeffs, mh * mw), &proto_data[..coeffs * mh * mw])
        .map_err(|e| SegError::Inference(e.to_string()))?;

    let src_w = letterbox.src_width as f32;
    let src_h = letterbox.src_height as f32;

    let masks = kept
        .par_iter()
        .filter(|det| det.coefficients.len() == coeffs)
        .map(|det| {
            let bbox = snap_to_border(
                box_to_source(det.bbox, letterbox),
                src_w,
                src_h,
                BORDER_SNAP_THRESHOLD,
            );
            let probs = prototype_probabilities(&det.coefficients, protos, mh, mw);
            render_mask(&probs, bbox, letterbox, params.retina_masks)
        })
        .filter(|mask| !mask.is_empty())
        .collect();
    Ok(masks)
}

/// `sigmoid(coefficients · protos)` reshaped to `(mh, mw)`.
pub fn prototype_probabilities(
    coefficients: &[f32],
    protos: ArrayView2<f32>,
    mh: usize,
    mw: usize,
) -> Array2<f32> {
    let c = ArrayView1::from(coefficients);
    let logits: Array1<f32> = c.dot(&protos);
    logits
        .mapv(|v| 1.0 / (1.0 + (-v).exp()))
        .into_shape_with_order((mh, mw))
        .unwrap_or_else(|_| Array2::zeros((mh, mw)))
}

/// Sample the prototype-space probabilities at every source pixel inside
/// `bbox` and threshold them.
fn render_mask(probs: &Array2<f32>, bbox: [f32; 4], letterbox: &Letterbox, bilinear: bool) -> Mask {
    let (mh, mw) = probs.dim();
    let w = letterbox.src_width as usize;
    let h = letterbox.src_height as usize;
    let mut data = Array2::from_elem((h, w), false);

    let to_proto_x = mw as f32 / letterbox.size as f32;
    let to_proto_y = mh as f32 / letterbox.size as f32;

    let x_start = bbox[0].floor().max(0.0) as usize;
    let y_start = bbox[1].floor().max(0.0) as usize;
    let x_end = (bbox[2].ceil() as usize).min(w);
    let y_end = (bbox[3].ceil() as usize).min(h);

    for y in y_start..y_end {
        let cy = y as f32 + 0.5;
        if cy < bbox[1] || cy > bbox[3] {
            continue;
        }
        for x in x_start..x_end {
            let cx = x as f32 + 0.5;
            if cx < bbox[0] || cx > bbox[2] {
                continue;
            }
            let (ix, iy) = letterbox.to_input(cx, cy);
            let px = ix * to_proto_x - 0.5;
            let py = iy * to_proto_y - 0.5;
            let p = if bilinear {
                sample_bilinear(probs, px, py)
            } else {
                sample_nearest(probs, px, py)
            };
            data[[y, x]] = p > MASK_THRESHOLD;
        }
    }
    Mask::new(data)
}

fn sample_nearest(grid: &Array2<f32>, x: f32, y: f32) -> f32 {
    let (h, w) = grid.dim();
    let col = (x.round().max(0.0) as usize).min(w - 1);
    let row = (y.round().max(0.0) as usize).min(h - 1);
    grid[[row, col]]
}

fn sample_bilinear(grid: &Array2<f32>, x: f32, y: f32) -> f32 {
    let (h, w) = grid.dim();
    let x = x.clamp(0.0, (w - 1) as f32);
    let y = y.clamp(0.0, (h - 1) as f32);
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let top = grid[[y0, x0]] * (1.0 - fx) + grid[[y0, x1]] * fx;
    let bottom = grid[[y1, x0]] * (1.0 - fx) + grid[[y1, x1]] * fx;
    top * (1.0 - fy) + bottom * fy
}
