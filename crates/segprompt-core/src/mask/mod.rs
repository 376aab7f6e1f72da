pub mod morphology;
pub mod select;

use ndarray::{s, Array2, Zip};

use crate::geometry::{ImageBox, ImagePoint, ImageSize};

/// Binary segmentation mask at source image resolution.
/// Shape is (height, width); `true` marks segment membership.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    data: Array2<bool>,
}

impl Mask {
    pub fn new(data: Array2<bool>) -> Self {
        Self { data }
    }

    pub fn empty(size: ImageSize) -> Self {
        Self {
            data: Array2::from_elem((size.height as usize, size.width as usize), false),
        }
    }

    /// Mask that is set exactly inside `bbox`.
    pub fn from_box(size: ImageSize, bbox: ImageBox) -> Self {
        let mut mask = Self::empty(size);
        let b = bbox.clamp_to(size);
        mask.data
            .slice_mut(s![b.y1 as usize..b.y2 as usize, b.x1 as usize..b.x2 as usize])
            .fill(true);
        mask
    }

    pub fn data(&self) -> &Array2<bool> {
        &self.data
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data.get((y, x)).copied().unwrap_or(false)
    }

    pub fn contains(&self, p: ImagePoint) -> bool {
        self.get(p.x as usize, p.y as usize)
    }

    pub fn area(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// Tight bounding box `[x1, x2) × [y1, y2)`, or `None` for an empty mask.
    pub fn bbox(&self) -> Option<ImageBox> {
        let mut bounds: Option<(usize, usize, usize, usize)> = None;
        for ((row, col), &v) in self.data.indexed_iter() {
            if !v {
                continue;
            }
            bounds = Some(match bounds {
                None => (col, row, col, row),
                Some((x1, y1, x2, y2)) => (x1.min(col), y1.min(row), x2.max(col), y2.max(row)),
            });
        }
        bounds.map(|(x1, y1, x2, y2)| {
            ImageBox::new(x1 as u32, y1 as u32, x2 as u32 + 1, y2 as u32 + 1)
        })
    }

    /// Number of mask pixels that fall inside `bbox`.
    pub fn count_in_box(&self, bbox: ImageBox) -> usize {
        let x2 = (bbox.x2 as usize).min(self.width());
        let y2 = (bbox.y2 as usize).min(self.height());
        let x1 = (bbox.x1 as usize).min(x2);
        let y1 = (bbox.y1 as usize).min(y2);
        self.data
            .slice(s![y1..y2, x1..x2])
            .iter()
            .filter(|&&v| v)
            .count()
    }

    /// Set every pixel that is set in `other`.
    pub fn union_with(&mut self, other: &Mask) {
        Zip::from(&mut self.data)
            .and(&other.data)
            .for_each(|a, &b| *a |= b);
    }

    /// Clear every pixel that is set in `other`.
    pub fn subtract(&mut self, other: &Mask) {
        Zip::from(&mut self.data)
            .and(&other.data)
            .for_each(|a, &b| *a &= !b);
    }
}
