use image::{Rgb, RgbImage};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::config::RenderConfig;
use crate::consts::{CONTOUR_ALPHA, CONTOUR_COLOR, CONTOUR_WIDTH, FIXED_MASK_COLOR, SMOOTHING_PASSES};
use crate::mask::morphology;
use crate::mask::Mask;

use super::Renderer;

/// In-memory mask overlay with optional contour outlines.
///
/// Each pixel takes the colour of the smallest mask covering it, blended
/// over the source pixel at `alpha`.
#[derive(Clone, Debug, Default)]
pub struct OverlayRenderer {
    config: RenderConfig,
}

impl OverlayRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn colors(&self, count: usize) -> Vec<[u8; 3]> {
        if !self.config.random_color {
            return vec![FIXED_MASK_COLOR; count];
        }
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        (0..count).map(|_| [rng.gen(), rng.gen(), rng.gen()]).collect()
    }
}

impl Renderer for OverlayRenderer {
    fn render(&self, image: &RgbImage, masks: &[Mask]) -> RgbImage {
        let mut out = image.clone();
        if masks.is_empty() {
            return out;
        }

        let better_quality = self.config.better_quality;
        let prepared: Vec<Array2<bool>> = masks
            .par_iter()
            .map(|m| {
                if better_quality {
                    morphology::smooth(m.data(), SMOOTHING_PASSES)
                } else {
                    m.data().clone()
                }
            })
            .collect();

        let mut order: Vec<(usize, usize)> = prepared
            .iter()
            .map(|m| m.iter().filter(|&&v| v).count())
            .enumerate()
            .collect();
        order.sort_by_key(|&(_, area)| area);

        // Paint largest first so the smallest covering mask wins.
        let (w, h) = image.dimensions();
        let mut owner = Array2::<Option<usize>>::from_elem((h as usize, w as usize), None);
        for &(index, _) in order.iter().rev() {
            for ((row, col), &v) in prepared[index].indexed_iter() {
                if v {
                    owner[[row, col]] = Some(index);
                }
            }
        }

        let colors = self.colors(masks.len());
        let alpha = self.config.alpha.clamp(0.0, 1.0);
        for (x, y, pixel) in out.enumerate_pixels_mut() {
            if let Some(index) = owner[[y as usize, x as usize]] {
                *pixel = blend(*pixel, colors[index], alpha);
            }
        }

        if self.config.with_contours {
            let edges: Vec<Array2<bool>> = prepared
                .par_iter()
                .map(|m| morphology::boundary(m, CONTOUR_WIDTH))
                .collect();
            for edge in &edges {
                for ((row, col), &v) in edge.indexed_iter() {
                    if v {
                        let p = out.get_pixel_mut(col as u32, row as u32);
                        *p = blend(*p, CONTOUR_COLOR, CONTOUR_ALPHA);
                    }
                }
            }
        }

        debug!("Rendered {} masks onto {}x{} image", masks.len(), w, h);
        out
    }
}

fn blend(base: Rgb<u8>, color: [u8; 3], alpha: f32) -> Rgb<u8> {
    let mix = |b: u8, c: u8| (c as f32 * alpha + b as f32 * (1.0 - alpha)).round() as u8;
    Rgb([
        mix(base[0], color[0]),
        mix(base[1], color[1]),
        mix(base[2], color[2]),
    ])
}
