use ndarray::Array2;

/// Morphological opening (erosion followed by dilation) with a 3x3 square kernel.
///
/// Removes small isolated foreground specks while preserving larger regions.
pub fn opening(mask: &Array2<bool>) -> Array2<bool> {
    dilate(&erode_inner(mask, true))
}

/// Morphological closing (dilation followed by erosion) with a 3x3 square kernel.
///
/// Fills pinholes and narrow gaps inside a region.
pub fn closing(mask: &Array2<bool>) -> Array2<bool> {
    erode_inner(&dilate(mask), true)
}

/// Close then open `passes` times. Used to clean up masks before display.
pub fn smooth(mask: &Array2<bool>, passes: usize) -> Array2<bool> {
    let mut result = mask.clone();
    for _ in 0..passes {
        result = opening(&closing(&result));
    }
    result
}

/// Pixels of the mask that touch the background (or the image edge),
/// thickened to `width` pixels.
pub fn boundary(mask: &Array2<bool>, width: usize) -> Array2<bool> {
    let eroded = erode(mask);
    let mut edge = Array2::from_shape_fn(mask.dim(), |idx| mask[idx] && !eroded[idx]);
    for _ in 1..width {
        edge = dilate(&edge);
    }
    edge
}

/// Binary erosion: a pixel stays true only if ALL pixels in its 3x3 neighborhood are true.
/// Pixels outside the image count as background.
pub fn erode(mask: &Array2<bool>) -> Array2<bool> {
    erode_inner(mask, false)
}

// `outside` is the value assumed for neighbours beyond the image edge.
// Opening/closing assume foreground there so regions touching the border keep their edge.
fn erode_inner(mask: &Array2<bool>, outside: bool) -> Array2<bool> {
    let (h, w) = mask.dim();
    let mut result = Array2::from_elem((h, w), false);

    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }
            let mut all_true = true;
            'neighbours: for dr in -1..=1_i32 {
                for dc in -1..=1_i32 {
                    let nr = row as i32 + dr;
                    let nc = col as i32 + dc;
                    let inside = nr >= 0 && nr < h as i32 && nc >= 0 && nc < w as i32;
                    let value = if inside {
                        mask[[nr as usize, nc as usize]]
                    } else {
                        outside
                    };
                    if !value {
                        all_true = false;
                        break 'neighbours;
                    }
                }
            }
            result[[row, col]] = all_true;
        }
    }

    result
}

/// Binary dilation: a pixel becomes true if ANY pixel in its 3x3 neighborhood is true.
pub fn dilate(mask: &Array2<bool>) -> Array2<bool> {
    let (h, w) = mask.dim();
    let mut result = Array2::from_elem((h, w), false);

    for row in 0..h {
        for col in 0..w {
            let mut any_true = false;
            'neighbours: for dr in -1..=1_i32 {
                for dc in -1..=1_i32 {
                    let nr = row as i32 + dr;
                    let nc = col as i32 + dc;
                    if nr >= 0
                        && nr < h as i32
                        && nc >= 0
                        && nc < w as i32
                        && mask[[nr as usize, nc as usize]]
                    {
                        any_true = true;
                        break 'neighbours;
                    }
                }
            }
            result[[row, col]] = any_true;
        }
    }

    result
}
