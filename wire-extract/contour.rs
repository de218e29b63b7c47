use rayon::prelude::*;
use wire_core::Contour;

/// Longest contour (open-path arc length) whose bounding box is wider than `min_width`.
///
/// Only a strictly longer contour replaces the current best, so the first of
/// equally long contours wins and a zero-length contour is never selected.
pub fn select_wire_contour(contours: &[Contour], min_width: f64) -> Option<&Contour> {
    let lengths: Vec<Option<f64>> = contours
        .par_iter()
        .map(|c| (c.width() > min_width).then(|| c.arc_length()))
        .collect();

    let mut best: Option<&Contour> = None;
    let mut max_len = 0.0;
    for (contour, len) in contours.iter().zip(lengths) {
        if let Some(len) = len {
            if len > max_len {
                max_len = len;
                best = Some(contour);
            }
        }
    }
    best
}
