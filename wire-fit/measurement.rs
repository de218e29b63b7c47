use wire_core::Point2D;

use crate::catenary::{calculate_arc_length, ArcLength};
use crate::chord::chord_sag;
use crate::error::{FitError, FitOutcome};

/// Final physical result for one set of key points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    pub length_m: f64,
    pub sag_m: f64,
    pub sag_px: f64,
    pub meters_per_pixel: f64,
    pub arc: ArcLength,
}

impl Measurement {
    pub fn is_fallback(&self) -> bool {
        self.arc.is_fallback()
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Length: {:.3} m\nSag: {:.3} m", self.length_m, self.sag_m)
    }
}

/// Wire length and sag in meters given the real span between `p1` and `p2`.
///
/// The sag is the vertical pixel distance of `p_sag` from the chord, converted
/// with the same meters-per-pixel ratio used for the arc length.
pub fn measure(real_span_m: f64, p1: &Point2D, p2: &Point2D, p_sag: &Point2D) -> FitOutcome<Measurement> {
    if !(real_span_m.is_finite() && real_span_m > 0.0) {
        return Err(FitError::InvalidSpan(real_span_m));
    }

    let pixel_span = p1.distance(p2);
    if pixel_span == 0.0 {
        return Err(FitError::CoincidentEndpoints);
    }

    let sag_px = chord_sag(p1, p2, p_sag)?;
    let meters_per_pixel = real_span_m / pixel_span;
    let arc = calculate_arc_length(real_span_m, p1, p2, p_sag);

    Ok(Measurement {
        length_m: arc.meters(),
        sag_m: sag_px * meters_per_pixel,
        sag_px,
        meters_per_pixel,
        arc,
    })
}
