use log::debug;
use wire_core::{ParabolaModel, Point2D};

use crate::error::{FitError, FitOutcome};

/// Below this |denominator| (meters^3) the three points are too close to
/// collinear for a stable exact fit
pub const COLLINEAR_EPSILON: f64 = 1e-4;

/// Fitted curves bending less than this (meters) away from the chord are straight
pub const FLAT_SAG_EPSILON_M: f64 = 1e-9;

/// Physical arc length, either integrated along a fitted curve or the straight span
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArcLength {
    Curved { meters: f64, model: ParabolaModel },
    Straight { meters: f64, reason: FitError },
}

impl ArcLength {
    pub fn meters(&self) -> f64 {
        match self {
            ArcLength::Curved { meters, .. } | ArcLength::Straight { meters, .. } => *meters,
        }
    }

    /// True when the straight-line span was used instead of a fitted curve
    pub fn is_fallback(&self) -> bool {
        matches!(self, ArcLength::Straight { .. })
    }

    pub fn model(&self) -> Option<&ParabolaModel> {
        match self {
            ArcLength::Curved { model, .. } => Some(model),
            ArcLength::Straight { .. } => None,
        }
    }
}

/// Exact parabola `y = a*x^2 + b*x` through the origin, `(wx2, wy2)` and `(wx3, wy3)`
pub fn fit_through_origin(wx2: f64, wy2: f64, wx3: f64, wy3: f64) -> FitOutcome<ParabolaModel> {
    let x2_sq = wx2 * wx2;
    let x3_sq = wx3 * wx3;

    let denominator = x2_sq * wx3 - x3_sq * wx2;
    if !(denominator.abs() >= COLLINEAR_EPSILON) {
        return Err(FitError::NearCollinear { denominator });
    }

    let a = (wy2 * wx3 - wy3 * wx2) / denominator;
    let b = (wy2 - a * x2_sq) / wx2;
    Ok(ParabolaModel::new(a, b, 0.0))
}

/// Arc length of `model` between `start` and `end`.
///
/// Closed form of the integral of sqrt(1 + y'^2):
/// `F(x) = [u*sqrt(1+u^2) + ln(u + sqrt(1+u^2))] / (4a)` with `u = 2a*x + b`.
/// When both ends have slopes of the same sign, `F(end) - F(start)` is evaluated
/// through the identities
/// `u1*s1 - u0*s0 = (u1-u0)(u1+u0)(1+u0^2+u1^2) / (u1*s1 + u0*s0)` and
/// `asinh(u1) - asinh(u0) = asinh((u1-u0)(u1+u0) / (u1*s0 + u0*s1))`,
/// which keeps full precision for nearly straight, steep curves.
pub fn parabola_arc_length(model: &ParabolaModel, start: f64, end: f64) -> f64 {
    let (a, b) = (model.a, model.b);
    if a == 0.0 {
        return (end - start).abs() * b.hypot(1.0);
    }

    let u0 = 2.0 * a * start + b;
    let u1 = 2.0 * a * end + b;
    let du = 2.0 * a * (end - start);
    let s0 = u0.hypot(1.0);
    let s1 = u1.hypot(1.0);

    let difference = if u0 * u1 <= 0.0 {
        (u1 * s1 - u0 * s0) + (u1.asinh() - u0.asinh())
    } else {
        let sum = u0 + u1;
        let poly = du * sum * (1.0 + u0 * u0 + u1 * u1) / (u1 * s1 + u0 * s0);
        let log = (du * sum / (u1 * s0 + u0 * s1)).asinh();
        poly + log
    };

    (difference / (4.0 * a)).abs()
}

/// Length of the wire in meters from its endpoints and lowest point in pixels.
///
/// The pixel geometry is scaled so that `p1`-`p2` measures `real_span_m`, the
/// exact parabola through the three points is fitted and integrated between
/// the endpoints. Degenerate geometry falls back to the straight span.
pub fn calculate_arc_length(real_span_m: f64, p1: &Point2D, p2: &Point2D, p_sag: &Point2D) -> ArcLength {
    let straight = |reason: FitError| {
        debug!("arc length falls back to straight span: {}", reason);
        ArcLength::Straight { meters: real_span_m, reason }
    };

    if !(real_span_m.is_finite() && real_span_m > 0.0) {
        return straight(FitError::InvalidSpan(real_span_m));
    }

    let pixel_span = p1.distance(p2);
    if !(pixel_span > 0.0) || !pixel_span.is_finite() {
        return straight(FitError::CoincidentEndpoints);
    }
    let meters_per_pixel = real_span_m / pixel_span;

    let w2 = p2.relative_to(p1, meters_per_pixel);
    let w3 = p_sag.relative_to(p1, meters_per_pixel);

    let model = match fit_through_origin(w2.x, w2.y, w3.x, w3.y) {
        Ok(model) => model,
        Err(reason) => return straight(reason),
    };

    let half_span = w2.x / 2.0;
    if model.a.abs() * half_span * half_span < FLAT_SAG_EPSILON_M {
        return straight(FitError::FlatParabola { a: model.a });
    }

    let start_x = w2.x.min(0.0);
    let end_x = w2.x.max(0.0);
    ArcLength::Curved {
        meters: parabola_arc_length(&model, start_x, end_x),
        model,
    }
}
