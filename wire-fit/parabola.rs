use log::debug;
use wire_core::{FitResult, ParabolaModel, Point2D};

use crate::chord::chord_sag;
use crate::error::{FitError, FitOutcome};
use crate::solver::solve_3x3;

/// Three coefficients need at least three samples
pub const MIN_POINTS: usize = 3;

/// |a| below this is treated as a straight line
pub const FLAT_EPSILON: f64 = 1e-12;

/// Curves bending less than this many pixels away from their own chord
/// across the sampled x-range are treated as straight lines
pub const FLAT_SAG_EPSILON: f64 = 1e-6;

/// Power sums of the samples in normalized coordinates `t = (x - center) / half_range`.
///
/// With `t` in [-1, 1] every entry of the normal matrix stays within `n`, so the
/// solver's relative pivot tolerance holds for any image width or x-offset.
#[derive(Debug, Default, Clone, Copy)]
struct PowerSums {
    center: f64,
    half_range: f64,
    n: f64,
    t: f64,
    t2: f64,
    t3: f64,
    t4: f64,
    y: f64,
    ty: f64,
    t2y: f64,
}

impl PowerSums {
    fn accumulate(points: &[Point2D]) -> FitOutcome<Self> {
        let (min_x, max_x) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
        let half_range = (max_x - min_x) / 2.0;
        if half_range <= 0.0 || !half_range.is_finite() {
            return Err(FitError::SingularSystem { step: 0, pivot: 0.0 });
        }

        let mut s = PowerSums {
            center: (min_x + max_x) / 2.0,
            half_range,
            ..Default::default()
        };
        for p in points {
            let t = (p.x - s.center) / half_range;
            let t2 = t * t;
            s.n += 1.0;
            s.t += t;
            s.t2 += t2;
            s.t3 += t2 * t;
            s.t4 += t2 * t2;
            s.y += p.y;
            s.ty += t * p.y;
            s.t2y += t2 * p.y;
        }
        Ok(s)
    }

    fn normal_equations(&self) -> ([[f64; 3]; 3], [f64; 3]) {
        (
            [
                [self.t4, self.t3, self.t2],
                [self.t3, self.t2, self.t],
                [self.t2, self.t, self.n],
            ],
            [self.t2y, self.ty, self.y],
        )
    }

    /// Expand `alpha t^2 + beta t + gamma` back into pixel coordinates
    fn expand(&self, [alpha, beta, gamma]: [f64; 3]) -> ParabolaModel {
        let (m, s) = (self.center, self.half_range);
        let a = alpha / (s * s);
        let b = beta / s - 2.0 * a * m;
        let c = a * m * m - beta * m / s + gamma;
        ParabolaModel::new(a, b, c)
    }
}

/// Solve the normalized normal equations; returns the sums with the
/// normalized coefficients so callers can judge curvature scale-free.
fn solve_normalized(points: &[Point2D]) -> FitOutcome<(PowerSums, [f64; 3])> {
    if points.len() < MIN_POINTS {
        return Err(FitError::TooFewPoints { got: points.len(), min: MIN_POINTS });
    }

    let sums = PowerSums::accumulate(points)?;
    let (m, r) = sums.normal_equations();
    let coeffs = solve_3x3(m, r)?;
    Ok((sums, coeffs))
}

/// Least-squares parabola through `points` via the normal equations.
///
/// The model is returned even when it is effectively a straight line; use
/// [`fit_parabola`] when a vertex is needed.
pub fn fit_model(points: &[Point2D]) -> FitOutcome<ParabolaModel> {
    let (sums, coeffs) = solve_normalized(points)?;
    Ok(sums.expand(coeffs))
}

/// Fit a parabola to the wire samples and measure its sag against the p1-p2 chord.
///
/// Fails on fewer than three points, a singular system, a curve that is
/// effectively straight, or a vertical chord.
pub fn fit_parabola(points: &[Point2D], p1: &Point2D, p2: &Point2D) -> FitOutcome<FitResult> {
    let (sums, coeffs) = solve_normalized(points)?;
    let model = sums.expand(coeffs);

    // quadratic term in t is the bend in pixels over the half-range
    let bend = coeffs[0].abs();
    if model.a.abs() < FLAT_EPSILON || bend < FLAT_SAG_EPSILON {
        debug!(
            "parabola fit rejected as flat: a={:e}, bend={:e}px over {} points",
            model.a,
            bend,
            points.len()
        );
        return Err(FitError::FlatParabola { a: model.a });
    }

    let vertex = model.vertex().ok_or(FitError::FlatParabola { a: model.a })?;
    let pixel_sag = chord_sag(p1, p2, &vertex)?;

    Ok(FitResult {
        model,
        vertex,
        pixel_sag,
    })
}

/// Sum of squared vertical residuals of `model` over `points`
pub fn residual_sum_of_squares(model: &ParabolaModel, points: &[Point2D]) -> f64 {
    points
        .iter()
        .map(|p| {
            let r = p.y - model.eval(p.x);
            r * r
        })
        .sum()
}
