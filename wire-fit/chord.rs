use wire_core::Point2D;
use crate::error::{FitError, FitOutcome};

/// Slope of the straight chord from `p1` to `p2`
pub fn chord_slope(p1: &Point2D, p2: &Point2D) -> FitOutcome<f64> {
    if p1 == p2 {
        return Err(FitError::CoincidentEndpoints);
    }
    if p2.x == p1.x {
        return Err(FitError::VerticalChord { x: p1.x });
    }
    Ok((p2.y - p1.y) / (p2.x - p1.x))
}

/// Vertical distance between `point` and the chord through `p1` and `p2`
pub fn chord_sag(p1: &Point2D, p2: &Point2D, point: &Point2D) -> FitOutcome<f64> {
    let slope = chord_slope(p1, p2)?;
    let y_on_chord = p1.y + slope * (point.x - p1.x);
    Ok((point.y - y_on_chord).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_chord() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(100.0, 0.0);
        assert_eq!(chord_sag(&p1, &p2, &Point2D::new(50.0, 10.0)), Ok(10.0));
    }

    #[test]
    fn test_sloped_chord() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(100.0, 50.0);
        assert_eq!(chord_slope(&p1, &p2), Ok(0.5));
        // chord passes through (40, 20)
        assert_eq!(chord_sag(&p1, &p2, &Point2D::new(40.0, 32.0)), Ok(12.0));
        assert_eq!(chord_sag(&p1, &p2, &Point2D::new(40.0, 20.0)), Ok(0.0));
    }

    #[test]
    fn test_degenerate_chords() {
        let p = Point2D::new(5.0, 5.0);
        assert_eq!(chord_slope(&p, &p), Err(FitError::CoincidentEndpoints));
        assert_eq!(
            chord_slope(&p, &Point2D::new(5.0, 9.0)),
            Err(FitError::VerticalChord { x: 5.0 })
        );
    }
}
