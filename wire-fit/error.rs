/// Degenerate inputs detected while fitting or measuring
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitError {
    TooFewPoints { got: usize, min: usize },
    SingularSystem { step: usize, pivot: f64 },
    FlatParabola { a: f64 },
    VerticalChord { x: f64 },
    CoincidentEndpoints,
    NearCollinear { denominator: f64 },
    InvalidSpan(f64),
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::TooFewPoints { got, min } => {
                write!(f, "Too few points for a parabola fit: got {}, need at least {}", got, min)
            }
            FitError::SingularSystem { step, pivot } => {
                write!(f, "Singular normal equations at elimination step {} (pivot {:e})", step, pivot)
            }
            FitError::FlatParabola { a } => {
                write!(f, "Fitted curve is effectively straight (a = {:e})", a)
            }
            FitError::VerticalChord { x } => {
                write!(f, "Chord between endpoints is vertical at x = {}", x)
            }
            FitError::CoincidentEndpoints => {
                write!(f, "Endpoints are on top of each other")
            }
            FitError::NearCollinear { denominator } => {
                write!(f, "Endpoints and sag point are nearly collinear (denominator {:e})", denominator)
            }
            FitError::InvalidSpan(span) => {
                write!(f, "Invalid real-world span: {} (must be finite and > 0)", span)
            }
        }
    }
}

impl std::error::Error for FitError {}

pub type FitOutcome<T> = Result<T, FitError>;
