use wire_core::InvalidMapData;

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    InvalidImageSize { width: usize, height: usize },
    InvalidCornerMap { expected_len: usize, actual_len: usize },
    CornerMapSizeMismatch { expected: (usize, usize), actual: (usize, usize) },
    InvalidCornerThreshold(f32),
    InvalidClusterBounds { left: f64, right: f64 },
    InvalidContourWidthFraction(f64),
    InvalidDefaultEndpoint { x: f64, y: f64 },
    InvalidThreadCount(usize),
    InvalidCannyThresholds { low: f32, high: f32 },
    InvalidHarrisK(f64),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::InvalidImageSize { width, height } => {
                write!(f, "Invalid image dimensions: {}x{} (must be > 0)", width, height)
            }
            ExtractError::InvalidCornerMap { expected_len, actual_len } => {
                write!(f, "Corner map length mismatch: expected {}, got {}", expected_len, actual_len)
            }
            ExtractError::CornerMapSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Corner map is {}x{} but the extractor is configured for {}x{}",
                    actual.0, actual.1, expected.0, expected.1
                )
            }
            ExtractError::InvalidCornerThreshold(t) => {
                write!(f, "Invalid corner threshold: {} (must be within 0-255)", t)
            }
            ExtractError::InvalidClusterBounds { left, right } => {
                write!(f, "Invalid cluster bounds: left {} / right {} (need 0 < left < right < 1)", left, right)
            }
            ExtractError::InvalidContourWidthFraction(fr) => {
                write!(f, "Invalid minimum contour width fraction: {} (must be within 0-1)", fr)
            }
            ExtractError::InvalidDefaultEndpoint { x, y } => {
                write!(f, "Invalid default endpoint ({}, {}) (fractions must be within 0-1)", x, y)
            }
            ExtractError::InvalidThreadCount(n) => {
                write!(f, "Invalid thread count: {} (must be >= 1)", n)
            }
            ExtractError::InvalidCannyThresholds { low, high } => {
                write!(f, "Invalid Canny thresholds: low {} / high {} (need 0 <= low <= high)", low, high)
            }
            ExtractError::InvalidHarrisK(k) => {
                write!(f, "Invalid Harris k: {} (must be within (0, 0.25))", k)
            }
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<InvalidMapData> for ExtractError {
    fn from(err: InvalidMapData) -> Self {
        ExtractError::InvalidCornerMap {
            expected_len: err.expected_len,
            actual_len: err.actual_len,
        }
    }
}

pub type ExtractResult<T> = Result<T, ExtractError>;
