#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 2-D point in pixel or physical units, depending on where it is used
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    pub fn distance(&self, other: &Point2D) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn midpoint(&self, other: &Point2D) -> Point2D {
        Point2D::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Express `self` relative to `origin`, multiplied by `scale`
    pub fn relative_to(&self, origin: &Point2D, scale: f64) -> Point2D {
        Point2D::new((self.x - origin.x) * scale, (self.y - origin.y) * scale)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Point2D::new(x, y)
    }
}

/// Corner-map data whose length does not match its declared dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMapData {
    pub expected_len: usize,
    pub actual_len: usize,
}

impl std::fmt::Display for InvalidMapData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Corner map length mismatch: expected {}, got {}",
            self.expected_len, self.actual_len
        )
    }
}

impl std::error::Error for InvalidMapData {}

/// Row-major grid of corner responses on a 0-255 scale
#[derive(Debug, Clone, PartialEq)]
pub struct CornerResponseMap {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl CornerResponseMap {
    /// Wrap already-normalized responses
    pub fn new(width: usize, height: usize, values: Vec<f32>) -> Result<Self, InvalidMapData> {
        let expected_len = width * height;
        if values.len() != expected_len {
            return Err(InvalidMapData {
                expected_len,
                actual_len: values.len(),
            });
        }
        Ok(Self { width, height, values })
    }

    /// An all-zero map (no corners anywhere)
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    /// Min-max normalize raw detector responses onto 0..=255.
    ///
    /// A constant map carries no corner evidence and normalizes to zeros.
    pub fn from_raw(width: usize, height: usize, raw: &[f32]) -> Result<Self, InvalidMapData> {
        let expected_len = width * height;
        if raw.len() != expected_len {
            return Err(InvalidMapData {
                expected_len,
                actual_len: raw.len(),
            });
        }

        let (min, max) = raw
            .iter()
            .filter(|v| v.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let range = max - min;

        let values = if range.is_finite() && range > 0.0 {
            raw.iter()
                .map(|&v| if v.is_finite() { (v - min) / range * 255.0 } else { 0.0 })
                .collect()
        } else {
            vec![0.0; expected_len]
        };

        Ok(Self { width, height, values })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Response at `(x, y)`, `None` outside the grid
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.values[y * self.width + x])
        } else {
            None
        }
    }

    /// Mutable access for building a map cell by cell
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        if x < self.width && y < self.height {
            self.values[y * self.width + x] = value;
        }
    }
}

/// Ordered polyline tracing one connected edge
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Contour {
    pub points: Vec<Point2D>,
}

/// Axis-aligned bounding box `(min_x, min_y, max_x, max_y)`
pub type BoundingBox = (f64, f64, f64, f64);

impl Contour {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Length of the open path through consecutive points
    pub fn arc_length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        Some(self.points.iter().fold(
            (first.x, first.y, first.x, first.y),
            |(min_x, min_y, max_x, max_y), p| {
                (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
            },
        ))
    }

    /// Horizontal extent of the bounding box, 0 for an empty contour
    pub fn width(&self) -> f64 {
        self.bounding_box()
            .map(|(min_x, _, max_x, _)| max_x - min_x)
            .unwrap_or(0.0)
    }

    /// Point with the largest y (lowest on screen); first one wins ties
    pub fn lowest_point(&self) -> Option<Point2D> {
        self.points
            .iter()
            .copied()
            .reduce(|best, p| if p.y > best.y { p } else { best })
    }
}

impl From<Vec<Point2D>> for Contour {
    fn from(points: Vec<Point2D>) -> Self {
        Contour::new(points)
    }
}

/// Coefficients of y = a*x^2 + b*x + c
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParabolaModel {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl ParabolaModel {
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    pub fn eval(&self, x: f64) -> f64 {
        (self.a * x + self.b) * x + self.c
    }

    /// dy/dx at `x`
    pub fn slope_at(&self, x: f64) -> f64 {
        2.0 * self.a * x + self.b
    }

    /// Vertex of the parabola. `None` when `a` is zero or not finite.
    pub fn vertex(&self) -> Option<Point2D> {
        if self.a == 0.0 || !self.a.is_finite() {
            return None;
        }
        let vx = -self.b / (2.0 * self.a);
        let vertex = Point2D::new(vx, self.eval(vx));
        vertex.is_finite().then_some(vertex)
    }
}

/// Outcome of a successful least-squares fit
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitResult {
    pub model: ParabolaModel,
    pub vertex: Point2D,
    /// Vertical distance from the vertex to the p1-p2 chord, in pixels
    pub pixel_sag: f64,
}

/// Endpoints, sag estimate and sampled wire points handed from extraction to fitting
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WireObservation {
    pub p1: Point2D,
    pub p2: Point2D,
    pub p_sag: Point2D,
    pub candidate_points: Vec<Point2D>,
}

/// Tunable thresholds of the wire-candidate heuristics.
///
/// Fractions are relative to the image width (and height for the default
/// endpoint row); `corner_threshold` is on the normalized 0-255 scale.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtractorConfig {
    pub corner_threshold: f32,
    pub left_cluster_fraction: f64,
    pub right_cluster_fraction: f64,
    pub min_contour_width_fraction: f64,
    pub default_left: (f64, f64),
    pub default_right: (f64, f64),
    pub n_threads: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            corner_threshold: 150.0,
            left_cluster_fraction: 0.25,
            right_cluster_fraction: 0.75,
            min_contour_width_fraction: 0.30,
            default_left: (0.10, 0.40),
            default_right: (0.90, 0.40),
            n_threads: num_cpus::get().max(1),
        }
    }
}

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}
