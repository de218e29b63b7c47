use std::path::{Path, PathBuf};

use image::GrayImage;
use log::{debug, info};
use wire_core::{init_thread_pool, Point2D, WireObservation};
use wire_extract::{Annotation, ExtractError, Extraction, ExtractionConfig, WireExtractor};
use wire_fit::{measure, FitError, Measurement};

pub mod vision;

pub use vision::{corner_response_map, downsample, downsample_factor, edge_contours};
pub use wire_core;
pub use wire_extract;
pub use wire_fit;

#[derive(Debug)]
pub enum CliError {
    Extract(ExtractError),
    Fit(FitError),
    Image(image::ImageError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Config { path: PathBuf, message: String },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Extract(e) => write!(f, "Extraction error: {}", e),
            CliError::Fit(e) => write!(f, "Measurement error: {}", e),
            CliError::Image(e) => write!(f, "Image error: {}", e),
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::Json(e) => write!(f, "JSON error: {}", e),
            CliError::Config { path, message } => {
                write!(f, "Invalid configuration {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl From<ExtractError> for CliError {
    fn from(err: ExtractError) -> Self {
        CliError::Extract(err)
    }
}

impl From<FitError> for CliError {
    fn from(err: FitError) -> Self {
        CliError::Fit(err)
    }
}

impl From<image::ImageError> for CliError {
    fn from(err: image::ImageError) -> Self {
        CliError::Image(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Json(err)
    }
}

pub type CliResult<T> = Result<T, CliError>;

/// Extraction on a downsampled copy of the input
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub extraction: Extraction,
    /// Input pixels per analysed pixel
    pub scale: u32,
}

impl Analysis {
    /// Key points and wire samples in full-resolution pixel coordinates
    pub fn observation(&self) -> WireObservation {
        let origin = Point2D::default();
        let s = f64::from(self.scale);
        let obs = &self.extraction.observation;
        WireObservation {
            p1: obs.p1.relative_to(&origin, s),
            p2: obs.p2.relative_to(&origin, s),
            p_sag: obs.p_sag.relative_to(&origin, s),
            candidate_points: obs.candidate_points.iter().map(|p| p.relative_to(&origin, s)).collect(),
        }
    }
}

/// High-level wire measurement: vision stage, extraction, manual correction and measurement
pub struct WireMaster {
    config: ExtractionConfig,
}

impl WireMaster {
    /// Create a measurer; the first one sizes the shared worker pool from `core.n_threads`
    pub fn new(config: ExtractionConfig) -> CliResult<Self> {
        config.validate()?;

        if let Err(err) = init_thread_pool(config.core.n_threads) {
            debug!("keeping existing thread pool: {}", err);
        }

        Ok(Self { config })
    }

    /// Run the vision stage and the extractor on `gray` as given
    pub fn analyze(&self, gray: &GrayImage) -> CliResult<Extraction> {
        let (w, h) = gray.dimensions();
        let extractor = WireExtractor::new(self.config.clone().resized(w as usize, h as usize))?;

        let corner_map = corner_response_map(gray, self.config.vision.harris_k)?;
        let contours = edge_contours(gray, &self.config.vision);
        let extraction = extractor.extract(&corner_map, &contours)?;

        info!(
            "{}x{}: {} strong corners, {} contours, endpoints {:?}/{:?}, sag from {:?}",
            w,
            h,
            extraction.corner_count,
            contours.len(),
            extraction.left,
            extraction.right,
            extraction.sag
        );
        Ok(extraction)
    }

    /// Downsample towards the configured size, then analyze
    pub fn analyze_downsampled(&self, gray: &GrayImage) -> CliResult<Analysis> {
        let (small, scale) = downsample(gray, self.config.vision.max_dimension);
        let extraction = self.analyze(&small)?;
        Ok(Analysis { extraction, scale })
    }

    /// Length and sag for the (possibly corrected) key points
    pub fn measure(&self, real_span_m: f64, annotation: &Annotation) -> CliResult<Measurement> {
        Ok(measure(real_span_m, &annotation.p1, &annotation.p2, &annotation.p_sag)?)
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }
}

/// Load an extraction config, choosing the format from the file extension
pub fn load_config(path: &Path) -> CliResult<ExtractionConfig> {
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let loaded = if is_toml {
        ExtractionConfig::load_toml(path)
    } else {
        ExtractionConfig::load_json(path)
    };
    loaded.map_err(|e| CliError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse an `x,y` pixel coordinate
pub fn parse_point(s: &str) -> Result<Point2D, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid coordinate '{}' in '{}'", v.trim(), s))
    };
    Ok(Point2D::new(parse(x)?, parse(y)?))
}
