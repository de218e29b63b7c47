use crate::config::ExtractionConfig;
use crate::error::ExtractResult;
use crate::extractor::WireExtractor;

/// Builder for creating a `WireExtractor`
#[derive(Debug, Clone)]
pub struct ExtractorBuilder {
    config: ExtractionConfig,
}

impl ExtractorBuilder {
    /// Create a new builder with default thresholds
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            config: ExtractionConfig::new(width, height),
        }
    }

    /// Normalized corner response a corner must exceed (0-255)
    pub fn corner_threshold(mut self, threshold: f32) -> Self {
        self.config.core.corner_threshold = threshold;
        self
    }

    /// Width fractions bounding the left and right corner clusters
    pub fn cluster_bands(mut self, left: f64, right: f64) -> Self {
        self.config.core.left_cluster_fraction = left;
        self.config.core.right_cluster_fraction = right;
        self
    }

    /// Minimum contour bounding-box width as a fraction of the image width
    pub fn min_contour_width(mut self, fraction: f64) -> Self {
        self.config.core.min_contour_width_fraction = fraction;
        self
    }

    /// Fallback endpoints as (x, y) fractions of the image size
    pub fn default_endpoints(mut self, left: (f64, f64), right: (f64, f64)) -> Self {
        self.config.core.default_left = left;
        self.config.core.default_right = right;
        self
    }

    pub fn threads(mut self, n_threads: usize) -> Self {
        self.config.core.n_threads = n_threads;
        self
    }

    pub fn harris_k(mut self, k: f64) -> Self {
        self.config.vision.harris_k = k;
        self
    }

    /// Canny hysteresis thresholds
    pub fn canny(mut self, low: f32, high: f32) -> Self {
        self.config.vision.canny_low = low;
        self.config.vision.canny_high = high;
        self
    }

    pub fn dilate_radius(mut self, radius: u8) -> Self {
        self.config.vision.dilate_radius = radius;
        self
    }

    pub fn max_dimension(mut self, max_dimension: u32) -> Self {
        self.config.vision.max_dimension = max_dimension;
        self
    }

    pub fn preset_close_range(self) -> Self {
        self.apply_preset(ExtractionConfig::close_range_preset)
    }

    pub fn preset_distant(self) -> Self {
        self.apply_preset(ExtractionConfig::distant_preset)
    }

    pub fn preset_low_contrast(self) -> Self {
        self.apply_preset(ExtractionConfig::low_contrast_preset)
    }

    fn apply_preset(mut self, preset: fn(usize, usize) -> ExtractionConfig) -> Self {
        let preset = preset(self.config.width, self.config.height);
        self.config.core = preset.core;
        self.config.vision = preset.vision;
        self
    }

    /// Validate and build the `WireExtractor`
    pub fn build(self) -> ExtractResult<WireExtractor> {
        WireExtractor::new(self.config)
    }

    pub fn summary(&self) -> String {
        self.config.summary()
    }

    pub fn from_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Builder settings without metadata
    pub fn to_config(self) -> ExtractionConfig {
        ExtractionConfig {
            name: None,
            description: None,
            version: None,
            ..self.config
        }
    }

    pub fn width(&self) -> usize {
        self.config.width
    }

    pub fn height(&self) -> usize {
        self.config.height
    }
}
