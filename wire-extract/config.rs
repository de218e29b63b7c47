use wire_core::ExtractorConfig;

use crate::builder::ExtractorBuilder;
use crate::error::{ExtractError, ExtractResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for the external vision stage that produces the corner map and contours
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VisionParams {
    /// Harris detector free parameter in `det(M) - k * trace(M)^2`
    pub harris_k: f64,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Edge dilation radius (L-infinity), 0 disables dilation
    pub dilate_radius: u8,
    /// Images are downsampled by powers of two towards this size
    pub max_dimension: u32,
}

impl Default for VisionParams {
    fn default() -> Self {
        Self {
            harris_k: 0.04,
            canny_low: 50.0,
            canny_high: 150.0,
            dilate_radius: 1,
            max_dimension: 1080,
        }
    }
}

/// Complete extraction configuration for one image size
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtractionConfig {
    pub width: usize,
    pub height: usize,
    /// Metadata
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub version: Option<String>,
    /// Extraction thresholds. Tables go last so the TOML form stays valid.
    pub core: ExtractorConfig,
    pub vision: VisionParams,
}

impl ExtractionConfig {
    /// Default thresholds for a `width` x `height` image
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            name: None,
            description: None,
            version: None,
            core: ExtractorConfig::default(),
            vision: VisionParams::default(),
        }
    }

    /// Wire fills most of the frame: tighter corner bands, longer contour required
    pub fn close_range_preset(width: usize, height: usize) -> Self {
        let mut config = Self::new(width, height);
        config.core.left_cluster_fraction = 0.20;
        config.core.right_cluster_fraction = 0.80;
        config.core.min_contour_width_fraction = 0.45;
        config.with_metadata("Close Range", "Span fills the frame; endpoints near the image borders")
    }

    /// Small span far from the camera
    pub fn distant_preset(width: usize, height: usize) -> Self {
        let mut config = Self::new(width, height);
        config.core.corner_threshold = 130.0;
        config.core.left_cluster_fraction = 0.30;
        config.core.right_cluster_fraction = 0.70;
        config.core.min_contour_width_fraction = 0.20;
        config.with_metadata("Distant", "Narrow span; relaxed contour width and corner threshold")
    }

    /// Wire against a busy or washed-out background
    pub fn low_contrast_preset(width: usize, height: usize) -> Self {
        let mut config = Self::new(width, height);
        config.core.corner_threshold = 110.0;
        config.vision.canny_low = 30.0;
        config.vision.canny_high = 90.0;
        config.vision.dilate_radius = 2;
        config.with_metadata("Low Contrast", "Lower edge thresholds and wider dilation for faint wires")
    }

    pub fn with_metadata(mut self, name: &str, description: &str) -> Self {
        self.name = Some(name.to_string());
        self.description = Some(description.to_string());
        self.version = Some("1.0".to_string());
        self
    }

    pub fn to_builder(self) -> ExtractorBuilder {
        ExtractorBuilder::from_config(self)
    }

    /// Same thresholds for a different image size
    pub fn resized(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn summary(&self) -> String {
        format!(
            "ExtractionConfig{}: {}x{}, corner>{}, bands=[<{:.2}, >{:.2}], min_width={:.2}, harris_k={}, canny={}/{}, dilate={}, threads={}",
            self.name.as_ref().map(|n| format!(" '{}'", n)).unwrap_or_default(),
            self.width,
            self.height,
            self.core.corner_threshold,
            self.core.left_cluster_fraction,
            self.core.right_cluster_fraction,
            self.core.min_contour_width_fraction,
            self.vision.harris_k,
            self.vision.canny_low,
            self.vision.canny_high,
            self.vision.dilate_radius,
            self.core.n_threads
        )
    }

    /// Check every threshold before an extractor is built from this configuration
    pub fn validate(&self) -> ExtractResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ExtractError::InvalidImageSize { width: self.width, height: self.height });
        }

        let core = &self.core;
        if !(0.0..=255.0).contains(&core.corner_threshold) {
            return Err(ExtractError::InvalidCornerThreshold(core.corner_threshold));
        }
        let (left, right) = (core.left_cluster_fraction, core.right_cluster_fraction);
        if !(left > 0.0 && left < right && right < 1.0) {
            return Err(ExtractError::InvalidClusterBounds { left, right });
        }
        if !(0.0..=1.0).contains(&core.min_contour_width_fraction) {
            return Err(ExtractError::InvalidContourWidthFraction(core.min_contour_width_fraction));
        }
        for &(x, y) in &[core.default_left, core.default_right] {
            if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
                return Err(ExtractError::InvalidDefaultEndpoint { x, y });
            }
        }
        if core.n_threads == 0 {
            return Err(ExtractError::InvalidThreadCount(core.n_threads));
        }

        let (low, high) = (self.vision.canny_low, self.vision.canny_high);
        if !(low >= 0.0 && low <= high) {
            return Err(ExtractError::InvalidCannyThresholds { low, high });
        }
        let k = self.vision.harris_k;
        if !(k > 0.0 && k < 0.25) {
            return Err(ExtractError::InvalidHarrisK(k));
        }
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Parse and validate
    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = ExtractionConfig::new(1080, 720);
        assert!(config.validate().is_ok());
        assert_eq!(config.core.corner_threshold, 150.0);
        assert_eq!(config.vision, VisionParams::default());
        assert_eq!(config.name, None);
    }

    #[test]
    fn test_presets_validate() {
        for config in [
            ExtractionConfig::close_range_preset(640, 480),
            ExtractionConfig::distant_preset(640, 480),
            ExtractionConfig::low_contrast_preset(640, 480),
        ] {
            assert!(config.validate().is_ok(), "{}", config.summary());
            assert!(config.name.is_some());
        }
    }

    #[test]
    fn test_validation_errors() {
        let mut config = ExtractionConfig::new(0, 10);
        assert_eq!(config.validate(), Err(ExtractError::InvalidImageSize { width: 0, height: 10 }));

        config = ExtractionConfig::new(10, 10);
        config.core.corner_threshold = 300.0;
        assert_eq!(config.validate(), Err(ExtractError::InvalidCornerThreshold(300.0)));

        config = ExtractionConfig::new(10, 10);
        config.core.left_cluster_fraction = 0.8;
        assert_eq!(
            config.validate(),
            Err(ExtractError::InvalidClusterBounds { left: 0.8, right: 0.75 })
        );

        config = ExtractionConfig::new(10, 10);
        config.core.min_contour_width_fraction = f64::NAN;
        assert!(matches!(config.validate(), Err(ExtractError::InvalidContourWidthFraction(_))));

        config = ExtractionConfig::new(10, 10);
        config.core.default_right = (1.5, 0.4);
        assert_eq!(config.validate(), Err(ExtractError::InvalidDefaultEndpoint { x: 1.5, y: 0.4 }));

        config = ExtractionConfig::new(10, 10);
        config.core.n_threads = 0;
        assert_eq!(config.validate(), Err(ExtractError::InvalidThreadCount(0)));

        config = ExtractionConfig::new(10, 10);
        config.vision.canny_low = 200.0;
        assert_eq!(
            config.validate(),
            Err(ExtractError::InvalidCannyThresholds { low: 200.0, high: 150.0 })
        );

        config = ExtractionConfig::new(10, 10);
        config.vision.harris_k = 0.0;
        assert_eq!(config.validate(), Err(ExtractError::InvalidHarrisK(0.0)));
        config.vision.harris_k = 0.3;
        assert_eq!(config.validate(), Err(ExtractError::InvalidHarrisK(0.3)));
    }

    #[test]
    fn test_summary_mentions_name_and_size() {
        let summary = ExtractionConfig::distant_preset(320, 240).summary();
        assert!(summary.contains("'Distant'"));
        assert!(summary.contains("320x240"));
        assert!(summary.contains("corner>130"));
    }

    #[test]
    fn test_resized_keeps_thresholds() {
        let config = ExtractionConfig::low_contrast_preset(100, 100).resized(400, 300);
        assert_eq!((config.width, config.height), (400, 300));
        assert_eq!(config.vision.dilate_radius, 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_round_trip() {
        let config = ExtractionConfig::close_range_preset(1920, 1080);
        let json = config.to_json().unwrap();
        assert_eq!(ExtractionConfig::from_json(&json).unwrap(), config);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_toml_round_trip() {
        let config = ExtractionConfig::low_contrast_preset(800, 600);
        let text = config.to_toml().unwrap();
        assert!(text.contains("[core]"));
        assert!(text.contains("[vision]"));
        assert_eq!(ExtractionConfig::from_toml(&text).unwrap(), config);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_loading_rejects_invalid_values() {
        let mut config = ExtractionConfig::new(10, 10);
        config.core.n_threads = 0;
        let json = config.to_json().unwrap();
        assert!(ExtractionConfig::from_json(&json).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_file_round_trip() {
        let dir = std::env::temp_dir();
        let json_path = dir.join(format!("wire-extract-config-{}.json", std::process::id()));
        let toml_path = dir.join(format!("wire-extract-config-{}.toml", std::process::id()));
        let config = ExtractionConfig::distant_preset(640, 360);

        config.save_json(&json_path).unwrap();
        config.save_toml(&toml_path).unwrap();
        assert_eq!(ExtractionConfig::load_json(&json_path).unwrap(), config);
        assert_eq!(ExtractionConfig::load_toml(&toml_path).unwrap(), config);

        let _ = std::fs::remove_file(json_path);
        let _ = std::fs::remove_file(toml_path);
    }
}
