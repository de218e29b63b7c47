use log::debug;
use wire_core::{Contour, CornerResponseMap, ExtractorConfig, FitResult, Point2D, WireObservation};
use wire_fit::fit_parabola;

use crate::clustering::{locate_endpoint, split_clusters, strong_corners, EndpointSource};
use crate::config::ExtractionConfig;
use crate::contour::select_wire_contour;
use crate::error::{ExtractError, ExtractResult};

/// Where the sag-point estimate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SagSource {
    /// Vertex of the parabola fitted to the selected contour
    Vertex,
    /// Fit failed; lowest point of the selected contour
    LowestContourPoint,
    /// No contour qualified; midpoint of the endpoints
    ChordMidpoint,
}

/// Observation plus the provenance of each estimate
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extraction {
    pub observation: WireObservation,
    pub fit: Option<FitResult>,
    pub left: EndpointSource,
    pub right: EndpointSource,
    pub sag: SagSource,
    pub corner_count: usize,
}

impl Extraction {
    pub fn into_observation(self) -> WireObservation {
        self.observation
    }

    /// True when any estimate fell back to a default
    pub fn is_degraded(&self) -> bool {
        self.left == EndpointSource::Default
            || self.right == EndpointSource::Default
            || self.sag != SagSource::Vertex
    }
}

/// Extract endpoints, sag seed and wire samples with the default thresholds
pub fn extract(
    image_width: usize,
    image_height: usize,
    corner_map: &CornerResponseMap,
    contours: &[Contour],
) -> Extraction {
    extract_with(&ExtractorConfig::default(), image_width, image_height, corner_map, contours)
}

/// Extract with explicit thresholds. Never fails: missing evidence degrades to
/// the configured defaults and is recorded in the provenance fields.
pub fn extract_with(
    cfg: &ExtractorConfig,
    image_width: usize,
    image_height: usize,
    corner_map: &CornerResponseMap,
    contours: &[Contour],
) -> Extraction {
    let w = image_width as f64;
    let h = image_height as f64;

    let corners = strong_corners(corner_map, cfg.corner_threshold);
    let clusters = split_clusters(corners, w, cfg);

    let default_left = Point2D::new(w * cfg.default_left.0, h * cfg.default_left.1);
    let default_right = Point2D::new(w * cfg.default_right.0, h * cfg.default_right.1);
    let (p1, left) = locate_endpoint(&clusters.left, default_left);
    let (p2, right) = locate_endpoint(&clusters.right, default_right);

    if left == EndpointSource::Default || right == EndpointSource::Default {
        debug!(
            "corner clusters incomplete ({} left, {} right of {} corners); using default endpoints",
            clusters.left.len(),
            clusters.right.len(),
            clusters.total
        );
    }

    let selected = select_wire_contour(contours, w * cfg.min_contour_width_fraction);
    let candidate_points = selected.map(|c| c.points.clone()).unwrap_or_default();

    let (p_sag, fit, sag) = match selected {
        None => {
            debug!("no contour wider than {:.0}% of the image", cfg.min_contour_width_fraction * 100.0);
            (p1.midpoint(&p2), None, SagSource::ChordMidpoint)
        }
        Some(contour) => match fit_parabola(&contour.points, &p1, &p2) {
            Ok(fit) => (fit.vertex, Some(fit), SagSource::Vertex),
            Err(err) => {
                debug!("parabola fit on {} contour points failed: {}", contour.len(), err);
                match contour.lowest_point() {
                    Some(lowest) => (lowest, None, SagSource::LowestContourPoint),
                    None => (p1.midpoint(&p2), None, SagSource::ChordMidpoint),
                }
            }
        },
    };

    Extraction {
        observation: WireObservation {
            p1,
            p2,
            p_sag,
            candidate_points,
        },
        fit,
        left,
        right,
        sag,
        corner_count: clusters.total,
    }
}

/// Extractor bound to a validated configuration and image size
#[derive(Debug, Clone)]
pub struct WireExtractor {
    config: ExtractionConfig,
}

impl WireExtractor {
    /// Create an extractor after validating `config`
    pub fn new(config: ExtractionConfig) -> ExtractResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Extract from a corner map that must match the configured image size
    pub fn extract(&self, corner_map: &CornerResponseMap, contours: &[Contour]) -> ExtractResult<Extraction> {
        let expected = (self.config.width, self.config.height);
        let actual = (corner_map.width(), corner_map.height());
        if expected != actual {
            return Err(ExtractError::CornerMapSizeMismatch { expected, actual });
        }
        Ok(extract_with(
            &self.config.core,
            self.config.width,
            self.config.height,
            corner_map,
            contours,
        ))
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn config_summary(&self) -> String {
        self.config.summary()
    }

    /// Image dimensions (width, height) the extractor is configured for
    pub fn dimensions(&self) -> (usize, usize) {
        (self.config.width, self.config.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire_core::ParabolaModel;

    const W: usize = 200;
    const H: usize = 100;

    fn wire_contour(model: &ParabolaModel, x0: f64, x1: f64, step: f64) -> Contour {
        let n = ((x1 - x0) / step).round() as usize;
        Contour::new(
            (0..=n)
                .map(|i| {
                    let x = x0 + i as f64 * step;
                    Point2D::new(x, model.eval(x))
                })
                .collect(),
        )
    }

    fn corner_map(cells: &[(usize, usize)]) -> CornerResponseMap {
        let mut map = CornerResponseMap::empty(W, H);
        for &(x, y) in cells {
            map.set(x, y, 255.0);
        }
        map
    }

    #[test]
    fn test_no_evidence_gives_documented_defaults() {
        let _ = env_logger::builder().is_test(true).try_init();

        let result = extract(W, H, &CornerResponseMap::empty(W, H), &[]);
        let obs = &result.observation;
        assert_eq!(obs.p1, Point2D::new(20.0, 40.0));
        assert_eq!(obs.p2, Point2D::new(180.0, 40.0));
        assert_eq!(obs.p_sag, Point2D::new(100.0, 40.0));
        assert!(obs.candidate_points.is_empty());
        assert_eq!(result.fit, None);
        assert_eq!(result.left, EndpointSource::Default);
        assert_eq!(result.right, EndpointSource::Default);
        assert_eq!(result.sag, SagSource::ChordMidpoint);
        assert_eq!(result.corner_count, 0);
        assert!(result.is_degraded());
    }

    #[test]
    fn test_cluster_centroids_become_endpoints() {
        let map = corner_map(&[(10, 20), (14, 24), (100, 50), (190, 30)]);
        let result = extract(W, H, &map, &[]);
        assert_eq!(result.observation.p1, Point2D::new(12.0, 22.0));
        assert_eq!(result.observation.p2, Point2D::new(190.0, 30.0));
        assert_eq!(result.left, EndpointSource::Cluster { members: 2 });
        assert_eq!(result.right, EndpointSource::Cluster { members: 1 });
        assert_eq!(result.corner_count, 4);
    }

    #[test]
    fn test_vertex_seeds_sag_point() {
        let map = corner_map(&[(10, 30), (190, 30)]);
        // y = 30 + 0.005 (x - 10)(190 - x): dips to 70.5 at x = 100
        let model = ParabolaModel::new(-0.005, 1.0, 20.5);
        let wire = wire_contour(&model, 10.0, 190.0, 2.0);
        let noise = Contour::new(vec![Point2D::new(150.0, 5.0), Point2D::new(160.0, 90.0)]);

        let result = extract(W, H, &map, &[noise, wire.clone()]);
        assert_eq!(result.sag, SagSource::Vertex);
        assert_eq!(result.observation.candidate_points, wire.points);

        let fit = result.fit.unwrap();
        assert!((result.observation.p_sag.x - 100.0).abs() < 1e-6);
        assert!((result.observation.p_sag.y - 70.5).abs() < 1e-6);
        assert!((fit.pixel_sag - 40.5).abs() < 1e-6);
        assert!(!result.is_degraded());
    }

    #[test]
    fn test_pixel_scale_image_fits_vertex() {
        let (w, h) = (1080, 810);
        let mut map = CornerResponseMap::empty(w, h);
        map.set(60, 300, 255.0);
        map.set(1020, 300, 255.0);

        // 40 px dip below the y = 300 chord, centred at x = 540
        let (x0, x1, sag) = (60.0, 1020.0, 40.0);
        let l2 = (x1 - x0) * (x1 - x0);
        let model = ParabolaModel::new(-4.0 * sag / l2, 4.0 * sag * (x0 + x1) / l2, 300.0 - 4.0 * sag * x0 * x1 / l2);
        let wire = wire_contour(&model, x0, x1, 1.0);

        let result = extract(w, h, &map, &[wire]);
        assert_eq!(result.sag, SagSource::Vertex);
        assert!((result.observation.p_sag.x - 540.0).abs() < 1e-6);
        assert!((result.observation.p_sag.y - 340.0).abs() < 1e-6);
        assert!((result.fit.unwrap().pixel_sag - 40.0).abs() < 1e-6);
        assert!(!result.is_degraded());
    }

    #[test]
    fn test_straight_contour_falls_back_to_lowest_point() {
        let map = corner_map(&[(10, 10), (190, 50)]);
        let line = Contour::new(
            (0..=90)
                .map(|i| Point2D::new(10.0 + 2.0 * i as f64, 10.0 + 0.8 * i as f64))
                .collect(),
        );
        let lowest = line.lowest_point().unwrap();

        let result = extract(W, H, &map, &[line]);
        assert_eq!(result.sag, SagSource::LowestContourPoint);
        assert_eq!(result.fit, None);
        assert_eq!(result.observation.p_sag, lowest);
        assert_eq!(lowest, Point2D::new(190.0, 82.0));
    }

    #[test]
    fn test_short_contours_are_ignored() {
        let model = ParabolaModel::new(-0.05, 5.0, -50.0);
        let short = wire_contour(&model, 40.0, 90.0, 1.0);
        let result = extract(W, H, &CornerResponseMap::empty(W, H), &[short]);
        assert_eq!(result.sag, SagSource::ChordMidpoint);
        assert!(result.observation.candidate_points.is_empty());
    }

    #[test]
    fn test_custom_thresholds() {
        let mut cfg = ExtractorConfig::default();
        cfg.corner_threshold = 100.0;
        cfg.left_cluster_fraction = 0.4;

        let mut map = CornerResponseMap::empty(W, H);
        map.set(70, 10, 120.0);
        let result = extract_with(&cfg, W, H, &map, &[]);
        assert_eq!(result.observation.p1, Point2D::new(70.0, 10.0));

        let default_result = extract(W, H, &map, &[]);
        assert_eq!(default_result.left, EndpointSource::Default);
    }

    #[test]
    fn test_configured_extractor_checks_map_size() {
        let extractor = WireExtractor::new(ExtractionConfig::new(W, H)).unwrap();
        let result = extractor.extract(&CornerResponseMap::empty(W, H + 1), &[]);
        assert_eq!(
            result,
            Err(ExtractError::CornerMapSizeMismatch { expected: (W, H), actual: (W, H + 1) })
        );
        assert!(extractor.extract(&CornerResponseMap::empty(W, H), &[]).is_ok());
        assert_eq!(extractor.dimensions(), (W, H));
    }

    #[test]
    fn test_idempotent() {
        let map = corner_map(&[(3, 7), (5, 9), (170, 40), (199, 99)]);
        let model = ParabolaModel::new(-0.004, 0.8, 30.0);
        let wire = wire_contour(&model, 5.0, 195.0, 0.5);
        let first = extract(W, H, &map, std::slice::from_ref(&wire));
        let second = extract(W, H, &map, std::slice::from_ref(&wire));
        assert_eq!(first, second);
        let (a, b) = (first.fit.unwrap(), second.fit.unwrap());
        assert_eq!(a.model.a.to_bits(), b.model.a.to_bits());
        assert_eq!(a.pixel_sag.to_bits(), b.pixel_sag.to_bits());
    }
}
