//! Wire-candidate extraction.
//!
//! Turns a normalized corner-response map and traced edge contours into a
//! [`WireObservation`](wire_core::WireObservation): two attachment points, an
//! initial sag point and the samples of the most wire-like contour. Missing
//! evidence never fails the extraction; the [`Extraction`] records which
//! estimates fell back to defaults.

pub mod annotation;
pub mod builder;
pub mod clustering;
pub mod config;
pub mod contour;
pub mod error;
pub mod extractor;

pub use annotation::{Annotation, Handle};
pub use builder::ExtractorBuilder;
pub use clustering::{centroid, locate_endpoint, split_clusters, strong_corners, CornerClusters, EndpointSource};
pub use config::{ExtractionConfig, VisionParams};
pub use contour::select_wire_contour;
pub use error::{ExtractError, ExtractResult};
pub use extractor::{extract, extract_with, Extraction, SagSource, WireExtractor};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wire_core::{Contour, CornerResponseMap, Point2D};

    proptest! {
        // Whatever the input, endpoints stay inside the image and the
        // provenance agrees with what was produced.
        #[test]
        fn prop_extraction_is_total(
            corners in prop::collection::vec((0usize..64, 0usize..48, 0.0f32..255.0), 0..40),
            samples in prop::collection::vec((0.0f64..64.0, 0.0f64..48.0), 0..60),
        ) {
            let mut map = CornerResponseMap::empty(64, 48);
            for &(x, y, v) in &corners {
                map.set(x, y, v);
            }
            let contour = Contour::new(samples.iter().map(|&(x, y)| Point2D::new(x, y)).collect());

            let result = extract(64, 48, &map, std::slice::from_ref(&contour));
            let obs = &result.observation;
            for p in [obs.p1, obs.p2] {
                prop_assert!(p.x >= 0.0 && p.x < 64.0 && p.y >= 0.0 && p.y < 48.0);
            }
            prop_assert!((obs.p1.x < 16.0 && obs.p2.x > 48.0) || result.is_degraded());
            prop_assert!(obs.p_sag.is_finite());

            match result.sag {
                SagSource::ChordMidpoint => prop_assert!(obs.candidate_points.is_empty()),
                _ => prop_assert_eq!(&obs.candidate_points, &contour.points),
            }
            prop_assert_eq!(result.fit.is_some(), result.sag == SagSource::Vertex);
        }
    }

    #[test]
    fn test_extraction_then_manual_correction() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut map = CornerResponseMap::empty(320, 240);
        map.set(20, 60, 255.0);
        map.set(300, 50, 255.0);
        let wire = Contour::new(
            (0..=280)
                .map(|i| {
                    let x = 20.0 + i as f64;
                    let t = i as f64 / 280.0;
                    Point2D::new(x, 60.0 - 10.0 * t + 80.0 * t * (1.0 - t))
                })
                .collect(),
        );

        let extractor = ExtractorBuilder::new(320, 240).threads(1).build().unwrap();
        let extraction = extractor.extract(&map, &[wire]).unwrap();
        assert_eq!(extraction.sag, SagSource::Vertex);
        assert!(!extraction.is_degraded());

        let annotation = Annotation::from_observation(&extraction.observation)
            .press(extraction.observation.p_sag, 10.0)
            .drag(Point2D::new(160.0, 90.0))
            .release();
        let corrected = annotation.apply_to(&extraction.observation);
        assert_eq!(corrected.p_sag, Point2D::new(160.0, 90.0));
        assert_eq!(corrected.p1, Point2D::new(20.0, 60.0));
        assert_eq!(corrected.candidate_points.len(), 281);
    }
}
