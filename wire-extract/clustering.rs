use rayon::prelude::*;
use wire_core::{CornerResponseMap, ExtractorConfig, Point2D};

/// Where an endpoint estimate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndpointSource {
    /// Centroid of this many strong corners
    Cluster { members: usize },
    /// No strong corner on that side; fixed framing default
    Default,
}

/// Strong corners split by horizontal position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CornerClusters {
    pub left: Vec<Point2D>,
    pub right: Vec<Point2D>,
    /// Corners above threshold anywhere in the map
    pub total: usize,
}

/// Cells whose response is strictly above `threshold`, in row-major order
pub fn strong_corners(map: &CornerResponseMap, threshold: f32) -> Vec<Point2D> {
    let width = map.width();
    if width == 0 {
        return Vec::new();
    }

    map.values()
        .par_chunks(width)
        .enumerate()
        .flat_map_iter(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(move |&(_, &v)| v > threshold)
                .map(move |(x, _)| Point2D::new(x as f64, y as f64))
        })
        .collect()
}

/// Partition corners into the left and right bands of an image `image_width` wide
pub fn split_clusters(corners: Vec<Point2D>, image_width: f64, cfg: &ExtractorConfig) -> CornerClusters {
    let left_limit = image_width * cfg.left_cluster_fraction;
    let right_limit = image_width * cfg.right_cluster_fraction;
    let total = corners.len();

    let (left, rest): (Vec<Point2D>, Vec<Point2D>) = corners.into_iter().partition(|p| p.x < left_limit);
    let right = rest.into_iter().filter(|p| p.x > right_limit).collect();

    CornerClusters { left, right, total }
}

/// Arithmetic mean of `points`
pub fn centroid(points: &[Point2D]) -> Option<Point2D> {
    if points.is_empty() {
        return None;
    }
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = points.len() as f64;
    Some(Point2D::new(sx / n, sy / n))
}

/// Centroid of `cluster`, or `fallback` when the cluster is empty
pub fn locate_endpoint(cluster: &[Point2D], fallback: Point2D) -> (Point2D, EndpointSource) {
    match centroid(cluster) {
        Some(c) => (c, EndpointSource::Cluster { members: cluster.len() }),
        None => (fallback, EndpointSource::Default),
    }
}
