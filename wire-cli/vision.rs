use image::imageops::{self, FilterType};
use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use imageproc::morphology::dilate;
use log::debug;
use wire_core::{Contour, CornerResponseMap, Point2D};
use wire_extract::{ExtractResult, VisionParams};

/// Dense Harris response `det(M) - k * trace(M)^2`, min-max normalized to 0-255.
///
/// Gradients come from 3x3 Sobel kernels; `M` sums their products over the
/// 2x2 window ending at each pixel, with borders clamped. Edges score
/// negative, so after normalization flat regions sit mid-scale and only
/// corners approach 255.
pub fn corner_response_map(gray: &GrayImage, k: f64) -> ExtractResult<CornerResponseMap> {
    let (w, h) = gray.dimensions();
    let (width, height) = (w as usize, h as usize);

    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);

    // structure tensor entries per pixel: [Ixx, Ixy, Iyy]
    let tensor: Vec<[f64; 3]> = gx
        .pixels()
        .zip(gy.pixels())
        .map(|(dx, dy)| {
            let (dx, dy) = (f64::from(dx[0]), f64::from(dy[0]));
            [dx * dx, dx * dy, dy * dy]
        })
        .collect();

    let mut raw = vec![0.0f32; width * height];
    for y in 0..height {
        let y0 = y.saturating_sub(1);
        for x in 0..width {
            let x0 = x.saturating_sub(1);
            let mut m = [0.0f64; 3];
            for (yy, xx) in [(y0, x0), (y0, x), (y, x0), (y, x)] {
                let t = &tensor[yy * width + xx];
                m[0] += t[0];
                m[1] += t[1];
                m[2] += t[2];
            }
            let trace = m[0] + m[2];
            raw[y * width + x] = (m[0] * m[2] - m[1] * m[1] - k * trace * trace) as f32;
        }
    }
    debug!("Harris response over {}x{} with k={}", width, height, k);

    Ok(CornerResponseMap::from_raw(width, height, &raw)?)
}

/// Canny edges, dilated to close small gaps, traced into polylines
pub fn edge_contours(gray: &GrayImage, params: &VisionParams) -> Vec<Contour> {
    let edges = canny(gray, params.canny_low, params.canny_high);
    let edges = if params.dilate_radius > 0 {
        dilate(&edges, Norm::LInf, params.dilate_radius)
    } else {
        edges
    };

    let contours: Vec<Contour> = imageproc::contours::find_contours::<u32>(&edges)
        .into_iter()
        .filter(|c| c.points.len() >= 2)
        .map(|c| {
            c.points
                .into_iter()
                .map(|p| Point2D::new(f64::from(p.x), f64::from(p.y)))
                .collect::<Vec<_>>()
                .into()
        })
        .collect();
    debug!("traced {} edge contours", contours.len());
    contours
}

/// Power-of-two reduction that keeps both half-dimensions at or above `target`
pub fn downsample_factor(width: u32, height: u32, target: u32) -> u32 {
    let mut factor = 1;
    if target == 0 || (width <= target && height <= target) {
        return factor;
    }
    let (half_w, half_h) = (width / 2, height / 2);
    while half_w / factor >= target && half_h / factor >= target {
        factor *= 2;
    }
    factor
}

/// Downsample `gray` towards `max_dimension`; returns the image and the factor used
pub fn downsample(gray: &GrayImage, max_dimension: u32) -> (GrayImage, u32) {
    let (w, h) = gray.dimensions();
    let factor = downsample_factor(w, h, max_dimension);
    if factor == 1 {
        return (gray.clone(), 1);
    }
    debug!("downsampling {}x{} by {}", w, h, factor);
    let resized = imageops::resize(gray, (w / factor).max(1), (h / factor).max(1), FilterType::Triangle);
    (resized, factor)
}
