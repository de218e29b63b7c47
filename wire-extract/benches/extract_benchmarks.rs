use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wire_core::{Contour, CornerResponseMap, Point2D};
use wire_extract::{extract, select_wire_contour, strong_corners};

/// Corner map with a few strong blobs near both image borders and weak texture elsewhere
fn create_corner_map(width: usize, height: usize) -> CornerResponseMap {
    let mut map = CornerResponseMap::empty(width, height);
    for y in 0..height {
        for x in 0..width {
            map.set(x, y, ((x * 7 + y * 13) % 120) as f32);
        }
    }
    for &(cx, cy) in &[(width / 12, height / 3), (width - width / 12, height / 3 + 4)] {
        for dy in 0..5 {
            for dx in 0..5 {
                map.set(cx + dx, cy + dy, 255.0);
            }
        }
    }
    map
}

/// One sagging wire among many short clutter contours
fn create_contours(width: usize, height: usize, clutter: usize) -> Vec<Contour> {
    let w = width as f64;
    let h = height as f64;
    let mut contours: Vec<Contour> = (0..clutter)
        .map(|i| {
            let x0 = (i * 37 % width) as f64;
            let y0 = (i * 53 % height) as f64;
            Contour::new((0..12).map(|k| Point2D::new(x0 + (k % 3) as f64, y0 + k as f64)).collect())
        })
        .collect();

    let wire = (0..width)
        .map(|x| {
            let t = x as f64 / w;
            Point2D::new(x as f64, h * 0.35 + h * 0.4 * t * (1.0 - t))
        })
        .collect();
    contours.push(Contour::new(wire));
    contours
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    for &(width, height) in &[(320usize, 240usize), (1080, 810)] {
        let map = create_corner_map(width, height);
        let contours = create_contours(width, height, 500);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &(map, contours),
            |b, (map, contours)| b.iter(|| black_box(extract(width, height, black_box(map), black_box(contours)))),
        );
    }

    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let map = create_corner_map(1080, 810);
    let contours = create_contours(1080, 810, 2000);

    c.bench_function("strong_corners_1080", |b| {
        b.iter(|| black_box(strong_corners(black_box(&map), 150.0)))
    });

    c.bench_function("select_wire_contour_2000", |b| {
        b.iter(|| black_box(select_wire_contour(black_box(&contours), 324.0)))
    });
}

criterion_group!(benches, bench_extract, bench_stages);
criterion_main!(benches);
