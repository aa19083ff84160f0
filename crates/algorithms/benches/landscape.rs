//! Benchmarks for landscape metrics

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use landpattern_algorithms::landscape::{
    composition, extract_window, landscape_metrics, scan_adjacency, SingleClassContagion,
};
use landpattern_algorithms::zonal::{zonal_landscape_metrics, MetricsParams};
use landpattern_core::{Bounds, GeoTransform, Raster, ZoneLayer, CRS};

const CELL: f64 = 30.0;

fn create_landcover(size: usize) -> Raster<u8> {
    let data = (0..size * size)
        .map(|i| {
            let (row, col) = (i / size, i % size);
            // blocky pattern with some speckle so every class shows up
            (((row / 7) * 3 + (col / 5) + (row * col) % 3) % 6 + 1) as u8
        })
        .collect();
    Raster::from_vec(data, size, size)
        .unwrap()
        .with_transform(GeoTransform::new(0.0, size as f64 * CELL, CELL, -CELL))
        .with_crs(CRS::utm_49n())
        .with_nodata(255)
}

fn fishnet(size: usize, cell_pixels: usize) -> ZoneLayer {
    let step = cell_pixels as f64 * CELL;
    let n = size / cell_pixels;
    let bounds = (0..n).flat_map(move |r| {
        (0..n).map(move |c| {
            let min_x = c as f64 * step;
            let min_y = r as f64 * step;
            Bounds::new(min_x, min_y, min_x + step, min_y + step)
        })
    });
    ZoneLayer::from_bounds(bounds, Some(CRS::utm_49n()))
}

fn bench_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_landscape_metrics");

    for size in [32, 64, 128, 256].iter() {
        let raster = create_landcover(*size);
        let extent = *size as f64 * CELL;
        let bounds = Bounds::new(0.0, 0.0, extent, extent);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let window = extract_window(black_box(&raster), &bounds, 255).unwrap();
                let comp = composition(&window);
                let scan = scan_adjacency(&window, &comp.codes());
                landscape_metrics(&comp, &scan.matrix, SingleClassContagion::Undefined)
            })
        });
    }

    group.finish();
}

fn bench_zonal(c: &mut Criterion) {
    let mut group = c.benchmark_group("zonal_landscape_metrics");
    group.sample_size(20);

    for size in [512, 1024].iter() {
        let raster = create_landcover(*size);
        let zones = fishnet(*size, 32);
        let params = MetricsParams::default();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| zonal_landscape_metrics(black_box(&raster), &zones, &params).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_window, bench_zonal);
criterion_main!(benches);
