//! Polyline decoding benchmarks
//!
//! Run with: cargo bench --package strava-route-lib

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use geo::LineString;
use strava_route_lib::{decode, encode, utils};

/// Generate a wiggly ride of `num_points` points starting near San Francisco
fn generate_path(num_points: usize) -> LineString<f64> {
    (0..num_points)
        .map(|i| {
            let t = i as f64 / num_points as f64;
            let lat = 37.8 + t * 0.3 + (t * 50.0).sin() * 0.002;
            let lon = -122.4 + t * 0.3 + (t * 30.0).cos() * 0.002;
            (lon, lat)
        })
        .collect::<Vec<_>>()
        .into()
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    // Summary polylines are a few hundred points, full ones tens of thousands
    for num_points in [500, 50_000] {
        let encoded = encode(&generate_path(num_points));
        group.throughput(Throughput::Elements(num_points as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_points),
            &encoded,
            |b, encoded| b.iter(|| decode(encoded)),
        );
    }

    group.finish();
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");

    let path = generate_path(50_000);
    group.bench_function("bounds_and_camera_50k", |b| {
        b.iter(|| {
            utils::path_bounds(&path)
                .map(|bounds| utils::fit_camera(bounds, (1280.0, 720.0), 50.0, 15.0, 256.0))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_fit);

criterion_main!(benches);
