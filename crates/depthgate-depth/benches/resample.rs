use criterion::{black_box, criterion_group, criterion_main, Criterion};
use depthgate_core::{DepthFrame, SampleFilter};
use depthgate_depth::resample;

/// LiDAR depth resolution onto the full camera image.
fn bench_resample(c: &mut Criterion) {
    let frame = DepthFrame::from_fn(256, 192, |x, y| 0.5 + (x + y) as f32 * 0.01).unwrap();

    let mut group = c.benchmark_group("resample_256x192_to_1920x1440");
    group.bench_function("nearest", |b| {
        b.iter(|| resample(black_box(&frame), 1920, 1440, SampleFilter::Nearest).unwrap());
    });
    group.bench_function("bilinear", |b| {
        b.iter(|| resample(black_box(&frame), 1920, 1440, SampleFilter::Bilinear).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_resample);
criterion_main!(benches);
