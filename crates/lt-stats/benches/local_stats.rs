use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lt_core::Image;
use lt_stats::{local_mean, local_stats};

fn synthetic(width: usize, height: usize) -> Image<f64> {
    let mut data = Vec::with_capacity(width * height);
    for i in 0..(width * height) {
        data.push((i % 251) as f64);
    }
    Image::from_vec(width, height, data).expect("valid image")
}

fn bench_local_mean(c: &mut Criterion) {
    let img = synthetic(640, 480);
    let view = img.as_view();

    c.bench_function("local_mean_r5_640x480", |b| {
        b.iter(|| {
            let out = local_mean(black_box(&view), black_box(5));
            black_box(out);
        });
    });
}

fn bench_local_stats(c: &mut Criterion) {
    let img = synthetic(640, 480);
    let view = img.as_view();

    c.bench_function("local_stats_r5_640x480", |b| {
        b.iter(|| {
            let out = local_stats(black_box(&view), black_box(5));
            black_box(out);
        });
    });
}

criterion_group!(benches, bench_local_mean, bench_local_stats);
criterion_main!(benches);
