//! Criterion benchmarks for psyclip-core
//!
//! Run with: cargo bench -p psyclip-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use psyclip_core::{
    Clipper, DEFAULT_MARGIN_CURVE, MarginCurve, RealFft, RustRealFft, SpreadTable,
    compute_mask_curve,
};

const SAMPLE_RATE: u32 = 48_000;
const FFT_SIZES: &[usize] = &[512, 1024, 2048, 4096];

fn generate_test_signal(size: usize, amplitude: f32) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * 997.0 * t).sin() * amplitude
        })
        .collect()
}

fn bench_feed(c: &mut Criterion) {
    let mut group = c.benchmark_group("Clipper/feed");

    for &fft_size in FFT_SIZES {
        let hop = fft_size / 4;
        let loud = generate_test_signal(hop, 2.0);
        let quiet = generate_test_signal(hop, 0.5);

        group.bench_with_input(BenchmarkId::new("overdriven", fft_size), &fft_size, |b, _| {
            let mut clipper = Clipper::new(SAMPLE_RATE, fft_size, 1.0).unwrap();
            let mut output = vec![0.0_f32; hop];
            b.iter(|| {
                clipper.feed(black_box(&loud), &mut output, false, None);
                black_box(&output);
            });
        });

        group.bench_with_input(BenchmarkId::new("below_ceiling", fft_size), &fft_size, |b, _| {
            let mut clipper = Clipper::new(SAMPLE_RATE, fft_size, 1.0).unwrap();
            let mut output = vec![0.0_f32; hop];
            b.iter(|| {
                clipper.feed(black_box(&quiet), &mut output, false, None);
                black_box(&output);
            });
        });
    }

    group.finish();
}

fn bench_iterations(c: &mut Criterion) {
    let mut group = c.benchmark_group("Clipper/iterations");
    let fft_size = 2048;
    let hop = fft_size / 4;
    let loud = generate_test_signal(hop, 2.0);

    for iterations in [1_u32, 3, 6, 12] {
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            &iterations,
            |b, &iterations| {
                let mut clipper = Clipper::new(SAMPLE_RATE, fft_size, 1.0).unwrap();
                clipper.set_iterations(iterations);
                let mut output = vec![0.0_f32; hop];
                let mut shift = 1.0_f32;
                b.iter(|| {
                    shift = 1.0;
                    clipper.feed(black_box(&loud), &mut output, false, Some(&mut shift));
                    black_box(shift);
                });
            },
        );
    }

    group.finish();
}

fn bench_mask(c: &mut Criterion) {
    let mut group = c.benchmark_group("MaskCurve");

    for &fft_size in FFT_SIZES {
        let spread = SpreadTable::new(fft_size / 2);
        let margin = MarginCurve::new(&DEFAULT_MARGIN_CURVE, SAMPLE_RATE, fft_size).unwrap();
        let mut fft = RustRealFft::new(fft_size);
        let frame = generate_test_signal(fft_size, 1.0);
        let mut spectrum = vec![0.0_f32; fft_size];
        fft.forward(&frame, &mut spectrum);
        let mut mask = vec![0.0_f32; fft_size / 2 + 1];

        group.bench_with_input(BenchmarkId::new("compute", fft_size), &fft_size, |b, _| {
            b.iter(|| {
                compute_mask_curve(black_box(&spectrum), &spread, &margin, &mut mask);
                black_box(&mask);
            });
        });
    }

    // Construction cost for a 4096-point frame
    group.bench_function("spread_table_4096", |b| {
        b.iter(|| black_box(SpreadTable::new(black_box(2048))));
    });

    group.finish();
}

criterion_group!(benches, bench_feed, bench_iterations, bench_mask);
criterion_main!(benches);
