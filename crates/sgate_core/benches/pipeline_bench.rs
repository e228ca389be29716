//! Pipeline Benchmarks
//!
//! Per-stage cost of one wake cycle. Every microsecond here is battery, so
//! regressions in the transform or the classifier show up first.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sgate_core::spectral::fast_sin;
use sgate_core::{Fixed, InferenceEngine, SpectralGate, SpectralProcessor, MAX_BINS, VIBRATION_BUFFER_SIZE};
use std::time::Duration;

/// Two aligned tones, the same shape the regression tests use
fn generate_window() -> [i16; VIBRATION_BUFFER_SIZE] {
    let mut samples = [0i16; VIBRATION_BUFFER_SIZE];
    for (n, s) in samples.iter_mut().enumerate() {
        let n = n as u32;
        let value = ((fast_sin(40 * n).to_bits() * 3) >> 3) + (fast_sin(96 * n).to_bits() >> 3);
        *s = value as i16;
    }
    samples
}

fn bench_spectral(c: &mut Criterion) {
    let mut group = c.benchmark_group("spectral");
    group.measurement_time(Duration::from_secs(5));
    let samples = generate_window();

    for bins in [16usize, 64, 128] {
        let processor = SpectralProcessor::new(bins, 1000);

        group.bench_with_input(BenchmarkId::new("process", bins), &samples, |b, samples| {
            b.iter(|| processor.process(black_box(samples)));
        });

        group.bench_with_input(BenchmarkId::new("extract_features", bins), &samples, |b, samples| {
            let mut features = [Fixed::ZERO; MAX_BINS];
            b.iter(|| processor.extract_features(black_box(samples), &mut features));
        });
    }

    group.finish();
}

fn bench_inference(c: &mut Criterion) {
    let engine = InferenceEngine::with_default_model();
    let mut features = [Fixed::ZERO; 64];
    SpectralProcessor::default()
        .extract_features(&generate_window(), &mut features)
        .unwrap();

    c.bench_function("inference/default_model", |b| {
        b.iter(|| engine.run(black_box(&features)));
    });
}

fn bench_full_cycle(c: &mut Criterion) {
    let gate = SpectralGate::with_defaults();
    let samples = generate_window();

    let mut group = c.benchmark_group("full_cycle");
    for battery_mv in [4100u16, 3200, 2800] {
        group.bench_with_input(BenchmarkId::from_parameter(battery_mv), &battery_mv, |b, &mv| {
            b.iter(|| gate.analyze(black_box(&samples), mv));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_spectral, bench_inference, bench_full_cycle);
criterion_main!(benches);
