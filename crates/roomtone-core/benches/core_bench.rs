//! Criterion benchmarks for roomtone-core primitives
//!
//! Run with: cargo bench -p roomtone-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use roomtone_core::{
    AbsorbentAllpass, DelayLine, FilterMemory, ParameterSmoother, solve_damping_coefficient,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_allpass(c: &mut Criterion) {
    let mut group = c.benchmark_group("AbsorbentAllpass");

    for memory in [FilterMemory::Persistent, FilterMemory::ResetPerSample] {
        for &block_size in BLOCK_SIZES {
            let input = generate_test_signal(block_size);
            group.bench_with_input(
                BenchmarkId::new(format!("{memory:?}"), block_size),
                &block_size,
                |b, _| {
                    let mut stage = AbsorbentAllpass::new(SAMPLE_RATE, 2000.0);
                    stage.set_delay_ms(127.0);
                    stage.set_feedback_gain(0.618);
                    stage.set_absorbent_gain(0.8);
                    stage.set_lowpass_coefficient(0.3);
                    stage.set_filter_memory(memory);
                    b.iter(|| {
                        for &sample in &input {
                            black_box(stage.process(black_box(sample)));
                        }
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_delay_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("DelayLine");
    let input = generate_test_signal(1024);

    group.bench_function("five_taps", |b| {
        let mut line = DelayLine::with_max_delay(1000.0, SAMPLE_RATE);
        let taps = [7.0, 8.54, 9.2, 10.19, 11.07];
        b.iter(|| {
            for &sample in &input {
                line.write(sample);
                let sum: f32 = taps.iter().map(|&ms| line.read_at_ms(ms)).sum();
                black_box(sum);
            }
        });
    });

    group.finish();
}

fn bench_coefficients(c: &mut Criterion) {
    c.bench_function("solve_damping_coefficient", |b| {
        b.iter(|| {
            black_box(solve_damping_coefficient(
                black_box(0.83),
                black_box(5000.0),
                black_box(127.0),
                black_box(1490.0),
                SAMPLE_RATE,
            ))
        });
    });

    c.bench_function("ParameterSmoother", |b| {
        let mut smoother = ParameterSmoother::new();
        b.iter(|| {
            for _ in 0..1024 {
                black_box(smoother.smooth(black_box(1.0)));
            }
        });
    });
}

criterion_group!(benches, bench_allpass, bench_delay_line, bench_coefficients);
criterion_main!(benches);
