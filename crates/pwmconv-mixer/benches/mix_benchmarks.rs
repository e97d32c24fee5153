//! Benchmarks for the drive mixer.

use criterion::{Criterion, criterion_group, criterion_main};
use pwmconv_mixer::{DriveMixer, MixInput};

fn bench_mix_centered(c: &mut Criterion) {
    let mixer = DriveMixer::default();
    let input = MixInput::nominal(500, 500, 500);

    c.bench_function("mix_centered", |b| {
        b.iter(|| mixer.mix(std::hint::black_box(&input)))
    });
}

fn bench_mix_blended_turn(c: &mut Criterion) {
    let mixer = DriveMixer::default();
    let input = MixInput::nominal(1000, 600, 800);

    c.bench_function("mix_blended_turn", |b| {
        b.iter(|| mixer.mix(std::hint::black_box(&input)))
    });
}

fn bench_mix_sweep(c: &mut Criterion) {
    let mixer = DriveMixer::default();
    let inputs: Vec<MixInput> = (0..=1000u32)
        .step_by(10)
        .map(|v| MixInput::nominal(800, v, 1000 - v))
        .collect();

    c.bench_function("mix_sweep_101", |b| {
        b.iter(|| {
            for input in &inputs {
                std::hint::black_box(mixer.mix(std::hint::black_box(input)));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_mix_centered,
    bench_mix_blended_turn,
    bench_mix_sweep
);
criterion_main!(benches);
