//! Per-sample cost of the canceller hot path.
//!
//! `update()` has a hard real-time budget: it runs once per 8 kHz sample on
//! every active channel, often on small telephony appliances. Benchmarked at
//! the two common filter lengths, converged and with the full processing
//! chain enabled.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use oslec::{AdaptionMode, EchoCanceller};

fn make_converged(taps: usize) -> EchoCanceller {
    let mode = AdaptionMode::ADAPTION
        | AdaptionMode::NLP
        | AdaptionMode::CNG
        | AdaptionMode::RX_HPF;
    let mut ec = EchoCanceller::new(taps, mode).unwrap();

    // Warm up into the converged steady state so we bench the common case.
    let mut seed = 1u32;
    for _ in 0..16_000 {
        seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
        let tx = ((seed >> 16) as i32 - 32768) as i16 >> 2;
        ec.update(tx, tx >> 2);
    }
    ec
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");

    for &taps in &[128usize, 256] {
        let mut ec = make_converged(taps);
        let mut seed = 99u32;
        group.bench_function(format!("{taps}_taps"), |b| {
            b.iter(|| {
                seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
                let tx = ((seed >> 16) as i32 - 32768) as i16 >> 2;
                ec.update(black_box(tx), black_box(tx >> 2))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
