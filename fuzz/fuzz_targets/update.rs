#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use oslec::{AdaptionMode, EchoCanceller};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Filter length (clamped to 1..=512).
    taps: u16,
    /// Raw mode bits (unknown bits are truncated away).
    mode_bits: u32,
    /// Synchronized tx/rx sample pairs.
    samples: Vec<(i16, i16)>,
    /// Sample index at which to flush mid-stream, if any.
    flush_at: Option<u16>,
}

fuzz_target!(|input: FuzzInput| {
    let taps = (input.taps % 512) as usize + 1;
    let mode = AdaptionMode::from_bits_truncate(input.mode_bits);

    let mut ec = match EchoCanceller::new(taps, mode) {
        Ok(ec) => ec,
        Err(_) => return,
    };

    let flush_at = input.flush_at.map(usize::from);
    for (i, &(tx, rx)) in input.samples.iter().enumerate() {
        if flush_at == Some(i) {
            ec.flush();
        }
        // Any i16 pair must yield a defined output, never a panic.
        let _ = ec.update(tx, rx);
        let _ = ec.hpf_tx(tx);
    }
});
