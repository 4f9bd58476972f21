#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use oslec::{AdaptionMode, EchoCanceller};

#[derive(Debug, Arbitrary)]
enum Action {
    Update { tx: i16, rx: i16 },
    SetMode { bits: u32 },
    Flush,
}

fuzz_target!(|actions: Vec<Action>| {
    let mut ec = EchoCanceller::new(128, AdaptionMode::ADAPTION)
        .expect("128 taps is always a valid filter length");

    // Mode churn between samples must never corrupt the canceller into a
    // panicking state.
    for action in actions {
        match action {
            Action::Update { tx, rx } => {
                let _ = ec.update(tx, rx);
            }
            Action::SetMode { bits } => {
                ec.set_mode(AdaptionMode::from_bits_truncate(bits));
            }
            Action::Flush => ec.flush(),
        }
    }
});
