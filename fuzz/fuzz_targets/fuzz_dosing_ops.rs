//! Fuzz target: `PhDoser` under arbitrary operation sequences
//!
//! Each 3-byte chunk is one operation: opcode, time step (×100 ms) and a
//! pH byte (÷16, so 0.0–15.9 covers both fault edges).
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - The two dosing pumps are never active together
//! - A change list never activates before it releases
//!
//! cargo fuzz run fuzz_dosing_ops

#![no_main]

use libfuzzer_sys::fuzz_target;

use hydrotower::config::PhConfig;
use hydrotower::control::ph_dosing::{DoseDirection, PhDoser};

fuzz_target!(|data: &[u8]| {
    let mut doser = PhDoser::new(PhConfig::default());
    let mut now = 0u64;

    for op in data.chunks_exact(3) {
        now += u64::from(op[1]) * 100;
        let ph = f32::from(op[2]) / 16.0;
        let changes = match op[0] % 6 {
            0 | 1 => doser.tick(now, ph),
            2 => doser.toggle_manual(DoseDirection::Raise, now),
            3 => doser.toggle_manual(DoseDirection::Lower, now),
            4 => doser.stop_all(now),
            _ => doser.set_auto_mode(op[2] & 1 == 1, now),
        };

        assert!(
            !(doser.is_active(DoseDirection::Raise) && doser.is_active(DoseDirection::Lower)),
            "both pumps active"
        );
        if let Some(first_on) = changes.iter().position(|c| c.active) {
            assert!(changes[first_on..].iter().all(|c| c.active));
        }
    }
});
