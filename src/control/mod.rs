//! Control core: the timer-driven state machines that decide actuator state.
//!
//! Each controller is an owned struct advanced by `tick(now_ms, ..)` and
//! mutated through explicit operations.  None of them touch hardware:
//! output changes are handed back to the caller, which forwards them to
//! the [`ActuatorPort`](crate::app::ports::ActuatorPort).

pub mod filter;
pub mod ph_dosing;
pub mod pump_cycle;

/// Milliseconds elapsed since `since`, zero if the clock reads earlier.
#[inline]
pub(crate) fn elapsed_ms(now_ms: u64, since_ms: u64) -> u64 {
    now_ms.saturating_sub(since_ms)
}
