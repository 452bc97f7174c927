//! Telemetry record cadence.
//!
//! Decides when the next [`TelemetryData`](crate::app::events::TelemetryData)
//! record is due.  The first record goes out on the first poll after boot,
//! then one every interval.  Recording can be paused from the API and a
//! record can be forced at any time.

use log::info;

#[derive(Debug, Clone)]
pub struct TelemetrySchedule {
    enabled: bool,
    interval_ms: u64,
    last_emit_ms: Option<u64>,
    emitted: u32,
}

impl TelemetrySchedule {
    pub fn new(interval_secs: u32) -> Self {
        Self {
            enabled: true,
            interval_ms: u64::from(interval_secs) * 1000,
            last_emit_ms: None,
            emitted: 0,
        }
    }

    /// Whether a periodic record is due at `now_ms`.
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.enabled
            && self
                .last_emit_ms
                .is_none_or(|t| now_ms.saturating_sub(t) >= self.interval_ms)
    }

    /// Record that a record went out at `now_ms`.
    pub fn mark_emitted(&mut self, now_ms: u64) {
        self.last_emit_ms = Some(now_ms);
        self.emitted = self.emitted.saturating_add(1);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        info!("Telemetry {}", if enabled { "enabled" } else { "paused" });
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_ms / 1000
    }

    /// Records emitted since boot, periodic and forced.
    pub fn emitted(&self) -> u32 {
        self.emitted
    }

    /// Milliseconds until the next periodic record; 0 when due, `None`
    /// when paused.
    pub fn next_in_ms(&self, now_ms: u64) -> Option<u64> {
        if !self.enabled {
            return None;
        }
        Some(match self.last_emit_ms {
            None => 0,
            Some(t) => self.interval_ms.saturating_sub(now_ms.saturating_sub(t)),
        })
    }
}
