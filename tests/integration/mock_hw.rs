//! Mock hardware adapter for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO/PWM registers.  Sensor readings are
//! whatever the test last put into `snapshot`.

use std::cell::Cell;

use hydrotower::app::events::AppEvent;
use hydrotower::app::ports::{ActuatorPort, ClockPort, EventSink, SensorPort};
use hydrotower::app::snapshot::SensorSnapshot;
use hydrotower::control::ph_dosing::DoseDirection;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    PumpOutput(u8),
    Dosing { direction: DoseDirection, on: bool },
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    pub snapshot: SensorSnapshot,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            snapshot: healthy_snapshot(),
        }
    }

    pub fn last_call(&self) -> Option<&ActuatorCall> {
        self.calls.last()
    }

    /// Current pump output level as the hardware would see it.
    pub fn pump_level(&self) -> u8 {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::PumpOutput(level) => Some(*level),
                ActuatorCall::AllOff => Some(0),
                ActuatorCall::Dosing { .. } => None,
            })
            .unwrap_or(0)
    }

    pub fn dosing_on(&self, direction: DoseDirection) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Dosing { direction: d, on } if *d == direction => Some(*on),
                ActuatorCall::AllOff => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Replay the call history; true if both dosing outputs were ever
    /// energised at the same moment.
    pub fn dosing_overlap_seen(&self) -> bool {
        let (mut raise, mut lower) = (false, false);
        for call in &self.calls {
            match *call {
                ActuatorCall::Dosing { direction: DoseDirection::Raise, on } => raise = on,
                ActuatorCall::Dosing { direction: DoseDirection::Lower, on } => lower = on,
                ActuatorCall::AllOff => (raise, lower) = (false, false),
                ActuatorCall::PumpOutput(_) => {}
            }
            if raise && lower {
                return true;
            }
        }
        false
    }

    pub fn set_ph(&mut self, ph: f32) {
        self.snapshot.ph_filtered = ph;
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockHardware {
    fn set_pump_output(&mut self, level: u8) {
        self.calls.push(ActuatorCall::PumpOutput(level));
    }

    fn set_dosing_pin(&mut self, direction: DoseDirection, on: bool) {
        self.calls.push(ActuatorCall::Dosing { direction, on });
    }

    fn all_off(&mut self) {
        self.calls.push(ActuatorCall::AllOff);
    }
}

impl SensorPort for MockHardware {
    fn read_all(&mut self) -> SensorSnapshot {
        self.snapshot
    }
}

/// Every reading inside its good band, pH on the default target.
pub fn healthy_snapshot() -> SensorSnapshot {
    SensorSnapshot {
        water_level_ok: true,
        co2_ppm: 800.0,
        ph_filtered: 6.0,
        water_temp_c: 20.0,
        air_temp_c: 22.0,
        humidity_pct: 60.0,
        light_lux: 12_000.0,
        ec_level: 1.5,
    }
}

// ── ManualClock ───────────────────────────────────────────────

#[allow(dead_code)]
pub struct ManualClock {
    now: Cell<u64>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) -> u64 {
        self.now.set(self.now.get() + ms);
        self.now.get()
    }
}

impl ClockPort for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
