//! Status reporter.
//!
//! Pure functions that turn sensor readings and controller state into a
//! worst-case health band plus the short strings shown on the dashboard
//! and in API responses.  Nothing here mutates state.

use core::fmt::Write as _;

use serde::Serialize;

use crate::app::snapshot::{check_ph, SensorSnapshot};
use crate::config::{SensorBands, StatusBands};
use crate::control::ph_dosing::PhDoser;
use crate::control::pump_cycle::PumpCycle;

/// Health classification, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Band {
    Good,
    Caution,
    Warning,
    Critical,
}

impl Band {
    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "System OK",
            Self::Caution => "Caution",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

/// Overall system health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Health {
    pub band: Band,
    pub text: &'static str,
}

impl Health {
    fn from_band(band: Band) -> Self {
        Self {
            band,
            text: band.label(),
        }
    }
}

/// Classify an analog reading against its band table.  NaN is critical.
pub fn band_for_range(value: f32, bands: &SensorBands) -> Band {
    let inside = |(lo, hi): (f32, f32)| value >= lo && value <= hi;
    if inside(bands.good) {
        Band::Good
    } else if inside(bands.caution) {
        Band::Caution
    } else if inside(bands.warning) {
        Band::Warning
    } else {
        Band::Critical
    }
}

/// Boolean sensors have no intermediate bands.
pub fn band_for_boolean(ok: bool) -> Band {
    if ok { Band::Good } else { Band::Critical }
}

/// Worst band across every sensor in the snapshot.
pub fn assess(snap: &SensorSnapshot, bands: &StatusBands) -> Health {
    let checks: [&dyn Fn() -> Band; 8] = [
        &|| band_for_boolean(snap.water_level_ok),
        &|| band_for_range(snap.water_temp_c, &bands.water_temp_c),
        &|| band_for_range(snap.ph_filtered, &bands.ph),
        &|| band_for_range(snap.air_temp_c, &bands.air_temp_c),
        &|| band_for_range(snap.humidity_pct, &bands.humidity_pct),
        &|| band_for_range(snap.light_lux, &bands.light_lux),
        &|| band_for_range(snap.co2_ppm, &bands.co2_ppm),
        &|| band_for_range(snap.ec_level, &bands.ec_level),
    ];

    let mut worst = Band::Good;
    for check in checks {
        worst = worst.max(check());
        if worst == Band::Critical {
            break;
        }
    }
    Health::from_band(worst)
}

/// Short status text for pump and dosing lines.
pub type StatusText = heapless::String<48>;

/// e.g. `Running (Auto - 42s remaining)`.
pub fn pump_status_text(pump: &PumpCycle, now_ms: u64) -> StatusText {
    let mut s = StatusText::new();
    let _ = s.push_str(if pump.is_on() { "Running" } else { "Stopped" });
    if !pump.is_auto() {
        let _ = s.push_str(" (Manual)");
    } else {
        let remaining = pump.cycle_time_remaining(now_ms);
        if remaining > 0 {
            let _ = write!(s, " (Auto - {}s remaining)", remaining / 1000);
        } else {
            let _ = s.push_str(" (Auto)");
        }
    }
    s
}

/// e.g. `Dosing pH Down (Auto)`, `Within range (Manual)`.
pub fn ph_status_text(doser: &PhDoser, measured_ph: f32) -> StatusText {
    let mut s = StatusText::new();
    match doser.active_direction() {
        Some(dir) => {
            let _ = write!(s, "Dosing {}", dir.label());
        }
        None => {
            let _ = s.push_str(match check_ph(measured_ph) {
                Err(_) => "Sensor fault",
                Ok(ph) if doser.in_band(ph) => "Within range",
                Ok(_) => "Out of range",
            });
        }
    }
    let _ = s.push_str(if doser.is_auto() { " (Auto)" } else { " (Manual)" });
    s
}
