//! Per-tick sensor snapshot.
//!
//! Filled once per control tick by the [`SensorPort`](super::ports::SensorPort)
//! adapter before any controller runs, then handed to the controllers and
//! the status reporter by reference.

use serde::Serialize;

use crate::error::SensorError;

/// Highest physically meaningful pH.  Readings must also be strictly above
/// zero; a zero reading is a dead probe.
pub const PH_VALID_MAX: f32 = 14.0;

/// A point-in-time snapshot of every sensor in the system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorSnapshot {
    /// Reservoir level switch: true = water present.
    pub water_level_ok: bool,
    /// CO2 concentration (ppm).
    pub co2_ppm: f32,
    /// Moving-average pH (never a raw sample).
    pub ph_filtered: f32,
    /// Nutrient solution temperature (°C).
    pub water_temp_c: f32,
    /// Air temperature (°C).
    pub air_temp_c: f32,
    /// Relative humidity (%).
    pub humidity_pct: f32,
    /// Illuminance (lux).
    pub light_lux: f32,
    /// Electrical conductivity (mS/cm).
    pub ec_level: f32,
}

impl Default for SensorSnapshot {
    /// Neutral readings used before the first tick.
    fn default() -> Self {
        Self {
            water_level_ok: false,
            co2_ppm: 0.0,
            ph_filtered: 0.0,
            water_temp_c: 0.0,
            air_temp_c: 0.0,
            humidity_pct: 0.0,
            light_lux: 0.0,
            ec_level: 0.0,
        }
    }
}

impl SensorSnapshot {
    /// The filtered pH if it is physically plausible.
    pub fn valid_ph(&self) -> Result<f32, SensorError> {
        check_ph(self.ph_filtered)
    }
}

/// Plausibility check for a pH value: `(0, 14]`, NaN rejected.
pub fn check_ph(ph: f32) -> Result<f32, SensorError> {
    if ph > 0.0 && ph <= PH_VALID_MAX {
        Ok(ph)
    } else {
        Err(SensorError::OutOfRange)
    }
}
