//! System configuration parameters
//!
//! All tunable parameters for the hydroponic tower controller.
//! There is no persistent store: every boot starts from [`SystemConfig::default()`]
//! and runtime changes arrive through the request API.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Circulation pump duty-cycle configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PumpConfig {
    /// Length of the ON phase in milliseconds.
    pub on_duration_ms: u32,
    /// Length of the OFF phase in milliseconds.
    pub off_duration_ms: u32,
    /// Automatic cycling enabled.
    pub auto_mode: bool,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            on_duration_ms: 60_000,
            off_duration_ms: 60_000,
            auto_mode: true,
        }
    }
}

/// pH dosing setpoint configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhConfig {
    pub target_ph: f32,
    /// Allowed deviation either side of the target before dosing.
    pub tolerance: f32,
    pub auto_mode: bool,
}

impl Default for PhConfig {
    fn default() -> Self {
        Self {
            target_ph: 6.0,
            tolerance: 0.5,
            auto_mode: true,
        }
    }
}

impl PhConfig {
    pub const TARGET_MIN: f32 = 5.0;
    pub const TARGET_MAX: f32 = 8.0;
    pub const TOLERANCE_MIN: f32 = 0.1;
    pub const TOLERANCE_MAX: f32 = 1.0;

    /// Range-check a target / tolerance pair.
    pub fn check_setpoint(target: f32, tolerance: f32) -> Result<(), ConfigError> {
        if !(Self::TARGET_MIN..=Self::TARGET_MAX).contains(&target) {
            return Err(ConfigError::ValidationFailed("target_ph must be 5.0–8.0"));
        }
        if !(Self::TOLERANCE_MIN..=Self::TOLERANCE_MAX).contains(&tolerance) {
            return Err(ConfigError::ValidationFailed("tolerance must be 0.1–1.0"));
        }
        Ok(())
    }
}

/// Inclusive `(min, max)` range.
pub type Range = (f32, f32);

/// Good / caution / warning ranges for one analog sensor.
/// Anything outside `warning` is critical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorBands {
    pub good: Range,
    pub caution: Range,
    pub warning: Range,
}

impl SensorBands {
    pub const fn new(good: Range, caution: Range, warning: Range) -> Self {
        Self {
            good,
            caution,
            warning,
        }
    }

    /// Each band must contain the one inside it.
    fn is_nested(&self) -> bool {
        let within = |inner: Range, outer: Range| {
            inner.0 <= inner.1 && outer.0 <= inner.0 && inner.1 <= outer.1
        };
        within(self.good, self.caution) && within(self.caution, self.warning)
    }
}

/// Band tables for every analog sensor in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusBands {
    pub water_temp_c: SensorBands,
    pub ph: SensorBands,
    pub air_temp_c: SensorBands,
    pub humidity_pct: SensorBands,
    pub light_lux: SensorBands,
    pub co2_ppm: SensorBands,
    pub ec_level: SensorBands,
}

impl Default for StatusBands {
    fn default() -> Self {
        Self {
            water_temp_c: SensorBands::new((18.0, 22.0), (15.0, 25.0), (12.0, 28.0)),
            ph: SensorBands::new((5.5, 6.5), (5.0, 7.0), (4.0, 8.0)),
            air_temp_c: SensorBands::new((15.0, 25.0), (13.0, 30.0), (10.0, 33.0)),
            humidity_pct: SensorBands::new((50.0, 70.0), (35.0, 85.0), (25.0, 95.0)),
            light_lux: SensorBands::new((10.0, 40_000.0), (5.0, 50_000.0), (2.0, 90_000.0)),
            co2_ppm: SensorBands::new((400.0, 1500.0), (200.0, 1800.0), (100.0, 2200.0)),
            ec_level: SensorBands::new((1.2, 2.0), (0.8, 2.5), (0.5, 3.0)),
        }
    }
}

impl StatusBands {
    fn all(&self) -> [&SensorBands; 7] {
        [
            &self.water_temp_c,
            &self.ph,
            &self.air_temp_c,
            &self.humidity_pct,
            &self.light_lux,
            &self.co2_ppm,
            &self.ec_level,
        ]
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Circulation pump ---
    pub pump: PumpConfig,
    /// PWM duty applied while the pump is on (actuator capability, 1-100%).
    pub pump_duty_percent: u8,

    // --- pH dosing ---
    pub ph: PhConfig,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// How often the loop drains pending API requests between ticks (milliseconds)
    pub request_poll_interval_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,

    // --- Status reporting ---
    pub bands: StatusBands,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            pump: PumpConfig::default(),
            pump_duty_percent: 100,

            ph: PhConfig::default(),

            control_loop_interval_ms: 1000, // 1 Hz
            request_poll_interval_ms: 50,
            telemetry_interval_secs: 300, // every 5 minutes

            bands: StatusBands::default(),
        }
    }
}

impl SystemConfig {
    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pump.on_duration_ms == 0 || self.pump.off_duration_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "pump on/off durations must be > 0",
            ));
        }
        if !(1..=100).contains(&self.pump_duty_percent) {
            return Err(ConfigError::ValidationFailed(
                "pump_duty_percent must be 1–100",
            ));
        }
        PhConfig::check_setpoint(self.ph.target_ph, self.ph.tolerance)?;
        if !(100..=5000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 100–5000",
            ));
        }
        if self.request_poll_interval_ms == 0
            || self.request_poll_interval_ms > self.control_loop_interval_ms
        {
            return Err(ConfigError::ValidationFailed(
                "request_poll_interval_ms must be 1..=control_loop_interval_ms",
            ));
        }
        if !(5..=3600).contains(&self.telemetry_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "telemetry_interval_secs must be 5–3600",
            ));
        }
        if !self.bands.all().iter().all(|b| b.is_nested()) {
            return Err(ConfigError::ValidationFailed(
                "status bands must nest good ⊆ caution ⊆ warning",
            ));
        }
        Ok(())
    }
}
