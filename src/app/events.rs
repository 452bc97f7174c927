//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, queue for upload,
//! push to a dashboard, etc.

use serde::Serialize;

use crate::control::ph_dosing::DoseDirection;
use crate::status::Band;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The circulation pump switched.
    PumpSwitched { on: bool, manual: bool },

    /// A dosing pump was energised or released.
    DosingChanged { direction: DoseDirection, active: bool },

    /// Worst-case health band moved.
    HealthChanged { from: Band, to: Band },

    /// Filtered pH left the plausible range; dosing evaluation is paused.
    PhSensorFault(f32),

    /// Filtered pH is plausible again.
    PhSensorRecovered(f32),

    /// A configuration write was refused; carries the reason.
    ConfigRejected(&'static str),

    /// The application service has started.
    Started { pump_auto: bool, ph_auto: bool },
}

/// A point-in-time telemetry record, shaped like the cloud upload row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryData {
    /// Milliseconds since boot.
    pub timestamp: u64,
    pub co2_level: f32,
    pub ph_level: f32,
    pub water_temp: f32,
    pub env_temp: f32,
    pub humidity: f32,
    pub light_level: f32,
    pub ec_level: f32,
    pub water_level: bool,
    pub pump_on: bool,
    pub ph_up_active: bool,
    pub ph_down_active: bool,
    pub health: Band,
}
