//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (HTTP API,
//! serial console) that the [`AppService`](super::service::AppService)
//! interprets and acts upon between control ticks.

use crate::control::ph_dosing::DoseDirection;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Force the circulation pump on or off (leaves auto mode).
    SetPump(bool),

    /// Flip the circulation pump (leaves auto mode).
    TogglePump,

    /// Enable or disable automatic pump cycling.
    SetPumpAutoMode(bool),

    /// New ON/OFF phase lengths in minutes, as entered by the operator.
    SetPumpTiming { on_minutes: i64, off_minutes: i64 },

    /// Manual toggle of one dosing pump.
    TogglePhDose(DoseDirection),

    /// Stop both dosing pumps and switch pH control to manual.
    StopDosing,

    /// Enable or disable automatic pH dosing.
    SetPhAutoMode(bool),

    /// New pH setpoint.
    SetPhTarget { target: f32, tolerance: f32 },

    /// Pause or resume periodic telemetry records.
    SetTelemetryEnabled(bool),

    /// Emit a telemetry record now, outside the schedule.
    TriggerTelemetry,
}
