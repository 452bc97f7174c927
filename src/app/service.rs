//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the pump and dosing controllers, the latest sensor
//! snapshot and the derived health.  All I/O flows through port traits
//! injected at call sites, making the entire service testable with mock
//! adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │       AppService        │
//! ActuatorPort ◀──│  Pump · Dosing · Status │
//!                 └────────────────────────┘
//! ```

use log::{info, warn};

use crate::app::snapshot::SensorSnapshot;
use crate::config::SystemConfig;
use crate::control::ph_dosing::{DoseChanges, DoseDirection, PhDoser};
use crate::control::pump_cycle::PumpCycle;
use crate::status::{self, Band, Health, StatusText};
use crate::telemetry::TelemetrySchedule;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, ConfigError, EventSink, SensorPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    pump: PumpCycle,
    doser: PhDoser,
    sensors: SensorSnapshot,
    health: Health,
    telemetry: TelemetrySchedule,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.  The first pump phase
    /// (OFF) starts at `now_ms`.
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig, now_ms: u64) -> Self {
        let pump = PumpCycle::new(config.pump, config.pump_duty_percent, now_ms);
        let doser = PhDoser::new(config.ph);
        let telemetry = TelemetrySchedule::new(config.telemetry_interval_secs);
        Self {
            config,
            pump,
            doser,
            sensors: SensorSnapshot::default(),
            health: Health {
                band: Band::Good,
                text: Band::Good.label(),
            },
            telemetry,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every actuator to its safe state and announce startup.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.all_off();
        sink.emit(&AppEvent::Started {
            pump_auto: self.pump.is_auto(),
            ph_auto: self.doser.is_auto(),
        });
        info!(
            "AppService started (pump auto={}, pH auto={})",
            self.pump.is_auto(),
            self.doser.is_auto()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: read sensors → pump → dosing → health.
    ///
    /// `hw` implements both [`SensorPort`] and [`ActuatorPort`].
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Snapshot, taken once before any controller runs
        let snap = hw.read_all();
        self.sensors = snap;

        // 2. Circulation pump
        if let Some(on) = self.pump.tick(now_ms) {
            hw.set_pump_output(self.pump.output_level());
            sink.emit(&AppEvent::PumpSwitched { on, manual: false });
        }

        // 3. pH dosing
        let was_fault = self.doser.sensor_fault();
        let changes = self.doser.tick(now_ms, snap.ph_filtered);
        match (was_fault, self.doser.sensor_fault()) {
            (false, true) => sink.emit(&AppEvent::PhSensorFault(snap.ph_filtered)),
            (true, false) => sink.emit(&AppEvent::PhSensorRecovered(snap.ph_filtered)),
            _ => {}
        }
        Self::apply_dosing(&changes, hw, sink);

        // 4. Health
        let health = status::assess(&snap, &self.config.bands);
        if health.band != self.health.band {
            info!("Health: {} -> {}", self.health.text, health.text);
            sink.emit(&AppEvent::HealthChanged {
                from: self.health.band,
                to: health.band,
            });
        }
        self.health = health;
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.  A rejected configuration write leaves
    /// the previous configuration in place and is reported both as the
    /// return value and as [`AppEvent::ConfigRejected`].
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), ConfigError> {
        let result = self.dispatch(cmd, now_ms, hw, sink);
        if let Err(ConfigError::ValidationFailed(reason)) = result {
            warn!("Rejected {:?}: {}", cmd, reason);
            sink.emit(&AppEvent::ConfigRejected(reason));
        }
        result
    }

    fn dispatch(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), ConfigError> {
        match cmd {
            AppCommand::SetPump(on) => {
                self.pump.set_manual(on, now_ms);
                self.drive_pump_manual(hw, sink);
            }
            AppCommand::TogglePump => {
                self.pump.toggle(now_ms);
                self.drive_pump_manual(hw, sink);
            }
            AppCommand::SetPumpAutoMode(enabled) => {
                self.pump.set_auto_mode(enabled, now_ms);
            }
            AppCommand::SetPumpTiming {
                on_minutes,
                off_minutes,
            } => {
                let on_ms = minutes_to_ms(on_minutes)?;
                let off_ms = minutes_to_ms(off_minutes)?;
                self.pump.set_timing(on_ms, off_ms)?;
            }
            AppCommand::TogglePhDose(direction) => {
                let changes = self.doser.toggle_manual(direction, now_ms);
                Self::apply_dosing(&changes, hw, sink);
            }
            AppCommand::StopDosing => {
                let changes = self.doser.stop_all(now_ms);
                Self::apply_dosing(&changes, hw, sink);
            }
            AppCommand::SetPhAutoMode(enabled) => {
                let changes = self.doser.set_auto_mode(enabled, now_ms);
                Self::apply_dosing(&changes, hw, sink);
            }
            AppCommand::SetPhTarget { target, tolerance } => {
                self.doser.set_target(target, tolerance)?;
            }
            AppCommand::SetTelemetryEnabled(enabled) => {
                self.telemetry.set_enabled(enabled);
            }
            AppCommand::TriggerTelemetry => {
                self.emit_telemetry(now_ms, sink);
            }
        }
        Ok(())
    }

    /// Emit a telemetry record if one is due.  Returns whether it did.
    pub fn poll_telemetry(&mut self, now_ms: u64, sink: &mut impl EventSink) -> bool {
        if !self.telemetry.is_due(now_ms) {
            return false;
        }
        self.emit_telemetry(now_ms, sink);
        true
    }

    fn emit_telemetry(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Telemetry(self.build_telemetry(now_ms)));
        self.telemetry.mark_emitted(now_ms);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry record from the latest snapshot and controller state.
    pub fn build_telemetry(&self, now_ms: u64) -> TelemetryData {
        let s = &self.sensors;
        TelemetryData {
            timestamp: now_ms,
            co2_level: s.co2_ppm,
            ph_level: s.ph_filtered,
            water_temp: s.water_temp_c,
            env_temp: s.air_temp_c,
            humidity: s.humidity_pct,
            light_level: s.light_lux,
            ec_level: s.ec_level,
            water_level: s.water_level_ok,
            pump_on: self.pump.is_on(),
            ph_up_active: self.doser.is_active(DoseDirection::Raise),
            ph_down_active: self.doser.is_active(DoseDirection::Lower),
            health: self.health.band,
        }
    }

    pub fn pump(&self) -> &PumpCycle {
        &self.pump
    }

    pub fn doser(&self) -> &PhDoser {
        &self.doser
    }

    /// Snapshot taken on the most recent tick.
    pub fn sensors(&self) -> &SensorSnapshot {
        &self.sensors
    }

    pub fn health(&self) -> Health {
        self.health
    }

    pub fn telemetry(&self) -> &TelemetrySchedule {
        &self.telemetry
    }

    pub fn pump_status_text(&self, now_ms: u64) -> StatusText {
        status::pump_status_text(&self.pump, now_ms)
    }

    pub fn ph_status_text(&self) -> StatusText {
        status::ph_status_text(&self.doser, self.sensors.ph_filtered)
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The live configuration, including runtime pump and pH changes.
    pub fn current_config(&self) -> SystemConfig {
        SystemConfig {
            pump: *self.pump.config(),
            ph: *self.doser.config(),
            ..self.config.clone()
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn drive_pump_manual(&self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.set_pump_output(self.pump.output_level());
        sink.emit(&AppEvent::PumpSwitched {
            on: self.pump.is_on(),
            manual: true,
        });
    }

    /// Releases are listed before activations, so the two dosing outputs
    /// are never energised together.
    fn apply_dosing(changes: &DoseChanges, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        for change in changes {
            hw.set_dosing_pin(change.direction, change.active);
            sink.emit(&AppEvent::DosingChanged {
                direction: change.direction,
                active: change.active,
            });
        }
    }
}

/// Operator minutes to milliseconds; non-positive and overflowing values
/// are rejected.
fn minutes_to_ms(minutes: i64) -> Result<u32, ConfigError> {
    if minutes <= 0 {
        return Err(ConfigError::ValidationFailed(
            "pump timing minutes must be > 0",
        ));
    }
    u32::try_from(minutes)
        .ok()
        .and_then(|m| m.checked_mul(60_000))
        .ok_or(ConfigError::ValidationFailed("pump timing too long"))
}
