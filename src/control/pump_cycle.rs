//! Circulation pump duty-cycle controller.
//!
//! In auto mode the pump alternates between an ON phase and an OFF phase
//! of configurable length.  A manual command pins the output and suspends
//! cycling until auto mode is explicitly re-enabled.
//!
//! The output is binary: a fixed duty (an actuator capability, not a
//! control variable) while on, zero while off.

use log::info;

use crate::app::ports::ConfigError;
use crate::config::PumpConfig;

use super::elapsed_ms;

#[derive(Debug, Clone)]
pub struct PumpCycle {
    config: PumpConfig,
    duty_percent: u8,
    is_on: bool,
    last_transition_at_ms: u64,
}

impl PumpCycle {
    /// Pump starts OFF with the first phase beginning at `now_ms`.
    pub fn new(config: PumpConfig, duty_percent: u8, now_ms: u64) -> Self {
        Self {
            config,
            duty_percent: duty_percent.clamp(1, 100),
            is_on: false,
            last_transition_at_ms: now_ms,
        }
    }

    /// Advance the auto cycle.  Returns the new on/off state when the pump
    /// switched this tick (in either direction), `None` otherwise.
    pub fn tick(&mut self, now_ms: u64) -> Option<bool> {
        if !self.config.auto_mode {
            return None;
        }
        let elapsed = elapsed_ms(now_ms, self.last_transition_at_ms);
        let phase = u64::from(self.phase_duration_ms());
        if elapsed < phase {
            return None;
        }
        self.is_on = !self.is_on;
        self.last_transition_at_ms = now_ms;
        info!(
            "Pump auto: {} after {}ms",
            if self.is_on { "ON" } else { "OFF" },
            elapsed
        );
        Some(self.is_on)
    }

    /// Force the pump on or off and leave auto mode.
    pub fn set_manual(&mut self, on: bool, now_ms: u64) {
        self.is_on = on;
        self.config.auto_mode = false;
        self.last_transition_at_ms = now_ms;
        info!("Pump manual: {}", if on { "ON" } else { "OFF" });
    }

    /// Manual toggle of the current output.
    pub fn toggle(&mut self, now_ms: u64) -> bool {
        self.set_manual(!self.is_on, now_ms);
        self.is_on
    }

    /// Enabling restarts the current phase from `now_ms`; disabling keeps
    /// the present output.
    pub fn set_auto_mode(&mut self, enabled: bool, now_ms: u64) {
        self.config.auto_mode = enabled;
        if enabled {
            self.last_transition_at_ms = now_ms;
        }
        info!("Pump auto mode {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Replace the phase durations.  The running phase keeps its start
    /// time, so a shorter duration can expire on the next tick.
    pub fn set_timing(&mut self, on_ms: u32, off_ms: u32) -> Result<(), ConfigError> {
        if on_ms == 0 || off_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "pump on/off durations must be > 0",
            ));
        }
        self.config.on_duration_ms = on_ms;
        self.config.off_duration_ms = off_ms;
        info!("Pump timing: on={}ms off={}ms", on_ms, off_ms);
        Ok(())
    }

    /// Milliseconds left in the current auto phase, 0 outside auto mode.
    pub fn cycle_time_remaining(&self, now_ms: u64) -> u32 {
        if !self.config.auto_mode {
            return 0;
        }
        let elapsed = elapsed_ms(now_ms, self.last_transition_at_ms);
        u64::from(self.phase_duration_ms()).saturating_sub(elapsed) as u32
    }

    /// Output level for the actuator: the configured duty while on.
    pub fn output_level(&self) -> u8 {
        if self.is_on { self.duty_percent } else { 0 }
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn is_auto(&self) -> bool {
        self.config.auto_mode
    }

    pub fn config(&self) -> &PumpConfig {
        &self.config
    }

    pub fn last_transition_at_ms(&self) -> u64 {
        self.last_transition_at_ms
    }

    fn phase_duration_ms(&self) -> u32 {
        if self.is_on {
            self.config.on_duration_ms
        } else {
            self.config.off_duration_ms
        }
    }
}
