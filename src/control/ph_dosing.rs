//! pH dosing controller.
//!
//! Two peristaltic dosing pumps, one raising and one lowering pH, pulse
//! reagent into the reservoir to keep the filtered pH inside
//! `target ± tolerance`.
//!
//! ## Per-direction state machine
//!
//! ```text
//!            auto, out of band, other idle, cooldown over
//!   Idle ──────────────────────────────────────────────▶ Active
//!    ▲                                                     │
//!    │   cooldown elapsed        on-time / manual stop     │
//!    └──────────────── Cooldown ◀──────────────────────────┘
//! ```
//!
//! `Cooldown` is not stored: it is derived from `last_deactivated_at_ms`.
//! At most one direction is ever active; every path that activates one
//! first releases the other.

use log::{info, warn};
use serde::Serialize;

use crate::app::ports::ConfigError;
use crate::app::snapshot::check_ph;
use crate::config::PhConfig;

use super::elapsed_ms;

/// Margin beyond which a pH error is acted on even if the tolerance is
/// configured tighter.
pub const PH_DEADBAND: f32 = 0.2;
/// How long a dosing pump runs per activation.
pub const DOSE_ON_MS: u64 = 2_000;
/// Minimum rest after a dose before the same pump may fire again.
pub const DOSE_COOLDOWN_MS: u64 = 60_000;

// ───────────────────────────────────────────────────────────────
// Direction / per-pump state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DoseDirection {
    /// pH Up reagent.
    Raise,
    /// pH Down reagent.
    Lower,
}

impl DoseDirection {
    pub const ALL: [Self; 2] = [Self::Raise, Self::Lower];

    pub fn opposite(self) -> Self {
        match self {
            Self::Raise => Self::Lower,
            Self::Lower => Self::Raise,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Raise => "pH Up",
            Self::Lower => "pH Down",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoseState {
    Idle,
    Active,
    Cooldown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoseChannel {
    pub is_active: bool,
    pub activated_at_ms: u64,
    /// `None` until the first deactivation, so there is no boot cooldown.
    pub last_deactivated_at_ms: Option<u64>,
}

impl DoseChannel {
    pub fn state(&self, now_ms: u64) -> DoseState {
        if self.is_active {
            DoseState::Active
        } else if self.cooling_down(now_ms) {
            DoseState::Cooldown
        } else {
            DoseState::Idle
        }
    }

    fn cooling_down(&self, now_ms: u64) -> bool {
        self.last_deactivated_at_ms
            .is_some_and(|t| elapsed_ms(now_ms, t) < DOSE_COOLDOWN_MS)
    }

    fn activate(&mut self, now_ms: u64) {
        self.is_active = true;
        self.activated_at_ms = now_ms;
    }

    /// Returns whether the channel was running.
    fn deactivate(&mut self, now_ms: u64) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_active = false;
        self.last_deactivated_at_ms = Some(now_ms);
        true
    }
}

/// An output edge the actuator layer must apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoseChange {
    pub direction: DoseDirection,
    pub active: bool,
}

/// Output edges from one operation.  Deactivations always precede
/// activations.
pub type DoseChanges = heapless::Vec<DoseChange, 4>;

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PhDoser {
    config: PhConfig,
    raise: DoseChannel,
    lower: DoseChannel,
    last_ph: Option<f32>,
    sensor_fault: bool,
}

impl PhDoser {
    pub fn new(config: PhConfig) -> Self {
        Self {
            config,
            raise: DoseChannel::default(),
            lower: DoseChannel::default(),
            last_ph: None,
            sensor_fault: false,
        }
    }

    /// One control step against the filtered pH.
    ///
    /// Expired doses are released first.  An implausible reading is a
    /// sensor fault: nothing is activated on this tick.
    pub fn tick(&mut self, now_ms: u64, measured_ph: f32) -> DoseChanges {
        let mut changes = DoseChanges::new();
        for dir in DoseDirection::ALL {
            let ch = self.channel_mut(dir);
            if ch.is_active && elapsed_ms(now_ms, ch.activated_at_ms) >= DOSE_ON_MS {
                ch.deactivate(now_ms);
                info!("{} dose complete", dir.label());
                push(&mut changes, dir, false);
            }
        }

        match check_ph(measured_ph) {
            Ok(ph) => {
                if self.sensor_fault {
                    info!("pH reading recovered: {:.2}", ph);
                }
                self.sensor_fault = false;
                self.last_ph = Some(ph);
            }
            Err(e) => {
                if !self.sensor_fault {
                    warn!("pH sensor fault ({}): {:.2}", e, measured_ph);
                }
                self.sensor_fault = true;
                return changes;
            }
        }

        if self.config.auto_mode {
            self.evaluate(now_ms, measured_ph, &mut changes);
        }
        changes
    }

    /// Manual toggle of one pump.  Leaves auto mode for the whole pH
    /// subsystem and ignores cooldown.
    pub fn toggle_manual(&mut self, direction: DoseDirection, now_ms: u64) -> DoseChanges {
        let mut changes = DoseChanges::new();
        if self.config.auto_mode {
            self.config.auto_mode = false;
            info!("pH auto mode disabled by manual {}", direction.label());
        }

        if self.channel(direction).is_active {
            self.channel_mut(direction).deactivate(now_ms);
            push(&mut changes, direction, false);
        } else {
            let other = direction.opposite();
            if self.channel_mut(other).deactivate(now_ms) {
                push(&mut changes, other, false);
            }
            self.channel_mut(direction).activate(now_ms);
            push(&mut changes, direction, true);
        }
        info!(
            "{} manual {}",
            direction.label(),
            if self.channel(direction).is_active { "ON" } else { "OFF" }
        );
        changes
    }

    /// Release both pumps and switch to manual mode.
    pub fn stop_all(&mut self, now_ms: u64) -> DoseChanges {
        self.config.auto_mode = false;
        let changes = self.release_all(now_ms);
        info!("pH dosing stopped");
        changes
    }

    /// Switching into auto releases the (manual) running pump and
    /// immediately re-evaluates the last good reading; switching out of
    /// auto releases the (automatic) running pump.  Re-asserting the
    /// current mode leaves running pumps alone.
    pub fn set_auto_mode(&mut self, enabled: bool, now_ms: u64) -> DoseChanges {
        let mut changes = if enabled == self.config.auto_mode {
            DoseChanges::new()
        } else {
            self.config.auto_mode = enabled;
            info!("pH auto mode {}", if enabled { "enabled" } else { "disabled" });
            self.release_all(now_ms)
        };
        if enabled && !self.sensor_fault {
            if let Some(ph) = self.last_ph {
                self.evaluate(now_ms, ph, &mut changes);
            }
        }
        changes
    }

    /// Replace target and tolerance.  Pump state is left alone.
    pub fn set_target(&mut self, target: f32, tolerance: f32) -> Result<(), ConfigError> {
        PhConfig::check_setpoint(target, tolerance)?;
        self.config.target_ph = target;
        self.config.tolerance = tolerance;
        info!("pH target {:.2} ± {:.2}", target, tolerance);
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_active(&self, direction: DoseDirection) -> bool {
        self.channel(direction).is_active
    }

    pub fn state(&self, direction: DoseDirection, now_ms: u64) -> DoseState {
        self.channel(direction).state(now_ms)
    }

    pub fn channel(&self, direction: DoseDirection) -> &DoseChannel {
        match direction {
            DoseDirection::Raise => &self.raise,
            DoseDirection::Lower => &self.lower,
        }
    }

    /// The running pump, if any.
    pub fn active_direction(&self) -> Option<DoseDirection> {
        DoseDirection::ALL.into_iter().find(|d| self.is_active(*d))
    }

    pub fn is_auto(&self) -> bool {
        self.config.auto_mode
    }

    pub fn config(&self) -> &PhConfig {
        &self.config
    }

    pub fn sensor_fault(&self) -> bool {
        self.sensor_fault
    }

    /// Last plausible reading seen by `tick`.
    pub fn last_ph(&self) -> Option<f32> {
        self.last_ph
    }

    /// Whether `ph` lies inside `target ± tolerance`.
    pub fn in_band(&self, ph: f32) -> bool {
        (ph - self.config.target_ph).abs() <= self.config.tolerance
    }

    // ── Internal ──────────────────────────────────────────────

    fn channel_mut(&mut self, direction: DoseDirection) -> &mut DoseChannel {
        match direction {
            DoseDirection::Raise => &mut self.raise,
            DoseDirection::Lower => &mut self.lower,
        }
    }

    fn release_all(&mut self, now_ms: u64) -> DoseChanges {
        let mut changes = DoseChanges::new();
        for dir in DoseDirection::ALL {
            if self.channel_mut(dir).deactivate(now_ms) {
                push(&mut changes, dir, false);
            }
        }
        changes
    }

    /// Too high is checked before too low.
    fn evaluate(&mut self, now_ms: u64, ph: f32, changes: &mut DoseChanges) {
        let threshold = self.config.tolerance.max(PH_DEADBAND);
        let error = ph - self.config.target_ph;
        let wanted = if error > threshold {
            Some(DoseDirection::Lower)
        } else if -error > threshold {
            Some(DoseDirection::Raise)
        } else {
            None
        };
        let Some(dir) = wanted else {
            return;
        };

        if self.state(dir.opposite(), now_ms) != DoseState::Idle
            || self.state(dir, now_ms) != DoseState::Idle
        {
            return;
        }
        self.channel_mut(dir).activate(now_ms);
        info!(
            "{} dose started: pH {:.2} vs target {:.2}",
            dir.label(),
            ph,
            self.config.target_ph
        );
        push(changes, dir, true);
    }
}

fn push(changes: &mut DoseChanges, direction: DoseDirection, active: bool) {
    // At most one release per direction plus one activation fits in 4.
    let _ = changes.push(DoseChange { direction, active });
}
