//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and both actuator drivers, exposing them
//! through [`SensorPort`] and [`ActuatorPort`].  This is the only
//! module in the system that touches actual hardware.  On non-espidf
//! targets, the underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::app::snapshot::SensorSnapshot;
use crate::control::ph_dosing::DoseDirection;
use crate::drivers::dosing::DosingDriver;
use crate::drivers::pump::PumpDriver;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    pump: PumpDriver,
    dosing: DosingDriver,
}

impl HardwareAdapter {
    pub fn new(sensor_hub: SensorHub, pump: PumpDriver, dosing: DosingDriver) -> Self {
        Self {
            sensor_hub,
            pump,
            dosing,
        }
    }

    pub fn pump(&self) -> &PumpDriver {
        &self.pump
    }

    pub fn dosing(&self) -> &DosingDriver {
        &self.dosing
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_all(&mut self) -> SensorSnapshot {
        self.sensor_hub.read_all()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_pump_output(&mut self, level: u8) {
        self.pump.set_level(level);
    }

    fn set_dosing_pin(&mut self, direction: DoseDirection, on: bool) {
        self.dosing.set(direction, on);
    }

    fn all_off(&mut self) {
        self.pump.stop();
        self.dosing.all_off();
    }
}
