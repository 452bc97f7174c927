//! Circulation pump driver (relay + LEDC PWM).
//!
//! The relay switches mains to the pump; the LEDC output sets duty on
//! boards fitted with a MOSFET stage.  Level 0 releases both.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real PWM and GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Stopped,
    Running { duty: u8 },
}

pub struct PumpDriver {
    state: PumpState,
}

impl Default for PumpDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PumpDriver {
    pub fn new() -> Self {
        Self {
            state: PumpState::Stopped,
        }
    }

    /// Apply an output level (0 = off, 1–100 = duty %).
    pub fn set_level(&mut self, level: u8) {
        let duty = level.min(100);
        if duty == 0 {
            self.stop();
            return;
        }
        hw_init::gpio_write(pins::PUMP_GPIO, true);
        Self::set_duty_hw(duty);
        self.state = PumpState::Running { duty };
    }

    pub fn stop(&mut self) {
        Self::set_duty_hw(0);
        hw_init::gpio_write(pins::PUMP_GPIO, false);
        self.state = PumpState::Stopped;
    }

    fn set_duty_hw(duty: u8) {
        let duty_8bit = (u16::from(duty) * 255 / 100) as u8;
        hw_init::ledc_set(hw_init::LEDC_CH_PUMP, duty_8bit);
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.state, PumpState::Stopped)
    }
}
