//! pH dosing pump outputs.
//!
//! Two digital outputs, one per reagent.  The controller above already
//! guarantees mutual exclusion; this driver enforces it again at the pin
//! level: energising one output always releases the other first.

use log::warn;

use crate::control::ph_dosing::DoseDirection;
use crate::drivers::hw_init;
use crate::pins;

#[derive(Debug, Default)]
pub struct DosingDriver {
    raise_on: bool,
    lower_on: bool,
}

impl DosingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, direction: DoseDirection, on: bool) {
        if on && self.is_on(direction.opposite()) {
            warn!(
                "Dosing interlock: releasing {} before {}",
                direction.opposite().label(),
                direction.label()
            );
            self.write(direction.opposite(), false);
        }
        self.write(direction, on);
    }

    pub fn all_off(&mut self) {
        self.write(DoseDirection::Raise, false);
        self.write(DoseDirection::Lower, false);
    }

    pub fn is_on(&self, direction: DoseDirection) -> bool {
        match direction {
            DoseDirection::Raise => self.raise_on,
            DoseDirection::Lower => self.lower_on,
        }
    }

    fn write(&mut self, direction: DoseDirection, on: bool) {
        let (pin, slot) = match direction {
            DoseDirection::Raise => (pins::PH_UP_GPIO, &mut self.raise_on),
            DoseDirection::Lower => (pins::PH_DOWN_GPIO, &mut self.lower_on),
        };
        hw_init::gpio_write(pin, on);
        *slot = on;
    }
}
