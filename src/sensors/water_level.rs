//! Reservoir float switch.
//!
//! The switch is read through a voltage divider that inverts it: the GPIO
//! reads LOW when water is present and HIGH when the reservoir is dry.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the real GPIO level via hw_init helpers.
//! On host/test: defaults to water-present.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_WATER_PRESENT: AtomicBool = AtomicBool::new(true);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_water_present(present: bool) {
    SIM_WATER_PRESENT.store(present, Ordering::Relaxed);
}

pub struct WaterLevelSensor {
    _gpio: i32,
    last: bool,
}

impl WaterLevelSensor {
    pub fn new(gpio: i32) -> Self {
        Self {
            _gpio: gpio,
            last: true,
        }
    }

    /// `true` = water present.
    pub fn read(&mut self) -> bool {
        self.last = self.read_gpio();
        self.last
    }

    #[cfg(target_os = "espidf")]
    fn read_gpio(&self) -> bool {
        !crate::drivers::hw_init::gpio_read(crate::pins::WATER_LEVEL_GPIO)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_gpio(&self) -> bool {
        SIM_WATER_PRESENT.load(Ordering::Relaxed)
    }

    pub fn needs_refill(&self) -> bool {
        !self.last
    }
}
