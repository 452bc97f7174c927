//! Actuator drivers and one-shot hardware initialisation.

pub mod dosing;
pub mod hw_init;
pub mod pump;
