//! Latest readings from the bus-attached sensors.
//!
//! The CO2 (UART), DHT22, BH1750 (I²C), DS18B20 (one-wire) and EC drivers
//! run outside the control core.  Each publishes its most recent value
//! here; the hub samples all of them once per tick.  Values are stored as
//! `f32` bit patterns in atomics so a publisher never blocks the loop.  A
//! failed bus read is published as NaN and classifies as critical.

use core::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusSensor {
    Co2Ppm,
    AirTempC,
    HumidityPct,
    LightLux,
    WaterTempC,
    EcLevel,
}

impl BusSensor {
    const COUNT: usize = 6;

    fn slot(self) -> &'static AtomicU32 {
        &READINGS[self as usize]
    }
}

static READINGS: [AtomicU32; BusSensor::COUNT] = [const { AtomicU32::new(0) }; BusSensor::COUNT];

/// Store the newest value for `sensor`.  Lock-free.
pub fn publish(sensor: BusSensor, value: f32) {
    sensor.slot().store(value.to_bits(), Ordering::Release);
}

/// Most recently published value (0.0 before the first publish).
pub fn latest(sensor: BusSensor) -> f32 {
    f32::from_bits(sensor.slot().load(Ordering::Acquire))
}

/// Host-side injection for simulation and tests.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set(sensor: BusSensor, value: f32) {
    publish(sensor, value);
}
