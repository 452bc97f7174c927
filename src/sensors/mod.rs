//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns the directly-wired sensors (pH probe, float switch) and
//! samples the bus-sensor cache, producing one [`SensorSnapshot`] per
//! control tick.

pub mod bus;
pub mod ph;
pub mod water_level;

use crate::app::snapshot::SensorSnapshot;
use bus::BusSensor;
use ph::PhProbe;
use water_level::WaterLevelSensor;

/// Aggregates all sensors and produces a unified snapshot.
pub struct SensorHub {
    pub ph: PhProbe,
    pub water_level: WaterLevelSensor,
}

impl SensorHub {
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(ph: PhProbe, water_level: WaterLevelSensor) -> Self {
        Self { ph, water_level }
    }

    /// Read every sensor and return a unified snapshot.  The pH field is
    /// the moving-average output.
    pub fn read_all(&mut self) -> SensorSnapshot {
        let ph = self.ph.read();
        SensorSnapshot {
            water_level_ok: self.water_level.read(),
            co2_ppm: bus::latest(BusSensor::Co2Ppm),
            ph_filtered: ph.filtered,
            water_temp_c: bus::latest(BusSensor::WaterTempC),
            air_temp_c: bus::latest(BusSensor::AirTempC),
            humidity_pct: bus::latest(BusSensor::HumidityPct),
            light_lux: bus::latest(BusSensor::LightLux),
            ec_level: bus::latest(BusSensor::EcLevel),
        }
    }
}
