//! End-to-end runs through the real `HardwareAdapter` on its host
//! simulation backends: injected ADC counts and bus readings go in, the
//! control loop decides, driver state comes out.
//!
//! The simulation inputs are process-wide statics, so everything that
//! touches them lives in a single test.

use super::mock_hw::RecordingSink;

use hydrotower::adapters::hardware::HardwareAdapter;
use hydrotower::app::ports::SensorPort;
use hydrotower::app::service::AppService;
use hydrotower::config::SystemConfig;
use hydrotower::control::filter::PH_FILTER_SAMPLES;
use hydrotower::control::ph_dosing::DoseDirection;
use hydrotower::drivers::dosing::DosingDriver;
use hydrotower::drivers::hw_init;
use hydrotower::drivers::pump::PumpDriver;
use hydrotower::pins;
use hydrotower::sensors::bus::{self, BusSensor};
use hydrotower::sensors::ph::{adc_to_ph, sim_set_ph_adc, PhProbe};
use hydrotower::sensors::water_level::{sim_set_water_present, WaterLevelSensor};
use hydrotower::sensors::SensorHub;
use hydrotower::status::Band;

fn adapter() -> HardwareAdapter {
    HardwareAdapter::new(
        SensorHub::new(
            PhProbe::new(hw_init::ADC1_CH_PH),
            WaterLevelSensor::new(pins::WATER_LEVEL_GPIO),
        ),
        PumpDriver::new(),
        DosingDriver::new(),
    )
}

fn publish_healthy_bus() {
    bus::sim_set(BusSensor::Co2Ppm, 750.0);
    bus::sim_set(BusSensor::AirTempC, 21.0);
    bus::sim_set(BusSensor::HumidityPct, 55.0);
    bus::sim_set(BusSensor::LightLux, 20_000.0);
    bus::sim_set(BusSensor::WaterTempC, 19.5);
    bus::sim_set(BusSensor::EcLevel, 1.6);
}

#[test]
fn simulated_probe_drives_dosing_through_filter() {
    publish_healthy_bus();
    sim_set_water_present(true);

    // ≈ pH 6.0, inside the band.
    sim_set_ph_adc(1264);
    let mut hw = adapter();
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(SystemConfig::default(), 0);
    app.start(&mut hw, &mut sink);

    let mut now = 0;
    for _ in 0..PH_FILTER_SAMPLES {
        app.tick(now, &mut hw, &mut sink);
        now += 1_000;
    }
    assert!((app.sensors().ph_filtered - adc_to_ph(1264)).abs() < 1e-3);
    assert_eq!(app.health().band, Band::Good);
    assert!(!hw.dosing().is_on(DoseDirection::Lower));

    // Probe jumps to ≈ pH 7.5; the average needs several samples to
    // cross target + tolerance.
    sim_set_ph_adc(1580);
    app.tick(now, &mut hw, &mut sink);
    assert!(
        !hw.dosing().is_on(DoseDirection::Lower),
        "one outlier must not trigger a dose"
    );
    for _ in 0..PH_FILTER_SAMPLES {
        now += 1_000;
        app.tick(now, &mut hw, &mut sink);
        if hw.dosing().is_on(DoseDirection::Lower) {
            break;
        }
    }
    assert!(hw.dosing().is_on(DoseDirection::Lower));
    assert!(!hw.dosing().is_on(DoseDirection::Raise));

    // Dry reservoir is critical.
    sim_set_water_present(false);
    let snap = hw.read_all();
    assert!(!snap.water_level_ok);
    app.tick(now + 1_000, &mut hw, &mut sink);
    assert_eq!(app.health().band, Band::Critical);
    sim_set_water_present(true);
}
