//! Hydrotower firmware: main entry point.
//!
//! Hexagonal architecture around one cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   Esp32TimeAdapter             │
//! │  (Sensor+Actuator) (EventSink)    (ClockPort)                  │
//! │  WifiStation       HTTP server ──▶ REQUEST_CHANNEL             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  PumpCycle · PhDoser · Status · Telemetry              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::{anyhow, Result};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};

use hydrotower::adapters::hardware::HardwareAdapter;
use hydrotower::adapters::http;
use hydrotower::adapters::log_sink::LogEventSink;
use hydrotower::adapters::time::Esp32TimeAdapter;
use hydrotower::adapters::wifi::{WifiCredentials, WifiStation};
use hydrotower::api::channels;
use hydrotower::api::router::ApiRouter;
use hydrotower::app::ports::ClockPort;
use hydrotower::app::service::AppService;
use hydrotower::config::SystemConfig;
use hydrotower::drivers::dosing::DosingDriver;
use hydrotower::drivers::hw_init;
use hydrotower::drivers::pump::PumpDriver;
use hydrotower::pins;
use hydrotower::sensors::ph::PhProbe;
use hydrotower::sensors::water_level::WaterLevelSensor;
use hydrotower::sensors::SensorHub;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Hydrotower v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Outputs may be floating; refuse to run the loop.
        error!("HAL init failed: {}", e);
        return Err(e.into());
    }

    let config = SystemConfig::default();
    config
        .validate()
        .map_err(|e| anyhow!("default config invalid: {}", e))?;

    // ── 3. Network (optional) ─────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take().ok();

    let mut wifi = match WifiCredentials::from_build_env() {
        Ok(creds) => match WifiStation::connect(peripherals.modem, sysloop, nvs, &creds) {
            Ok(w) => Some(w),
            Err(e) => {
                warn!("WiFi unavailable ({}), running offline", e);
                None
            }
        },
        Err(e) => {
            warn!("WiFi disabled: {}", e);
            None
        }
    };
    let _server = if wifi.is_some() {
        Some(http::start()?)
    } else {
        None
    };

    // ── 4. Adapters + service ─────────────────────────────────
    let sensor_hub = SensorHub::new(
        PhProbe::new(hw_init::ADC1_CH_PH),
        WaterLevelSensor::new(pins::WATER_LEVEL_GPIO),
    );
    let mut hw = HardwareAdapter::new(sensor_hub, PumpDriver::new(), DosingDriver::new());
    let mut log_sink = LogEventSink::new();
    let clock = Esp32TimeAdapter::new();

    let mut app = AppService::new(config.clone(), clock.now_ms());
    app.start(&mut hw, &mut log_sink);
    let mut router = ApiRouter::new();

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    let tick_ms = u64::from(config.control_loop_interval_ms);
    let poll = Duration::from_millis(u64::from(config.request_poll_interval_ms));
    let mut last_tick: Option<u64> = None;

    loop {
        let now = clock.now_ms();

        while let Some(req) = channels::try_recv_request() {
            let resp = router.handle(&req, &mut app, now, &mut hw, &mut log_sink);
            channels::send_response(resp);
        }

        if last_tick.is_none_or(|t| now.saturating_sub(t) >= tick_ms) {
            app.tick(now, &mut hw, &mut log_sink);
            last_tick = Some(now);
        }

        app.poll_telemetry(now, &mut log_sink);

        if let Some(w) = wifi.as_mut() {
            w.poll(now);
        }

        std::thread::sleep(poll);
    }
}
