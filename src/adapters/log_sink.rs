//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A cloud uploader would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | t={}ms | pH={:.2} | EC={:.2} | water={:.1}\u{00b0}C {} | \
                     air={:.1}\u{00b0}C {:.0}% | CO2={:.0}ppm | light={:.0}lx | \
                     pump={} up={} down={} | {:?}",
                    t.timestamp,
                    t.ph_level,
                    t.ec_level,
                    t.water_temp,
                    if t.water_level { "OK" } else { "LOW" },
                    t.env_temp,
                    t.humidity,
                    t.co2_level,
                    t.light_level,
                    if t.pump_on { "ON" } else { "OFF" },
                    if t.ph_up_active { "ON" } else { "OFF" },
                    if t.ph_down_active { "ON" } else { "OFF" },
                    t.health,
                );
            }
            AppEvent::PumpSwitched { on, manual } => {
                info!(
                    "PUMP | {} ({})",
                    if *on { "ON" } else { "OFF" },
                    if *manual { "manual" } else { "auto" }
                );
            }
            AppEvent::DosingChanged { direction, active } => {
                info!(
                    "DOSE | {} {}",
                    direction.label(),
                    if *active { "started" } else { "stopped" }
                );
            }
            AppEvent::HealthChanged { from, to } => {
                info!("HEALTH | {} -> {}", from.label(), to.label());
            }
            AppEvent::PhSensorFault(ph) => {
                warn!("DOSE | pH sensor fault (reading {:.2}), dosing paused", ph);
            }
            AppEvent::PhSensorRecovered(ph) => {
                info!("DOSE | pH sensor recovered ({:.2})", ph);
            }
            AppEvent::ConfigRejected(reason) => {
                warn!("CONFIG | rejected: {}", reason);
            }
            AppEvent::Started { pump_auto, ph_auto } => {
                info!("START | pump_auto={} ph_auto={}", pump_auto, ph_auto);
            }
        }
    }
}
