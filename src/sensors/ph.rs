//! Analog pH probe (DFRobot SEN0161 style amplifier).
//!
//! The amplifier output is read through ADC1, converted to pH with a
//! linear probe curve, and pushed through the moving-average filter.
//! The filtered value is the only pH the control core ever sees.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads its ADC1 channel via the oneshot API (initialised by
//! hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::control::filter::PhFilter;

#[cfg(not(target_os = "espidf"))]
static SIM_PH_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_ph_adc(raw: u16) {
    SIM_PH_ADC.store(raw, Ordering::Relaxed);
}

/// Full-scale ADC count (12-bit).
const ADC_FULL_SCALE: f32 = 4096.0;
/// Reference the probe board is calibrated against (V).
const ADC_REF_VOLTS: f32 = 5.0;
/// pH units per volt of amplifier output.
const PH_PER_VOLT: f32 = 3.5;
/// Probe deviation compensation (pH).
const PH_OFFSET: f32 = 0.6;

#[derive(Debug, Clone, Copy)]
pub struct PhReading {
    pub raw: u16,
    pub ph: f32,
    pub filtered: f32,
}

pub struct PhProbe {
    filter: PhFilter,
    adc_channel: u32,
}

impl PhProbe {
    /// Probe on ADC1 `adc_channel` (see `hw_init::ADC1_CH_PH`).
    pub fn new(adc_channel: u32) -> Self {
        Self {
            filter: PhFilter::new(),
            adc_channel,
        }
    }

    pub fn adc_channel(&self) -> u32 {
        self.adc_channel
    }

    pub fn read(&mut self) -> PhReading {
        let raw = self.read_adc();
        let ph = adc_to_ph(raw);
        let filtered = self.filter.push(ph);
        PhReading { raw, ph, filtered }
    }

    /// Number of samples currently in the filter window.
    pub fn samples(&self) -> usize {
        self.filter.len()
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        crate::drivers::hw_init::adc1_read(self.adc_channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_PH_ADC.load(Ordering::Relaxed)
    }
}

/// Probe curve: `3.5 × volts + offset`.
pub fn adc_to_ph(raw: u16) -> f32 {
    let volts = f32::from(raw) * ADC_REF_VOLTS / ADC_FULL_SCALE;
    PH_PER_VOLT * volts + PH_OFFSET
}
