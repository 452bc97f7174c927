//! Hydrotower controller library.
//!
//! Exposes the control core, the request API and the hardware adapters for
//! integration testing and for the firmware binary. All ESP-IDF-specific
//! code is guarded by `#[cfg(target_os = "espidf")]` within each module;
//! on the host the drivers run against in-memory simulation state.

#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod sensors;
pub mod status;
pub mod telemetry;
