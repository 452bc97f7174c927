//! WiFi station-mode adapter.
//!
//! Brings the network up for the dashboard HTTP server.  Credentials are
//! baked in at build time from `HYDROTOWER_WIFI_SSID` /
//! `HYDROTOWER_WIFI_PASS`.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: credential validation and the reconnect policy only.
//!
//! ## Reconnection policy
//!
//! On disconnect the adapter waits an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s) before retrying.  The control loop keeps running
//! offline; only the API is unreachable.

use core::fmt;

#[cfg(target_os = "espidf")]
use log::{info, warn};

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
        }
    }
}

impl std::error::Error for ConnectivityError {}

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        if ssid.is_empty() || !is_printable_ascii(ssid) {
            return Err(ConnectivityError::InvalidSsid);
        }
        if !password.is_empty() && password.len() < 8 {
            return Err(ConnectivityError::InvalidPassword);
        }
        let mut s = heapless::String::new();
        s.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        let mut p = heapless::String::new();
        p.push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        Ok(Self {
            ssid: s,
            password: p,
        })
    }

    /// Credentials compiled into the image, if any.
    pub fn from_build_env() -> Result<Self, ConnectivityError> {
        let ssid = option_env!("HYDROTOWER_WIFI_SSID").ok_or(ConnectivityError::NoCredentials)?;
        Self::new(ssid, option_env!("HYDROTOWER_WIFI_PASS").unwrap_or(""))
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Reconnect backoff
// ───────────────────────────────────────────────────────────────

const INITIAL_BACKOFF_MS: u64 = 2_000;
const MAX_BACKOFF_MS: u64 = 60_000;

/// Exponential retry schedule for a lost link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    delay_ms: u64,
    next_attempt_ms: Option<u64>,
    attempt: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

impl Backoff {
    pub const fn new() -> Self {
        Self {
            delay_ms: INITIAL_BACKOFF_MS,
            next_attempt_ms: None,
            attempt: 0,
        }
    }

    /// Whether a reconnect attempt is due.  The first call after a
    /// disconnect schedules the attempt and returns `false`.
    pub fn should_retry(&mut self, now_ms: u64) -> bool {
        match self.next_attempt_ms {
            None => {
                self.next_attempt_ms = Some(now_ms + self.delay_ms);
                false
            }
            Some(at) if now_ms >= at => {
                self.attempt += 1;
                self.delay_ms = (self.delay_ms * 2).min(MAX_BACKOFF_MS);
                self.next_attempt_ms = Some(now_ms + self.delay_ms);
                true
            }
            Some(_) => false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF station
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use station::WifiStation;

#[cfg(target_os = "espidf")]
mod station {
    use super::*;

    use anyhow::anyhow;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::modem::Modem;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

    pub struct WifiStation {
        wifi: BlockingWifi<EspWifi<'static>>,
        backoff: Backoff,
    }

    impl WifiStation {
        /// Start the driver and block until the station has an IP address.
        pub fn connect(
            modem: Modem,
            sysloop: EspSystemEventLoop,
            nvs: Option<EspDefaultNvsPartition>,
            creds: &WifiCredentials,
        ) -> anyhow::Result<Self> {
            let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), nvs)?, sysloop)?;
            wifi.set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: creds
                    .ssid
                    .as_str()
                    .try_into()
                    .map_err(|_| anyhow!(ConnectivityError::InvalidSsid))?,
                password: creds
                    .password
                    .as_str()
                    .try_into()
                    .map_err(|_| anyhow!(ConnectivityError::InvalidPassword))?,
                auth_method: if creds.is_open() {
                    AuthMethod::None
                } else {
                    AuthMethod::WPA2Personal
                },
                ..Default::default()
            }))?;

            info!("WiFi: connecting to '{}'", creds.ssid);
            wifi.start()?;
            wifi.connect()?;
            wifi.wait_netif_up()?;
            let ip = wifi.wifi().sta_netif().get_ip_info()?;
            info!("WiFi: connected, dashboard at http://{}/", ip.ip);

            Ok(Self {
                wifi,
                backoff: Backoff::new(),
            })
        }

        pub fn is_connected(&self) -> bool {
            self.wifi.is_connected().unwrap_or(false)
        }

        /// Reconnect with backoff if the link dropped.  Call from the main loop.
        pub fn poll(&mut self, now_ms: u64) {
            if self.is_connected() {
                if self.backoff.attempt() > 0 {
                    info!("WiFi: reconnected");
                }
                self.backoff.reset();
                return;
            }
            if !self.backoff.should_retry(now_ms) {
                return;
            }
            warn!(
                "WiFi: link down, reconnect attempt {} (next backoff {}ms)",
                self.backoff.attempt(),
                self.backoff.delay_ms()
            );
            if let Err(e) = self.wifi.connect() {
                warn!("WiFi: reconnect failed: {}", e);
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
