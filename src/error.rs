//! Unified error types for the hydrotower firmware.
//!
//! A single `Error` enum that request handling converts into, keeping the
//! boundary layer's error handling uniform.  All variants are `Copy`.
//! Nothing in the control core is fatal: these errors describe rejected
//! requests and implausible readings, never a reason to halt.

use core::fmt;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A configuration write was rejected.
    Config(ConfigError),
    /// A request could not be parsed.
    BadRequest(&'static str),
    /// No route matches the request path.
    NotFound,
    /// The route exists but not for this method.
    MethodNotAllowed,
    /// The mutating-request token bucket is empty.
    RateLimited,
    /// The control loop did not answer in time.
    Unavailable,
}

impl Error {
    /// HTTP status code reported to API clients.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) | Self::BadRequest(_) => 400,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::RateLimited => 429,
            Self::Unavailable => 503,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::BadRequest(msg) => write!(f, "bad request: {msg}"),
            Self::NotFound => write!(f, "not found"),
            Self::MethodNotAllowed => write!(f, "method not allowed"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::Unavailable => write!(f, "controller busy"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
