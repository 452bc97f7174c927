//! API inter-task communication channels.
//!
//! Uses `embassy-sync` bounded MPMC channels to bridge the HTTP server
//! task with the synchronous control loop. Both sides share these static
//! channels; requests and responses are correlated by `request_id`.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;
use log::warn;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Options,
}

/// Inbound request, delivered to the control loop.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub request_id: u32,
    pub method: Method,
    pub path: String<32>,
    /// Raw query string without the leading `?`.
    pub query: String<128>,
}

impl ApiRequest {
    pub fn new(request_id: u32, method: Method, path: &str, query: &str) -> Result<Self, Error> {
        let mut p = String::new();
        p.push_str(path)
            .map_err(|_| Error::BadRequest("path too long"))?;
        let mut q = String::new();
        q.push_str(query)
            .map_err(|_| Error::BadRequest("query too long"))?;
        Ok(Self {
            request_id,
            method,
            path: p,
            query: q,
        })
    }

    /// Split a request URI (`/path?query`) into its parts.
    pub fn from_uri(request_id: u32, method: Method, uri: &str) -> Result<Self, Error> {
        let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
        Self::new(request_id, method, path, query)
    }
}

/// Outbound response from the control loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub request_id: u32,
    pub status: u16,
    /// JSON body; empty for 204.
    pub body: std::string::String,
}

/// Channel depth for inbound requests.
const REQUEST_DEPTH: usize = 8;

/// Channel depth for outbound responses.
const RESPONSE_DEPTH: usize = 8;

/// Inbound request channel: HTTP task → control loop.
pub static REQUEST_CHANNEL: Channel<CriticalSectionRawMutex, ApiRequest, REQUEST_DEPTH> =
    Channel::new();

/// Outbound response channel: control loop → HTTP task.
pub static RESPONSE_CHANNEL: Channel<CriticalSectionRawMutex, ApiResponse, RESPONSE_DEPTH> =
    Channel::new();

// ── Channel accessors for the control loop ───────────────────

/// Try to receive an inbound request from the HTTP task.
pub fn try_recv_request() -> Option<ApiRequest> {
    REQUEST_CHANNEL.try_receive().ok()
}

/// Hand a response back to the HTTP task.  Returns `false` (and drops the
/// response) when the channel is full.
pub fn send_response(resp: ApiResponse) -> bool {
    let id = resp.request_id;
    if RESPONSE_CHANNEL.try_send(resp).is_err() {
        warn!("API: response channel full, dropping response {}", id);
        return false;
    }
    true
}
