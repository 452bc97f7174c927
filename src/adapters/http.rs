//! Dashboard HTTP server adapter.
//!
//! Every request is converted into an [`ApiRequest`], pushed into
//! [`REQUEST_CHANNEL`] and answered with whatever the control loop sends
//! back on [`RESPONSE_CHANNEL`].  The server task never touches the
//! controllers itself.
//!
//! ```text
//!  HTTP client ─▶ EspHttpServer ─▶ REQUEST_CHANNEL ─▶ main loop / ApiRouter
//!              ◀─                ◀─ RESPONSE_CHANNEL ◀─
//! ```
//!
//! The ESP-IDF server runs handlers one at a time, so at most one request
//! is in flight; responses with a stale id (a request that already timed
//! out) are discarded.

use core::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;
use esp_idf_svc::http::Method as HttpMethod;
use esp_idf_svc::http::server::{Configuration, EspHttpConnection, EspHttpServer, Request};
use esp_idf_svc::io::Write;
use log::{info, warn};

use crate::api::channels::{ApiRequest, ApiResponse, Method, REQUEST_CHANNEL, RESPONSE_CHANNEL};
use crate::api::router::error_response;
use crate::error::Error;

/// How long a handler waits for the control loop.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);
const RESPONSE_POLL: Duration = Duration::from_millis(5);

const HEADERS: [(&str, &str); 4] = [
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, PUT, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

static NEXT_REQUEST_ID: AtomicU32 = AtomicU32::new(1);

/// Start the server with a wildcard handler per method.  The returned
/// server must be kept alive for as long as the API should answer.
pub fn start() -> Result<EspHttpServer<'static>> {
    let mut server = EspHttpServer::new(&Configuration {
        uri_match_wildcard: true,
        ..Default::default()
    })?;

    for (http, method) in [
        (HttpMethod::Get, Method::Get),
        (HttpMethod::Post, Method::Post),
        (HttpMethod::Put, Method::Put),
        (HttpMethod::Options, Method::Options),
    ] {
        server.fn_handler("/*", http, move |req| -> Result<()> { forward(req, method) })?;
    }

    info!("HTTP: dashboard API listening on :80");
    Ok(server)
}

fn forward(req: Request<&mut EspHttpConnection<'_>>, method: Method) -> Result<()> {
    let id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
    let resp = match ApiRequest::from_uri(id, method, req.uri()) {
        Ok(api_req) => exchange(api_req),
        Err(e) => error_response(id, e),
    };
    let mut out = req.into_response(resp.status, None, &HEADERS)?;
    out.write_all(resp.body.as_bytes())?;
    Ok(())
}

fn exchange(req: ApiRequest) -> ApiResponse {
    let id = req.request_id;
    futures_lite::future::block_on(REQUEST_CHANNEL.send(req));

    let deadline = Instant::now() + RESPONSE_TIMEOUT;
    while Instant::now() < deadline {
        match RESPONSE_CHANNEL.try_receive() {
            Ok(resp) if resp.request_id == id => return resp,
            Ok(stale) => warn!("HTTP: discarding stale response {}", stale.request_id),
            Err(_) => std::thread::sleep(RESPONSE_POLL),
        }
    }
    warn!("HTTP: request {} timed out", id);
    error_response(id, Error::Unavailable)
}
