//! Route table for the dashboard API.
//!
//! | method | path            | effect                                  |
//! |--------|-----------------|-----------------------------------------|
//! | GET    | `/sensors`      | latest snapshot, dashboard rounding     |
//! | GET    | `/status`       | health band and text                    |
//! | GET    | `/pump/status`  | pump state, timing (minutes), countdown |
//! | POST   | `/pump/toggle`  | manual toggle                           |
//! | PUT    | `/pump/config`  | `onTime`, `offTime`, `autoMode`         |
//! | GET    | `/ph/status`    | pH, setpoint, dosing state              |
//! | POST   | `/ph/up`        | manual toggle of the pH Up pump         |
//! | POST   | `/ph/down`      | manual toggle of the pH Down pump       |
//! | POST   | `/ph/stop`      | stop all dosing                         |
//! | PUT    | `/ph/config`    | `target`, `tolerance`, `autoMode`       |
//! | GET    | `/api/log/status`  | telemetry schedule                   |
//! | PUT    | `/api/log/enable`  | `enabled`                            |
//! | POST   | `/api/log/trigger` | emit a record now                    |
//! | OPTIONS| any             | 204 (CORS preflight)                    |
//!
//! Mutating requests (POST/PUT) draw from a token bucket: 10 per second,
//! burst of 10.

use burster::Limiter;
use core::time::Duration;
use log::{debug, warn};
use serde::Serialize;

use crate::app::commands::AppCommand;
use crate::app::ports::{ActuatorPort, EventSink};
use crate::app::service::AppService;
use crate::control::ph_dosing::DoseDirection;
use crate::error::{Error, Result};
use crate::status::Band;

use super::channels::{ApiRequest, ApiResponse, Method};
use super::query::Query;

// ── Response bodies ──────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SensorsBody {
    light_level: f32,
    env_temp: f32,
    env_hum: f32,
    #[serde(rename = "CO2")]
    co2: i32,
    water_temp: f32,
    ph_level: f32,
    ec_level: f32,
    water_level: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody<'a> {
    health: Band,
    status_text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PumpStatusBody<'a> {
    pump_status: bool,
    auto_mode: bool,
    /// Minutes.
    on_time: u32,
    /// Minutes.
    off_time: u32,
    remaining_ms: u32,
    status_text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PhStatusBody<'a> {
    ph_level: f32,
    target: f32,
    tolerance: f32,
    auto_mode: bool,
    /// pH Up pump running.
    ph_status: bool,
    ph_down_status: bool,
    status_text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PhActionBody<'a> {
    message: &'a str,
    ph_status: bool,
    ph_down_status: bool,
    auto_mode: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogStatusBody {
    enabled: bool,
    interval_secs: u64,
    records_emitted: u32,
    next_in_ms: Option<u64>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

enum Reply {
    Json(String),
    NoContent,
}

fn encode<T: Serialize>(body: &T) -> String {
    serde_json::to_string(body).unwrap_or_else(|e| {
        warn!("API: response encoding failed: {}", e);
        String::from("{}")
    })
}

fn json<T: Serialize>(body: &T) -> Reply {
    Reply::Json(encode(body))
}

/// Render an error as a `{"error": ..}` response with its status code.
pub fn error_response(request_id: u32, err: Error) -> ApiResponse {
    let msg = err.to_string();
    ApiResponse {
        request_id,
        status: err.status_code(),
        body: encode(&ErrorBody { error: &msg }),
    }
}

/// Round to `places` decimals the way the dashboard displays values.
fn round_to(value: f32, places: i32) -> f32 {
    let scale = 10f32.powi(places);
    (value * scale).round() / scale
}

// ── Router ───────────────────────────────────────────────────

const ROUTES: [&str; 13] = [
    "/sensors",
    "/status",
    "/pump/status",
    "/pump/toggle",
    "/pump/config",
    "/ph/status",
    "/ph/up",
    "/ph/down",
    "/ph/stop",
    "/ph/config",
    "/api/log/status",
    "/api/log/enable",
    "/api/log/trigger",
];

pub struct ApiRouter {
    rate_limiter: burster::TokenBucket<fn() -> Duration>,
}

impl Default for ApiRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiRouter {
    pub fn new() -> Self {
        Self {
            rate_limiter: burster::TokenBucket::new_with_time_provider(
                10,
                10, // 10 tokens per second, 10 burst capacity
                platform_now as fn() -> Duration,
            ),
        }
    }

    /// Execute one request against the service.  Never fails: errors are
    /// rendered as a JSON `{"error": ..}` body with the matching status.
    pub fn handle(
        &mut self,
        req: &ApiRequest,
        app: &mut AppService,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> ApiResponse {
        debug!("API: {:?} {}?{}", req.method, req.path, req.query);
        match self.route(req, app, now_ms, hw, sink) {
            Ok(Reply::Json(body)) => ApiResponse {
                request_id: req.request_id,
                status: 200,
                body,
            },
            Ok(Reply::NoContent) => ApiResponse {
                request_id: req.request_id,
                status: 204,
                body: String::new(),
            },
            Err(e) => {
                warn!("API: {:?} {} -> {}", req.method, req.path, e);
                error_response(req.request_id, e)
            }
        }
    }

    fn route(
        &mut self,
        req: &ApiRequest,
        app: &mut AppService,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<Reply> {
        if req.method == Method::Options {
            return Ok(Reply::NoContent);
        }
        let path = req.path.as_str();
        if !ROUTES.contains(&path) {
            return Err(Error::NotFound);
        }
        if matches!(req.method, Method::Post | Method::Put)
            && self.rate_limiter.try_consume(1).is_err()
        {
            return Err(Error::RateLimited);
        }
        let query = Query::parse(req.query.as_str());

        match (req.method, path) {
            (Method::Get, "/sensors") => Ok(sensors(app)),
            (Method::Get, "/status") => {
                let health = app.health();
                Ok(json(&StatusBody {
                    health: health.band,
                    status_text: health.text,
                }))
            }
            (Method::Get, "/pump/status") => Ok(pump_status(app, now_ms)),
            (Method::Post, "/pump/toggle") => {
                app.handle_command(AppCommand::TogglePump, now_ms, hw, sink)?;
                Ok(pump_status(app, now_ms))
            }
            (Method::Put, "/pump/config") => {
                let on = query.get_i64("onTime")?;
                let off = query.get_i64("offTime")?;
                let auto = query.get_bool("autoMode")?;
                if on.is_none() && off.is_none() && auto.is_none() {
                    return Err(Error::BadRequest("expected onTime, offTime or autoMode"));
                }
                if on.is_some() || off.is_some() {
                    let cfg = *app.pump().config();
                    let cmd = AppCommand::SetPumpTiming {
                        on_minutes: on.unwrap_or(i64::from(cfg.on_duration_ms / 60_000)),
                        off_minutes: off.unwrap_or(i64::from(cfg.off_duration_ms / 60_000)),
                    };
                    app.handle_command(cmd, now_ms, hw, sink)?;
                }
                if let Some(enabled) = auto {
                    app.handle_command(AppCommand::SetPumpAutoMode(enabled), now_ms, hw, sink)?;
                }
                Ok(pump_status(app, now_ms))
            }
            (Method::Get, "/ph/status") => Ok(ph_status(app)),
            (Method::Post, "/ph/up") => {
                app.handle_command(AppCommand::TogglePhDose(DoseDirection::Raise), now_ms, hw, sink)?;
                let msg = if app.doser().is_active(DoseDirection::Raise) {
                    "pH Up pump started"
                } else {
                    "pH Up pump stopped"
                };
                Ok(ph_action(app, msg))
            }
            (Method::Post, "/ph/down") => {
                app.handle_command(AppCommand::TogglePhDose(DoseDirection::Lower), now_ms, hw, sink)?;
                let msg = if app.doser().is_active(DoseDirection::Lower) {
                    "pH Down pump started"
                } else {
                    "pH Down pump stopped"
                };
                Ok(ph_action(app, msg))
            }
            (Method::Post, "/ph/stop") => {
                app.handle_command(AppCommand::StopDosing, now_ms, hw, sink)?;
                Ok(ph_action(app, "All pH pumps stopped"))
            }
            (Method::Put, "/ph/config") => {
                let target = query.get_f32("target")?;
                let tolerance = query.get_f32("tolerance")?;
                let auto = query.get_bool("autoMode")?;
                if target.is_none() && tolerance.is_none() && auto.is_none() {
                    return Err(Error::BadRequest("expected target, tolerance or autoMode"));
                }
                if target.is_some() || tolerance.is_some() {
                    let cfg = *app.doser().config();
                    let cmd = AppCommand::SetPhTarget {
                        target: target.unwrap_or(cfg.target_ph),
                        tolerance: tolerance.unwrap_or(cfg.tolerance),
                    };
                    app.handle_command(cmd, now_ms, hw, sink)?;
                }
                if let Some(enabled) = auto {
                    app.handle_command(AppCommand::SetPhAutoMode(enabled), now_ms, hw, sink)?;
                }
                Ok(ph_status(app))
            }
            (Method::Get, "/api/log/status") => Ok(log_status(app, now_ms)),
            (Method::Put, "/api/log/enable") => {
                let enabled = query
                    .get_bool("enabled")?
                    .ok_or(Error::BadRequest("expected enabled"))?;
                app.handle_command(AppCommand::SetTelemetryEnabled(enabled), now_ms, hw, sink)?;
                Ok(log_status(app, now_ms))
            }
            (Method::Post, "/api/log/trigger") => {
                app.handle_command(AppCommand::TriggerTelemetry, now_ms, hw, sink)?;
                Ok(log_status(app, now_ms))
            }
            _ => Err(Error::MethodNotAllowed),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────

fn sensors(app: &AppService) -> Reply {
    let s = app.sensors();
    json(&SensorsBody {
        light_level: round_to(s.light_lux, 0),
        env_temp: round_to(s.air_temp_c, 2),
        env_hum: round_to(s.humidity_pct, 0),
        co2: s.co2_ppm.round() as i32,
        water_temp: round_to(s.water_temp_c, 2),
        ph_level: round_to(s.ph_filtered, 2),
        ec_level: round_to(s.ec_level, 2),
        water_level: s.water_level_ok,
    })
}

fn pump_status(app: &AppService, now_ms: u64) -> Reply {
    let pump = app.pump();
    let cfg = pump.config();
    let text = app.pump_status_text(now_ms);
    json(&PumpStatusBody {
        pump_status: pump.is_on(),
        auto_mode: pump.is_auto(),
        on_time: cfg.on_duration_ms / 60_000,
        off_time: cfg.off_duration_ms / 60_000,
        remaining_ms: pump.cycle_time_remaining(now_ms),
        status_text: text.as_str(),
    })
}

fn ph_status(app: &AppService) -> Reply {
    let doser = app.doser();
    let cfg = doser.config();
    let text = app.ph_status_text();
    json(&PhStatusBody {
        ph_level: round_to(app.sensors().ph_filtered, 2),
        target: cfg.target_ph,
        tolerance: cfg.tolerance,
        auto_mode: doser.is_auto(),
        ph_status: doser.is_active(DoseDirection::Raise),
        ph_down_status: doser.is_active(DoseDirection::Lower),
        status_text: text.as_str(),
    })
}

fn ph_action(app: &AppService, message: &str) -> Reply {
    let doser = app.doser();
    json(&PhActionBody {
        message,
        ph_status: doser.is_active(DoseDirection::Raise),
        ph_down_status: doser.is_active(DoseDirection::Lower),
        auto_mode: doser.is_auto(),
    })
}

fn log_status(app: &AppService, now_ms: u64) -> Reply {
    let t = app.telemetry();
    json(&LogStatusBody {
        enabled: t.is_enabled(),
        interval_secs: t.interval_secs(),
        records_emitted: t.emitted(),
        next_in_ms: t.next_in_ms(now_ms),
    })
}

// ── Platform time for rate limiter ───────────────────────────

#[cfg(target_os = "espidf")]
fn platform_now() -> Duration {
    // SAFETY: esp_timer_get_time is a read of the monotonic RTC counter.
    let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
    Duration::from_micros(us as u64)
}

#[cfg(not(target_os = "espidf"))]
fn platform_now() -> Duration {
    use std::time::Instant;
    static START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
    START.get_or_init(Instant::now).elapsed()
}
