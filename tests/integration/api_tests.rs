//! Integration tests for the dashboard API router.
//!
//! Requests are routed against a live `AppService` backed by the mock
//! hardware; bodies are checked as parsed JSON.

use serde_json::Value;

use super::mock_hw::{MockHardware, RecordingSink};

use hydrotower::api::channels::{ApiRequest, ApiResponse, Method};
use hydrotower::api::router::ApiRouter;
use hydrotower::app::service::AppService;
use hydrotower::config::SystemConfig;
use hydrotower::control::ph_dosing::DoseDirection;

struct Harness {
    app: AppService,
    hw: MockHardware,
    sink: RecordingSink,
    router: ApiRouter,
    next_id: u32,
}

impl Harness {
    fn new() -> Self {
        let mut app = AppService::new(SystemConfig::default(), 0);
        let mut hw = MockHardware::new();
        let mut sink = RecordingSink::new();
        app.start(&mut hw, &mut sink);
        app.tick(0, &mut hw, &mut sink);
        Self {
            app,
            hw,
            sink,
            router: ApiRouter::new(),
            next_id: 1,
        }
    }

    fn call(&mut self, method: Method, uri: &str, now_ms: u64) -> ApiResponse {
        let req = ApiRequest::from_uri(self.next_id, method, uri).unwrap();
        self.next_id += 1;
        self.router
            .handle(&req, &mut self.app, now_ms, &mut self.hw, &mut self.sink)
    }

    fn json(&mut self, method: Method, uri: &str, now_ms: u64) -> (u16, Value) {
        let resp = self.call(method, uri, now_ms);
        let body = serde_json::from_str(&resp.body).unwrap();
        (resp.status, body)
    }
}

// ── Routing ───────────────────────────────────────────────────

#[test]
fn response_echoes_request_id() {
    let mut h = Harness::new();
    let req = ApiRequest::from_uri(4242, Method::Get, "/status").unwrap();
    let resp = h.router.handle(&req, &mut h.app, 0, &mut h.hw, &mut h.sink);
    assert_eq!(resp.request_id, 4242);
    assert_eq!(resp.status, 200);
}

#[test]
fn unknown_path_is_404() {
    let mut h = Harness::new();
    let (status, body) = h.json(Method::Get, "/nope", 0);
    assert_eq!(status, 404);
    assert_eq!(body["error"], "not found");
}

#[test]
fn wrong_method_is_405() {
    let mut h = Harness::new();
    assert_eq!(h.call(Method::Post, "/sensors", 0).status, 405);
    assert_eq!(h.call(Method::Get, "/pump/toggle", 0).status, 405);
}

#[test]
fn options_is_empty_204() {
    let mut h = Harness::new();
    let resp = h.call(Method::Options, "/pump/config", 0);
    assert_eq!(resp.status, 204);
    assert!(resp.body.is_empty());
}

// ── Read endpoints ────────────────────────────────────────────

#[test]
fn sensors_are_rounded_for_the_dashboard() {
    let mut h = Harness::new();
    h.hw.snapshot.light_lux = 12_345.6;
    h.hw.snapshot.air_temp_c = 22.456;
    h.hw.snapshot.humidity_pct = 61.4;
    h.hw.snapshot.co2_ppm = 812.7;
    h.hw.snapshot.ph_filtered = 6.128;
    h.app.tick(1_000, &mut h.hw, &mut h.sink);

    let (status, body) = h.json(Method::Get, "/sensors", 1_000);
    assert_eq!(status, 200);
    assert_eq!(body["lightLevel"].as_f64(), Some(12_346.0));
    assert_eq!(body["envTemp"].as_f64(), Some(22.46));
    assert_eq!(body["envHum"].as_f64(), Some(61.0));
    assert_eq!(body["CO2"].as_i64(), Some(813));
    assert_eq!(body["phLevel"].as_f64(), Some(6.13));
    assert_eq!(body["waterLevel"], true);
}

#[test]
fn status_reports_health() {
    let mut h = Harness::new();
    let (_, body) = h.json(Method::Get, "/status", 0);
    assert_eq!(body["health"], "Good");
    assert_eq!(body["statusText"], "System OK");
}

#[test]
fn pump_status_reports_minutes_and_countdown() {
    let mut h = Harness::new();
    let (_, body) = h.json(Method::Get, "/pump/status", 18_500);
    assert_eq!(body["pumpStatus"], false);
    assert_eq!(body["autoMode"], true);
    assert_eq!(body["onTime"], 1);
    assert_eq!(body["offTime"], 1);
    assert_eq!(body["remainingMs"], 41_500);
    assert_eq!(body["statusText"], "Stopped (Auto - 41s remaining)");
}

// ── Pump writes ───────────────────────────────────────────────

#[test]
fn pump_toggle_goes_manual() {
    let mut h = Harness::new();
    let (status, body) = h.json(Method::Post, "/pump/toggle", 100);
    assert_eq!(status, 200);
    assert_eq!(body["pumpStatus"], true);
    assert_eq!(body["autoMode"], false);
    assert_eq!(h.hw.pump_level(), 100);
}

#[test]
fn pump_config_sets_timing_then_mode() {
    let mut h = Harness::new();
    let (status, body) = h.json(
        Method::Put,
        "/pump/config?onTime=15&offTime=45&autoMode=false",
        0,
    );
    assert_eq!(status, 200);
    assert_eq!(body["onTime"], 15);
    assert_eq!(body["offTime"], 45);
    assert_eq!(body["autoMode"], false);
    assert_eq!(h.app.pump().config().on_duration_ms, 900_000);
}

#[test]
fn pump_config_single_field_keeps_other() {
    let mut h = Harness::new();
    let (status, body) = h.json(Method::Put, "/pump/config?offTime=30", 0);
    assert_eq!(status, 200);
    assert_eq!(body["onTime"], 1);
    assert_eq!(body["offTime"], 30);
}

#[test]
fn pump_config_rejects_bad_input() {
    let mut h = Harness::new();
    let before = *h.app.pump().config();

    assert_eq!(h.call(Method::Put, "/pump/config", 0).status, 400);
    assert_eq!(h.call(Method::Put, "/pump/config?onTime=abc", 0).status, 400);

    let (status, body) = h.json(Method::Put, "/pump/config?onTime=0&offTime=10", 0);
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("must be > 0"));
    assert_eq!(*h.app.pump().config(), before);
}

// ── pH endpoints ──────────────────────────────────────────────

#[test]
fn ph_up_then_down_never_overlaps() {
    let mut h = Harness::new();
    let (_, body) = h.json(Method::Post, "/ph/up", 1_000);
    assert_eq!(body["message"], "pH Up pump started");
    assert_eq!(body["phStatus"], true);
    assert_eq!(body["autoMode"], false);

    let (_, body) = h.json(Method::Post, "/ph/down", 1_100);
    assert_eq!(body["message"], "pH Down pump started");
    assert_eq!(body["phStatus"], false);
    assert_eq!(body["phDownStatus"], true);
    assert!(!h.hw.dosing_overlap_seen());

    let (_, body) = h.json(Method::Post, "/ph/down", 1_200);
    assert_eq!(body["message"], "pH Down pump stopped");
    assert!(!h.hw.dosing_on(DoseDirection::Lower));
}

#[test]
fn ph_stop_releases_all() {
    let mut h = Harness::new();
    h.call(Method::Post, "/ph/up", 1_000);
    let (_, body) = h.json(Method::Post, "/ph/stop", 1_100);
    assert_eq!(body["message"], "All pH pumps stopped");
    assert_eq!(body["phStatus"], false);
    assert_eq!(body["phDownStatus"], false);
}

#[test]
fn ph_config_partial_update() {
    let mut h = Harness::new();
    let (status, body) = h.json(Method::Put, "/ph/config?target=6.5", 0);
    assert_eq!(status, 200);
    assert_eq!(body["target"].as_f64(), Some(6.5));
    assert_eq!(body["tolerance"].as_f64(), Some(0.5));

    let (status, _) = h.json(Method::Put, "/ph/config?tolerance=3", 0);
    assert_eq!(status, 400);
    assert_eq!(h.app.doser().config().tolerance, 0.5);

    let (_, body) = h.json(Method::Put, "/ph/config?autoMode=false", 0);
    assert_eq!(body["autoMode"], false);
    assert_eq!(body["statusText"], "Within range (Manual)");
}

#[test]
fn ph_config_reasserting_auto_keeps_running_dose() {
    let mut h = Harness::new();
    h.hw.snapshot.ph_filtered = 6.9;
    h.app.tick(1_000, &mut h.hw, &mut h.sink);
    assert!(h.hw.dosing_on(DoseDirection::Lower));

    let (status, body) = h.json(Method::Put, "/ph/config?autoMode=true", 1_500);
    assert_eq!(status, 200);
    assert_eq!(body["phDownStatus"], true);
    assert!(h.hw.dosing_on(DoseDirection::Lower));
}

// ── Telemetry log ─────────────────────────────────────────────

#[test]
fn log_routes_control_schedule() {
    let mut h = Harness::new();
    let (_, body) = h.json(Method::Get, "/api/log/status", 0);
    assert_eq!(body["enabled"], true);
    assert_eq!(body["intervalSecs"], 300);

    let (_, body) = h.json(Method::Post, "/api/log/trigger", 5_000);
    assert_eq!(body["recordsEmitted"], 1);
    assert_eq!(body["nextInMs"], 300_000);

    let (_, body) = h.json(Method::Put, "/api/log/enable?enabled=false", 6_000);
    assert_eq!(body["enabled"], false);
    assert!(body["nextInMs"].is_null());

    assert_eq!(h.call(Method::Put, "/api/log/enable", 6_000).status, 400);
}

// ── Rate limiting ─────────────────────────────────────────────

#[test]
fn mutating_requests_are_rate_limited() {
    let mut h = Harness::new();
    for i in 0..10 {
        let status = h.call(Method::Post, "/pump/toggle", i).status;
        assert_eq!(status, 200, "request {} should pass", i);
    }
    assert_eq!(h.call(Method::Post, "/pump/toggle", 10).status, 429);

    // Reads draw no tokens.
    for _ in 0..20 {
        assert_eq!(h.call(Method::Get, "/pump/status", 10).status, 200);
    }
}
