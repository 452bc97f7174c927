//! Fuzz target: `ApiRouter::handle` over arbitrary request URIs
//!
//! The first byte picks the method, the rest is the URI.  Every request is
//! routed against a live service.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Every response echoes the request id and carries a known status
//! - Non-204 bodies are valid JSON
//! - The dosing outputs are never both energised
//!
//! cargo fuzz run fuzz_api_request

#![no_main]

use libfuzzer_sys::fuzz_target;

use hydrotower::api::channels::{ApiRequest, Method};
use hydrotower::api::router::ApiRouter;
use hydrotower::app::events::AppEvent;
use hydrotower::app::ports::{ActuatorPort, EventSink};
use hydrotower::app::service::AppService;
use hydrotower::config::SystemConfig;
use hydrotower::control::ph_dosing::DoseDirection;

#[derive(Default)]
struct Outputs {
    raise: bool,
    lower: bool,
}

impl ActuatorPort for Outputs {
    fn set_pump_output(&mut self, _level: u8) {}

    fn set_dosing_pin(&mut self, direction: DoseDirection, on: bool) {
        match direction {
            DoseDirection::Raise => self.raise = on,
            DoseDirection::Lower => self.lower = on,
        }
        assert!(!(self.raise && self.lower), "both dosing outputs energised");
    }

    fn all_off(&mut self) {
        self.raise = false;
        self.lower = false;
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Some((&sel, rest)) = data.split_first() else {
        return;
    };
    let method = match sel % 4 {
        0 => Method::Get,
        1 => Method::Post,
        2 => Method::Put,
        _ => Method::Options,
    };
    let Ok(uri) = core::str::from_utf8(rest) else {
        return;
    };

    let mut app = AppService::new(SystemConfig::default(), 0);
    let mut hw = Outputs::default();
    let mut sink = Discard;
    let mut router = ApiRouter::new();

    // Same URI twice so toggles exercise both edges.
    for (id, now) in [(1u32, 1_000u64), (2, 2_000)] {
        let Ok(req) = ApiRequest::from_uri(id, method, uri) else {
            return;
        };
        let resp = router.handle(&req, &mut app, now, &mut hw, &mut sink);
        assert_eq!(resp.request_id, id);
        assert!(matches!(resp.status, 200 | 204 | 400 | 404 | 405 | 429));
        if resp.status != 204 {
            assert!(serde_json::from_str::<serde_json::Value>(&resp.body).is_ok());
        }
    }
});
