//! Integration tests for the AppService → controllers → actuators pipeline.
//!
//! These run on the host (x86_64) and drive the service with a manual
//! clock, checking both the actuator call history and the emitted events.

use super::mock_hw::{ActuatorCall, ManualClock, MockHardware, RecordingSink};

use hydrotower::app::commands::AppCommand;
use hydrotower::app::events::AppEvent;
use hydrotower::app::ports::{ClockPort, ConfigError};
use hydrotower::app::service::AppService;
use hydrotower::config::SystemConfig;
use hydrotower::control::ph_dosing::{DoseDirection, DOSE_COOLDOWN_MS, DOSE_ON_MS};
use hydrotower::status::Band;

fn make_app() -> (AppService, MockHardware, RecordingSink) {
    let mut app = AppService::new(SystemConfig::default(), 0);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);
    (app, hw, sink)
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_releases_outputs_and_announces() {
    let (_app, hw, sink) = make_app();
    assert_eq!(hw.calls, vec![ActuatorCall::AllOff]);
    assert_eq!(
        sink.events,
        vec![AppEvent::Started {
            pump_auto: true,
            ph_auto: true
        }]
    );
}

// ── Pump cycle ────────────────────────────────────────────────

#[test]
fn auto_pump_alternates_with_configured_phases() {
    let (mut app, mut hw, mut sink) = make_app();
    let clock = ManualClock::new(0);

    clock.advance(59_999);
    app.tick(clock.now_ms(), &mut hw, &mut sink);
    assert_eq!(hw.pump_level(), 0, "pump starts with the OFF phase");

    clock.advance(1);
    app.tick(clock.now_ms(), &mut hw, &mut sink);
    assert_eq!(hw.pump_level(), 100);
    assert!(sink.events.contains(&AppEvent::PumpSwitched {
        on: true,
        manual: false
    }));

    clock.advance(60_000);
    app.tick(clock.now_ms(), &mut hw, &mut sink);
    assert_eq!(hw.pump_level(), 0);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::PumpSwitched { manual: false, .. })),
        2
    );
}

#[test]
fn manual_pump_survives_ticks() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::SetPump(true), 1_000, &mut hw, &mut sink)
        .unwrap();
    assert_eq!(hw.last_call(), Some(&ActuatorCall::PumpOutput(100)));
    assert!(!app.pump().is_auto());

    app.tick(1_001, &mut hw, &mut sink);
    app.tick(500_000, &mut hw, &mut sink);
    assert!(app.pump().is_on());
    assert_eq!(hw.pump_level(), 100);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::PumpSwitched { manual: true, on: true })),
        1
    );
}

#[test]
fn re_enabling_auto_restarts_phase() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::TogglePump, 10_000, &mut hw, &mut sink)
        .unwrap();
    app.handle_command(AppCommand::SetPumpAutoMode(true), 20_000, &mut hw, &mut sink)
        .unwrap();

    // Pump is on; the ON phase restarted at 20 s.
    app.tick(79_999, &mut hw, &mut sink);
    assert!(app.pump().is_on());
    app.tick(80_000, &mut hw, &mut sink);
    assert!(!app.pump().is_on());
}

#[test]
fn pump_timing_in_minutes() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(
        AppCommand::SetPumpTiming {
            on_minutes: 15,
            off_minutes: 45,
        },
        0,
        &mut hw,
        &mut sink,
    )
    .unwrap();
    assert_eq!(app.pump().config().on_duration_ms, 900_000);
    assert_eq!(app.pump().config().off_duration_ms, 2_700_000);
    assert_eq!(app.pump().cycle_time_remaining(700_000), 2_000_000);
}

#[test]
fn zero_minute_timing_rejected_and_reported() {
    let (mut app, mut hw, mut sink) = make_app();
    let before = *app.pump().config();
    let result = app.handle_command(
        AppCommand::SetPumpTiming {
            on_minutes: 0,
            off_minutes: 10,
        },
        0,
        &mut hw,
        &mut sink,
    );
    assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
    assert_eq!(*app.pump().config(), before);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ConfigRejected(_))),
        1
    );
}

// ── pH dosing ─────────────────────────────────────────────────

#[test]
fn high_ph_runs_lower_pump_then_cools_down() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.set_ph(6.9);

    app.tick(1_000, &mut hw, &mut sink);
    assert!(hw.dosing_on(DoseDirection::Lower));
    assert!(!hw.dosing_on(DoseDirection::Raise));
    assert!(sink.events.contains(&AppEvent::DosingChanged {
        direction: DoseDirection::Lower,
        active: true
    }));

    let released_at = 1_000 + DOSE_ON_MS;
    app.tick(released_at - 1, &mut hw, &mut sink);
    assert!(hw.dosing_on(DoseDirection::Lower));
    app.tick(released_at, &mut hw, &mut sink);
    assert!(!hw.dosing_on(DoseDirection::Lower));

    // Still too high, but the pump is cooling down.
    app.tick(released_at + DOSE_COOLDOWN_MS - 1, &mut hw, &mut sink);
    assert!(!hw.dosing_on(DoseDirection::Lower));

    app.tick(released_at + DOSE_COOLDOWN_MS, &mut hw, &mut sink);
    assert!(hw.dosing_on(DoseDirection::Lower));
    assert!(!hw.dosing_overlap_seen());
}

#[test]
fn reading_inside_deadband_does_nothing() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.set_ph(6.45);
    app.tick(1_000, &mut hw, &mut sink);
    assert!(app.doser().active_direction().is_none());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::DosingChanged { .. })),
        0
    );
}

#[test]
fn sensor_fault_blocks_dosing_and_recovers() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.set_ph(0.0);
    app.tick(1_000, &mut hw, &mut sink);
    app.tick(2_000, &mut hw, &mut sink);
    assert!(app.doser().sensor_fault());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::PhSensorFault(_))),
        1,
        "fault is reported once, on the edge"
    );
    assert!(app.doser().active_direction().is_none());

    hw.set_ph(5.0);
    app.tick(3_000, &mut hw, &mut sink);
    assert!(!app.doser().sensor_fault());
    assert!(sink.events.contains(&AppEvent::PhSensorRecovered(5.0)));
    assert!(hw.dosing_on(DoseDirection::Raise));
}

#[test]
fn manual_toggle_switches_sides_without_overlap() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(
        AppCommand::TogglePhDose(DoseDirection::Raise),
        1_000,
        &mut hw,
        &mut sink,
    )
    .unwrap();
    app.handle_command(
        AppCommand::TogglePhDose(DoseDirection::Lower),
        1_500,
        &mut hw,
        &mut sink,
    )
    .unwrap();

    assert!(!app.doser().is_auto());
    assert!(hw.dosing_on(DoseDirection::Lower));
    assert!(!hw.dosing_on(DoseDirection::Raise));
    assert!(!hw.dosing_overlap_seen());
    assert_eq!(
        &hw.calls[hw.calls.len() - 2..],
        &[
            ActuatorCall::Dosing {
                direction: DoseDirection::Raise,
                on: false
            },
            ActuatorCall::Dosing {
                direction: DoseDirection::Lower,
                on: true
            },
        ]
    );
}

#[test]
fn manual_dose_still_times_out() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(
        AppCommand::TogglePhDose(DoseDirection::Raise),
        1_000,
        &mut hw,
        &mut sink,
    )
    .unwrap();
    app.tick(1_000 + DOSE_ON_MS, &mut hw, &mut sink);
    assert!(!hw.dosing_on(DoseDirection::Raise));
}

#[test]
fn stop_dosing_releases_and_goes_manual() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.set_ph(5.0);
    app.tick(1_000, &mut hw, &mut sink);
    assert!(hw.dosing_on(DoseDirection::Raise));

    app.handle_command(AppCommand::StopDosing, 1_200, &mut hw, &mut sink)
        .unwrap();
    assert!(!hw.dosing_on(DoseDirection::Raise));
    assert!(!app.doser().is_auto());

    // Manual mode: an out-of-band reading does not restart dosing.
    app.tick(200_000, &mut hw, &mut sink);
    assert!(!hw.dosing_on(DoseDirection::Raise));
}

#[test]
fn out_of_range_target_rejected() {
    let (mut app, mut hw, mut sink) = make_app();
    let result = app.handle_command(
        AppCommand::SetPhTarget {
            target: 9.0,
            tolerance: 0.5,
        },
        0,
        &mut hw,
        &mut sink,
    );
    assert!(result.is_err());
    assert_eq!(app.doser().config().target_ph, 6.0);

    app.handle_command(
        AppCommand::SetPhTarget {
            target: 6.5,
            tolerance: 0.3,
        },
        0,
        &mut hw,
        &mut sink,
    )
    .unwrap();
    assert_eq!(app.current_config().ph.target_ph, 6.5);
}

// ── Health + telemetry ────────────────────────────────────────

#[test]
fn health_change_is_emitted_once() {
    let (mut app, mut hw, mut sink) = make_app();
    app.tick(1_000, &mut hw, &mut sink);
    assert_eq!(app.health().band, Band::Good);

    hw.snapshot.water_level_ok = false;
    app.tick(2_000, &mut hw, &mut sink);
    app.tick(3_000, &mut hw, &mut sink);
    assert_eq!(app.health().band, Band::Critical);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::HealthChanged {
                from: Band::Good,
                to: Band::Critical
            }
        )),
        1
    );
}

#[test]
fn telemetry_follows_schedule_and_trigger() {
    let (mut app, mut hw, mut sink) = make_app();
    app.tick(0, &mut hw, &mut sink);

    assert!(app.poll_telemetry(0, &mut sink));
    assert!(!app.poll_telemetry(299_999, &mut sink));
    assert!(app.poll_telemetry(300_000, &mut sink));

    app.handle_command(AppCommand::TriggerTelemetry, 310_000, &mut hw, &mut sink)
        .unwrap();
    assert_eq!(app.telemetry().emitted(), 3);

    app.handle_command(AppCommand::SetTelemetryEnabled(false), 310_000, &mut hw, &mut sink)
        .unwrap();
    assert!(!app.poll_telemetry(10_000_000, &mut sink));

    let last = sink
        .events
        .iter()
        .rev()
        .find_map(|e| match e {
            AppEvent::Telemetry(t) => Some(*t),
            _ => None,
        })
        .unwrap();
    assert_eq!(last.timestamp, 310_000);
    assert_eq!(last.ph_level, 6.0);
    assert!(last.water_level);
}

#[test]
fn tick_count_tracks_ticks() {
    let (mut app, mut hw, mut sink) = make_app();
    for t in 0..5 {
        app.tick(t * 1_000, &mut hw, &mut sink);
    }
    assert_eq!(app.tick_count(), 5);
}
