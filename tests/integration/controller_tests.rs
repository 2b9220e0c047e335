//! End-to-end scenarios: keypad → tasks → FSM → outputs.
//!
//! Each test drives the controller with a simulated 10 ms loop clock and
//! the recording mock adapter.

use crate::mock_hw::Rig;

use secmon::app::events::{AlarmCause, AppEvent};
use secmon::config::SystemConfig;
use secmon::error::{SensorError, SensorFault};
use secmon::events::InputSignal;
use secmon::fsm::StateId;
use secmon::scheduler::TaskId;

fn screen_row(rig: &Rig, row: usize) -> String {
    rig.hw
        .screen()
        .map(|f| f.row(row).to_owned())
        .unwrap_or_default()
}

// ── Access control ────────────────────────────────────────────

#[test]
fn boots_into_password_prompt() {
    let mut rig = Rig::new();
    rig.step();
    assert_eq!(rig.state(), StateId::Idle);
    assert_eq!(screen_row(&rig, 0), "Enter password:");
    assert!(!rig.hw.led());
    assert_eq!(rig.hw.buzzer(), None);
    assert_eq!(rig.sink.events[0], AppEvent::Started(StateId::Idle));
}

#[test]
fn entered_digits_are_masked() {
    let mut rig = Rig::new();
    rig.press("12");
    assert_eq!(screen_row(&rig, 1), "**");
    rig.press("*");
    assert_eq!(screen_row(&rig, 1), "");
}

#[test]
fn correct_password_starts_environmental_monitoring() {
    let mut rig = Rig::new();
    rig.login();
    let ctx = rig.ctl.context();
    assert!(ctx.tasks.is_active(TaskId::ClimatePoll));
    assert!(ctx.tasks.is_active(TaskId::LightPoll));
    assert!(ctx.tasks.is_active(TaskId::EnvironmentCycle));
    assert_eq!(rig.ctl.failed_attempts(), 0);
    assert!(rig.sink.events.contains(&AppEvent::StateChanged {
        from: StateId::Idle,
        to: StateId::EnvironmentalMonitoring,
    }));
}

#[test]
fn three_wrong_passwords_lock_out() {
    let mut rig = Rig::new();
    rig.press("0000#");
    rig.press("1111#");
    assert_eq!(rig.state(), StateId::Idle);
    rig.press("2222#");

    assert_eq!(rig.state(), StateId::Locked);
    for attempts in 1..=3 {
        assert!(rig
            .sink
            .events
            .contains(&AppEvent::PasswordRejected { attempts, max: 3 }));
    }
    assert_eq!(rig.sink.count(|e| *e == AppEvent::LockedOut), 1);
    assert!(rig.hw.led());
    assert_eq!(rig.hw.buzzer(), Some(1000));
    assert_eq!(screen_row(&rig, 0), "LOCKED");
}

#[test]
fn lockout_releases_after_seven_seconds() {
    let mut rig = Rig::new();
    rig.press("0000#0000#0000#");
    assert_eq!(rig.state(), StateId::Locked);
    let locked_at = rig.last;

    rig.run_through(locked_at + 6990);
    assert_eq!(rig.state(), StateId::Locked);

    rig.step();
    assert_eq!(rig.last, locked_at + 7000);
    assert_eq!(rig.state(), StateId::Idle);
    assert_eq!(rig.ctl.failed_attempts(), 0);
    assert!(!rig.hw.led());
    assert_eq!(rig.hw.buzzer(), None);
    assert_eq!(rig.ctl.context().tasks.active_count(), 0);

    // A fresh set of attempts is available.
    rig.login();
}

#[test]
fn keys_are_ignored_while_locked() {
    let mut rig = Rig::new();
    rig.press("0000#0000#0000#");
    rig.press("1234#");
    assert_eq!(rig.state(), StateId::Locked);
}

#[test]
fn locked_led_blinks() {
    let mut rig = Rig::new();
    rig.press("0000#0000#0000#");
    assert!(rig.hw.led());
    rig.run_for(500);
    assert!(!rig.hw.led());
    rig.run_for(500);
    assert!(rig.hw.led());
}

// ── Monitoring cycle ──────────────────────────────────────────

#[test]
fn monitoring_alternates_between_environment_and_events() {
    let mut rig = Rig::new();
    let env_at = rig.login();

    rig.run_through(env_at + 4990);
    assert_eq!(rig.state(), StateId::EnvironmentalMonitoring);
    rig.step();
    assert_eq!(rig.state(), StateId::EventMonitoring);
    let event_at = rig.last;
    assert!(rig.ctl.context().tasks.is_active(TaskId::MotionPoll));
    assert!(!rig.ctl.context().tasks.is_active(TaskId::ClimatePoll));

    rig.run_through(event_at + 2990);
    assert_eq!(rig.state(), StateId::EventMonitoring);
    rig.step();
    assert_eq!(rig.state(), StateId::EnvironmentalMonitoring);
    assert!(!rig.ctl.context().tasks.is_active(TaskId::MotionPoll));
}

#[test]
fn environment_display_follows_readings() {
    let mut rig = Rig::new();
    let env_at = rig.login();
    rig.hw.set_temperature(24.5);
    rig.run_through(env_at + 500);
    assert_eq!(screen_row(&rig, 0), "T:24.5C H:40.0%");
    assert_eq!(screen_row(&rig, 1), "Light: 512");
}

#[test]
fn keypad_is_inert_during_monitoring() {
    let mut rig = Rig::new();
    rig.login();
    rig.press("0000#");
    assert_eq!(rig.state(), StateId::EnvironmentalMonitoring);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::PasswordRejected { .. })),
        0
    );
}

// ── Alarms ────────────────────────────────────────────────────

#[test]
fn temperature_at_threshold_does_not_alarm() {
    let mut rig = Rig::new();
    rig.hw.set_temperature(30.0);
    let env_at = rig.login();
    rig.run_through(env_at + 4990);
    assert_eq!(rig.state(), StateId::EnvironmentalMonitoring);
}

#[test]
fn temperature_above_threshold_raises_alarm() {
    let mut rig = Rig::new();
    rig.hw.set_temperature(31.0);
    let env_at = rig.login();

    rig.run_through(env_at + 490);
    assert_eq!(rig.state(), StateId::EnvironmentalMonitoring);
    rig.step();
    assert_eq!(rig.state(), StateId::Alarm);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::AlarmRaised(AlarmCause::Temperature)));
    assert_eq!(screen_row(&rig, 0), "!!!! ALARM !!!!");
    assert!(!rig.ctl.context().tasks.is_active(TaskId::ClimatePoll));
}

#[test]
fn alarm_banner_gives_way_to_persistent_message() {
    let mut rig = Rig::new();
    rig.hw.set_temperature(31.0);
    let env_at = rig.login();
    rig.run_through(env_at + 500);
    let alarm_at = rig.last;

    rig.run_through(alarm_at + 1990);
    assert_eq!(screen_row(&rig, 0), "!!!! ALARM !!!!");
    rig.step();
    assert_eq!(screen_row(&rig, 0), "ALARM: TEMP");
    assert_eq!(screen_row(&rig, 1), "Press # to ack");
}

#[test]
fn alarm_can_be_acknowledged_during_banner() {
    let mut rig = Rig::new();
    rig.hw.set_temperature(31.0);
    let env_at = rig.login();
    rig.run_through(env_at + 600);
    assert_eq!(rig.state(), StateId::Alarm);

    rig.press("#");
    assert_eq!(rig.state(), StateId::Idle);
    assert_eq!(screen_row(&rig, 0), "Enter password:");
    assert!(!rig.hw.led());
    assert_eq!(rig.hw.buzzer(), None);
    assert_eq!(rig.ctl.context().tasks.active_count(), 0);
}

#[test]
fn alarm_ignores_keys_other_than_submit() {
    let mut rig = Rig::new();
    rig.hw.set_temperature(31.0);
    let env_at = rig.login();
    rig.run_through(env_at + 500);
    rig.press("1234*");
    assert_eq!(rig.state(), StateId::Alarm);
}

#[test]
fn alarm_alternates_tones() {
    let mut rig = Rig::new();
    rig.hw.set_temperature(31.0);
    let env_at = rig.login();
    rig.run_through(env_at + 500);
    rig.run_for(600);

    let tones = rig.hw.tones_played();
    assert!(tones.contains(&1000));
    assert!(tones.contains(&1500));
}

#[test]
fn motion_during_event_monitoring_raises_alarm() {
    let mut rig = Rig::new();
    let env_at = rig.login();
    rig.run_through(env_at + 5000);
    assert_eq!(rig.state(), StateId::EventMonitoring);

    rig.hw.motion = true;
    rig.run_through(env_at + 5500);
    assert_eq!(rig.state(), StateId::Alarm);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::AlarmRaised(AlarmCause::Intrusion)));
    assert_eq!(screen_row(&rig, 1), "INTRUSION");
}

#[test]
fn magnetic_field_during_event_monitoring_raises_alarm() {
    let mut rig = Rig::new();
    let env_at = rig.login();
    rig.run_through(env_at + 5000);
    rig.hw.magnetic = true;
    rig.run_through(env_at + 5500);
    assert_eq!(rig.state(), StateId::Alarm);
}

#[test]
fn intrusion_on_cycle_tick_is_reported_as_dropped() {
    let mut rig = Rig::new();
    let env_at = rig.login();
    rig.run_through(env_at + 5000);
    assert_eq!(rig.state(), StateId::EventMonitoring);
    let event_at = rig.last;

    rig.run_through(event_at + 2990);
    rig.hw.motion = true;
    rig.step();

    assert_eq!(rig.state(), StateId::EnvironmentalMonitoring);
    assert_eq!(rig.ctl.counters().dropped_signals, 1);
    assert!(rig.sink.events.contains(&AppEvent::InputDropped {
        state: StateId::EventMonitoring,
        signal: InputSignal::SecondaryEvent,
    }));
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlarmRaised(_))), 0);
}

#[test]
fn intrusion_alarm_names_the_cause() {
    let mut rig = Rig::new();
    let env_at = rig.login();
    rig.run_through(env_at + 5000);
    rig.hw.magnetic = true;
    rig.run_through(env_at + 5500);
    let alarm_at = rig.last;
    rig.run_through(alarm_at + 2000);
    assert_eq!(screen_row(&rig, 0), "ALARM: INTRUSION");
}

#[test]
fn motion_is_not_watched_during_environmental_monitoring() {
    let mut rig = Rig::new();
    rig.hw.motion = true;
    let env_at = rig.login();
    rig.run_through(env_at + 4990);
    assert_eq!(rig.state(), StateId::EnvironmentalMonitoring);
}

// ── Sensor faults ─────────────────────────────────────────────

#[test]
fn climate_fault_is_reported_and_recovers() {
    let mut rig = Rig::new();
    let env_at = rig.login();
    rig.hw.climate = Err(SensorError::ReadFailed);
    rig.run_through(env_at + 500);

    assert_eq!(rig.ctl.fault_flags(), SensorFault::Climate.mask());
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::SensorFault(SensorFault::Climate.mask())));
    assert_eq!(screen_row(&rig, 0), "T:--C H:--%");
    assert_eq!(rig.state(), StateId::EnvironmentalMonitoring);

    rig.hw.set_temperature(22.0);
    rig.run_through(env_at + 1000);
    assert_eq!(rig.ctl.fault_flags(), 0);
    assert!(rig.sink.events.contains(&AppEvent::SensorRecovered));
}

// ── Configuration ─────────────────────────────────────────────

#[test]
fn custom_password_and_lockout_are_honoured() {
    let mut config = SystemConfig::default();
    config.password = "4321".try_into().unwrap();
    config.lockout_ms = 1000;
    let mut rig = Rig::with_config(config);

    rig.press("1234#1234#1234#");
    assert_eq!(rig.state(), StateId::Locked);
    let locked_at = rig.last;
    rig.run_through(locked_at + 1000);
    assert_eq!(rig.state(), StateId::Idle);

    rig.press("4321#");
    assert_eq!(rig.state(), StateId::EnvironmentalMonitoring);
}

#[test]
fn counters_track_the_loop() {
    let mut rig = Rig::new();
    let env_at = rig.login();
    rig.run_through(env_at + 5000);
    let counters = rig.ctl.counters();
    assert_eq!(counters.transitions, 2);
    assert_eq!(counters.iterations, (env_at + 5000) / 10 + 1);
}
