//! Concrete transitions, guards, state actions and the task table.
//!
//! ```text
//!            ┌──[TimeExpired: lockout over]── LOCKED
//!            ▼                                  ▲
//!          IDLE ──[SecondaryEvent: 3 strikes]───┘
//!           │  ▲
//!  [TimeExpired: password ok]   [TimeExpired: '#' ack]
//!           ▼  │
//!           │  └──────────────────────────── ALARM
//!           ▼                                ▲    ▲
//!   ENVIRONMENTAL ──[PrimaryThresholdEvent]──┘    │
//!     │       ▲                                   │
//!  [cycle] [cycle]                                │
//!     ▼       │                                   │
//!   EVENT ────┴──────────[SecondaryEvent]─────────┘
//! ```
//!
//! Registration order matters: in both monitoring states the cycle hand-over
//! is registered before the alarm edge. The sensor polls divide the cycle
//! periods, so a poll always runs on the hand-over tick; if it raised a
//! signal, the hand-over still wins and the controller reports the signal as
//! dropped. The condition is only seen again after the next hand-over back
//! into the state that watches it.

use log::{debug, info, warn};

use super::context::{AlarmCause, FsmContext, OutputCommands, SensorSnapshot, Signals};
use super::{StateId, StateMachine};
use crate::config::SystemConfig;
use crate::drivers::display::DisplayFrame;
use crate::drivers::keypad::Key;
use crate::error::FsmError;
use crate::events::InputSignal;
use crate::scheduler::{PeriodicTask, TaskId};

// ═══════════════════════════════════════════════════════════════════════════
//  Builders
// ═══════════════════════════════════════════════════════════════════════════

/// Register every transition and state action. Called once at startup.
pub fn build_state_machine() -> Result<StateMachine<FsmContext>, FsmError> {
    use StateId::*;

    let mut fsm = StateMachine::new(Idle);

    fsm.add_transition(Idle, EnvironmentalMonitoring, time_expired)?;
    fsm.add_transition(Idle, Locked, secondary_event)?;
    fsm.add_transition(Locked, Idle, time_expired)?;
    fsm.add_transition(EnvironmentalMonitoring, EventMonitoring, cycle_elapsed)?;
    fsm.add_transition(EventMonitoring, EnvironmentalMonitoring, cycle_elapsed)?;
    fsm.add_transition(EnvironmentalMonitoring, Alarm, primary_threshold)?;
    fsm.add_transition(EventMonitoring, Alarm, secondary_event)?;
    fsm.add_transition(Alarm, Idle, time_expired)?;

    fsm.set_entry_action(Idle, idle_enter)?;
    fsm.set_key_handler(Idle, idle_key)?;

    fsm.set_entry_action(Locked, locked_enter)?;
    fsm.set_exit_action(Locked, locked_exit)?;

    fsm.set_entry_action(EnvironmentalMonitoring, environment_enter)?;
    fsm.set_exit_action(EnvironmentalMonitoring, environment_exit)?;

    fsm.set_entry_action(EventMonitoring, event_enter)?;
    fsm.set_exit_action(EventMonitoring, event_exit)?;

    fsm.set_entry_action(Alarm, alarm_enter)?;
    fsm.set_exit_action(Alarm, alarm_exit)?;
    fsm.set_key_handler(Alarm, alarm_key)?;

    Ok(fsm)
}

/// Task table in [`TaskId`] slot order. Every task starts inactive.
pub fn build_task_table(config: &SystemConfig) -> [PeriodicTask; TaskId::COUNT] {
    [
        PeriodicTask::new("climate_poll", config.climate_poll_ms, true),
        PeriodicTask::new("light_poll", config.light_poll_ms, true),
        PeriodicTask::new("motion_poll", config.motion_poll_ms, true),
        PeriodicTask::new("environment_cycle", config.environment_cycle_ms, false),
        PeriodicTask::new("event_cycle", config.event_cycle_ms, false),
        PeriodicTask::new("lockout", config.lockout_ms, false),
        PeriodicTask::new("locked_blink", config.locked_blink_ms, true),
        PeriodicTask::new("alarm_blink", config.alarm_blink_ms, true),
        PeriodicTask::new("alarm_banner", config.alarm_banner_ms, false),
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Guards
// ═══════════════════════════════════════════════════════════════════════════

fn time_expired(s: &Signals) -> bool {
    s.input == InputSignal::TimeExpired
}

fn secondary_event(s: &Signals) -> bool {
    s.input == InputSignal::SecondaryEvent
}

fn primary_threshold(s: &Signals) -> bool {
    s.input == InputSignal::PrimaryThresholdEvent
}

fn cycle_elapsed(s: &Signals) -> bool {
    s.cycle_elapsed
}

// ═══════════════════════════════════════════════════════════════════════════
//  Display rendering (shared with the task callbacks)
// ═══════════════════════════════════════════════════════════════════════════

/// Password prompt with one `*` per entered digit.
pub fn render_prompt(entered: usize, frame: &mut DisplayFrame) {
    const MASK: &str = "****";
    frame.set_row(0, "Enter password:");
    frame.set_row(1, &MASK[..entered.min(MASK.len())]);
}

pub fn render_environment(sensors: &SensorSnapshot, frame: &mut DisplayFrame) {
    match sensors.climate {
        Some(c) => frame.set_row_fmt(
            0,
            format_args!("T:{:.1}C H:{:.1}%", c.temperature_c, c.humidity_pct),
        ),
        None => frame.set_row(0, "T:--C H:--%"),
    }
    match sensors.light {
        Some(raw) => frame.set_row_fmt(1, format_args!("Light: {raw}")),
        None => frame.set_row(1, "Light: --"),
    }
}

pub fn render_event(sensors: &SensorSnapshot, frame: &mut DisplayFrame) {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    frame.set_row_fmt(0, format_args!("Motion: {}", yes_no(sensors.motion)));
    frame.set_row_fmt(1, format_args!("Field: {}", yes_no(sensors.magnetic)));
}

/// Persistent alarm message shown once the banner phase is over.
pub fn render_alarm_message(cause: Option<AlarmCause>, frame: &mut DisplayFrame) {
    let top = match cause {
        Some(AlarmCause::Temperature) => "ALARM: TEMP",
        Some(AlarmCause::Intrusion) => "ALARM: INTRUSION",
        None => "ALARM",
    };
    frame.set_row(0, top);
    frame.set_row(1, "Press # to ack");
}

fn render_alarm_banner(cause: Option<AlarmCause>, frame: &mut DisplayFrame) {
    frame.set_row(0, "!!!! ALARM !!!!");
    frame.set_row(
        1,
        match cause {
            Some(AlarmCause::Temperature) => "TEMPERATURE HIGH",
            Some(AlarmCause::Intrusion) => "INTRUSION",
            None => "",
        },
    );
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE: password entry
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.password.clear_buffer();
    ctx.password.reset_failures();
    ctx.outputs = OutputCommands::all_off();
    render_prompt(0, &mut ctx.outputs.display);
    info!("IDLE: awaiting password");
}

fn idle_key(ctx: &mut FsmContext, key: Key) {
    match key {
        Key::Digit(d) => {
            if !ctx.password.push_digit(d) {
                debug!("IDLE: password buffer full, digit dropped");
            }
            render_prompt(ctx.password.entered_len(), &mut ctx.outputs.display);
        }
        Key::Clear => {
            ctx.password.clear_buffer();
            render_prompt(0, &mut ctx.outputs.display);
        }
        Key::Submit => submit_password(ctx),
        Key::Letter(c) => debug!("IDLE: data key '{c}' ignored"),
    }
}

fn submit_password(ctx: &mut FsmContext) {
    if ctx.password.entered_len() == 0 {
        debug!("IDLE: empty submission ignored");
        return;
    }

    let accepted = ctx.password.matches(&ctx.config.password);
    ctx.password.clear_buffer();

    if accepted {
        info!("IDLE: password accepted");
        ctx.password.reset_failures();
        ctx.input.set(InputSignal::TimeExpired);
        return;
    }

    let attempts = ctx.password.record_failure();
    let max = ctx.config.max_failed_attempts;
    warn!("IDLE: wrong password ({attempts}/{max})");

    if attempts >= max {
        ctx.input.set(InputSignal::SecondaryEvent);
    } else {
        let frame = &mut ctx.outputs.display;
        frame.set_row(0, "Wrong password");
        frame.set_row_fmt(1, format_args!("Attempts: {attempts}/{max}"));
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  LOCKED: too many failures, timed release
// ═══════════════════════════════════════════════════════════════════════════

fn locked_enter(ctx: &mut FsmContext) {
    let now = ctx.now_ms;
    ctx.tasks.start(TaskId::LockoutTimer, now);
    ctx.tasks.start(TaskId::LockedBlink, now);

    ctx.outputs.led_on = true;
    ctx.outputs.buzzer_hz = Some(ctx.config.locked_tone_hz);
    ctx.outputs.display = DisplayFrame::blank();
    ctx.outputs.display.set_row(0, "LOCKED");
    ctx.outputs
        .display
        .set_row_fmt(1, format_args!("Wait {}s", ctx.config.lockout_ms.div_ceil(1000)));
    warn!("LOCKED: lockout for {}ms", ctx.config.lockout_ms);
}

fn locked_exit(ctx: &mut FsmContext) {
    ctx.tasks.stop(TaskId::LockoutTimer);
    ctx.tasks.stop(TaskId::LockedBlink);
    ctx.outputs = OutputCommands::all_off();
}

// ═══════════════════════════════════════════════════════════════════════════
//  ENVIRONMENTAL MONITORING: climate + light
// ═══════════════════════════════════════════════════════════════════════════

fn environment_enter(ctx: &mut FsmContext) {
    let now = ctx.now_ms;
    ctx.tasks.start(TaskId::ClimatePoll, now);
    ctx.tasks.start(TaskId::LightPoll, now);
    ctx.tasks.start(TaskId::EnvironmentCycle, now);

    ctx.outputs = OutputCommands::all_off();
    render_environment(&ctx.sensors, &mut ctx.outputs.display);
    info!("ENV: monitoring climate and light");
}

fn environment_exit(ctx: &mut FsmContext) {
    ctx.tasks.stop(TaskId::ClimatePoll);
    ctx.tasks.stop(TaskId::LightPoll);
    ctx.tasks.stop(TaskId::EnvironmentCycle);
    ctx.outputs = OutputCommands::all_off();
}

// ═══════════════════════════════════════════════════════════════════════════
//  EVENT MONITORING: motion + magnetic field
// ═══════════════════════════════════════════════════════════════════════════

fn event_enter(ctx: &mut FsmContext) {
    let now = ctx.now_ms;
    ctx.tasks.start(TaskId::MotionPoll, now);
    ctx.tasks.start(TaskId::EventCycle, now);

    ctx.outputs = OutputCommands::all_off();
    render_event(&ctx.sensors, &mut ctx.outputs.display);
    info!("EVENT: monitoring motion and field");
}

fn event_exit(ctx: &mut FsmContext) {
    ctx.tasks.stop(TaskId::MotionPoll);
    ctx.tasks.stop(TaskId::EventCycle);
    ctx.outputs = OutputCommands::all_off();
}

// ═══════════════════════════════════════════════════════════════════════════
//  ALARM: banner, then persistent message until acknowledged
// ═══════════════════════════════════════════════════════════════════════════

fn alarm_enter(ctx: &mut FsmContext) {
    // The triggering signal is still pending while entry runs.
    ctx.alarm_cause = match ctx.input.signal() {
        InputSignal::PrimaryThresholdEvent => Some(AlarmCause::Temperature),
        InputSignal::SecondaryEvent => Some(AlarmCause::Intrusion),
        _ => None,
    };

    let now = ctx.now_ms;
    ctx.tasks.start(TaskId::AlarmBanner, now);
    ctx.tasks.start(TaskId::AlarmBlink, now);

    ctx.alarm_tone_high = false;
    ctx.outputs.led_on = true;
    ctx.outputs.buzzer_hz = Some(ctx.config.alarm_tones_hz.0);
    render_alarm_banner(ctx.alarm_cause, &mut ctx.outputs.display);
    warn!("ALARM: raised ({:?})", ctx.alarm_cause);
}

fn alarm_key(ctx: &mut FsmContext, key: Key) {
    if key == Key::Submit {
        info!("ALARM: acknowledged");
        ctx.input.set(InputSignal::TimeExpired);
    }
}

fn alarm_exit(ctx: &mut FsmContext) {
    ctx.tasks.stop(TaskId::AlarmBanner);
    ctx.tasks.stop(TaskId::AlarmBlink);
    ctx.alarm_tone_high = false;
    ctx.outputs = OutputCommands::all_off();
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════
