//! Controller — the hexagonal core.
//!
//! [`Controller`] owns the state machine and its shared context and runs
//! one cooperative loop iteration per [`run_once`](Controller::run_once)
//! call. All I/O flows through port traits injected at call sites, so the
//! whole controller is testable with mock adapters.
//!
//! ```text
//!  KeypadPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  SensorPort ──▶ │          Controller          │
//!                 │ keys · tasks · FSM · clear   │
//!  OutputPort ◀── └──────────────────────────────┘
//! ```
//!
//! One iteration, strictly sequential:
//!
//! 1. scan the keypad and hand a new key to the current state's handler,
//! 2. run due periodic tasks (sensor polls, timers),
//! 3. evaluate the state machine once (at most one transition),
//! 4. clear the input register, reporting any unconsumed signal,
//! 5. push changed outputs to the hardware.

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::error::Result;
use crate::fsm::context::{FsmContext, OutputCommands};
use crate::fsm::states::build_state_machine;
use crate::fsm::{StateId, StateMachine};

use super::events::AppEvent;
use super::ports::{EventSink, KeypadPort, OutputPort, SensorPort};
use super::tasks::TaskDispatch;

// ───────────────────────────────────────────────────────────────
// Counters
// ───────────────────────────────────────────────────────────────

/// Loop statistics exposed for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopCounters {
    pub iterations: u64,
    pub transitions: u64,
    /// Signals cleared without being consumed by the fired transition.
    pub dropped_signals: u64,
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller {
    fsm: StateMachine<FsmContext>,
    ctx: FsmContext,
    counters: LoopCounters,
    /// Last outputs pushed to the hardware; `None` forces a full refresh.
    applied: Option<OutputCommands>,
    last_faults: u8,
}

impl Controller {
    /// Validate the configuration and build the state machine.
    ///
    /// Does **not** start the machine; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Result<Self> {
        config.validate()?;
        let fsm = build_state_machine()?;
        Ok(Self {
            fsm,
            ctx: FsmContext::new(config),
            counters: LoopCounters::default(),
            applied: None,
            last_faults: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter the initial state (Idle).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.state()));
        info!("Controller started in {:?}", self.fsm.state());
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one loop iteration at time `now_ms`.
    ///
    /// `hw` satisfies every port at once, which avoids juggling several
    /// mutable borrows of the same adapter.
    pub fn run_once(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + KeypadPort + OutputPort),
        sink: &mut impl EventSink,
    ) {
        self.counters.iterations += 1;
        self.ctx.now_ms = now_ms;

        // 1. Keypad
        if let Some(key) = hw.read_key() {
            self.handle_key(key, sink);
        }

        // 2. Periodic tasks
        self.run_tasks(now_ms, &mut *hw);

        // 3. State machine
        let before = self.fsm.state();
        let fired = self.fsm.update(&mut self.ctx);
        if let Some(t) = fired {
            self.counters.transitions += 1;
            sink.emit(&AppEvent::StateChanged {
                from: t.from,
                to: t.to,
            });
            if t.to == StateId::Alarm {
                if let Some(cause) = self.ctx.alarm_cause {
                    sink.emit(&AppEvent::AlarmRaised(cause));
                }
            }
        }

        // 4. Consume-or-drop. A cycle hand-over does not consume a sensor
        // signal raised on the same tick.
        let pending = self.ctx.input.clear();
        if !pending.is_none() && !fired.is_some_and(|t| t.consumes(pending)) {
            self.counters.dropped_signals += 1;
            debug!("Input {:?} dropped in {}", pending, before.name());
            sink.emit(&AppEvent::InputDropped {
                state: before,
                signal: pending,
            });
        }

        self.report_faults(sink);

        // 5. Outputs
        self.apply_outputs(&mut *hw);
    }

    fn handle_key(&mut self, key: crate::drivers::keypad::Key, sink: &mut impl EventSink) {
        let failures_before = self.ctx.password.failed_attempts();
        self.fsm.handle_key(&mut self.ctx, key);
        let failures = self.ctx.password.failed_attempts();

        if failures > failures_before {
            let max = self.ctx.config.max_failed_attempts;
            sink.emit(&AppEvent::PasswordRejected {
                attempts: failures,
                max,
            });
            if failures >= max {
                sink.emit(&AppEvent::LockedOut);
            }
        }
    }

    fn run_tasks(&mut self, now_ms: u64, hw: &mut impl SensorPort) {
        let ctx = &mut self.ctx;
        let mut dispatch = TaskDispatch {
            hw,
            config: &ctx.config,
            input: &mut ctx.input,
            sensors: &mut ctx.sensors,
            outputs: &mut ctx.outputs,
            alarm_cause: ctx.alarm_cause,
            alarm_tone_high: &mut ctx.alarm_tone_high,
        };
        ctx.tasks.update(now_ms, &mut dispatch);
    }

    fn report_faults(&mut self, sink: &mut impl EventSink) {
        let faults = self.ctx.sensors.faults;
        if faults == self.last_faults {
            return;
        }
        if faults == 0 {
            info!("Sensor faults cleared");
            sink.emit(&AppEvent::SensorRecovered);
        } else {
            warn!("Sensor fault flags=0b{:04b}", faults);
            sink.emit(&AppEvent::SensorFault(faults));
        }
        self.last_faults = faults;
    }

    /// Push output commands to the hardware, skipping unchanged ones.
    fn apply_outputs(&mut self, hw: &mut impl OutputPort) {
        let cmds = &self.ctx.outputs;
        let prev = self.applied.as_ref();

        if prev.is_none_or(|p| p.display != cmds.display) {
            hw.show(&cmds.display);
        }
        if prev.is_none_or(|p| p.led_on != cmds.led_on) {
            hw.set_led(cmds.led_on);
        }
        if prev.is_none_or(|p| p.buzzer_hz != cmds.buzzer_hz) {
            hw.set_buzzer(cmds.buzzer_hz);
        }
        self.applied = Some(cmds.clone());
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current state.
    pub fn state(&self) -> StateId {
        self.fsm.state()
    }

    /// Read-only view of the shared context.
    pub fn context(&self) -> &FsmContext {
        &self.ctx
    }

    pub fn counters(&self) -> LoopCounters {
        self.counters
    }

    /// Signals overwritten before the machine consumed them.
    pub fn overwritten_signals(&self) -> u32 {
        self.ctx.input.overwrites()
    }

    pub fn failed_attempts(&self) -> u8 {
        self.ctx.password.failed_attempts()
    }

    /// Current sensor fault bitmask (0 = healthy).
    pub fn fault_flags(&self) -> u8 {
        self.ctx.sensors.faults
    }
}
