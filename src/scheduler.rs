//! Periodic task engine.
//!
//! Decouples sensor polling and timeouts from the control loop cadence.
//! The scheduler notifies a [`SchedulerDelegate`] when a task fires; the
//! controller implements the delegate to poll sensors and deposit input
//! signals.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        Task table                             │
//! │                                                               │
//! │  ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │
//! │  │ Sensor    │  │ Cycle     │  │ Lockout   │  │ Blink /   │   │
//! │  │ pollers   │  │ timers    │  │ timer     │  │ banner    │   │
//! │  │ (repeat)  │  │ (one-shot)│  │ (one-shot)│  │           │   │
//! │  └─────┬─────┘  └─────┬─────┘  └─────┬─────┘  └─────┬─────┘   │
//! │        ▼              ▼              ▼              ▼         │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │                 SchedulerDelegate                       │  │
//! │  │      (controller polls sensors / sets input signal)     │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! A single [`PeriodicTask`] type covers both behaviours: with
//! `repeat = true` it re-arms after every fire, with `repeat = false` it
//! deactivates itself after the first fire and stays inactive until the
//! next `start()`.

use crate::app::ports::SchedulerDelegate;
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════
//  Task identity
// ═══════════════════════════════════════════════════════════════

/// Every timer the controller owns. Indexes the fixed task table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TaskId {
    /// Temperature + humidity sampling (environmental monitoring).
    ClimatePoll = 0,
    /// Light level sampling (environmental monitoring).
    LightPoll = 1,
    /// Motion + magnetic field sampling (event monitoring).
    MotionPoll = 2,
    /// Environmental → event monitoring hand-over.
    EnvironmentCycle = 3,
    /// Event → environmental monitoring hand-over.
    EventCycle = 4,
    /// Lockout release.
    LockoutTimer = 5,
    /// LED blink while locked out.
    LockedBlink = 6,
    /// LED blink + tone alternation during an alarm.
    AlarmBlink = 7,
    /// Ends the full-screen alarm banner.
    AlarmBanner = 8,
}

impl TaskId {
    pub const COUNT: usize = 9;

    /// All tasks in slot order; this is also the firing order in one update.
    pub const ALL: [TaskId; Self::COUNT] = [
        Self::ClimatePoll,
        Self::LightPoll,
        Self::MotionPoll,
        Self::EnvironmentCycle,
        Self::EventCycle,
        Self::LockoutTimer,
        Self::LockedBlink,
        Self::AlarmBlink,
        Self::AlarmBanner,
    ];
}

// ═══════════════════════════════════════════════════════════════
//  Periodic task
// ═══════════════════════════════════════════════════════════════

/// A single timer entry.
#[derive(Debug, Clone)]
pub struct PeriodicTask {
    /// Human-readable label for logs.
    pub label: &'static str,
    /// Time between start (or last fire) and the next fire.
    pub interval_ms: u32,
    /// Re-arm after firing (`true`) or deactivate (`false`).
    pub repeat: bool,
    enabled: bool,
    /// Baseline for the elapsed-time comparison. `None` while stopped.
    last_fire_ms: Option<u64>,
    fire_count: u32,
}

impl PeriodicTask {
    pub const fn new(label: &'static str, interval_ms: u32, repeat: bool) -> Self {
        Self {
            label,
            interval_ms,
            repeat,
            enabled: false,
            last_fire_ms: None,
            fire_count: 0,
        }
    }

    /// Activate the task with `now_ms` as its baseline.
    ///
    /// Starting an already-active task does nothing: the baseline is kept,
    /// so the task still fires once per interval.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.enabled {
            return false;
        }
        self.enabled = true;
        self.last_fire_ms = Some(now_ms);
        true
    }

    /// Deactivate the task and forget its baseline. No-op when inactive.
    pub fn stop(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.enabled = false;
        self.last_fire_ms = None;
        true
    }

    pub fn is_active(&self) -> bool {
        self.enabled
    }

    /// Number of times this task has fired since startup.
    pub fn fire_count(&self) -> u32 {
        self.fire_count
    }

    /// Check for expiry. Returns `true` when the task fired this call.
    fn poll(&mut self, now_ms: u64) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(last) = self.last_fire_ms else {
            return false;
        };
        if now_ms.saturating_sub(last) < u64::from(self.interval_ms) {
            return false;
        }

        self.fire_count = self.fire_count.wrapping_add(1);
        if self.repeat {
            self.last_fire_ms = Some(now_ms);
        } else {
            self.enabled = false;
            self.last_fire_ms = None;
        }
        true
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Fixed table of tasks indexed by [`TaskId`]. No heap.
pub struct Scheduler {
    tasks: [PeriodicTask; TaskId::COUNT],
}

impl Scheduler {
    /// Build from a task table. All tasks start inactive.
    pub fn new(tasks: [PeriodicTask; TaskId::COUNT]) -> Self {
        Self { tasks }
    }

    pub fn start(&mut self, id: TaskId, now_ms: u64) {
        let task = &mut self.tasks[id as usize];
        if task.start(now_ms) {
            debug!("Scheduler: '{}' started ({}ms)", task.label, task.interval_ms);
        }
    }

    pub fn stop(&mut self, id: TaskId) {
        let task = &mut self.tasks[id as usize];
        if task.stop() {
            debug!("Scheduler: '{}' stopped", task.label);
        }
    }

    /// Stop every task (used when forcing a state without exit actions).
    pub fn stop_all(&mut self) {
        for id in TaskId::ALL {
            self.stop(id);
        }
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.tasks[id as usize].is_active()
    }

    pub fn task(&self, id: TaskId) -> &PeriodicTask {
        &self.tasks[id as usize]
    }

    /// Fire every active task whose interval has elapsed.
    ///
    /// Must be called once per control-loop iteration. Tasks fire in slot
    /// order; a one-shot task is already inactive when its callback runs.
    pub fn update(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        for id in TaskId::ALL {
            let task = &mut self.tasks[id as usize];
            if task.poll(now_ms) {
                if !task.repeat {
                    info!("Scheduler: '{}' one-shot fired after {}ms", task.label, task.interval_ms);
                }
                delegate.on_task_fired(id);
            }
        }
    }

    /// Number of active tasks.
    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_active()).count()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
