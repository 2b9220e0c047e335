//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern in Rust: a fixed state enum, a transition
//! list registered once at startup, and per-state action slots.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Transitions (registration order)     Per-state slots         │
//! │  ┌─────────┬─────────┬───────────┐    ┌─────────┬──────────┐  │
//! │  │ from    │ to      │ guard     │    │ entry   │ fn(ctx)  │  │
//! │  ├─────────┼─────────┼───────────┤    │ exit    │ fn(ctx)  │  │
//! │  │ StateId │ StateId │ fn(&Sig)  │    │ on_key  │ fn(ctx,k)│  │
//! │  │  ...    │  ...    │  ...      │    └─────────┴──────────┘  │
//! │  └─────────┴─────────┴───────────┘                            │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each `update()` walks the transitions leaving the **current** state in
//! registration order and fires the first whose guard returns `true`:
//! `exit(from)` → current = `to` → `entry(to)`, all before `update()`
//! returns. If two guards could match in the same tick, the one registered
//! first wins; this ordering is part of the contract.
//!
//! Guards receive a [`Signals`] snapshot by shared reference and cannot
//! touch hardware or the context.

pub mod context;
pub mod states;

use heapless::Vec;
use log::{debug, info};

use crate::drivers::keypad::Key;
use crate::error::FsmError;
use crate::events::InputSignal;
use context::Signals;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    /// Password prompt.
    Idle = 0,
    Locked = 1,
    EnvironmentalMonitoring = 2,
    EventMonitoring = 3,
    Alarm = 4,
}

impl StateId {
    /// Total number of states, used to size the slot arrays.
    pub const COUNT: usize = 5;

    pub const ALL: [StateId; Self::COUNT] = [
        Self::Idle,
        Self::Locked,
        Self::EnvironmentalMonitoring,
        Self::EventMonitoring,
        Self::Alarm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Locked => "Locked",
            Self::EnvironmentalMonitoring => "EnvironmentalMonitoring",
            Self::EventMonitoring => "EventMonitoring",
            Self::Alarm => "Alarm",
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Pure predicate over the signal snapshot.
pub type GuardFn = fn(&Signals) -> bool;

/// Entry / exit action. Runs exactly once per transition.
pub type ActionFn<C> = fn(&mut C);

/// Per-iteration keypad handler for the current state.
pub type KeyHandlerFn<C> = fn(&mut C, Key);

/// Contexts the engine can build a guard snapshot from.
pub trait SignalSource {
    fn signals(&self) -> Signals;
}

/// One directed edge of the state graph.
#[derive(Clone, Copy)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
    pub guard: GuardFn,
}

impl Transition {
    /// Whether this edge fires on `input` alone, without the cycle flag.
    /// A pending signal that the fired edge does not consume was lost.
    pub fn consumes(&self, input: InputSignal) -> bool {
        !input.is_none()
            && (self.guard)(&Signals {
                input,
                cycle_elapsed: false,
            })
    }
}

impl core::fmt::Debug for Transition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} -> {}", self.from.name(), self.to.name())
    }
}

/// Transition table capacity.
pub const MAX_TRANSITIONS: usize = 16;

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct StateMachine<C> {
    current: StateId,
    transitions: Vec<Transition, MAX_TRANSITIONS>,
    on_enter: [Option<ActionFn<C>>; StateId::COUNT],
    on_exit: [Option<ActionFn<C>>; StateId::COUNT],
    on_key: [Option<KeyHandlerFn<C>>; StateId::COUNT],
    /// Set by `start()`; registration is rejected afterwards.
    sealed: bool,
    transitions_fired: u64,
}

impl<C> StateMachine<C> {
    pub fn new(initial: StateId) -> Self {
        Self {
            current: initial,
            transitions: Vec::new(),
            on_enter: [None; StateId::COUNT],
            on_exit: [None; StateId::COUNT],
            on_key: [None; StateId::COUNT],
            sealed: false,
            transitions_fired: 0,
        }
    }

    // -- Registration (startup only) --

    pub fn add_transition(
        &mut self,
        from: StateId,
        to: StateId,
        guard: GuardFn,
    ) -> Result<(), FsmError> {
        self.check_open()?;
        self.transitions
            .push(Transition { from, to, guard })
            .map_err(|_| FsmError::TableFull)
    }

    /// Register the entry action; replaces any previous one.
    pub fn set_entry_action(&mut self, state: StateId, action: ActionFn<C>) -> Result<(), FsmError> {
        self.check_open()?;
        self.on_enter[state as usize] = Some(action);
        Ok(())
    }

    /// Register the exit action; replaces any previous one.
    pub fn set_exit_action(&mut self, state: StateId, action: ActionFn<C>) -> Result<(), FsmError> {
        self.check_open()?;
        self.on_exit[state as usize] = Some(action);
        Ok(())
    }

    pub fn set_key_handler(
        &mut self,
        state: StateId,
        handler: KeyHandlerFn<C>,
    ) -> Result<(), FsmError> {
        self.check_open()?;
        self.on_key[state as usize] = Some(handler);
        Ok(())
    }

    fn check_open(&self) -> Result<(), FsmError> {
        if self.sealed {
            Err(FsmError::Sealed)
        } else {
            Ok(())
        }
    }

    // -- Lifecycle --

    /// Seal the tables and run the entry action of the initial state.
    /// Call once, before the first `update()`.
    pub fn start(&mut self, ctx: &mut C) {
        self.sealed = true;
        info!(
            "FSM starting in state: {} ({} transitions)",
            self.current.name(),
            self.transitions.len()
        );
        if let Some(enter) = self.on_enter[self.current as usize] {
            enter(ctx);
        }
    }

    /// Force the current state, optionally running the exit action of the
    /// old state and the entry action of the new one.
    pub fn set_state(&mut self, state: StateId, run_exit: bool, run_entry: bool, ctx: &mut C) {
        info!("FSM forced: {} -> {}", self.current.name(), state.name());
        if run_exit {
            if let Some(exit) = self.on_exit[self.current as usize] {
                exit(ctx);
            }
        }
        self.current = state;
        if run_entry {
            if let Some(enter) = self.on_enter[state as usize] {
                enter(ctx);
            }
        }
    }

    /// Dispatch a key to the current state's handler, if it has one.
    pub fn handle_key(&mut self, ctx: &mut C, key: Key) {
        match self.on_key[self.current as usize] {
            Some(handler) => handler(ctx, key),
            None => debug!("FSM: key '{}' ignored in {}", key.as_char(), self.current.name()),
        }
    }

    // -- Queries --

    /// The current state's identity.
    pub fn state(&self) -> StateId {
        self.current
    }

    /// Outgoing transitions of `state`, in registration order.
    pub fn transitions_from(&self, state: StateId) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().filter(move |t| t.from == state)
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Total transitions fired by `update()` since startup.
    pub fn transitions_fired(&self) -> u64 {
        self.transitions_fired
    }

    fn fire(&mut self, t: Transition, ctx: &mut C) {
        info!("FSM transition: {} -> {}", t.from.name(), t.to.name());

        if let Some(exit) = self.on_exit[t.from as usize] {
            exit(ctx);
        }

        self.current = t.to;
        self.transitions_fired += 1;

        if let Some(enter) = self.on_enter[t.to as usize] {
            enter(ctx);
        }
    }
}

impl<C: SignalSource> StateMachine<C> {
    /// Evaluate the current state's transitions once.
    ///
    /// Returns the transition that fired, or `None` when no guard matched
    /// (in which case no action ran and the state is unchanged).
    pub fn update(&mut self, ctx: &mut C) -> Option<Transition> {
        let signals = ctx.signals();
        let current = self.current;
        let fired = self
            .transitions
            .iter()
            .find(|t| t.from == current && (t.guard)(&signals))
            .copied()?;
        self.fire(fired, ctx);
        Some(fired)
    }
}
