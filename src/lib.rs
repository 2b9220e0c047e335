//! Secmon controller library.
//!
//! Password-gated security monitor: a five-state machine that cycles
//! between environmental and event monitoring, raises alarms, and locks
//! out after repeated wrong passwords. Exposes the pure-logic modules for
//! integration testing; all I/O sits behind the port traits in
//! [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod fsm;
pub mod scheduler;
pub mod sensors;
