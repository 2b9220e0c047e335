//! Application core — pure domain logic, zero I/O.
//!
//! Loop orchestration, task callbacks and outbound events for the
//! security monitor. All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
pub mod tasks;
