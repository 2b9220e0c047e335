//! Device drivers: keypad, display frame, status LED, buzzer.

pub mod buzzer;
pub mod display;
pub mod keypad;
pub mod status_led;
