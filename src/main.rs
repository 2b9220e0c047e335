//! Secmon — host simulator entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter<Sim*>   LogEventSink   env_logger      Clock  │
//! │  (Sensor+Keypad+Output)  (EventSink)    (log backend)          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  FSM · Scheduler · Input register                      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `secmon-sim [config.json]`. Type keypad characters or sensor
//! commands on stdin (see `adapters::sim`). `SECMON_LOG` takes an
//! `env_logger` filter, `info` by default.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use env_logger::{Builder, Env};
use log::{info, warn};

use secmon::adapters::log_sink::LogEventSink;
use secmon::adapters::sim;
use secmon::adapters::time::MonotonicClock;
use secmon::app::service::Controller;
use secmon::config::SystemConfig;
use secmon::sensors::sim::SimInputs;

const LOG_ENV: &str = "SECMON_LOG";
const DEFAULT_LOG_FILTER: &str = "info";

fn load_config(path: Option<&Path>) -> Result<SystemConfig> {
    let Some(path) = path else {
        info!("No config file given, using defaults");
        return Ok(SystemConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: SystemConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!("Config loaded from {}", path.display());
    Ok(config)
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    Builder::from_env(Env::new().filter_or(LOG_ENV, DEFAULT_LOG_FILTER))
        .format_timestamp_millis()
        .try_init()
        .context("installing logger")?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Secmon simulator v{:<18}║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (startup only) ───────────────────────
    let config_path = std::env::args_os().nth(1);
    let config = load_config(config_path.as_deref().map(Path::new))?;
    let loop_period = Duration::from_millis(u64::from(config.control_loop_interval_ms));
    let mut controller = Controller::new(config).context("invalid configuration")?;

    // ── 3. Simulated board ────────────────────────────────────
    let inputs = Arc::new(SimInputs::default());
    let (key_tx, key_rx) = mpsc::channel();
    let quit = Arc::new(AtomicBool::new(false));
    let reader = sim::spawn_stdin_reader(inputs.clone(), key_tx, quit.clone())
        .context("spawning stdin reader")?;
    let mut hw = sim::build_hardware(inputs, key_rx);

    // ── 4. Controller ─────────────────────────────────────────
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();
    controller.start(&mut sink);

    // ── 5. Control loop ───────────────────────────────────────
    while !quit.load(Ordering::Relaxed) {
        controller.run_once(clock.uptime_ms(), &mut hw, &mut sink);
        std::thread::sleep(loop_period);
    }

    let counters = controller.counters();
    info!(
        "Shutting down after {}s: {} iterations, {} transitions, {} dropped, {} overwritten, {} events",
        clock.uptime_secs(),
        counters.iterations,
        counters.transitions,
        counters.dropped_signals,
        controller.overwritten_signals(),
        sink.emitted()
    );
    if reader.join().is_err() {
        warn!("stdin reader panicked");
    }
    Ok(())
}
