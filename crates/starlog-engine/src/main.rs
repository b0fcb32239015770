//! Engine binary for Starlog.
//!
//! Loads configuration, initializes logging, and plays one profile on
//! autopilot with the rule-based advisor, committing every applied action
//! to the profile's save file and logbook.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `starlog-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Reconcile the save file with the profile's logbook
//! 4. Run the autopilot
//! 5. Log the result

mod error;

use std::path::Path;

use starlog_core::config::{CONFIG_FILE, LoggingConfig};
use starlog_core::runner::{self, AutopilotEndReason};
use starlog_core::{Engine, StarlogConfig, StubAdvisor};
use starlog_world::sectors;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config_path = Path::new(CONFIG_FILE);
    let found = config_path.exists();
    let config = load_config(config_path, found)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("starlog-engine starting");
    if !found {
        info!("Config file not found, using defaults");
    }
    info!(
        data_dir = %config.storage.data_dir.display(),
        profile = %config.autopilot.profile,
        max_steps = config.autopilot.max_steps,
        snapshot_interval_days = config.logging.snapshot_interval_days,
        "Configuration loaded"
    );

    let profile = config.autopilot.profile.clone();
    let max_steps = config.autopilot.max_steps;
    let engine = Engine::new(config);

    // 3. Reconcile the save file with the logbook.
    let state = engine.reconcile(&profile)?;
    info!(
        profile = %profile,
        day = state.day,
        sector = %state.ship.sector,
        known_sectors = ?sectors::list().iter().map(|s| s.name).collect::<Vec<_>>(),
        "Profile ready"
    );

    // 4. Run the autopilot.
    let summary = runner::run_autopilot(&engine, &profile, &StubAdvisor::default(), max_steps)?;

    // 5. Log the result.
    runner::log_autopilot_end(&summary);
    if summary.end_reason == AutopilotEndReason::GameOver {
        warn!(profile = %profile, day = summary.final_state.day, "Ship lost");
    }
    Ok(())
}

/// Load the engine configuration.
///
/// Falls back to defaults (with environment overrides) when the file does
/// not exist.
fn load_config(path: &Path, found: bool) -> Result<StarlogConfig, EngineError> {
    if found {
        Ok(StarlogConfig::from_file(path)?)
    } else {
        let mut config = StarlogConfig::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
