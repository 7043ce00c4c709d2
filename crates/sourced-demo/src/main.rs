//! Demo binary for the event-sourced user aggregate.
//!
//! Runs a fixed set of scenarios against a seed user and prints one JSON
//! report per scenario. Exits non-zero if any scenario fails.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `sourced-config.yaml` (or `SOURCED_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Run the scenarios: valid change, rejected change, replay, raw replay,
//!    concurrent writers
//! 4. Print the reports

mod config;
mod error;
mod scenario;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigSource, DEFAULT_CONFIG_PATH, DemoConfig};
use crate::error::DemoError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, a scenario cannot
/// run, or any scenario reports a failure.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config comes first so it can pick the log level and format.
    let (config, source) = load_config().context("loading configuration")?;
    init_tracing(&config);

    info!("sourced-demo starting");
    match &source {
        ConfigSource::File(path) => info!(path = %path.display(), "Config file read"),
        ConfigSource::Defaults => {
            info!(path = DEFAULT_CONFIG_PATH, "Config file not found, using defaults");
        }
    }
    info!(
        seed_user = %config.seed.user_id(),
        unknown_event_policy = config.replay.unknown_event_policy.as_str(),
        min_name_len = config.validation.min_name_len,
        max_name_len = config.validation.max_name_len,
        writers = config.concurrency.writers,
        "Configuration loaded"
    );

    let reports = scenario::run_all(&config)
        .await
        .context("running scenarios")?;

    for report in &reports {
        println!("{}", serde_json::to_string_pretty(report)?);
    }

    let failed: Vec<&str> = reports
        .iter()
        .filter(|r| !r.passed)
        .map(|r| r.name)
        .collect();
    if !failed.is_empty() {
        anyhow::bail!("scenarios failed: {}", failed.join(", "));
    }

    info!(scenarios = reports.len(), "All scenarios passed");
    Ok(())
}

/// Load configuration from the file named by `SOURCED_CONFIG`, or from
/// `sourced-config.yaml` in the working directory.
///
/// Only a missing default file falls back to built-in defaults; a missing
/// `SOURCED_CONFIG` file is an error.
fn load_config() -> Result<(DemoConfig, ConfigSource), DemoError> {
    Ok(DemoConfig::load(|key| std::env::var(key).ok())?)
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(config: &DemoConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
