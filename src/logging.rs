//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `SITETASK_LOG` environment variable (e.g. "info", "debug")
//! 2. `debug` when running with `--verbose`
//! 3. default to `warn`
//!
//! Diagnostics go to stderr so they never mix with generator output.

use crate::runner::Verbosity;
use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::fmt;

/// Environment variable that overrides the log level
pub const LOG_ENV: &str = "SITETASK_LOG";

/// Initialise the global logging subscriber. Call once at startup.
pub fn init_logging(verbosity: Verbosity) -> Result<()> {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| parse_level_str(&s))
        .unwrap_or_else(|| default_level(verbosity));

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

fn default_level(verbosity: Verbosity) -> Level {
    match verbosity {
        Verbosity::Silent => Level::ERROR,
        Verbosity::Quiet | Verbosity::Normal => Level::WARN,
        Verbosity::Verbose => Level::DEBUG,
    }
}

fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
