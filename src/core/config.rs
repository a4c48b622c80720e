//! Engine configuration
//!
//! All tunables are read from environment variables with sensible defaults,
//! so an embedding application can run the engine with zero configuration.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.7.0
//!
//! ## Changelog
//! - 1.1.0: Added suggestion check interval and cooldown
//! - 1.0.0: Initial implementation with poll interval and lookback window

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Engine configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level filter passed to env_logger (e.g. "info", "debug")
    pub log_level: String,
    /// Seconds between due-reminder poll ticks
    pub poll_interval_secs: u64,
    /// Lookback window in seconds: reminders due earlier than
    /// `now - lookback` are treated as missed and never delivered
    pub due_lookback_secs: u64,
    /// Seconds between proactive suggestion checks
    pub suggestion_interval_secs: u64,
    /// Minimum seconds between two surfaced suggestions
    pub suggestion_cooldown_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            poll_interval_secs: 30,
            due_lookback_secs: 300,
            suggestion_interval_secs: 600,
            suggestion_cooldown_secs: 1800,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, honoring a `.env`
    /// file in the working directory when one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Config::default();

        Ok(Config {
            log_level: env::var("COMPANION_LOG_LEVEL").unwrap_or(defaults.log_level),
            poll_interval_secs: parse_var("REMINDER_POLL_INTERVAL_SECS", defaults.poll_interval_secs)?,
            due_lookback_secs: parse_var("REMINDER_LOOKBACK_SECS", defaults.due_lookback_secs)?,
            suggestion_interval_secs: parse_var(
                "SUGGESTION_CHECK_INTERVAL_SECS",
                defaults.suggestion_interval_secs,
            )?,
            suggestion_cooldown_secs: parse_var(
                "SUGGESTION_COOLDOWN_SECS",
                defaults.suggestion_cooldown_secs,
            )?,
        })
    }

    /// Poll tick period as a std Duration (for tokio timers)
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Due-window lookback as a chrono Duration (for timestamp arithmetic)
    pub fn due_lookback(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.due_lookback_secs as i64)
    }

    /// Suggestion check period as a std Duration (for tokio timers)
    pub fn suggestion_interval(&self) -> Duration {
        Duration::from_secs(self.suggestion_interval_secs)
    }

    /// Suggestion cooldown as a chrono Duration (for timestamp arithmetic)
    pub fn suggestion_cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.suggestion_cooldown_secs as i64)
    }
}

/// Parse an optional env var, falling back to a default when unset
fn parse_var(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{name} must be a non-negative integer, got {raw:?}")),
        Err(_) => Ok(default),
    }
}
