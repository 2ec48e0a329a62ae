use std::time::Duration;

use lineup_core::config::{env_or, ConfigError};
use lineup_core::reminders::DEFAULT_REMINDER_INTERVAL_SECS;
use lineup_core::spot_lifecycle::{
    validate_deadline_hours, DEFAULT_DEADLINE_HOURS, DEFAULT_SWEEP_BATCH_SIZE,
    DEFAULT_SWEEP_INTERVAL_SECS,
};

use crate::retry::RetryPolicy;

/// Lifecycle engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub sweep_interval: Duration,
    pub reminder_interval: Duration,
    /// Rows fetched per sweep or reminder scan.
    pub sweep_batch_size: i64,
    /// Confirmation window used when an assignment does not name one.
    pub default_deadline_hours: i64,
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            reminder_interval: Duration::from_secs(DEFAULT_REMINDER_INTERVAL_SECS),
            sweep_batch_size: DEFAULT_SWEEP_BATCH_SIZE,
            default_deadline_hours: DEFAULT_DEADLINE_HOURS,
            retry: RetryPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `SWEEP_INTERVAL_SECS`    | `300`   |
    /// | `REMINDER_INTERVAL_SECS` | `300`   |
    /// | `SWEEP_BATCH_SIZE`       | `500`   |
    /// | `DEFAULT_DEADLINE_HOURS` | `48`    |
    /// | `STORE_RETRY_ATTEMPTS`   | `3`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let sweep_interval_secs: u64 = env_or("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS)?;
        let reminder_interval_secs: u64 =
            env_or("REMINDER_INTERVAL_SECS", DEFAULT_REMINDER_INTERVAL_SECS)?;
        let sweep_batch_size: i64 = env_or("SWEEP_BATCH_SIZE", DEFAULT_SWEEP_BATCH_SIZE)?;
        let default_deadline_hours: i64 = env_or("DEFAULT_DEADLINE_HOURS", DEFAULT_DEADLINE_HOURS)?;
        let retry_attempts: u32 = env_or("STORE_RETRY_ATTEMPTS", defaults.retry.max_retries)?;

        let config = Self {
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            reminder_interval: Duration::from_secs(reminder_interval_secs),
            sweep_batch_size,
            default_deadline_hours,
            retry: defaults.retry.with_max_retries(retry_attempts),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_interval.is_zero() {
            return Err(invalid("SWEEP_INTERVAL_SECS", "0", "must be positive"));
        }
        if self.reminder_interval.is_zero() {
            return Err(invalid("REMINDER_INTERVAL_SECS", "0", "must be positive"));
        }
        if self.sweep_batch_size <= 0 {
            return Err(invalid(
                "SWEEP_BATCH_SIZE",
                &self.sweep_batch_size.to_string(),
                "must be positive",
            ));
        }
        validate_deadline_hours(self.default_deadline_hours).map_err(|e| {
            invalid(
                "DEFAULT_DEADLINE_HOURS",
                &self.default_deadline_hours.to_string(),
                &e.to_string(),
            )
        })
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
