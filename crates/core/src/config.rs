//! Environment variable parsing shared by the engine, API and worker
//! configuration structs.

use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Parse a raw value for `var`.
pub fn parse_value<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a boolean flag: `1/true/yes/on` or `0/false/no/off`.
pub fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

/// Read `var`, falling back to `default` when unset.
pub fn env_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(var) {
        Ok(raw) => parse_value(var, &raw),
        Err(_) => Ok(default),
    }
}

pub fn env_required(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::Missing(var))
}

pub fn env_flag(var: &'static str) -> Result<bool, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => parse_flag(var, &raw),
        Err(_) => Ok(false),
    }
}

/// Comma-separated list, blank entries dropped.
pub fn env_list(var: &'static str, default: &str) -> Vec<String> {
    std::env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_numbers() {
        assert_eq!(parse_value::<u64>("SWEEP_INTERVAL_SECS", " 60 ").unwrap(), 60);
        assert_matches!(
            parse_value::<u16>("PORT", "http"),
            Err(ConfigError::Invalid { var: "PORT", .. })
        );
    }

    #[test]
    fn parses_flags() {
        assert!(parse_flag("RUN_SCHEDULER", "TRUE").unwrap());
        assert!(parse_flag("RUN_SCHEDULER", "on").unwrap());
        assert!(!parse_flag("RUN_SCHEDULER", "0").unwrap());
        assert!(parse_flag("RUN_SCHEDULER", "maybe").is_err());
    }

    #[test]
    fn invalid_message_names_variable() {
        let err = parse_value::<i64>("SWEEP_BATCH_SIZE", "lots").unwrap_err();
        assert!(err.to_string().starts_with("SWEEP_BATCH_SIZE has invalid value 'lots'"));
    }
}
