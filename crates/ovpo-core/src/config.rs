//! # Environment Configuration
//!
//! OVPO services are configured entirely through environment variables.
//! Each binary assembles its own config struct with [`env_or`]; malformed
//! values abort startup with a [`ConfigError`] instead of silently falling
//! back to defaults.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error raised while reading configuration from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but its value could not be parsed.
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        /// Environment variable name.
        key: String,
        /// The raw value found in the environment.
        value: String,
        /// Parser error message.
        reason: String,
    },
}

/// Output format for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected 'pretty' or 'json'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Read `key` from the environment, parsing it as `T`.
///
/// Unset or empty variables yield `default`.
pub fn env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    parse_or(key, std::env::var(key).ok(), default)
}

/// Parse an optional raw value, the testable half of [`env_or`].
pub fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(value) if !value.trim().is_empty() => {
            value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key: key.to_string(),
                value: value.clone(),
                reason: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}
