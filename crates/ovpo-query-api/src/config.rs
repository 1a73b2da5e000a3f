//! Query API configuration.

use ovpo_core::config::{env_or, ConfigError};
use ovpo_core::LogFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// `OVPO_QUERY_PORT`.
    pub port: u16,
    /// `OVPO_LOG_FORMAT`.
    pub log_format: LogFormat,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            port: 8081,
            log_format: LogFormat::Pretty,
        }
    }
}

impl QueryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            port: env_or("OVPO_QUERY_PORT", defaults.port)?,
            log_format: env_or("OVPO_LOG_FORMAT", defaults.log_format)?,
        })
    }
}
