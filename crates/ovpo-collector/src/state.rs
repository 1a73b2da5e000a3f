//! Application state and configuration for the collector service.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ovpo_core::config::{env_or, ConfigError};
use ovpo_core::LogFormat;
use ovpo_schema::SchemaValidator;

use crate::gate::AcceptanceGate;
use crate::ports::{BatchQueue, IdempotencyStore};

/// Collector configuration, read from `OVPO_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `OVPO_COLLECTOR_PORT`.
    pub port: u16,
    /// `OVPO_SCHEMAS_ROOT`; the versioned directory lives beneath it.
    pub schemas_root: PathBuf,
    /// `OVPO_ENQUEUE_TIMEOUT_MS`; bound on each collaborator call.
    pub collaborator_timeout: Duration,
    /// `OVPO_LOG_FORMAT`.
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            schemas_root: PathBuf::from("schemas"),
            collaborator_timeout: Duration::from_millis(2000),
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            port: env_or("OVPO_COLLECTOR_PORT", defaults.port)?,
            schemas_root: env_or("OVPO_SCHEMAS_ROOT", defaults.schemas_root)?,
            collaborator_timeout: Duration::from_millis(env_or(
                "OVPO_ENQUEUE_TIMEOUT_MS",
                2000u64,
            )?),
            log_format: env_or("OVPO_LOG_FORMAT", defaults.log_format)?,
        })
    }
}

/// Optional downstream collaborators. Both absent by default.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub queue: Option<Arc<dyn BatchQueue>>,
    pub idempotency: Option<Arc<dyn IdempotencyStore>>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("queue", &self.queue.is_some())
            .field("idempotency", &self.idempotency.is_some())
            .finish()
    }
}

/// Shared state for every collector handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// Schema store built once at startup.
    pub validator: Arc<SchemaValidator>,
    pub collaborators: Collaborators,
}

impl AppState {
    pub fn new(config: AppConfig, validator: Arc<SchemaValidator>) -> Self {
        Self {
            config,
            validator,
            collaborators: Collaborators::default(),
        }
    }

    pub fn with_queue(mut self, queue: Arc<dyn BatchQueue>) -> Self {
        self.collaborators.queue = Some(queue);
        self
    }

    pub fn with_idempotency_store(mut self, store: Arc<dyn IdempotencyStore>) -> Self {
        self.collaborators.idempotency = Some(store);
        self
    }

    /// Gate bound to this state's validator and collaborators.
    pub fn gate(&self) -> AcceptanceGate<'_> {
        AcceptanceGate::new(
            &self.validator,
            &self.collaborators,
            self.config.collaborator_timeout,
        )
    }
}
