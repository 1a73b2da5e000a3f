//! # Collaborator Ports
//!
//! Downstream collaborators of the acceptance gate. Neither is required:
//! without them the gate validates and acknowledges only. When configured,
//! both run after validation succeeds and each call is bounded by a
//! deadline. Dropping the request future (client disconnect) drops the
//! pending call with it.
//!
//! A key is only kept once its batch is enqueued: if the queue fails
//! after `check_and_set` reported `FirstSeen`, the gate calls `release`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Boxed future returned by port methods, keeping the traits object-safe.
pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Failure of a collaborator call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("no response within {0:?}")]
    DeadlineExceeded(Duration),
}

/// Opaque handle returned by a queue for an enqueued batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueueToken(pub String);

impl fmt::Display for EnqueueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepts validated batches for asynchronous processing.
pub trait BatchQueue: Send + Sync {
    fn enqueue<'a>(
        &'a self,
        batch_id: &'a str,
        payload: &'a Value,
    ) -> PortFuture<'a, Result<EnqueueToken, PortError>>;
}

/// Result of recording an idempotency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdempotencyOutcome {
    /// Key not seen before; it is now recorded.
    FirstSeen,
    /// Key already recorded; the batch must not be enqueued again.
    Duplicate,
}

/// Records `Idempotency-Key` values and reports repeats.
pub trait IdempotencyStore: Send + Sync {
    fn check_and_set<'a>(
        &'a self,
        key: &'a str,
    ) -> PortFuture<'a, Result<IdempotencyOutcome, PortError>>;

    /// Forget a key recorded by `check_and_set` whose batch was never
    /// enqueued, so a retry is processed instead of acknowledged as a
    /// duplicate.
    fn release<'a>(&'a self, key: &'a str) -> PortFuture<'a, Result<(), PortError>>;
}

/// Await `call`, failing with `PortError::DeadlineExceeded` after `deadline`.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, PortError>
where
    F: Future<Output = Result<T, PortError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(PortError::DeadlineExceeded(deadline)),
    }
}

/// Enqueue `payload` on `queue`, bounded by `deadline`.
pub async fn enqueue_with_deadline(
    queue: &dyn BatchQueue,
    batch_id: &str,
    payload: &Value,
    deadline: Duration,
) -> Result<EnqueueToken, PortError> {
    with_deadline(deadline, queue.enqueue(batch_id, payload)).await
}
