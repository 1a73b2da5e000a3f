//! # Ingest Errors
//!
//! Closed set of reasons the acceptance gate rejects a batch. Each kind
//! maps to exactly one HTTP status and a fixed message template; the
//! mapping happens only in [`IntoResponse`].
//!
//! Configuration faults (missing or malformed ingest schema) and
//! collaborator outages are server-side: they are logged with full detail
//! at `error` and answered with a generic `detail`. Everything else is a
//! client fault, logged at `warn` and echoed to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// JSON body of every error response: `{"detail": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub detail: String,
}

/// Gate stage at which a request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Headers,
    ApiKey,
    SchemaVersion,
    Size,
    Body,
    /// Idempotency check and queue handoff after acceptance.
    Handoff,
}

impl IngestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Headers => "headers",
            Self::ApiKey => "api_key",
            Self::SchemaVersion => "schema_version",
            Self::Size => "size",
            Self::Body => "body",
            Self::Handoff => "handoff",
        }
    }
}

/// Reason a batch submission was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// One or more of the required headers is absent or empty.
    #[error("Missing one or more required headers: {}", .0.join(", "))]
    MissingHeader(Vec<&'static str>),

    /// A required header is present but not visible ASCII.
    #[error("Malformed header value (must be visible ASCII): {}", .0.join(", "))]
    MalformedHeader(Vec<&'static str>),

    /// `Authorization` does not start with `Bearer ovpo_sk_`.
    #[error("Invalid API key format. Key must start with 'ovpo_sk_'.")]
    InvalidApiKeyFormat,

    /// `X-OVPO-Schema-Version` is not the supported version.
    #[error("Unsupported schema version '{0}'. Server supports '{supported}'.", supported = ovpo_core::SCHEMA_VERSION)]
    UnsupportedSchemaVersion(String),

    /// `Content-Length` is absent or not a non-negative integer.
    #[error("Content-Length required")]
    MissingContentLength,

    /// Declared body size is over the limit.
    #[error("Payload exceeds 5MB limit. Received: {0} bytes.")]
    PayloadTooLarge(u64),

    /// The body is not JSON or does not satisfy the ingest schema.
    #[error("{0}")]
    SchemaValidationFailed(String),

    /// The ingest schema is missing from the schema directory.
    #[error("ingest schema not found: {0}")]
    SchemaNotFound(String),

    /// The ingest schema (or a schema it references) is malformed.
    #[error("ingest schema is invalid: {0}")]
    SchemaItselfInvalid(String),

    /// The transport failed while the body was being read.
    #[error("Request body could not be read: {0}")]
    BodyUnreadable(String),

    /// The configured batch queue failed or timed out.
    #[error("Batch queue unavailable: {0}")]
    QueueUnavailable(String),

    /// The configured idempotency store failed or timed out.
    #[error("Idempotency store unavailable: {0}")]
    IdempotencyStoreUnavailable(String),
}

impl IngestError {
    /// HTTP status for this error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingHeader(_) | Self::MalformedHeader(_) => StatusCode::BAD_REQUEST,
            Self::InvalidApiKeyFormat => StatusCode::UNAUTHORIZED,
            Self::UnsupportedSchemaVersion(_) => StatusCode::BAD_REQUEST,
            Self::MissingContentLength => StatusCode::LENGTH_REQUIRED,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::SchemaValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::SchemaNotFound(_) | Self::SchemaItselfInvalid(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::BodyUnreadable(_) => StatusCode::BAD_REQUEST,
            Self::QueueUnavailable(_) | Self::IdempotencyStoreUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    /// Stage that produced this error.
    pub fn stage(&self) -> IngestStage {
        match self {
            Self::MissingHeader(_) | Self::MalformedHeader(_) => IngestStage::Headers,
            Self::InvalidApiKeyFormat => IngestStage::ApiKey,
            Self::UnsupportedSchemaVersion(_) => IngestStage::SchemaVersion,
            Self::MissingContentLength | Self::PayloadTooLarge(_) => IngestStage::Size,
            Self::SchemaValidationFailed(_)
            | Self::SchemaNotFound(_)
            | Self::SchemaItselfInvalid(_)
            | Self::BodyUnreadable(_) => IngestStage::Body,
            Self::QueueUnavailable(_) | Self::IdempotencyStoreUnavailable(_) => {
                IngestStage::Handoff
            }
        }
    }

    /// True for faults in the server's own schema deployment.
    pub fn is_configuration_fault(&self) -> bool {
        matches!(self, Self::SchemaNotFound(_) | Self::SchemaItselfInvalid(_))
    }

    /// Message returned to the client. Server-side faults are not detailed.
    pub fn client_detail(&self) -> String {
        match self {
            Self::SchemaNotFound(_) | Self::SchemaItselfInvalid(_) => {
                "Ingest schema configuration error".to_string()
            }
            Self::QueueUnavailable(_) => "Batch queue unavailable".to_string(),
            Self::IdempotencyStoreUnavailable(_) => "Idempotency store unavailable".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = self.status();
        let stage = self.stage().as_str();

        if self.is_configuration_fault() {
            tracing::error!(stage, error = %self, "ingest schema configuration fault");
        } else if status.is_server_error() {
            tracing::error!(stage, error = %self, "ingest handoff failed");
        } else {
            tracing::warn!(stage, status = status.as_u16(), error = %self, "batch rejected");
        }

        let body = ErrorBody {
            detail: self.client_detail(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn message_templates() {
        assert_eq!(
            IngestError::MissingHeader(vec!["Authorization", "Idempotency-Key"]).to_string(),
            "Missing one or more required headers: Authorization, Idempotency-Key"
        );
        assert_eq!(
            IngestError::MalformedHeader(vec!["Idempotency-Key"]).to_string(),
            "Malformed header value (must be visible ASCII): Idempotency-Key"
        );
        assert_eq!(
            IngestError::InvalidApiKeyFormat.to_string(),
            "Invalid API key format. Key must start with 'ovpo_sk_'."
        );
        assert_eq!(
            IngestError::UnsupportedSchemaVersion("0.07".into()).to_string(),
            "Unsupported schema version '0.07'. Server supports '0.08'."
        );
        assert_eq!(
            IngestError::MissingContentLength.to_string(),
            "Content-Length required"
        );
        assert_eq!(
            IngestError::PayloadTooLarge(5_242_881).to_string(),
            "Payload exceeds 5MB limit. Received: 5242881 bytes."
        );
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (IngestError::MissingHeader(vec!["Authorization"]), 400),
            (IngestError::MalformedHeader(vec!["Idempotency-Key"]), 400),
            (IngestError::InvalidApiKeyFormat, 401),
            (IngestError::UnsupportedSchemaVersion("0.07".into()), 400),
            (IngestError::MissingContentLength, 411),
            (IngestError::PayloadTooLarge(1), 413),
            (IngestError::SchemaValidationFailed("x".into()), 422),
            (IngestError::SchemaNotFound("x".into()), 500),
            (IngestError::SchemaItselfInvalid("x".into()), 500),
            (IngestError::BodyUnreadable("x".into()), 400),
            (IngestError::QueueUnavailable("x".into()), 503),
            (IngestError::IdempotencyStoreUnavailable("x".into()), 503),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status().as_u16(), expected, "{err:?}");
        }
    }

    #[test]
    fn stages_follow_gate_order() {
        assert_eq!(
            IngestError::MissingHeader(vec![]).stage(),
            IngestStage::Headers
        );
        assert_eq!(IngestError::InvalidApiKeyFormat.stage(), IngestStage::ApiKey);
        assert_eq!(
            IngestError::MissingContentLength.stage(),
            IngestStage::Size
        );
        assert_eq!(IngestError::PayloadTooLarge(9).stage(), IngestStage::Size);
        assert_eq!(
            IngestError::SchemaItselfInvalid("x".into()).stage(),
            IngestStage::Body
        );
    }

    #[test]
    fn configuration_faults_hide_details() {
        let err = IngestError::SchemaItselfInvalid("/srv/schemas/v0.08/common.json broken".into());
        assert!(err.is_configuration_fault());
        assert!(!err.client_detail().contains("/srv/schemas"));

        let err = IngestError::QueueUnavailable("connection refused to 10.0.0.7".into());
        assert_eq!(err.client_detail(), "Batch queue unavailable");
    }

    #[tokio::test]
    async fn into_response_uses_detail_body() {
        let response = IngestError::InvalidApiKeyFormat.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body.detail,
            "Invalid API key format. Key must start with 'ovpo_sk_'."
        );
    }

    #[tokio::test]
    async fn into_response_internal_is_generic() {
        let response = IngestError::SchemaNotFound("ingest_batch.json in /srv".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.detail, "Ingest schema configuration error");
    }
}
