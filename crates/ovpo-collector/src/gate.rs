//! # Acceptance Gate
//!
//! Staged admission checks for a batch submission. Stages run in a fixed
//! order and the first failure decides the response:
//!
//! 1. required headers present and non-empty
//! 2. API key prefix
//! 3. schema version
//! 4. declared `Content-Length` present and within [`MAX_PAYLOAD_BYTES`]
//! 5. body is JSON and satisfies [`INGEST_SCHEMA`]
//!
//! The body is not read until stages 1-4 pass, and never beyond the
//! declared length. After acceptance the optional idempotency store and
//! batch queue are consulted.

use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::headers::{ContentLength, HeaderMapExt};
use ovpo_schema::{SchemaError, SchemaValidator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::IngestError;
use crate::ports::{enqueue_with_deadline, with_deadline, IdempotencyOutcome};
use crate::state::Collaborators;

/// Largest accepted declared body size: 5 MiB.
pub const MAX_PAYLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Required prefix of the `Authorization` header value.
pub const API_KEY_PREFIX: &str = "Bearer ovpo_sk_";

/// Schema every batch body is validated against.
pub const INGEST_SCHEMA: &str = "ingest_batch.json";

/// Required headers, in reporting order: (lookup name, display name).
const REQUIRED_HEADERS: [(&str, &str); 3] = [
    ("authorization", "Authorization"),
    ("idempotency-key", "Idempotency-Key"),
    ("x-ovpo-schema-version", "X-OVPO-Schema-Version"),
];

/// Values of the required headers once all are known to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredHeaders<'h> {
    pub authorization: &'h str,
    pub idempotency_key: &'h str,
    pub schema_version: &'h str,
}

/// Per-item failure inside an otherwise accepted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ItemError {
    pub index: usize,
    pub detail: String,
}

/// Acknowledgement body of an accepted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BatchAck {
    /// Always `"accepted"`.
    pub status: String,
    /// `batch_id` echoed from the payload.
    pub batch_id: Option<String>,
    pub processed_items: usize,
    pub duplicate_items: usize,
    pub failed_items: usize,
    pub errors: Vec<ItemError>,
}

impl BatchAck {
    /// Acknowledge a validated payload: every item counts as processed.
    pub fn accepted(payload: &Value) -> Self {
        let items = payload
            .get("items")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        Self {
            status: "accepted".to_string(),
            batch_id: payload
                .get("batch_id")
                .and_then(Value::as_str)
                .map(str::to_owned),
            processed_items: items,
            duplicate_items: 0,
            failed_items: 0,
            errors: Vec::new(),
        }
    }

    /// Re-count every item as a duplicate of an earlier submission.
    pub fn into_duplicate(mut self) -> Self {
        self.duplicate_items += self.processed_items;
        self.processed_items = 0;
        self
    }
}

/// Outcome of running the gate on one request.
#[derive(Debug)]
pub enum AcceptanceDecision {
    Accepted(BatchAck),
    /// Some items failed; `errors` lists them. No producer yet: item-level
    /// failures need a processing pipeline behind the queue.
    PartiallyAccepted(BatchAck),
    Rejected(IngestError),
}

impl AcceptanceDecision {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Accepted(_) | Self::PartiallyAccepted(_) => StatusCode::ACCEPTED,
            Self::Rejected(err) => err.status(),
        }
    }
}

impl From<Result<BatchAck, IngestError>> for AcceptanceDecision {
    fn from(result: Result<BatchAck, IngestError>) -> Self {
        match result {
            Ok(ack) if ack.failed_items > 0 => Self::PartiallyAccepted(ack),
            Ok(ack) => Self::Accepted(ack),
            Err(err) => Self::Rejected(err),
        }
    }
}

impl IntoResponse for AcceptanceDecision {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted(ack) | Self::PartiallyAccepted(ack) => {
                tracing::info!(
                    batch_id = ack.batch_id.as_deref().unwrap_or(""),
                    processed = ack.processed_items,
                    duplicates = ack.duplicate_items,
                    "batch accepted"
                );
                (StatusCode::ACCEPTED, Json(ack)).into_response()
            }
            Self::Rejected(err) => err.into_response(),
        }
    }
}

/// Stage 1: every required header is present and non-empty, then visible
/// ASCII. Absent headers are reported before malformed ones.
pub fn check_required_headers(headers: &HeaderMap) -> Result<RequiredHeaders<'_>, IngestError> {
    let mut values = [""; 3];
    let mut missing = Vec::new();
    let mut malformed = Vec::new();

    for (slot, (name, display)) in values.iter_mut().zip(REQUIRED_HEADERS) {
        let Some(raw) = headers.get(name) else {
            missing.push(display);
            continue;
        };
        match raw.to_str().map(str::trim) {
            Ok("") => missing.push(display),
            Ok(value) => *slot = value,
            Err(_) => malformed.push(display),
        }
    }

    if !missing.is_empty() {
        return Err(IngestError::MissingHeader(missing));
    }
    if !malformed.is_empty() {
        return Err(IngestError::MalformedHeader(malformed));
    }

    let [authorization, idempotency_key, schema_version] = values;
    Ok(RequiredHeaders {
        authorization,
        idempotency_key,
        schema_version,
    })
}

/// Stage 2: the credential has the expected prefix. Format only; the key
/// itself is not verified.
pub fn check_api_key(authorization: &str) -> Result<(), IngestError> {
    if authorization.starts_with(API_KEY_PREFIX) {
        Ok(())
    } else {
        Err(IngestError::InvalidApiKeyFormat)
    }
}

/// Stage 3: exact match on the supported schema version.
pub fn check_schema_version(version: &str) -> Result<(), IngestError> {
    if version == ovpo_core::SCHEMA_VERSION {
        Ok(())
    } else {
        Err(IngestError::UnsupportedSchemaVersion(version.to_string()))
    }
}

/// Stage 4: declared length present, parseable and within the limit.
/// An unparseable value counts as absent.
pub fn check_content_length(headers: &HeaderMap) -> Result<u64, IngestError> {
    let ContentLength(declared) = headers
        .typed_get::<ContentLength>()
        .ok_or(IngestError::MissingContentLength)?;
    check_declared_size(declared)?;
    Ok(declared)
}

/// Size limit on a declared length; exactly [`MAX_PAYLOAD_BYTES`] passes.
pub fn check_declared_size(declared: u64) -> Result<(), IngestError> {
    if declared > MAX_PAYLOAD_BYTES {
        Err(IngestError::PayloadTooLarge(declared))
    } else {
        Ok(())
    }
}

/// Read at most `declared` bytes of `body`.
pub async fn read_body(body: Body, declared: u64) -> Result<axum::body::Bytes, IngestError> {
    // `declared` is at most MAX_PAYLOAD_BYTES, so it fits in usize.
    let limit = usize::try_from(declared).unwrap_or(usize::MAX);
    axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| IngestError::BodyUnreadable(e.to_string()))
}

/// Stage 5: parse `bytes` as JSON and validate it against [`INGEST_SCHEMA`].
pub fn validate_body(validator: &SchemaValidator, bytes: &[u8]) -> Result<Value, IngestError> {
    let payload: Value = serde_json::from_slice(bytes).map_err(|e| {
        IngestError::SchemaValidationFailed(format!("Payload is not valid JSON: {e}"))
    })?;

    match validator.validate(&payload, INGEST_SCHEMA) {
        Ok(()) => Ok(payload),
        Err(SchemaError::ValidationFailed { violations, .. }) => {
            let first = violations
                .first()
                .map(ToString::to_string)
                .unwrap_or_default();
            Err(IngestError::SchemaValidationFailed(format!(
                "Payload failed schema validation: {first}"
            )))
        }
        Err(e @ SchemaError::NotFound { .. }) => Err(IngestError::SchemaNotFound(e.to_string())),
        Err(e) => Err(IngestError::SchemaItselfInvalid(e.to_string())),
    }
}

/// One request's view of the gate: the validator plus collaborators.
pub struct AcceptanceGate<'a> {
    validator: &'a SchemaValidator,
    collaborators: &'a Collaborators,
    deadline: Duration,
}

impl<'a> AcceptanceGate<'a> {
    pub fn new(
        validator: &'a SchemaValidator,
        collaborators: &'a Collaborators,
        deadline: Duration,
    ) -> Self {
        Self {
            validator,
            collaborators,
            deadline,
        }
    }

    /// Run every stage and decide.
    pub async fn evaluate(&self, headers: &HeaderMap, body: Body) -> AcceptanceDecision {
        self.run(headers, body).await.into()
    }

    async fn run(&self, headers: &HeaderMap, body: Body) -> Result<BatchAck, IngestError> {
        let required = check_required_headers(headers)?;
        check_api_key(required.authorization)?;
        check_schema_version(required.schema_version)?;
        let declared = check_content_length(headers)?;

        let bytes = read_body(body, declared).await?;
        let payload = validate_body(self.validator, &bytes)?;
        let ack = BatchAck::accepted(&payload);

        let key = required.idempotency_key;
        let mut recorded = false;
        if let Some(store) = &self.collaborators.idempotency {
            let outcome = with_deadline(self.deadline, store.check_and_set(key))
                .await
                .map_err(|e| IngestError::IdempotencyStoreUnavailable(e.to_string()))?;
            if outcome == IdempotencyOutcome::Duplicate {
                tracing::debug!(idempotency_key = key, "duplicate submission, not enqueued");
                return Ok(ack.into_duplicate());
            }
            recorded = true;
        }

        if let Some(queue) = &self.collaborators.queue {
            let batch_id = ack.batch_id.as_deref().unwrap_or_default();
            match enqueue_with_deadline(queue.as_ref(), batch_id, &payload, self.deadline).await {
                Ok(token) => tracing::debug!(batch_id, %token, "batch enqueued"),
                Err(e) => {
                    if recorded {
                        self.release_key(key).await;
                    }
                    return Err(IngestError::QueueUnavailable(e.to_string()));
                }
            }
        }

        Ok(ack)
    }

    /// Undo `check_and_set` after a failed enqueue. A failure here is only
    /// logged: the client already gets 503 for the queue.
    async fn release_key(&self, key: &str) {
        let Some(store) = &self.collaborators.idempotency else {
            return;
        };
        if let Err(e) = with_deadline(self.deadline, store.release(key)).await {
            tracing::warn!(
                idempotency_key = key,
                error = %e,
                "could not release idempotency key; retries will be treated as duplicates"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use proptest::prelude::*;
    use serde_json::json;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn full_headers() -> HeaderMap {
        headers(&[
            ("authorization", "Bearer ovpo_sk_test"),
            ("idempotency-key", "idem-1"),
            ("x-ovpo-schema-version", "0.08"),
        ])
    }

    #[test]
    fn all_required_headers_present() {
        let map = full_headers();
        let required = check_required_headers(&map).unwrap();
        assert_eq!(required.authorization, "Bearer ovpo_sk_test");
        assert_eq!(required.idempotency_key, "idem-1");
        assert_eq!(required.schema_version, "0.08");
    }

    #[test]
    fn missing_headers_are_listed_in_order() {
        let map = headers(&[("x-ovpo-schema-version", "0.08")]);
        assert_eq!(
            check_required_headers(&map).unwrap_err(),
            IngestError::MissingHeader(vec!["Authorization", "Idempotency-Key"])
        );
    }

    #[test]
    fn empty_header_counts_as_missing() {
        let map = headers(&[
            ("authorization", "Bearer ovpo_sk_test"),
            ("idempotency-key", ""),
            ("x-ovpo-schema-version", "0.08"),
        ]);
        assert_eq!(
            check_required_headers(&map).unwrap_err(),
            IngestError::MissingHeader(vec!["Idempotency-Key"])
        );
    }

    #[test]
    fn non_ascii_header_is_malformed_not_missing() {
        let mut map = full_headers();
        map.insert(
            "idempotency-key",
            HeaderValue::from_bytes(b"idem-\xe9").unwrap(),
        );
        assert_eq!(
            check_required_headers(&map).unwrap_err(),
            IngestError::MalformedHeader(vec!["Idempotency-Key"])
        );
    }

    #[test]
    fn missing_header_reported_before_malformed() {
        let mut map = headers(&[("x-ovpo-schema-version", "0.08")]);
        map.insert(
            "idempotency-key",
            HeaderValue::from_bytes(b"\xff").unwrap(),
        );
        assert_eq!(
            check_required_headers(&map).unwrap_err(),
            IngestError::MissingHeader(vec!["Authorization"])
        );
    }

    #[test]
    fn api_key_prefix() {
        assert!(check_api_key("Bearer ovpo_sk_abc").is_ok());
        assert!(check_api_key("Bearer ovpo_sk_").is_ok());
        assert_eq!(
            check_api_key("Bearer sk_live_abc").unwrap_err(),
            IngestError::InvalidApiKeyFormat
        );
        assert!(check_api_key("bearer ovpo_sk_abc").is_err());
        assert!(check_api_key("ovpo_sk_abc").is_err());
    }

    #[test]
    fn schema_version_is_exact() {
        assert!(check_schema_version("0.08").is_ok());
        assert_eq!(
            check_schema_version("0.07").unwrap_err(),
            IngestError::UnsupportedSchemaVersion("0.07".into())
        );
        assert!(check_schema_version("0.080").is_err());
        assert!(check_schema_version("v0.08").is_err());
    }

    #[test]
    fn content_length_required_and_parsed() {
        assert_eq!(
            check_content_length(&HeaderMap::new()).unwrap_err(),
            IngestError::MissingContentLength
        );
        assert_eq!(
            check_content_length(&headers(&[("content-length", "abc")])).unwrap_err(),
            IngestError::MissingContentLength
        );
        assert_eq!(
            check_content_length(&headers(&[("content-length", "42")])).unwrap(),
            42
        );
    }

    #[test]
    fn size_boundary() {
        assert!(check_declared_size(MAX_PAYLOAD_BYTES).is_ok());
        assert_eq!(
            check_declared_size(MAX_PAYLOAD_BYTES + 1).unwrap_err(),
            IngestError::PayloadTooLarge(5_242_881)
        );
        assert_eq!(MAX_PAYLOAD_BYTES, 5_242_880);
    }

    #[test]
    fn ack_counts_items_and_echoes_batch_id() {
        let payload = json!({"batch_id": "b-1", "items": [{}, {}, {}]});
        let ack = BatchAck::accepted(&payload);
        assert_eq!(ack.status, "accepted");
        assert_eq!(ack.batch_id.as_deref(), Some("b-1"));
        assert_eq!(ack.processed_items, 3);
        assert_eq!(ack.duplicate_items, 0);
        assert_eq!(ack.failed_items, 0);
        assert!(ack.errors.is_empty());

        let dup = ack.into_duplicate();
        assert_eq!(dup.processed_items, 0);
        assert_eq!(dup.duplicate_items, 3);
    }

    #[test]
    fn decision_from_result() {
        let ack = BatchAck::accepted(&json!({"items": [{}]}));
        assert!(matches!(
            AcceptanceDecision::from(Ok(ack.clone())),
            AcceptanceDecision::Accepted(_)
        ));

        let mut partial = ack;
        partial.failed_items = 1;
        let decision = AcceptanceDecision::from(Ok(partial));
        assert!(matches!(decision, AcceptanceDecision::PartiallyAccepted(_)));
        assert_eq!(decision.status(), StatusCode::ACCEPTED);

        let rejected = AcceptanceDecision::from(Err(IngestError::MissingContentLength));
        assert_eq!(rejected.status(), StatusCode::LENGTH_REQUIRED);
    }

    proptest! {
        #[test]
        fn prefixed_keys_always_pass(suffix in "[A-Za-z0-9_]{0,40}") {
            let key = format!("{API_KEY_PREFIX}{suffix}");
            prop_assert!(check_api_key(&key).is_ok());
        }

        #[test]
        fn keys_without_prefix_always_fail(key in "[A-Za-z0-9_ ]{0,40}") {
            prop_assume!(!key.starts_with(API_KEY_PREFIX));
            prop_assert_eq!(check_api_key(&key), Err(IngestError::InvalidApiKeyFormat));
        }

        #[test]
        fn size_check_matches_limit(declared in 0u64..(2 * MAX_PAYLOAD_BYTES)) {
            prop_assert_eq!(check_declared_size(declared).is_ok(), declared <= MAX_PAYLOAD_BYTES);
        }
    }
}
