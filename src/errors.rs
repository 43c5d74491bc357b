//! Error types for the AlephX API layer
//!
//! Registry lookups, request preparation and response decoding all return
//! `AlephxError`. Exchange error payloads of the form
//! `{"error": {"reason": "...", "message": "..."}}` are classified into the
//! structured variants below.

use serde::Deserialize;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AlephxError>;

#[derive(Debug, Error)]
pub enum AlephxError {
    /// Name did not match any snake_case or camelCase endpoint alias
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// A `{placeholder}` in the path template had no value
    #[error("missing parameter '{param}' for path '{path}'")]
    MissingParam { path: String, param: String },

    #[error("invalid request parameters: {0}")]
    InvalidParams(String),

    #[error("apiKey and secret credentials are required for private endpoints")]
    MissingCredentials,

    #[error("failed to sign request: {0}")]
    Signing(String),

    /// Environment settings that are missing, malformed or inconsistent
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("order not found: {0}")]
    OrderNotFound(String),

    /// Error payload that matched no specific class
    #[error("exchange error: {0}")]
    Exchange(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Message substrings mapped to error classes, checked in order
const BROAD_MATCHES: &[(&str, ErrorClass)] = &[
    ("Wallet not allowed", ErrorClass::Authentication),
    ("Invalid signature", ErrorClass::Authentication),
    ("Unauthorized", ErrorClass::PermissionDenied),
    ("Order is not cancellable", ErrorClass::BadRequest),
    ("Asset is not supported", ErrorClass::BadRequest),
    ("Not Found", ErrorClass::OrderNotFound),
];

#[derive(Debug, Clone, Copy)]
enum ErrorClass {
    Authentication,
    PermissionDenied,
    BadRequest,
    OrderNotFound,
}

impl ErrorClass {
    fn into_error(self, feedback: String) -> AlephxError {
        match self {
            ErrorClass::Authentication => AlephxError::Authentication(feedback),
            ErrorClass::PermissionDenied => AlephxError::PermissionDenied(feedback),
            ErrorClass::BadRequest => AlephxError::BadRequest(feedback),
            ErrorClass::OrderNotFound => AlephxError::OrderNotFound(feedback),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl AlephxError {
    /// Classify a raw response body.
    ///
    /// Returns `None` when the body carries no `error.reason`, i.e. the
    /// response is not an error payload.
    pub fn from_response_body(body: &str) -> Option<Self> {
        let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
        let error = envelope.error?;
        let reason = error.reason?;
        let message = error.message.unwrap_or_default();
        let feedback = format!("alephx {}", body);

        if let Some((_, class)) = BROAD_MATCHES
            .iter()
            .find(|(needle, _)| message.contains(needle))
        {
            return Some(class.into_error(feedback));
        }

        // Fall back to the HTTP-style reason phrase
        match reason.as_str() {
            "Not Found" => Some(AlephxError::OrderNotFound(feedback)),
            "Bad Request" => Some(AlephxError::BadRequest(feedback)),
            _ => Some(AlephxError::Exchange(feedback)),
        }
    }

    /// Same as [`from_response_body`](Self::from_response_body) for an already parsed value
    pub fn from_response_value(value: &serde_json::Value) -> Option<Self> {
        value.get("error")?;
        Self::from_response_body(&value.to_string())
    }

    /// Whether the failure originated from the exchange rather than the caller
    pub fn is_exchange_error(&self) -> bool {
        matches!(
            self,
            AlephxError::Authentication(_)
                | AlephxError::PermissionDenied(_)
                | AlephxError::BadRequest(_)
                | AlephxError::OrderNotFound(_)
                | AlephxError::Exchange(_)
        )
    }
}
