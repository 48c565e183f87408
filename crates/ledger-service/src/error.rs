//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use ledger_core::LedgerError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Insufficient credits to run the billed action.
    #[error("insufficient credits: balance={balance}, required={required}")]
    InsufficientCredits {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// A purchase event with this idempotency key was already applied.
    #[error("duplicate purchase event: {0}")]
    DuplicateEvent(String),

    /// Transaction contention; the request may be retried.
    #[error("ledger busy, retry")]
    Contention,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// External service error.
    #[error("external service error: {0}")]
    ExternalService(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::InsufficientCredits { balance, required } => (
                StatusCode::PAYMENT_REQUIRED,
                "insufficient_credits",
                self.to_string(),
                Some(serde_json::json!({
                    "balance": balance,
                    "required": required
                })),
            ),
            Self::DuplicateEvent(key) => (
                StatusCode::CONFLICT,
                "duplicate_event",
                format!("Purchase event {key} already applied"),
                None,
            ),
            Self::Contention => (
                StatusCode::SERVICE_UNAVAILABLE,
                "contention",
                "The ledger is busy for this account, retry the request".to_string(),
                None,
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                "external_service_error",
                msg.clone(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientCredits { balance, required } => {
                Self::InsufficientCredits { balance, required }
            }
            LedgerError::AccountNotFound { user_id } => {
                Self::NotFound(format!("Account not found: {user_id}"))
            }
            LedgerError::InvalidAmount(amount) => {
                Self::BadRequest(format!("Invalid amount: {amount}"))
            }
            LedgerError::DuplicateIdempotencyKey { key } => Self::DuplicateEvent(key),
            LedgerError::Contention { .. } => Self::Contention,
            LedgerError::Storage(msg) => Self::Internal(msg),
            LedgerError::InvalidId(err) => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<ledger_store::StoreError> for ApiError {
    fn from(err: ledger_store::StoreError) -> Self {
        match err {
            ledger_store::StoreError::DuplicateKey { key } => Self::DuplicateEvent(key),
            other => Self::Internal(other.to_string()),
        }
    }
}
