//! Tracker error types with HTTP status code mapping.
//!
//! [`TrackerError`] is the central error type of the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! The swap index itself never fails; these errors come from request
//! validation, lookups at the API boundary, and the swap source.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "swap not found",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Service error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status               |
/// |-----------|-----------------|---------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request           |
/// | 2000–2999 | Not Found       | 404 Not Found             |
/// | 3000–3999 | Server          | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A time range ends before it starts.
    #[error("invalid time range: stop {stop} is before start {start}")]
    InvalidTimeRange {
        /// Requested start.
        start: i64,
        /// Requested stop.
        stop: i64,
    },

    /// The requested ticker is neither leg of the swap.
    #[error("ticker not part of swap")]
    TickerNotInSwap,

    /// No swap with the given uuid is indexed.
    #[error("swap not found")]
    SwapNotFound(String),

    /// No event window with the given name is registered.
    #[error("event not found: {0}")]
    EventNotFound(String),

    /// The swap leg matching the ticker has no pubkey.
    #[error("pubkey not found for ticker")]
    PubkeyNotFound,

    /// The swap source database failed.
    #[error("swap source error: {0}")]
    Source(#[from] sqlx::Error),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidTimeRange { .. } => 1002,
            Self::TickerNotInSwap => 1003,
            Self::SwapNotFound(_) => 2001,
            Self::EventNotFound(_) => 2002,
            Self::PubkeyNotFound => 2003,
            Self::Internal(_) => 3000,
            Self::Source(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidTimeRange { .. } | Self::TickerNotInSwap => {
                StatusCode::BAD_REQUEST
            }
            Self::SwapNotFound(_) | Self::EventNotFound(_) | Self::PubkeyNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Source(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let details = match &self {
            Self::SwapNotFound(uuid) => Some(uuid.clone()),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
