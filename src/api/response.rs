//! Response types for the supplement engine API.
//!
//! This module defines the error response structures and the mapping from
//! engine errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates an unknown contract error response.
    pub fn unknown_contract(code: &str) -> Self {
        Self::with_details(
            "UNKNOWN_CONTRACT",
            format!("Unknown contract: {}", code),
            format!("The contract code '{}' has no entry in the contract table", code),
        )
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidSettings { .. }
            | EngineError::UnknownNormPeriodKind { .. }
            | EngineError::UnknownCategory { .. } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::InvalidReportWindow { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "VALIDATION_ERROR",
                    message,
                    "report_end must be after report_start",
                ),
            ),
            EngineError::UnknownContract { code } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::unknown_contract(&code),
            ),
            EngineError::UnsortedTimeline { .. } | EngineError::InvalidEvent { .. } => {
                ApiErrorResponse::new(
                    StatusCode::BAD_REQUEST,
                    ApiError::with_details(
                        "INVALID_EVENT",
                        message,
                        "The timesheet data contains invalid information",
                    ),
                )
            }
            EngineError::MissingColumn { .. }
            | EngineError::ColumnAlreadySet { .. }
            | EngineError::CyclicDependency { .. }
            | EngineError::CursorNotPositioned => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("ENGINE_ERROR", "Calculation failed", message),
            ),
            EngineError::Cancelled { .. } => ApiErrorResponse::new(
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::new("CANCELLED", message),
            ),
        }
    }
}
