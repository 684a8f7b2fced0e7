//! Response types for the payroll API.
//!
//! This module defines the error response structures, the mapping from
//! engine errors to HTTP status codes, and the period snapshot body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{
    AttendanceDecision, OverrideRequest, PayrollAddition, PayrollBatch, PayrollPeriod, PayrollRow,
};

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

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response for an unparseable body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
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
        let (status, error) = match error {
            EngineError::InvalidState { .. } => {
                (StatusCode::CONFLICT, ApiError::new("INVALID_STATE", message))
            }
            EngineError::Unauthorized { .. } => {
                (StatusCode::FORBIDDEN, ApiError::new("UNAUTHORIZED", message))
            }
            EngineError::DomainRuleViolation { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("DOMAIN_RULE_VIOLATION", message),
            ),
            EngineError::InvalidInput { field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details("VALIDATION_ERROR", message, format!("field: {}", field)),
            ),
            EngineError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
            }
            EngineError::MissingContext { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("MISSING_CONTEXT", message),
            ),
            EngineError::ConfigNotFound { path } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            ),
            EngineError::ConfigParseError { path, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            ),
            EngineError::CalculationError { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}

/// Everything recorded against a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    /// The period.
    pub period: PayrollPeriod,
    /// Its attendance decisions, ordered by employee and date.
    pub decisions: Vec<AttendanceDecision>,
    /// Override requests targeting its decisions.
    pub override_requests: Vec<OverrideRequest>,
    /// Additions recorded for it.
    pub additions: Vec<PayrollAddition>,
    /// The batch, once finalized.
    pub batch: Option<PayrollBatch>,
    /// Rows of the batch.
    pub rows: Vec<PayrollRow>,
}
