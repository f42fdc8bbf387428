//! Response types for the attendance API.
//!
//! This module defines the success and error response structures and the
//! mapping from engine errors to HTTP status codes.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::calculation::PunchClassification;
use crate::error::EngineError;
use crate::models::PunchClass;

/// Response body for the `/punches/classify` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyResponse {
    /// The label assigned to the punch.
    pub classification: PunchClass,
    /// Punches strictly before this time are entries.
    pub entry_limit: NaiveTime,
    /// Punches at or after this time are exits.
    pub adjusted_end: NaiveTime,
}

impl From<PunchClassification> for ClassifyResponse {
    fn from(result: PunchClassification) -> Self {
        Self {
            classification: result.classification,
            entry_limit: result.entry_limit,
            adjusted_end: result.adjusted_end,
        }
    }
}

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

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a missing content type error response.
    pub fn missing_content_type() -> Self {
        Self::new(
            "MISSING_CONTENT_TYPE",
            "Content-Type must be application/json",
        )
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
    /// A 400 response carrying the given error.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            },
            EngineError::CalendarDayMissing { date } => ApiErrorResponse::bad_request(
                ApiError::with_details(
                    "CALENDAR_DAY_MISSING",
                    message,
                    format!("Configure the calendar for {} before resolving it", date),
                ),
            ),
            EngineError::InvalidDateRange { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("INVALID_DATE_RANGE", message))
            }
            EngineError::InvalidLeave { .. } => ApiErrorResponse::bad_request(
                ApiError::with_details(
                    "INVALID_LEAVE",
                    message,
                    "The leave data contains invalid information",
                ),
            ),
            EngineError::Store { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("STORE_ERROR", "Store access failed", message),
            },
            EngineError::DeviceUnreachable { .. } | EngineError::DeviceFetch { .. } => {
                ApiErrorResponse {
                    status: StatusCode::BAD_GATEWAY,
                    error: ApiError::with_details("DEVICE_ERROR", "Device access failed", message),
                }
            }
        }
    }
}
