//! HTTP request handlers for the attendance API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{AttendanceInput, calculate_daily_attendance, classify_punch};
use crate::error::EngineResult;
use crate::models::{AttendanceResolution, LeaveGrant, LeaveSnapshot};

use super::request::{ClassifyRequest, ResolveRequest};
use super::response::{ApiError, ApiErrorResponse, ClassifyResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/attendance/resolve", post(resolve_handler))
        .route("/punches/classify", post(classify_handler))
        .with_state(state)
}

/// Maps a JSON extraction failure onto an API error.
fn rejection_response(rejection: JsonRejection, correlation_id: Uuid) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => ApiError::missing_content_type(),
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::bad_request(error).into_response()
}

/// Handler for POST /attendance/resolve endpoint.
///
/// Resolves one assignment on one date from the snapshot in the body and
/// returns the record with its audit trace.
async fn resolve_handler(
    State(state): State<AppState>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing resolve request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let start_time = Instant::now();
    match resolve(&state, request) {
        Ok(resolution) => {
            info!(
                correlation_id = %correlation_id,
                assignment_id = resolution.record.assignment_id,
                date = %resolution.record.date,
                code = %resolution.record.observation,
                duration_us = start_time.elapsed().as_micros(),
                "Resolution completed successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(resolution),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Resolution failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Builds the engine input from a request and resolves it.
fn resolve(state: &AppState, request: ResolveRequest) -> EngineResult<AttendanceResolution> {
    let codes = state.config().leave_codes();
    let punches = request.to_punches();

    let grants = request
        .leaves
        .iter()
        .cloned()
        .map(|leave| leave.into_grant(codes))
        .collect::<EngineResult<Vec<LeaveGrant>>>()?;
    let leaves = LeaveSnapshot::collect(
        &grants,
        &request.nursing_schedules,
        &request.assignment,
        request.date,
    );

    Ok(calculate_daily_attendance(&AttendanceInput {
        date: request.date,
        day_state: request.day_state,
        assignment: &request.assignment,
        schedule: &request.schedule,
        punches: &punches,
        leaves: &leaves,
    }))
}

/// Handler for POST /punches/classify endpoint.
///
/// Labels one punch as entry, exit or intermediate.
async fn classify_handler(payload: Result<Json<ClassifyRequest>, JsonRejection>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing classify request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let result = classify_punch(request.time, &request.schedule, request.nursing.as_ref(), 1);
    info!(
        correlation_id = %correlation_id,
        time = %request.time,
        classification = %result.classification,
        "Punch classified"
    );

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(ClassifyResponse::from(result)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::models::{OutcomeCode, PunchClass};
    use axum::body::{Body, Bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/default").expect("Failed to load config");
        AppState::new(config)
    }

    fn valid_body() -> serde_json::Value {
        serde_json::json!({
            "date": "2025-03-14",
            "day_state": "working",
            "assignment": { "id": 10, "employee_id": 1, "start_date": "2025-01-01" },
            "schedule": {
                "expected_start": "08:00:00",
                "expected_end": "17:00:00",
                "tolerance_minutes": 10
            },
            "punches": [
                { "timestamp": "2025-03-14T08:05:00", "kind": "entry" },
                { "timestamp": "2025-03-14T17:20:00", "kind": "exit" }
            ]
        })
    }

    async fn post(uri: &str, body: String) -> (StatusCode, Bytes) {
        let response = create_router(create_test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_api_001_valid_request_returns_200() {
        let (status, body) = post("/attendance/resolve", valid_body().to_string()).await;

        assert_eq!(status, StatusCode::OK);
        let resolution: AttendanceResolution = serde_json::from_slice(&body).unwrap();
        assert_eq!(resolution.record.observation, OutcomeCode::Late(5));
        assert_eq!(resolution.record.overtime_minutes, 20);
        assert!(!resolution.audit_trace.is_empty());
    }

    #[tokio::test]
    async fn test_api_002_malformed_json_returns_400() {
        let (status, body) = post("/attendance/resolve", "{invalid json".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_api_003_missing_schedule_returns_validation_error() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("schedule");

        let (status, body) = post("/attendance/resolve", body.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(error.message.contains("schedule"));
    }

    #[tokio::test]
    async fn test_api_004_unpaid_leave_without_assignment_returns_400() {
        let mut body = valid_body();
        body["leaves"] = serde_json::json!([
            { "id": 3, "type_code": "LSG", "start_date": "2025-03-01", "end_date": "2025-03-31" }
        ]);

        let (status, body) = post("/attendance/resolve", body.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "INVALID_LEAVE");
    }

    #[tokio::test]
    async fn test_api_005_vacation_overrides_punches() {
        let mut body = valid_body();
        body["leaves"] = serde_json::json!([
            { "id": 1, "type_code": "VACACIONES", "start_date": "2025-03-10", "end_date": "2025-03-21" }
        ]);

        let (status, body) = post("/attendance/resolve", body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        let resolution: AttendanceResolution = serde_json::from_slice(&body).unwrap();
        assert_eq!(resolution.record.observation, OutcomeCode::Vacation);
        assert_eq!(resolution.record.check_in, None);
    }

    #[tokio::test]
    async fn test_api_006_classify_punch() {
        let body = serde_json::json!({
            "time": "12:00:00",
            "schedule": {
                "expected_start": "08:00:00",
                "expected_end": "17:00:00",
                "tolerance_minutes": 10
            }
        });

        let (status, body) = post("/punches/classify", body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        let response: ClassifyResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.classification, PunchClass::Intermediate);
        assert_eq!(response.entry_limit.to_string(), "08:10:00");
        assert_eq!(response.adjusted_end.to_string(), "17:00:00");
    }

    #[tokio::test]
    async fn test_api_007_missing_content_type() {
        let response = create_router(create_test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/punches/classify")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MISSING_CONTENT_TYPE");
    }
}
