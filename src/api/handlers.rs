//! HTTP request handlers for the supplement engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{FixedHolidays, HolidayCalendar, SupplementEngine};
use crate::config::CalculationSettings;
use crate::error::EngineResult;
use crate::models::{CalculationOutcome, TimesheetEvent};

use super::request::CalculationRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .with_state(state)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts timesheet events and returns one payroll line per employee.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
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
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response();
        }
    };

    let configured = state.settings();
    let settings = configured.with_report_window(
        request.report_start.unwrap_or(configured.report_start),
        request.report_end.unwrap_or(configured.report_end),
    );

    let request_holidays = FixedHolidays::new(request.public_holidays.iter().copied());
    let holidays: &dyn HolidayCalendar = if request.public_holidays.is_empty() {
        state.holidays()
    } else {
        &request_holidays
    };

    let events: Vec<TimesheetEvent> = request.events.into_iter().map(Into::into).collect();
    let events_count = events.len();

    let start_time = Instant::now();
    match perform_calculation(&settings, holidays, events) {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                calculation_id = %outcome.calculation_id,
                events_count,
                employees = outcome.lines.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Calculation completed successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(outcome),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Calculation failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Runs the engine over the request's events.
fn perform_calculation(
    settings: &CalculationSettings,
    holidays: &dyn HolidayCalendar,
    events: Vec<TimesheetEvent>,
) -> EngineResult<CalculationOutcome> {
    SupplementEngine::new(settings, holidays)?.run_events(events)
}
