//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints. Mutating
//! handlers hold the store lock for the whole operation.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::calculate_thr;
use crate::error::EngineResult;
use crate::workflow::{
    add_payroll_addition, create_period, create_thr_addition, create_thr_additions_bulk,
    finalize_period, generate_decisions, preview_thr, request_override, resolve_override,
    submit_for_review,
};

use super::request::{
    ActorRequest, AddAdditionRequest, CreatePeriodRequest, RequestOverrideRequest,
    ResolveOverrideRequest, ThrAdditionRequest, ThrBulkRequest, ThrCalculationRequest,
};
use super::response::{ApiError, ApiErrorResponse, PeriodSnapshot};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/periods", post(create_period_handler))
        .route("/periods/:id", get(period_snapshot_handler))
        .route("/periods/:id/decisions", post(generate_decisions_handler))
        .route("/periods/:id/review", post(submit_for_review_handler))
        .route("/periods/:id/finalize", post(finalize_handler))
        .route("/periods/:id/additions", post(add_addition_handler))
        .route("/periods/:id/thr", post(create_thr_handler))
        .route("/periods/:id/thr/bulk", post(create_thr_bulk_handler))
        .route("/periods/:id/thr/preview", post(preview_thr_handler))
        .route("/overrides", post(request_override_handler))
        .route("/overrides/:id/resolve", post(resolve_override_handler))
        .route("/thr/calculate", post(calculate_thr_handler))
        .with_state(state)
}

/// Unwraps a JSON body or builds the 400 response for it.
fn parse_body<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    match payload {
        Ok(Json(request)) => Ok(request),
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
                        ApiError::new("VALIDATION_ERROR", body_text)
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
            Err(json_error(ApiErrorResponse::bad_request(error)))
        }
    }
}

fn json_error(api_error: ApiErrorResponse) -> Response {
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}

/// Turns an operation result into a JSON response and logs the outcome.
fn respond<T: Serialize>(
    correlation_id: Uuid,
    operation: &'static str,
    success: StatusCode,
    started: Instant,
    result: EngineResult<T>,
) -> Response {
    match result {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                operation,
                duration_us = started.elapsed().as_micros(),
                "Request completed successfully"
            );
            (
                success,
                [(header::CONTENT_TYPE, "application/json")],
                Json(body),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                operation,
                error = %err,
                "Request failed"
            );
            json_error(err.into())
        }
    }
}

/// Handler for POST /periods.
async fn create_period_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreatePeriodRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    info!(correlation_id = %correlation_id, "Processing create period request");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let mut store = state.store().lock().await;
    let result = create_period(
        &mut store,
        &request.actor,
        &request.company_id,
        request.period_start,
        request.period_end,
        &state.config().engine().rule_version,
    );
    respond(correlation_id, "create_period", StatusCode::CREATED, started, result)
}

/// Handler for GET /periods/:id.
async fn period_snapshot_handler(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let store = state.store().lock().await;
    let result = store.period(period_id).map(|period| {
        let mut decisions: Vec<_> = store.period_decisions(period_id).cloned().collect();
        decisions.sort_by(|a, b| (&a.employee_id, a.date).cmp(&(&b.employee_id, b.date)));
        let override_requests: Vec<_> = store
            .override_requests
            .values()
            .filter(|r| {
                store
                    .decisions
                    .get(&r.decision_id)
                    .is_some_and(|d| d.period_id == period_id)
            })
            .cloned()
            .collect();
        let additions: Vec<_> = store
            .additions
            .iter()
            .filter(|a| a.period_id == period_id)
            .cloned()
            .collect();
        let batch = store.batch_for_period(period_id).cloned();
        let rows: Vec<_> = batch
            .as_ref()
            .map(|b| store.rows_for_batch(b.id).cloned().collect())
            .unwrap_or_default();

        PeriodSnapshot {
            period: period.clone(),
            decisions,
            override_requests,
            additions,
            batch,
            rows,
        }
    });
    respond(correlation_id, "period_snapshot", StatusCode::OK, started, result)
}

/// Handler for POST /periods/:id/decisions.
async fn generate_decisions_handler(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
    payload: Result<Json<ActorRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    info!(correlation_id = %correlation_id, period_id = %period_id, "Processing generate decisions request");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let mut store = state.store().lock().await;
    let result = generate_decisions(&mut store, &request.actor, period_id, Utc::now());
    respond(correlation_id, "generate_decisions", StatusCode::OK, started, result)
}

/// Handler for POST /periods/:id/review.
async fn submit_for_review_handler(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
    payload: Result<Json<ActorRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    info!(correlation_id = %correlation_id, period_id = %period_id, "Processing review request");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let mut store = state.store().lock().await;
    let result = submit_for_review(&mut store, &request.actor, period_id, Utc::now());
    respond(correlation_id, "submit_for_review", StatusCode::OK, started, result)
}

/// Handler for POST /periods/:id/finalize.
async fn finalize_handler(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
    payload: Result<Json<ActorRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    info!(correlation_id = %correlation_id, period_id = %period_id, "Processing finalize request");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let mut store = state.store().lock().await;
    let result = finalize_period(
        &mut store,
        state.config().tax(),
        &request.actor,
        period_id,
        Utc::now(),
    );
    respond(correlation_id, "finalize", StatusCode::OK, started, result)
}

/// Handler for POST /periods/:id/additions.
async fn add_addition_handler(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
    payload: Result<Json<AddAdditionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let actor = request.actor.clone();

    let mut store = state.store().lock().await;
    let result = add_payroll_addition(&mut store, &actor, period_id, request.into(), Utc::now());
    respond(correlation_id, "add_addition", StatusCode::CREATED, started, result)
}

/// Handler for POST /periods/:id/thr.
async fn create_thr_handler(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
    payload: Result<Json<ThrAdditionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let mut store = state.store().lock().await;
    let result = create_thr_addition(
        &mut store,
        state.config().thr(),
        &request.actor,
        period_id,
        &request.employee_id,
        request.options(),
        Utc::now(),
    );
    respond(correlation_id, "create_thr", StatusCode::CREATED, started, result)
}

/// Handler for POST /periods/:id/thr/bulk.
async fn create_thr_bulk_handler(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
    payload: Result<Json<ThrBulkRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let mut store = state.store().lock().await;
    let result = create_thr_additions_bulk(
        &mut store,
        state.config().thr(),
        &request.actor,
        period_id,
        request.options(),
        Utc::now(),
    );
    respond(correlation_id, "create_thr_bulk", StatusCode::OK, started, result)
}

/// Handler for POST /periods/:id/thr/preview.
async fn preview_thr_handler(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
    payload: Result<Json<ThrAdditionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let store = state.store().lock().await;
    let result = preview_thr(
        &store,
        state.config().thr(),
        &request.actor,
        period_id,
        &request.employee_id,
        request.options(),
    );
    respond(correlation_id, "preview_thr", StatusCode::OK, started, result)
}

/// Handler for POST /overrides.
async fn request_override_handler(
    State(state): State<AppState>,
    payload: Result<Json<RequestOverrideRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let mut store = state.store().lock().await;
    let result = request_override(
        &mut store,
        &request.actor,
        request.decision_id,
        request.proposed_classification,
        &request.reason,
        Utc::now(),
    );
    respond(correlation_id, "request_override", StatusCode::CREATED, started, result)
}

/// Handler for POST /overrides/:id/resolve.
async fn resolve_override_handler(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    payload: Result<Json<ResolveOverrideRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let mut store = state.store().lock().await;
    let result = resolve_override(
        &mut store,
        &request.actor,
        request_id,
        request.resolution,
        request.note.as_deref(),
        Utc::now(),
    );
    respond(correlation_id, "resolve_override", StatusCode::OK, started, result)
}

/// Handler for POST /thr/calculate.
///
/// Pure calculation; the store is not touched.
async fn calculate_thr_handler(
    State(state): State<AppState>,
    payload: Result<Json<ThrCalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let result = request
        .into_input()
        .and_then(|input| calculate_thr(&input, state.config().thr()));
    if let Ok(thr) = &result {
        info!(
            correlation_id = %correlation_id,
            amount = %thr.amount,
            eligible = thr.eligible,
            "THR calculated"
        );
    }
    respond(correlation_id, "calculate_thr", StatusCode::OK, started, result)
}
