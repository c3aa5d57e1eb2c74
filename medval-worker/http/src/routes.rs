//! HTTP route definitions and handlers.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use medval_core::{outcome::BatchSummary, queue::QueueBatch};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::response::{EventsResponse, HealthResponse};
use crate::state::AppState;

/// Default request body size limit (4MB).
pub const DEFAULT_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Creates the HTTP router with the default body size limit.
pub fn create_router(state: AppState) -> Router {
    create_router_with_body_limit(state, DEFAULT_BODY_LIMIT)
}

/// Creates the HTTP router with a custom body size limit.
///
/// # Arguments
///
/// * `state` - Application state holding the event processor
/// * `body_limit` - Maximum request body size in bytes
pub fn create_router_with_body_limit(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/events", post(events))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
}

/// Processes a batch of queue messages carrying storage notifications.
///
/// Answers 200 for every well-formed batch, however many of its messages
/// failed to parse. Per-message failures only show up in `failedEvents`.
async fn events(
    State(state): State<AppState>,
    payload: Result<Json<QueueBatch>, JsonRejection>,
) -> (StatusCode, Json<EventsResponse>) {
    info!("received request to /events endpoint");

    let batch = match payload {
        Ok(Json(batch)) => batch,
        Err(rejection) => {
            warn!(
                "failed to parse SQS event from request body: {}",
                rejection.body_text()
            );
            // Keep 413 for oversized bodies, everything else is the caller's bad request.
            let status = match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            };
            return (
                status,
                Json(EventsResponse::error(
                    "Failed to parse SQS event from request body",
                )),
            );
        }
    };

    if let Some(records) = &batch.records {
        info!(records = records.len(), "parsed SQS event");
    }

    match state.processor.process(&batch) {
        Ok(outcomes) => {
            let summary = BatchSummary::from_outcomes(&outcomes);
            info!(
                total = summary.total,
                successful = summary.successful,
                failed = summary.failed,
                "processing complete"
            );
            (StatusCode::OK, Json(EventsResponse::success(summary)))
        }
        Err(err) => {
            error!("failed to process SQS event: {err}");
            (
                StatusCode::BAD_REQUEST,
                Json(EventsResponse::error(format!(
                    "Failed to process SQS event: {err}"
                ))),
            )
        }
    }
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}
