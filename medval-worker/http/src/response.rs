//! Response bodies returned by the HTTP handlers.

use medval_core::outcome::BatchSummary;
use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Body returned by the events endpoint.
///
/// Example:
/// ```json
/// {
///     "status": "success",
///     "message": "SQS events processed successfully",
///     "processedEvents": 3,
///     "successfulEvents": 2,
///     "failedEvents": 1
/// }
/// ```
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub status: String,
    pub message: String,
    pub processed_events: usize,
    pub successful_events: usize,
    pub failed_events: usize,
}

impl EventsResponse {
    /// Response for a batch that was processed, whatever its per-message results.
    pub fn success(summary: BatchSummary) -> Self {
        EventsResponse {
            status: STATUS_SUCCESS.to_string(),
            message: "SQS events processed successfully".to_string(),
            processed_events: summary.total,
            successful_events: summary.successful,
            failed_events: summary.failed,
        }
    }

    /// Response for a request that could not be processed at all.
    pub fn error(message: impl Into<String>) -> Self {
        EventsResponse {
            status: STATUS_ERROR.to_string(),
            message: message.into(),
            processed_events: 0,
            successful_events: 0,
            failed_events: 0,
        }
    }
}

/// Body returned by the health endpoint.
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        HealthResponse {
            status: "ok".to_string(),
        }
    }
}
