//! Per-message processing outcomes and the batch summary derived from them.

use crate::{notification::StorageNotification, queue::QueueMessage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of extracting a notification from one message body.
///
/// Serialized flattened into the outcome as either an `s3Event` or an
/// `s3EventError` field, never both.
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
pub enum NotificationResult {
    #[serde(rename = "s3Event")]
    Parsed(StorageNotification),
    #[serde(rename = "s3EventError")]
    Failed(String),
}

impl NotificationResult {
    pub fn is_parsed(&self) -> bool {
        matches!(self, NotificationResult::Parsed(_))
    }

    pub fn notification(&self) -> Option<&StorageNotification> {
        match self {
            NotificationResult::Parsed(notification) => Some(notification),
            NotificationResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            NotificationResult::Parsed(_) => None,
            NotificationResult::Failed(error) => Some(error),
        }
    }
}

/// Outcome of processing a single queue message.
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedOutcome {
    pub message_id: String,
    pub receipt_handle: String,
    #[serde(flatten)]
    pub result: NotificationResult,
    pub processed_at: DateTime<Utc>,
    /// Identifier of the queue the message came from.
    pub source_queue: String,
    pub region: String,
}

impl ProcessedOutcome {
    /// Creates an outcome for `message` stamped with `processed_at`.
    pub fn new(
        message: &QueueMessage,
        result: NotificationResult,
        processed_at: DateTime<Utc>,
    ) -> Self {
        ProcessedOutcome {
            message_id: message.message_id.clone(),
            receipt_handle: message.receipt_handle.clone(),
            result,
            processed_at,
            source_queue: message.event_source_arn.clone(),
            region: message.aws_region.clone(),
        }
    }
}

/// Aggregate counts over a list of outcomes.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[ProcessedOutcome]) -> Self {
        let successful = outcomes.iter().filter(|o| o.result.is_parsed()).count();
        BatchSummary {
            total: outcomes.len(),
            successful,
            failed: outcomes.len() - successful,
        }
    }
}

/// Counts outcomes by whether their notification parsed.
pub fn summarize(outcomes: &[ProcessedOutcome]) -> BatchSummary {
    BatchSummary::from_outcomes(outcomes)
}
