//! Batch event processor.
//!
//! Turns a queue batch into an ordered list of outcomes, one per message.
//! A message whose body is not a storage notification only fails its own
//! outcome; the rest of the batch is processed regardless.

use crate::{
    diagnostics::DiagnosticSink,
    notification::parse_notification,
    outcome::{NotificationResult, ProcessedOutcome},
    queue::{QueueBatch, QueueMessage},
};
use chrono::Utc;
use std::sync::Arc;

/// Errors that fail a whole batch.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The batch carries no `Records` array.
    #[error("Queue batch is missing its Records array")]
    MissingRecords,
    /// Required builder attribute was not provided.
    #[error("Missing required attribute: {}", _0)]
    MissingRequiredAttribute(String),
}

/// Extracts storage notifications from queue messages.
///
/// Holds no per-batch state, so one instance can serve concurrent requests.
pub struct EventProcessor {
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for EventProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventProcessor")
            .field("sink", &"<dyn DiagnosticSink>")
            .finish()
    }
}

impl EventProcessor {
    /// Processes every message of `batch` in order.
    ///
    /// # Returns
    /// One outcome per message, in input order.
    ///
    /// # Errors
    /// Returns `Error::MissingRecords` if the batch has no `Records` array.
    /// Malformed message bodies never fail the call.
    pub fn process(&self, batch: &QueueBatch) -> Result<Vec<ProcessedOutcome>, Error> {
        let messages = batch.records.as_deref().ok_or(Error::MissingRecords)?;
        let total = messages.len();
        self.sink.batch_started(total);

        let outcomes: Vec<ProcessedOutcome> = messages
            .iter()
            .enumerate()
            .map(|(index, message)| self.process_message(index, total, message))
            .collect();

        self.sink.batch_completed(&outcomes);
        Ok(outcomes)
    }

    fn process_message(
        &self,
        index: usize,
        total: usize,
        message: &QueueMessage,
    ) -> ProcessedOutcome {
        let processed_at = Utc::now();
        self.sink.message_received(index, total, message);

        let result = match parse_notification(&message.body) {
            Ok(notification) => {
                self.sink.notification_parsed(message, &notification);
                NotificationResult::Parsed(notification)
            }
            Err(err) => {
                self.sink.notification_failed(message, &err);
                NotificationResult::Failed(err.to_string())
            }
        };

        ProcessedOutcome::new(message, result, processed_at)
    }
}

/// Builder for [`EventProcessor`].
#[derive(Default)]
pub struct EventProcessorBuilder {
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl EventProcessorBuilder {
    pub fn new() -> EventProcessorBuilder {
        EventProcessorBuilder {
            ..Default::default()
        }
    }

    /// Sets the sink diagnostic events are reported to.
    pub fn sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Builds the processor.
    ///
    /// # Errors
    /// Returns `Error::MissingRequiredAttribute` if no sink was set.
    pub fn build(self) -> Result<EventProcessor, Error> {
        Ok(EventProcessor {
            sink: self
                .sink
                .ok_or_else(|| Error::MissingRequiredAttribute("sink".to_string()))?,
        })
    }
}
