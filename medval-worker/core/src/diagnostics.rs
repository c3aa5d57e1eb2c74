//! Diagnostic reporting for batch processing.
//!
//! The processor reports what it sees through a [`DiagnosticSink`] handed to
//! it at build time. Reporting is best effort and has no influence on the
//! outcomes the processor returns.

use crate::{
    notification::{NotificationRecord, ParseError, StorageNotification},
    outcome::{BatchSummary, ProcessedOutcome},
    queue::QueueMessage,
};
use tracing::{debug, info, warn};

/// Receiver of descriptive processing events.
///
/// Every hook defaults to doing nothing, so implementations only override the
/// events they care about.
pub trait DiagnosticSink: Send + Sync {
    /// Called once before any message of a batch is processed.
    fn batch_started(&self, _size: usize) {}

    /// Called for every message, in order, before its body is decoded.
    ///
    /// # Arguments
    /// * `index` - Zero based position of the message in the batch
    /// * `total` - Number of messages in the batch
    /// * `message` - The message about to be processed
    fn message_received(&self, _index: usize, _total: usize, _message: &QueueMessage) {}

    /// Called when a message body decoded into a notification.
    fn notification_parsed(&self, _message: &QueueMessage, _notification: &StorageNotification) {}

    /// Called when a message body could not be decoded.
    fn notification_failed(&self, _message: &QueueMessage, _error: &ParseError) {}

    /// Called once with the full, ordered outcome list.
    fn batch_completed(&self, _outcomes: &[ProcessedOutcome]) {}
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {}

/// Sink that emits events through `tracing`.
///
/// Message and record details are logged at `info`, full JSON dumps of parsed
/// records and outcomes at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    fn log_record(&self, index: usize, total: usize, record: &NotificationRecord) {
        let object = &record.s3.object;
        let bucket = &record.s3.bucket;
        info!(
            record = index + 1,
            total,
            event_version = %record.event_version,
            event_source = %record.event_source,
            aws_region = %record.aws_region,
            event_time = %record.event_time.to_rfc3339(),
            event_name = %record.event_name,
            "storage notification record"
        );
        if let Some(source_ip) = &record.request_parameters.source_ip_address {
            info!(source_ip = %source_ip, "record source ip");
        }
        info!(
            bucket_name = %bucket.name,
            bucket_arn = %bucket.arn,
            object_key = %object.key,
            object_size = object.size,
            object_etag = %object.e_tag,
            object_sequencer = %object.sequencer,
            "record object"
        );

        // Dumps are best effort.
        if let Ok(json) = serde_json::to_string_pretty(record) {
            debug!("complete storage notification record:\n{json}");
        }
    }
}

impl DiagnosticSink for TracingSink {
    fn batch_started(&self, size: usize) {
        info!(records = size, "processing queue batch");
    }

    fn message_received(&self, index: usize, total: usize, message: &QueueMessage) {
        info!(
            record = index + 1,
            total,
            message_id = %message.message_id,
            receipt_handle = %message.receipt_handle,
            event_source = %message.event_source,
            event_source_arn = %message.event_source_arn,
            aws_region = %message.aws_region,
            body_length = message.body_len(),
            "processing queue message"
        );

        if let Some(attributes) = &message.attributes {
            for (key, value) in attributes {
                debug!(message_id = %message.message_id, %key, %value, "message attribute");
            }
        }

        if let Some(attributes) = &message.message_attributes {
            for (key, attribute) in attributes {
                let value = attribute.string_value.as_deref().unwrap_or("nil");
                match attribute.decode_binary() {
                    Some(Ok(bytes)) => debug!(
                        message_id = %message.message_id,
                        %key,
                        %value,
                        data_type = %attribute.data_type,
                        binary_length = bytes.len(),
                        "message typed attribute"
                    ),
                    Some(Err(err)) => debug!(
                        message_id = %message.message_id,
                        %key,
                        data_type = %attribute.data_type,
                        "message typed attribute has undecodable binary value: {err}"
                    ),
                    None => debug!(
                        message_id = %message.message_id,
                        %key,
                        %value,
                        data_type = %attribute.data_type,
                        "message typed attribute"
                    ),
                }
            }
        }
    }

    fn notification_parsed(&self, message: &QueueMessage, notification: &StorageNotification) {
        info!(
            message_id = %message.message_id,
            records = notification.records.len(),
            "parsed storage notification"
        );
        let total = notification.records.len();
        for (index, record) in notification.records.iter().enumerate() {
            self.log_record(index, total, record);
        }
    }

    fn notification_failed(&self, message: &QueueMessage, error: &ParseError) {
        warn!(message_id = %message.message_id, "{error}");
        warn!(message_id = %message.message_id, "raw message body: {}", message.body);
    }

    fn batch_completed(&self, outcomes: &[ProcessedOutcome]) {
        let summary = BatchSummary::from_outcomes(outcomes);
        info!(
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            "completed processing queue batch"
        );

        if let Ok(json) = serde_json::to_string_pretty(outcomes) {
            debug!("complete processed outcomes:\n{json}");
        }
    }
}
