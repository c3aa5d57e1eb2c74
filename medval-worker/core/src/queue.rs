//! Queue batch model as delivered to the events endpoint.
//!
//! Mirrors the SQS event envelope used by Lambda style queue triggers, so a
//! batch forwarded from an SQS consumer can be posted to the worker as is.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A batch of queue messages.
///
/// Example:
/// ```json
/// {
///     "Records": [
///         {
///             "messageId": "059f36b4-87a3-44ab-83d2-661975830a7d",
///             "receiptHandle": "AQEBwJnKyrHigUMZj6rYigCgxlaS3SLy0a...",
///             "body": "{\"Records\": []}",
///             "eventSource": "aws:sqs",
///             "eventSourceARN": "arn:aws:sqs:us-east-1:123456789012:media-events",
///             "awsRegion": "us-east-1"
///         }
///     ]
/// }
/// ```
///
/// `records` is `None` when the envelope carries no `Records` array at all,
/// which the processor rejects as a structurally unusable batch.
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
pub struct QueueBatch {
    #[serde(rename = "Records", default)]
    pub records: Option<Vec<QueueMessage>>,
}

impl QueueBatch {
    /// Wraps a list of messages into a batch.
    pub fn new(records: Vec<QueueMessage>) -> Self {
        QueueBatch {
            records: Some(records),
        }
    }
}

/// A single message taken from an external queue.
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueMessage {
    /// Unique identifier of the message within its queue.
    pub message_id: String,
    /// Opaque token used to acknowledge the message.
    #[serde(default)]
    pub receipt_handle: String,
    /// Raw message body, expected to hold a storage notification.
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5_of_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5_of_message_attributes: Option<String>,
    /// System set metadata such as `ApproximateReceiveCount`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
    /// Caller set typed metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_attributes: Option<BTreeMap<String, MessageAttribute>>,
    #[serde(default)]
    pub event_source: String,
    /// Identifier of the queue the message came from.
    #[serde(rename = "eventSourceARN", default)]
    pub event_source_arn: String,
    #[serde(default)]
    pub aws_region: String,
}

/// A caller set message attribute with a declared data type.
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAttribute {
    /// Declared type, e.g. `String`, `Number` or `Binary`.
    pub data_type: String,
    /// Present-but-empty is `Some("")`, absent is `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    /// Base64 encoded binary content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub string_list_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binary_list_values: Vec<String>,
}

impl MessageAttribute {
    /// Decodes the binary value, if there is one.
    pub fn decode_binary(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        self.binary_value
            .as_deref()
            .map(|value| STANDARD.decode(value))
    }
}

impl QueueMessage {
    /// Length of the raw body in bytes.
    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_deserialize_full() {
        let value = json!({
            "messageId": "msg-1",
            "receiptHandle": "handle-1",
            "body": "hello",
            "md5OfBody": "5d41402abc4b2a76b9719d911017c592",
            "attributes": {
                "ApproximateReceiveCount": "1",
                "SentTimestamp": "1523232000000"
            },
            "messageAttributes": {
                "tenant": { "dataType": "String", "stringValue": "acme" },
                "blob": { "dataType": "Binary", "binaryValue": "aGVsbG8=" }
            },
            "eventSource": "aws:sqs",
            "eventSourceARN": "arn:aws:sqs:us-east-1:123456789012:media-events",
            "awsRegion": "us-east-1"
        });

        let message: QueueMessage = serde_json::from_value(value).unwrap();
        assert_eq!(message.message_id, "msg-1");
        assert_eq!(message.receipt_handle, "handle-1");
        assert_eq!(
            message.event_source_arn,
            "arn:aws:sqs:us-east-1:123456789012:media-events"
        );
        assert_eq!(message.body_len(), 5);

        let attributes = message.attributes.unwrap();
        assert_eq!(attributes["ApproximateReceiveCount"], "1");

        let typed = message.message_attributes.unwrap();
        assert_eq!(typed["tenant"].string_value.as_deref(), Some("acme"));
        assert!(typed["blob"].string_value.is_none());
        assert_eq!(
            typed["blob"].decode_binary().unwrap().unwrap(),
            b"hello".to_vec()
        );
    }

    #[test]
    fn test_message_optional_metadata_absent() {
        let value = json!({
            "messageId": "msg-2",
            "receiptHandle": "handle-2",
            "body": "",
            "eventSourceARN": "arn:aws:sqs:eu-west-1:123456789012:q",
            "awsRegion": "eu-west-1",
            "messageAttributes": null
        });

        let message: QueueMessage = serde_json::from_value(value).unwrap();
        assert!(message.attributes.is_none());
        assert!(message.message_attributes.is_none());
        assert!(message.event_source.is_empty());
    }

    #[test]
    fn test_message_missing_identifier_is_rejected() {
        let value = json!({
            "receiptHandle": "handle",
            "body": "",
            "eventSourceARN": "arn",
            "awsRegion": "us-east-1"
        });

        let result = serde_json::from_value::<QueueMessage>(value);
        assert!(result.is_err());
    }

    #[test]
    fn test_message_passthrough_metadata_defaults_to_empty() {
        let value = json!({ "messageId": "msg-3", "body": "{}" });

        let message: QueueMessage = serde_json::from_value(value).unwrap();
        assert_eq!(message.message_id, "msg-3");
        assert!(message.receipt_handle.is_empty());
        assert!(message.event_source_arn.is_empty());
        assert!(message.aws_region.is_empty());
    }

    #[test]
    fn test_message_missing_body_is_rejected() {
        let value = json!({ "messageId": "msg-4", "awsRegion": "us-east-1" });

        let result = serde_json::from_value::<QueueMessage>(value);
        assert!(result.is_err());
    }

    #[test]
    fn test_attribute_empty_string_is_not_absent() {
        let empty: MessageAttribute =
            serde_json::from_value(json!({ "dataType": "String", "stringValue": "" })).unwrap();
        let absent: MessageAttribute =
            serde_json::from_value(json!({ "dataType": "String" })).unwrap();

        assert_eq!(empty.string_value, Some(String::new()));
        assert_eq!(absent.string_value, None);
        assert_ne!(empty, absent);
    }

    #[test]
    fn test_attribute_invalid_binary() {
        let attribute: MessageAttribute =
            serde_json::from_value(json!({ "dataType": "Binary", "binaryValue": "%%%" }))
                .unwrap();
        assert!(attribute.decode_binary().unwrap().is_err());
    }

    #[test]
    fn test_batch_records_absent_or_null() {
        let missing: QueueBatch = serde_json::from_str("{}").unwrap();
        let null: QueueBatch = serde_json::from_str(r#"{"Records": null}"#).unwrap();
        let empty: QueueBatch = serde_json::from_str(r#"{"Records": []}"#).unwrap();

        assert!(missing.records.is_none());
        assert!(null.records.is_none());
        assert_eq!(empty.records, Some(Vec::new()));
    }
}
