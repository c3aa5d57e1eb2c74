//! Storage change notifications carried in queue message bodies.
//!
//! The shape follows S3 event notifications. Decoding is strict: the body must
//! be a JSON object with a `Records` array whose entries carry the required
//! event and object fields, otherwise the whole body is rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Failure to decode a message body into a [`StorageNotification`].
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ParseError {
    #[error("Failed to parse S3 event: {0}")]
    Decode(#[source] serde_json::Error),
}

/// A storage change notification with one or more change records.
///
/// Example:
/// ```json
/// {
///     "Records": [
///         {
///             "eventVersion": "2.1",
///             "eventSource": "aws:s3",
///             "awsRegion": "us-east-1",
///             "eventTime": "2024-05-01T12:00:00.000Z",
///             "eventName": "ObjectCreated:Put",
///             "requestParameters": { "sourceIPAddress": "203.0.113.7" },
///             "s3": {
///                 "s3SchemaVersion": "1.0",
///                 "configurationId": "media-upload",
///                 "bucket": { "name": "media-bucket", "arn": "arn:aws:s3:::media-bucket" },
///                 "object": {
///                     "key": "images/cat.png",
///                     "size": 1024,
///                     "eTag": "d41d8cd98f00b204e9800998ecf8427e",
///                     "sequencer": "0055AED6DCD90281E5"
///                 }
///             }
///         }
///     ]
/// }
/// ```
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
pub struct StorageNotification {
    #[serde(rename = "Records")]
    pub records: Vec<NotificationRecord>,
}

/// A single change to a stored object.
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    /// Schema version of the record.
    pub event_version: String,
    /// Originating service, `aws:s3` for S3.
    pub event_source: String,
    pub aws_region: String,
    pub event_time: DateTime<Utc>,
    /// Event type, e.g. `ObjectCreated:Put`.
    pub event_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_identity: Option<Identity>,
    #[serde(default)]
    pub request_parameters: RequestParameters,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub response_elements: BTreeMap<String, String>,
    pub s3: ObjectDescriptor,
}

/// Principal that issued the request or owns the bucket.
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
pub struct Identity {
    #[serde(rename = "principalId")]
    pub principal_id: String,
}

#[derive(PartialEq, Clone, Debug, Default, Deserialize, Serialize)]
pub struct RequestParameters {
    /// Source IP of the requesting actor.
    #[serde(
        rename = "sourceIPAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_ip_address: Option<String>,
}

/// Container and object the change applies to.
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDescriptor {
    #[serde(rename = "s3SchemaVersion", default)]
    pub schema_version: String,
    #[serde(default)]
    pub configuration_id: String,
    pub bucket: Bucket,
    pub object: Object,
}

#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_identity: Option<Identity>,
    #[serde(default)]
    pub arn: String,
}

#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    pub key: String,
    /// Object size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Content hash of the object.
    #[serde(rename = "eTag", default)]
    pub e_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    /// Orders concurrent modifications of the same key.
    #[serde(default)]
    pub sequencer: String,
}

/// Decodes a raw message body into a storage notification.
pub fn parse_notification(body: &str) -> Result<StorageNotification, ParseError> {
    serde_json::from_str(body).map_err(ParseError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_json(key: &str) -> serde_json::Value {
        json!({
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "awsRegion": "us-east-1",
            "eventTime": "2024-05-01T12:00:00.000Z",
            "eventName": "ObjectCreated:Put",
            "userIdentity": { "principalId": "AWS:AIDAEXAMPLE" },
            "requestParameters": { "sourceIPAddress": "203.0.113.7" },
            "responseElements": {
                "x-amz-request-id": "C3D13FE58DE4C810",
                "x-amz-id-2": "FMyUVURIY8/IgAtTv8xRjskZQpcIZ9KG4V5Wp6S7S/JRWeUWerMUE5JgHvANOjpD"
            },
            "s3": {
                "s3SchemaVersion": "1.0",
                "configurationId": "media-upload",
                "bucket": {
                    "name": "media-bucket",
                    "ownerIdentity": { "principalId": "A3NL1KOZZKExample" },
                    "arn": "arn:aws:s3:::media-bucket"
                },
                "object": {
                    "key": key,
                    "size": 1024,
                    "eTag": "d41d8cd98f00b204e9800998ecf8427e",
                    "sequencer": "0055AED6DCD90281E5"
                }
            }
        })
    }

    #[test]
    fn test_parse_notification_fields() {
        let body = json!({ "Records": [record_json("images/cat.png")] }).to_string();
        let notification = parse_notification(&body).unwrap();

        assert_eq!(notification.records.len(), 1);
        let record = &notification.records[0];
        assert_eq!(record.event_version, "2.1");
        assert_eq!(record.event_source, "aws:s3");
        assert_eq!(record.event_name, "ObjectCreated:Put");
        assert_eq!(
            record.event_time,
            "2024-05-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(
            record.request_parameters.source_ip_address.as_deref(),
            Some("203.0.113.7")
        );
        assert_eq!(record.s3.bucket.name, "media-bucket");
        assert_eq!(record.s3.bucket.arn, "arn:aws:s3:::media-bucket");
        assert_eq!(record.s3.object.key, "images/cat.png");
        assert_eq!(record.s3.object.size, 1024);
        assert_eq!(record.s3.object.e_tag, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(record.s3.object.sequencer, "0055AED6DCD90281E5");
        assert!(record.s3.object.version_id.is_none());
    }

    #[test]
    fn test_parse_notification_roundtrip() {
        let body = json!({
            "Records": [record_json("images/cat.png"), record_json("video/intro.mp4")]
        })
        .to_string();
        let notification = parse_notification(&body).unwrap();

        let encoded = serde_json::to_string(&notification).unwrap();
        let decoded = parse_notification(&encoded).unwrap();
        assert_eq!(decoded, notification);
    }

    #[test]
    fn test_parse_notification_minimal_record() {
        let body = json!({
            "Records": [{
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "awsRegion": "us-east-1",
                "eventTime": "2024-05-01T12:00:00Z",
                "eventName": "ObjectCreated:Copy",
                "s3": {
                    "bucket": { "name": "media-bucket" },
                    "object": { "key": "a.jpg" }
                }
            }]
        })
        .to_string();

        let notification = parse_notification(&body).unwrap();
        let record = &notification.records[0];
        assert!(record.request_parameters.source_ip_address.is_none());
        assert_eq!(record.s3.object.size, 0);
        assert!(record.s3.object.e_tag.is_empty());
    }

    #[test]
    fn test_parse_notification_plain_text() {
        let err = parse_notification("not json").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse S3 event: "));
    }

    #[test]
    fn test_parse_notification_wrong_shape() {
        for body in ["{}", "null", "[]", "42", r#"{"Records": {}}"#, r#""text""#] {
            assert!(parse_notification(body).is_err(), "accepted {body}");
        }
    }

    #[test]
    fn test_parse_notification_missing_object_key() {
        let mut record = record_json("images/cat.png");
        record["s3"]["object"]
            .as_object_mut()
            .unwrap()
            .remove("key");
        let body = json!({ "Records": [record] }).to_string();

        let err = parse_notification(&body).unwrap_err();
        assert!(err.to_string().contains("key"));
    }

    #[test]
    fn test_parse_notification_type_mismatch() {
        let mut record = record_json("images/cat.png");
        record["s3"]["object"]["size"] = json!("large");
        let body = json!({ "Records": [record] }).to_string();

        assert!(parse_notification(&body).is_err());
    }

    #[test]
    fn test_parse_notification_empty_records() {
        let notification = parse_notification(r#"{"Records": []}"#).unwrap();
        assert!(notification.records.is_empty());
    }
}
