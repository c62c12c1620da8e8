//! Payloads delivered by the hosting runtime and where each one is routed.
//!
//! Only two shapes start work: an S3 notification (`Records[].s3.object.key`)
//! and an EventBridge event, which carries either the schedule
//! (`aws.events` / `Scheduled Event`) or an S3 `Object Created` event.
//! Everything else (the `s3:TestEvent` sent when notifications are wired up,
//! SNS-wrapped records, a bare manual invoke) is rejected, never taken for the
//! timer.

use crate::core::layout;
use crate::utils::error::{EtlError, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TriggerEvent {
    S3Notification(ObjectCreatedEvent),
    EventBridge(EventBridgeEvent),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectCreatedEvent {
    #[serde(rename = "Records")]
    pub records: Vec<ObjectCreatedRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectCreatedRecord {
    #[serde(rename = "eventName", default)]
    pub event_name: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventBridgeEvent {
    pub source: String,
    #[serde(rename = "detail-type")]
    pub detail_type: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub detail: serde_json::Value,
}

/// What an invocation should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Extract,
    /// Staging keys to transform, in delivery order. May be empty.
    Transform(Vec<String>),
}

impl ObjectCreatedEvent {
    /// Decoded keys of every created object, in delivery order.
    pub fn object_keys(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|record| {
                record
                    .event_name
                    .as_deref()
                    .map_or(true, |name| name.starts_with("ObjectCreated"))
            })
            .map(|record| decode_object_key(&record.s3.object.key))
            .collect()
    }
}

impl EventBridgeEvent {
    pub fn is_schedule(&self) -> bool {
        self.source == "aws.events" && self.detail_type == "Scheduled Event"
    }

    pub fn is_object_created(&self) -> bool {
        self.source == "aws.s3" && self.detail_type == "Object Created"
    }

    pub fn object_key(&self) -> Option<String> {
        self.detail
            .get("object")
            .and_then(|object| object.get("key"))
            .and_then(|key| key.as_str())
            .map(decode_object_key)
    }

    fn describe(&self) -> String {
        format!("EventBridge '{}' from '{}'", self.detail_type, self.source)
    }
}

impl TriggerEvent {
    pub fn dispatch(&self) -> Result<Dispatch> {
        let keys = match self {
            TriggerEvent::S3Notification(created) => created.object_keys(),
            TriggerEvent::EventBridge(event) if event.is_schedule() => {
                return Ok(Dispatch::Extract)
            }
            TriggerEvent::EventBridge(event) if event.is_object_created() => {
                let key = event.object_key().ok_or_else(|| EtlError::UnrecognizedTrigger {
                    description: format!("{} without detail.object.key", event.describe()),
                })?;
                vec![key]
            }
            TriggerEvent::EventBridge(event) => {
                return Err(EtlError::UnrecognizedTrigger {
                    description: event.describe(),
                })
            }
            TriggerEvent::Other(value) => {
                return Err(EtlError::UnrecognizedTrigger {
                    description: describe_payload(value),
                })
            }
        };
        Ok(Dispatch::Transform(staged_keys(keys)))
    }
}

/// Keeps the keys under the staging prefix. Our own CSV writes and archive
/// copies also raise object-created events; those are dropped here.
pub fn staged_keys(keys: Vec<String>) -> Vec<String> {
    keys.into_iter()
        .filter(|key| {
            let staged = layout::is_staging_path(key);
            if !staged {
                tracing::info!("Ignoring {}: not under {}", key, layout::STAGING_PREFIX);
            }
            staged
        })
        .collect()
}

fn describe_payload(value: &serde_json::Value) -> String {
    match value.as_object() {
        Some(fields) => format!(
            "payload with fields [{}]",
            fields.keys().cloned().collect::<Vec<_>>().join(", ")
        ),
        None => format!("non-object payload {}", value),
    }
}

/// Notification keys are form-encoded (`+` for space, `%XX` escapes).
/// An encoded key never contains a bare `&` or `=`, so it parses as a single name.
pub fn decode_object_key(raw: &str) -> String {
    url::form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(name, _)| name.into_owned())
        .unwrap_or_default()
}
