//! Persisted message records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user message as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub project_id: String,
    pub request_id: String,
    pub resource_type: Option<String>,
    pub resource_uuid: Option<String>,
    pub event_id: String,
    pub message_level: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Field values a list query can compare on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldValue<'a> {
    Null,
    Text(&'a str),
    Time(DateTime<Utc>),
}

impl MessageRecord {
    /// Names accepted as filter and sort keys.
    pub const FIELDS: &'static [&'static str] = &[
        "id",
        "project_id",
        "request_id",
        "resource_type",
        "resource_uuid",
        "event_id",
        "message_level",
        "created_at",
        "expires_at",
    ];

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        Some(match name {
            "id" => FieldValue::Text(&self.id),
            "project_id" => FieldValue::Text(&self.project_id),
            "request_id" => FieldValue::Text(&self.request_id),
            "resource_type" => optional(&self.resource_type),
            "resource_uuid" => optional(&self.resource_uuid),
            "event_id" => FieldValue::Text(&self.event_id),
            "message_level" => FieldValue::Text(&self.message_level),
            "created_at" => FieldValue::Time(self.created_at),
            "expires_at" => FieldValue::Time(self.expires_at),
            _ => return None,
        })
    }

    /// Whether the message has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

fn optional(value: &Option<String>) -> FieldValue<'_> {
    match value {
        Some(s) => FieldValue::Text(s.as_str()),
        None => FieldValue::Null,
    }
}

/// A message to be created. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub project_id: String,
    pub request_id: String,
    pub resource_type: Option<String>,
    pub resource_uuid: Option<String>,
    pub event_id: String,
    pub message_level: String,
    pub expires_at: DateTime<Utc>,
}

impl NewMessage {
    /// Turn into a full record.
    pub fn into_record(self, id: String, created_at: DateTime<Utc>) -> MessageRecord {
        MessageRecord {
            id,
            project_id: self.project_id,
            request_id: self.request_id,
            resource_type: self.resource_type,
            resource_uuid: self.resource_uuid,
            event_id: self.event_id,
            message_level: self.message_level,
            created_at,
            expires_at: self.expires_at,
        }
    }
}
