//! Message response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stratus_messages::EventId;
use stratus_storage::MessageRecord;

/// Hypermedia link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
        }
    }
}

/// A message as rendered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub id: String,
    pub event_id: String,
    /// Catalog text for `event_id`.
    pub user_message: String,
    pub message_level: String,
    pub resource_type: Option<String>,
    pub resource_uuid: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Earliest time the message may be reaped.
    pub guaranteed_until: DateTime<Utc>,
    pub request_id: String,
    pub links: Vec<Link>,
}

/// Body of `GET .../messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageIndex {
    pub messages: Vec<MessageView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages_links: Vec<Link>,
}

/// Body of `GET .../messages/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDetail {
    pub message: MessageView,
}

/// Builds absolute URLs for message resources.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    /// Versioned endpoint, e.g. `http://localhost/v3`.
    base: String,
}

impl LinkBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Collection URL, e.g. `http://localhost/v3/<project>/messages`.
    pub fn collection(&self, project_id: &str) -> String {
        format!("{}/{}/messages", self.base, project_id)
    }

    fn resource(&self, project_id: &str, id: &str) -> String {
        format!("{}/{}", self.collection(project_id), id)
    }

    /// Unversioned URL for the same resource.
    fn bookmark(&self, project_id: &str, id: &str) -> String {
        let root = match self.base.rsplit_once('/') {
            Some((root, last)) if is_version_segment(last) => root,
            _ => self.base.as_str(),
        };
        format!("{}/{}/messages/{}", root, project_id, id)
    }

    /// `next` link repeating `params` and pointing past `marker`.
    pub fn next(&self, project_id: &str, params: &[(String, String)], marker: &str) -> Link {
        let mut query: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        query.push(format!("marker={}", urlencoding::encode(marker)));
        Link::new(
            "next",
            format!("{}?{}", self.collection(project_id), query.join("&")),
        )
    }

    pub fn view(&self, record: MessageRecord) -> MessageView {
        let links = vec![
            Link::new("self", self.resource(&record.project_id, &record.id)),
            Link::new("bookmark", self.bookmark(&record.project_id, &record.id)),
        ];
        MessageView {
            user_message: EventId::text_for(&record.event_id)
                .unwrap_or_default()
                .to_string(),
            id: record.id,
            event_id: record.event_id,
            message_level: record.message_level,
            resource_type: record.resource_type,
            resource_uuid: record.resource_uuid,
            created_at: record.created_at,
            guaranteed_until: record.expires_at,
            request_id: record.request_id,
            links,
        }
    }
}

fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit() || c == '.'))
}
