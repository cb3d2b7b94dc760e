//! Catalog of user-visible events.
//!
//! Each event has a stable wire code, a fixed user-facing text and a level.
//! Records store only the code; the text is resolved when rendering.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Severity attached to a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageLevel {
    Error,
}

impl MessageLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Catalog event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventId {
    #[serde(rename = "VOLUME_000001")]
    UnknownError,
    #[serde(rename = "VOLUME_000002")]
    UnableToAllocate,
    #[serde(rename = "VOLUME_000003")]
    AttachReadonlyVolume,
    #[serde(rename = "VOLUME_000004")]
    ImageFromVolumeOverQuota,
}

impl EventId {
    /// Every catalog entry, in code order.
    pub const ALL: [EventId; 4] = [
        Self::UnknownError,
        Self::UnableToAllocate,
        Self::AttachReadonlyVolume,
        Self::ImageFromVolumeOverQuota,
    ];

    /// Wire code, e.g. `VOLUME_000002`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownError => "VOLUME_000001",
            Self::UnableToAllocate => "VOLUME_000002",
            Self::AttachReadonlyVolume => "VOLUME_000003",
            Self::ImageFromVolumeOverQuota => "VOLUME_000004",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UnknownError => "An unknown error occurred.",
            Self::UnableToAllocate => {
                "No storage could be allocated for this volume request. \
                 You may be able to try another size or volume type."
            }
            Self::AttachReadonlyVolume => "A readonly volume must be attached as readonly.",
            Self::ImageFromVolumeOverQuota => {
                "Failed to copy volume to image as image quota has been met. \
                 Please delete images or have your limit increased, then try again."
            }
        }
    }

    pub fn level(&self) -> MessageLevel {
        MessageLevel::Error
    }

    /// Resolve a stored code to its user-facing text, if defined.
    pub fn text_for(code: &str) -> Option<&'static str> {
        code.parse::<EventId>().ok().map(|e| e.user_message())
    }
}

impl FromStr for EventId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.code() == s)
            .ok_or_else(|| Error::UndefinedEvent(s.to_string()))
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
