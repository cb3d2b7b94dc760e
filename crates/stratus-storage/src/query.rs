//! Generic list processing: filtering, sorting and pagination.
//!
//! Both store backends feed their visible records through [`apply`] in
//! insertion order, so listing semantics are identical regardless of
//! where the data lives.
//!
//! Marker pagination is computed against the records present at call time.
//! Messages created or destroyed between two page fetches can shift page
//! boundaries; callers get no snapshot isolation across pages.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::{FieldValue, MessageRecord};

/// Sort key used when a query names none.
pub const DEFAULT_SORT_KEY: &str = "created_at";
/// Sort direction used when a query names none.
pub const DEFAULT_SORT_DIR: SortDir = SortDir::Desc;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortDir {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(Error::InvalidInput(format!(
                "Invalid sort direction '{}', expected 'asc' or 'desc'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SortDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Listing parameters passed verbatim from the API layer to a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQuery {
    /// Equality filters keyed by field name.
    pub filters: HashMap<String, String>,
    /// Maximum number of records to return.
    pub limit: Option<usize>,
    /// ID of the last record of the previous page (exclusive).
    pub marker: Option<String>,
    /// Number of leading records to skip after the marker.
    pub offset: Option<usize>,
    pub sort_keys: Option<Vec<String>>,
    /// Directions paired with `sort_keys`; keys past the end sort descending.
    pub sort_dirs: Option<Vec<SortDir>>,
}

impl MessageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_sort(mut self, key: impl Into<String>, dir: SortDir) -> Self {
        self.sort_keys.get_or_insert_with(Vec::new).push(key.into());
        self.sort_dirs.get_or_insert_with(Vec::new).push(dir);
        self
    }

    /// Resolve sort keys and directions, applying defaults.
    fn sort_spec(&self) -> Result<Vec<(&str, SortDir)>> {
        let keys: Vec<&str> = match &self.sort_keys {
            Some(keys) if !keys.is_empty() => keys.iter().map(String::as_str).collect(),
            _ => vec![DEFAULT_SORT_KEY],
        };
        let dirs = self.sort_dirs.as_deref().unwrap_or_default();
        if dirs.len() > keys.len() {
            return Err(Error::InvalidInput(
                "More sort directions than sort keys".to_string(),
            ));
        }

        keys.into_iter()
            .enumerate()
            .map(|(i, key)| {
                if !MessageRecord::FIELDS.contains(&key) {
                    return Err(Error::InvalidInput(format!("Invalid sort key: {}", key)));
                }
                Ok((key, dirs.get(i).copied().unwrap_or(DEFAULT_SORT_DIR)))
            })
            .collect()
    }
}

/// Filter, sort and paginate `records`, which must be in insertion order.
///
/// - Unknown filter keys match nothing.
/// - Sorting is stable, so ties keep insertion order.
/// - A marker that is not among the filtered records yields an empty page.
pub fn apply(records: Vec<MessageRecord>, query: &MessageQuery) -> Result<Vec<MessageRecord>> {
    let sort = query.sort_spec()?;

    if let Some(key) = query
        .filters
        .keys()
        .find(|k| !MessageRecord::FIELDS.contains(&k.as_str()))
    {
        tracing::debug!("Ignoring listing with unknown filter key: {}", key);
        return Ok(Vec::new());
    }

    let mut matched: Vec<MessageRecord> = records
        .into_iter()
        .filter(|r| matches_filters(r, &query.filters))
        .collect();

    matched.sort_by(|a, b| compare(a, b, &sort));

    let start = match &query.marker {
        Some(marker) => match matched.iter().position(|r| &r.id == marker) {
            Some(pos) => pos + 1,
            None => {
                tracing::debug!("Marker {} not found, returning empty page", marker);
                return Ok(Vec::new());
            }
        },
        None => 0,
    };

    let skip = start.saturating_add(query.offset.unwrap_or(0));
    let take = query.limit.unwrap_or(usize::MAX);
    Ok(matched.into_iter().skip(skip).take(take).collect())
}

fn matches_filters(record: &MessageRecord, filters: &HashMap<String, String>) -> bool {
    filters.iter().all(|(key, expected)| match record.field(key) {
        Some(FieldValue::Text(actual)) => actual == expected,
        Some(FieldValue::Time(actual)) => parse_time(expected) == Some(actual),
        Some(FieldValue::Null) | None => false,
    })
}

fn compare(a: &MessageRecord, b: &MessageRecord, sort: &[(&str, SortDir)]) -> Ordering {
    for (key, dir) in sort {
        let ord = a.field(key).cmp(&b.field(key));
        let ord = match dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
