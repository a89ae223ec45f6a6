use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalizer::MediaRef;

/// One entry as a source delivered it, before any filtering or cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub identity: String,
    pub title: String,
    pub raw_body: String,
    pub url: String,
    pub timestamp: Option<DateTime<Utc>>,
    /// Classification assigned by the source (e.g. the compatibility tier
    /// a listing was fetched under).
    pub label: Option<String>,
    /// Picture to use when the body itself carries no media.
    pub media_hint: Option<MediaRef>,
    /// Short facts rendered as `key: value` lines in the alert body.
    pub details: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new(
        identity: impl Into<String>,
        title: impl Into<String>,
        raw_body: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            title: title.into(),
            raw_body: raw_body.into(),
            url: url.into(),
            timestamp: None,
            label: None,
            media_hint: None,
            details: Vec::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_media_hint(mut self, media: MediaRef) -> Self {
        self.media_hint = Some(media);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }
}

/// Put records in processing order, oldest first.
///
/// Feeds list newest first. When every record is timestamped the order is a
/// stable sort on the timestamp, otherwise the feed order is reversed.
pub fn oldest_first(mut records: Vec<RawRecord>) -> Vec<RawRecord> {
    if !records.is_empty() && records.iter().all(|r| r.timestamp.is_some()) {
        records.sort_by_key(|r| r.timestamp);
    } else {
        records.reverse();
    }
    records
}
