//! Paste record persisted by the store, plus the JSON shapes of the API.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Paste record as persisted under `paste:<id>`.
///
/// `expires_at` is derived once from `created_at` and `ttl_seconds` and is
/// never recomputed; only `views_count` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paste {
    pub id: String,
    pub content: String,
    pub ttl_seconds: Option<u64>,
    pub max_views: Option<u64>,
    /// Creation instant, ms since the Unix epoch.
    pub created_at: i64,
    pub views_count: u64,
    /// Absolute deadline, ms since the Unix epoch.
    pub expires_at: Option<i64>,
}

/// Validated creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaste {
    pub content: String,
    pub ttl_seconds: Option<u64>,
    pub max_views: Option<u64>,
}

/// Response body for a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPaste {
    pub id: String,
    pub url: String,
}

/// Response body for a successful view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteView {
    pub content: String,
    /// Views left after the one being served; `None` when unlimited.
    pub remaining_views: Option<i64>,
    /// RFC 3339 deadline; `None` when the paste has no ttl.
    pub expires_at: Option<String>,
}

impl Paste {
    /// Build the initial record for a freshly generated id.
    ///
    /// # Arguments
    /// - `id`: Fresh paste id.
    /// - `new`: Validated creation input.
    /// - `now_ms`: Creation instant.
    ///
    /// # Returns
    /// A record with zero views and `expires_at` set iff a ttl was supplied.
    pub fn new(id: String, new: NewPaste, now_ms: i64) -> Self {
        let expires_at = new.ttl_seconds.map(|ttl| {
            let ttl_ms = i64::try_from(ttl).unwrap_or(i64::MAX).saturating_mul(1000);
            now_ms.saturating_add(ttl_ms)
        });
        Self {
            id,
            content: new.content,
            ttl_seconds: new.ttl_seconds,
            max_views: new.max_views,
            created_at: now_ms,
            views_count: 0,
            expires_at,
        }
    }
}

/// Render a millisecond timestamp as RFC 3339 UTC with millisecond precision,
/// e.g. `2024-01-01T00:00:00.000Z`.
///
/// Instants outside chrono's range clamp to its earliest or latest
/// representable time, so a deadline always renders.
pub fn format_timestamp_ms(ms: i64) -> String {
    let at = DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or(if ms < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    });
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
