//! Hub state types and error definitions.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A state record as returned by `GET /api/states`.
///
/// `last_updated` stays raw and optional so one malformed, null or absent
/// timestamp cannot fail the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StateEntity {
    pub entity_id: String,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl StateEntity {
    pub fn last_updated_utc(&self) -> Option<DateTime<Utc>> {
        self.last_updated.as_deref().and_then(parse_timestamp)
    }
}

/// An entity selected for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleEntity {
    pub entity_id: String,
    pub last_updated: DateTime<Utc>,
}

/// Parse an ISO-8601 timestamp. Any offset is accepted; a timestamp with no
/// offset is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Result of one delete call that reached the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// HTTP 200.
    Removed,
    /// Any other status.
    Rejected { status: u16 },
}

/// Errors that can occur talking to the hub.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Token cannot be used as a header value.
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    /// Writing the listing or reading the confirmation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hub operations.
pub type HubResult<T> = Result<T, HubError>;
