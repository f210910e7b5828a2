//! Story Documents
//!
//! A story carries three named JSON artifacts: the canvas, the character
//! sheet and the timeline. This module defines how those artifacts are
//! identified, what an empty one looks like, and the envelope used when a
//! caller needs the document together with its modification stamp.
//!
//! # Last-Modified Stamps
//!
//! Stamps are written as RFC 3339 / ISO-8601 strings. The relational store
//! has no per-document stamp, so reads through it report
//! [`LAST_MODIFIED_SENTINEL`] instead.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::shared::error::SharedError;

/// Numeric story identifier
pub type StoryId = i64;

/// Numeric user identifier
pub type UserId = i64;

/// Stamp reported when the backing store does not track modification time
pub const LAST_MODIFIED_SENTINEL: &str = "0001-01-01T00:00:00Z";

/// The kind of document attached to a story
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Drawing surface: strokes, images, markers
    Canvas,
    /// Character sheet
    Character,
    /// Events and eras
    Timeline,
}

impl DocumentKind {
    /// All kinds, in the order they are migrated
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::Canvas,
        DocumentKind::Character,
        DocumentKind::Timeline,
    ];

    /// Lowercase name used in routes and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canvas => "canvas",
            Self::Character => "character",
            Self::Timeline => "timeline",
        }
    }

    /// Whether the spreadsheet backend stores this kind as row chunks
    ///
    /// Canvas payloads routinely exceed the per-cell size limit of a sheet.
    pub fn is_chunked(&self) -> bool {
        matches!(self, Self::Canvas)
    }

    /// Document returned when nothing has been saved yet
    ///
    /// Characters have no default; callers report not-found instead.
    pub fn default_document(&self) -> Option<Value> {
        match self {
            Self::Canvas => Some(default_canvas()),
            Self::Character => None,
            Self::Timeline => Some(default_timeline()),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "canvas" => Ok(Self::Canvas),
            "character" => Ok(Self::Character),
            "timeline" => Ok(Self::Timeline),
            other => Err(SharedError::validation(
                "kind",
                format!("unknown document kind '{}'", other),
            )),
        }
    }
}

/// Empty canvas at the default 1920x1080 viewport
pub fn default_canvas() -> Value {
    json!({
        "strokes": [],
        "images": [],
        "markers": [],
        "canvasMeta": {
            "width": 1920,
            "height": 1080,
            "scrollX": 0,
            "scrollY": 0
        }
    })
}

/// Timeline with no events or eras
pub fn default_timeline() -> Value {
    json!({ "events": [], "eras": [] })
}

/// Stored JSON together with its raw last-modified stamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWithModified {
    /// Document JSON exactly as stored
    pub json: String,
    /// Stamp as stored, usually RFC 3339
    #[serde(rename = "lastModified")]
    pub last_modified_raw: String,
}

impl JsonWithModified {
    pub fn new(json: impl Into<String>, last_modified_raw: impl Into<String>) -> Self {
        Self {
            json: json.into(),
            last_modified_raw: last_modified_raw.into(),
        }
    }

    /// Wrap JSON from a store without modification tracking
    pub fn with_sentinel(json: impl Into<String>) -> Self {
        Self::new(json, LAST_MODIFIED_SENTINEL)
    }

    /// Parsed stamp, `None` when the stored cell is not a valid timestamp
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        parse_last_modified(&self.last_modified_raw)
    }

    /// True when the stamp is the relational sentinel
    pub fn is_sentinel(&self) -> bool {
        self.last_modified() == Some(sentinel_last_modified())
    }
}

/// The sentinel stamp as a timestamp
pub fn sentinel_last_modified() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Format a stamp the way it is written into sheet cells
pub fn format_last_modified(stamp: DateTime<Utc>) -> String {
    stamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stamp written by [`format_last_modified`] or by other writers
pub fn parse_last_modified(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in DocumentKind::ALL {
            assert_eq!(kind.as_str().parse::<DocumentKind>().unwrap(), kind);
        }
        assert_eq!("Canvas".parse::<DocumentKind>().unwrap(), DocumentKind::Canvas);
    }

    #[test]
    fn test_unknown_kind_is_validation_error() {
        let err = "map".parse::<DocumentKind>().unwrap_err();
        assert!(matches!(err, SharedError::ValidationError { .. }));
    }

    #[test]
    fn test_only_canvas_is_chunked() {
        assert!(DocumentKind::Canvas.is_chunked());
        assert!(!DocumentKind::Character.is_chunked());
        assert!(!DocumentKind::Timeline.is_chunked());
    }

    #[test]
    fn test_default_documents() {
        let canvas = DocumentKind::Canvas.default_document().unwrap();
        assert_eq!(canvas["canvasMeta"]["width"], 1920);
        assert_eq!(canvas["canvasMeta"]["height"], 1080);
        assert_eq!(canvas["strokes"], json!([]));

        let timeline = DocumentKind::Timeline.default_document().unwrap();
        assert_eq!(timeline, json!({"events": [], "eras": []}));

        assert!(DocumentKind::Character.default_document().is_none());
    }

    #[test]
    fn test_sentinel_parses_to_year_one() {
        let wrapped = JsonWithModified::with_sentinel("{}");
        assert!(wrapped.is_sentinel());
        assert_eq!(wrapped.last_modified(), Some(sentinel_last_modified()));
    }

    #[test]
    fn test_stamp_format_is_parseable() {
        let stamp = Utc.with_ymd_and_hms(2025, 4, 21, 9, 35, 38).unwrap();
        let raw = format_last_modified(stamp);
        assert_eq!(raw, "2025-04-21T09:35:38.000000Z");
        assert_eq!(parse_last_modified(&raw), Some(stamp));
        assert_eq!(parse_last_modified("yesterday"), None);
    }
}
