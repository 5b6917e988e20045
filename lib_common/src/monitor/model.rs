//! # Dapurate Data Models
//!
//! This module defines the data structures returned by the Dapurate backend.
//! It is designed to provide a strongly-typed representation of the JSON
//! responses while staying tolerant to fields this client does not know
//! about.
//!
//! ## Key Features:
//! - **Strict Core, Open Edges**: the fields the dashboard relies on are
//!   typed; everything else on a sample is preserved verbatim in an opaque
//!   map so the detail view can display it.
//! - **Local Calendar Dates**: date keys sent to the backend are always the
//!   viewer's local calendar day formatted as `YYYY-MM-DD`, never a
//!   UTC-shifted timestamp string.
//! - **Envelope Tolerance**: every envelope field is optional with a
//!   default, so a terse `{data: null}` and a full
//!   `{message, success, data}` both deserialize.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// # Response Envelope
///
/// The standard wrapper the backend puts around every JSON payload:
/// `{ message, success, data }`. Only `data` is trusted by this client;
/// `message` and `success` are informational.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Human-readable status message, if the backend sent one.
    pub message: Option<String>,
    /// Backend-reported success flag, if present.
    pub success: Option<bool>,
    /// The actual payload. `null` and absent are equivalent.
    pub data: Option<T>,
}

/// # Score Summary
///
/// The daily cleanliness score for one calendar day. Replaced wholesale on
/// every successful fetch; absent when the day has no data or the fetch
/// failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Backend identifier, used as the foreign key for the sample list.
    pub id: i64,
    /// Percentage of clean samples for the day (0-100).
    pub score: f64,
    /// Number of samples classified as clean.
    pub clean_sample: i64,
    /// Total number of samples captured.
    pub total_sample: i64,
}

impl ScoreSummary {
    /// Derived count of dirty samples: `total_sample - clean_sample`.
    pub fn dirty_sample(&self) -> i64 {
        self.total_sample - self.clean_sample
    }
}

/// # Sample Record
///
/// One captured observation belonging to a score summary. Backend insertion
/// order is preserved; the client never re-sorts. Fields beyond the typed
/// core are kept verbatim for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Backend identifier.
    pub id: i64,
    /// Capture timestamp.
    pub created_at: DateTime<Utc>,
    /// Backend classification of the sample.
    pub is_clean: bool,
    /// Any other fields the backend attached, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// # Violation Record
///
/// A named infraction detected within one sample, with an occurrence count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRecord {
    /// Backend identifier.
    pub id: i64,
    /// Machine name of the violation (underscore separated).
    pub name: String,
    /// Number of occurrences within the sample.
    pub total: i64,
}

/// Today's date in the viewer's local calendar.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Formats a calendar day as the backend's `YYYY-MM-DD` wire format.
pub fn date_query(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Turns a machine label into a display label: underscores become spaces
/// and the first letter is upper-cased. Empty input yields `"-"`.
pub fn format_label(raw: &str) -> String {
    if raw.is_empty() {
        return "-".to_string();
    }
    let spaced = raw.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirty_sample_is_total_minus_clean() {
        let summary = ScoreSummary {
            id: 7,
            score: 92.0,
            clean_sample: 46,
            total_sample: 50,
        };
        assert_eq!(summary.dirty_sample(), 4);
    }

    #[test]
    fn envelope_tolerates_null_and_missing_fields() {
        // ScoreSummary has no Default impl; the envelope must deserialize
        // around any payload type regardless.
        let e: Envelope<ScoreSummary> = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(e.data.is_none());
        assert!(e.success.is_none());

        let e: Envelope<ScoreSummary> = serde_json::from_str("{}").unwrap();
        assert!(e.data.is_none());
        assert!(e.message.is_none());

        let e: Envelope<ScoreSummary> = serde_json::from_str(
            r#"{"message":"ok","success":true,"data":{"id":7,"score":92,"clean_sample":46,"total_sample":50}}"#,
        )
        .unwrap();
        assert_eq!(e.data.unwrap().id, 7);
    }

    #[test]
    fn sample_record_keeps_unknown_fields() {
        let sample: SampleRecord = serde_json::from_str(
            r#"{"id":3,"created_at":"2024-03-05T08:30:00Z","is_clean":false,"camera":"kitchen-2"}"#,
        )
        .unwrap();
        assert!(!sample.is_clean);
        assert_eq!(sample.extra.get("camera").and_then(Value::as_str), Some("kitchen-2"));
    }

    #[test]
    fn date_query_uses_calendar_day_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(date_query(date), "2024-03-05");
    }

    #[test]
    fn labels_are_humanized() {
        assert_eq!(format_label("missing_hairnet"), "Missing hairnet");
        assert_eq!(format_label(""), "-");
        assert_eq!(format_label("clean"), "Clean");
    }
}
