//! Core data model for maintenance applications.
//!
//! An [`Ticket`] mirrors the backend's Application JSON shape (camelCase
//! fields, all free-text fields optional). The backend historically emitted
//! the resolution flag as either a real boolean or the string `"true"`;
//! that duck-typing is resolved here, at the deserialization boundary, so
//! the rest of the crate only ever sees a `bool`.

use jiff::civil;
use jiff::tz::TimeZone;
use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};

/// One maintenance application as served by the tracker backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Server-issued identifier; used for show, delete, and export.
    pub id: i64,

    /// Human-facing application number. Not guaranteed unique; search
    /// matches on substring.
    #[serde(default)]
    pub application_number: Option<String>,

    #[serde(default)]
    pub engineer: Option<String>,

    #[serde(default)]
    pub gsm_level: Option<String>,

    #[serde(default)]
    pub internet_level: Option<String>,

    #[serde(default)]
    pub internet_reason: Option<String>,

    #[serde(default)]
    pub installation_date: Option<String>,

    #[serde(default)]
    pub inspector: Option<String>,

    #[serde(default)]
    pub comments: Option<String>,

    /// Check verdict: true = OK, false = NOK. Accepts `true`/`"true"` on
    /// the wire; anything else is NOK.
    #[serde(default, deserialize_with = "resolution_from_any")]
    pub resolution: bool,

    /// ISO timestamp of the last edit, as emitted by the backend. Absent
    /// means the application never enters date-scoped results and groups
    /// under the "no date" bucket.
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl Ticket {
    /// The exact field set the free-text predicate searches, in order.
    /// Absent fields read as empty strings and can never match.
    pub fn search_fields(&self) -> [&str; 8] {
        [
            self.application_number.as_deref().unwrap_or(""),
            self.engineer.as_deref().unwrap_or(""),
            self.gsm_level.as_deref().unwrap_or(""),
            self.internet_level.as_deref().unwrap_or(""),
            self.internet_reason.as_deref().unwrap_or(""),
            self.installation_date.as_deref().unwrap_or(""),
            self.inspector.as_deref().unwrap_or(""),
            self.comments.as_deref().unwrap_or(""),
        ]
    }

    /// Calendar day of the last edit in local time, if the timestamp is
    /// present and parseable.
    pub fn updated_day(&self) -> Option<civil::Date> {
        parse_day(self.last_updated.as_deref()?)
    }
}

/// Extract a local calendar day from an ISO-flavored timestamp string.
///
/// The backend serializes `LocalDateTime` without an offset, but instant
/// timestamps and bare dates are accepted too.
pub fn parse_day(raw: &str) -> Option<civil::Date> {
    let raw = raw.trim();
    if let Ok(ts) = raw.parse::<Timestamp>() {
        return Some(ts.to_zoned(TimeZone::system()).date());
    }
    if let Ok(dt) = raw.parse::<civil::DateTime>() {
        return Some(dt.date());
    }
    raw.parse::<civil::Date>().ok()
}

fn resolution_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Bool(b)) => b,
        Some(Raw::Text(s)) => s == "true",
        Some(Raw::Other(_)) | None => false,
    })
}

/// Bare ticket fixture for unit tests.
#[cfg(test)]
pub(crate) fn blank(id: i64) -> Ticket {
    Ticket {
        id,
        application_number: None,
        engineer: None,
        gsm_level: None,
        internet_level: None,
        internet_reason: None,
        installation_date: None,
        inspector: None,
        comments: None,
        resolution: false,
        last_updated: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_fields() {
        let json = r#"{
            "id": 7,
            "applicationNumber": "24-123456",
            "engineer": "Ivanov",
            "gsmLevel": "-75 dB",
            "resolution": true,
            "lastUpdated": "2024-05-01T23:59:00"
        }"#;

        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.id, 7);
        assert_eq!(ticket.application_number.as_deref(), Some("24-123456"));
        assert_eq!(ticket.gsm_level.as_deref(), Some("-75 dB"));
        assert!(ticket.resolution);
        assert!(ticket.internet_level.is_none());
    }

    #[test]
    fn test_resolution_accepts_string_true() {
        let ticket: Ticket =
            serde_json::from_str(r#"{"id": 1, "resolution": "true"}"#).unwrap();
        assert!(ticket.resolution);
    }

    #[test]
    fn test_resolution_everything_else_is_nok() {
        for raw in [
            r#"{"id": 1, "resolution": "false"}"#,
            r#"{"id": 1, "resolution": "yes"}"#,
            r#"{"id": 1, "resolution": null}"#,
            r#"{"id": 1, "resolution": 1}"#,
            r#"{"id": 1}"#,
        ] {
            let ticket: Ticket = serde_json::from_str(raw).unwrap();
            assert!(!ticket.resolution, "{raw} should be NOK");
        }
    }

    #[test]
    fn test_updated_day_ignores_time_of_day() {
        let ticket = Ticket {
            last_updated: Some("2024-05-01T23:59:00".to_string()),
            ..blank(1)
        };
        assert_eq!(ticket.updated_day(), Some(civil::date(2024, 5, 1)));
    }

    #[test]
    fn test_updated_day_absent_or_garbage() {
        assert_eq!(blank(1).updated_day(), None);

        let ticket = Ticket {
            last_updated: Some("not a date".to_string()),
            ..blank(1)
        };
        assert_eq!(ticket.updated_day(), None);
    }

    #[test]
    fn test_parse_day_bare_date() {
        assert_eq!(parse_day("2024-01-02"), Some(civil::date(2024, 1, 2)));
    }

    #[test]
    fn test_search_fields_absent_read_as_empty() {
        let ticket = blank(1);
        let fields = ticket.search_fields();
        assert_eq!(fields, [""; 8]);
    }
}
