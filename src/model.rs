//! Request model: memorial entries, the document request, and timestamps.
//!
//! Requests arrive as loosely-typed JSON from a browser form. Parsing is
//! deliberately forgiving where the rendered page can absorb it (an
//! unparseable date is simply not printed, an empty string counts as
//! absent) and strict where it cannot (`data` must be an array of objects,
//! text fields must be strings).

use crate::error::MemorialError;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Title used on the cover and in the PDF metadata when none is supplied.
pub const DEFAULT_TITLE: &str = "Memorial de Recuerdos";

/// A point in time as supplied by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// An absolute instant (RFC 3339 with offset, date-only, or epoch ms).
    Instant(DateTime<Utc>),
    /// A wall-clock time with no zone; printed exactly as given.
    Naive(NaiveDateTime),
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl Timestamp {
    /// Parse any accepted textual form. Returns `None` when nothing matches.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Timestamp::Instant(dt.with_timezone(&Utc)));
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Timestamp::Naive(naive));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|midnight| Timestamp::Instant(midnight.and_utc()))
    }

    /// Interpret a JSON number as epoch milliseconds.
    pub fn from_epoch_millis(ms: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(ms).map(Timestamp::Instant)
    }

    /// Interpret an arbitrary JSON value; anything unusable is `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
                .and_then(Self::from_epoch_millis),
            _ => None,
        }
    }

    /// Wall-clock time to print. Instants are shifted into `offset`, or into
    /// the host's local zone when no offset is configured.
    pub fn wall_clock(&self, offset: Option<FixedOffset>) -> NaiveDateTime {
        match self {
            Timestamp::Naive(naive) => *naive,
            Timestamp::Instant(utc) => match offset {
                Some(offset) => utc.with_timezone(&offset).naive_local(),
                None => utc.with_timezone(&Local).naive_local(),
            },
        }
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Timestamp::from_json(&value))
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// One memorial item; produces exactly one entry page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MemorialEntry {
    /// Photo path relative to the assets root, e.g. `/uploads/abuela.jpg`.
    #[serde(default, deserialize_with = "non_empty")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub message: Option<String>,
    #[serde(default, alias = "createdAt", deserialize_with = "lenient_timestamp")]
    pub created_at: Option<Timestamp>,
}

/// Everything needed to render one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentRequest {
    pub entries: Vec<MemorialEntry>,
    /// Cover title; [`DEFAULT_TITLE`] when `None`.
    pub title: Option<String>,
    /// Date printed on the cover; the render time when `None`.
    pub generated_at: Option<Timestamp>,
}

impl DocumentRequest {
    pub fn new(entries: Vec<MemorialEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into()).filter(|t| !t.is_empty());
        self
    }

    pub fn with_generated_at(mut self, at: Timestamp) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Total pages the rendered document will have: cover + entries + closing.
    pub fn page_count(&self) -> usize {
        self.entries.len() + 2
    }

    /// Validate and convert a request body of the form
    /// `{ "data": [...], "title"?: string, "generatedAt"?: timestamp }`.
    ///
    /// # Errors
    /// - [`MemorialError::MissingEntries`] when the body is not an object,
    ///   or `data` is missing or not an array.
    /// - [`MemorialError::InvalidRequest`] when an entry is not an object or
    ///   one of its text fields is not a string, or `title` is not a string.
    pub fn from_json(body: Value) -> Result<Self, MemorialError> {
        let Value::Object(mut body) = body else {
            return Err(MemorialError::MissingEntries);
        };
        let Some(Value::Array(items)) = body.remove("data") else {
            return Err(MemorialError::MissingEntries);
        };

        let entries = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                if !item.is_object() {
                    return Err(MemorialError::InvalidRequest(format!(
                        "data[{i}] must be an object"
                    )));
                }
                serde_json::from_value::<MemorialEntry>(item)
                    .map_err(|e| MemorialError::InvalidRequest(format!("data[{i}]: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let title = match body.remove("title") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s).filter(|s| !s.is_empty()),
            Some(_) => {
                return Err(MemorialError::InvalidRequest(
                    "title must be a string".into(),
                ))
            }
        };

        let generated_at = body
            .get("generatedAt")
            .or_else(|| body.get("generated_at"))
            .and_then(Timestamp::from_json);

        Ok(Self {
            entries,
            title,
            generated_at,
        })
    }

    /// Parse a raw JSON body. A body that is not JSON at all is treated the
    /// same as one without `data`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, MemorialError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|_| MemorialError::MissingEntries)?;
        Self::from_json(value)
    }
}
