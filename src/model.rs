/// Core data types for the wind board client.
///
/// This module defines the shared domain model imported by all other modules:
/// station records as delivered by `/api/data`, the tab selector and the
/// record fields it maps onto, the response envelope, and the crate error.
/// It contains no I/O. Backend schema drift is absorbed here, at ingestion,
/// so the rest of the crate never has to re-check field shapes.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Group membership
// ---------------------------------------------------------------------------

/// The `groups` attribute of a record, resolved once when the payload is
/// decoded.
///
/// The backend has shipped this attribute as a list of tags, as a bare tag
/// string, and not at all. Anything else (numbers, objects, null) lands in
/// `Unknown`, which matches no group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupTags {
    Tags(Vec<String>),
    Tag(String),
    #[default]
    Unknown,
}

impl GroupTags {
    /// Resolves a raw JSON value. Non-string members of a list are dropped.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => GroupTags::Tags(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(tag) => Some(tag),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::String(tag) => GroupTags::Tag(tag),
            _ => GroupTags::Unknown,
        }
    }

    /// Whether this record belongs to `group`.
    pub fn contains(&self, group: &str) -> bool {
        match self {
            GroupTags::Tags(tags) => tags.iter().any(|t| t == group),
            GroupTags::Tag(tag) => tag == group,
            GroupTags::Unknown => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Station record
// ---------------------------------------------------------------------------

/// One station's reading for the requested window.
///
/// Measurement fields keep the raw JSON value (number, numeric string, null
/// or absent). Whether a value is numeric is decided by
/// `format::parse_numeric` at display time, and the raw text is what the
/// direction and time columns show.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub station_id: String,
    #[serde(default)]
    pub speed: Value,
    #[serde(default)]
    pub gust_speed: Value,
    #[serde(default)]
    pub dir: Value,
    #[serde(default)]
    pub gust_dir: Value,
    #[serde(default)]
    pub time: Value,
    #[serde(default, deserialize_with = "group_tags")]
    pub groups: GroupTags,
}

impl Record {
    /// Reads one measurement field. Absent fields read as `Value::Null`.
    pub fn value(&self, field: Field) -> &Value {
        match field {
            Field::Speed => &self.speed,
            Field::GustSpeed => &self.gust_speed,
            Field::Dir => &self.dir,
            Field::GustDir => &self.gust_dir,
            Field::Time => &self.time,
        }
    }
}

impl AsRef<Record> for Record {
    fn as_ref(&self) -> &Record {
        self
    }
}

/// Measurement fields a tab can select for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Speed,
    GustSpeed,
    Dir,
    GustDir,
    Time,
}

impl Field {
    /// Attribute name in the `/api/data` payload.
    pub fn wire_name(self) -> &'static str {
        match self {
            Field::Speed => "speed",
            Field::GustSpeed => "gust_speed",
            Field::Dir => "dir",
            Field::GustDir => "gust_dir",
            Field::Time => "time",
        }
    }
}

// ---------------------------------------------------------------------------
// Tab selection
// ---------------------------------------------------------------------------

/// Display mode: which measurement fills the speed and direction columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    AverageWind,
    Gust,
}

impl Tab {
    /// Resolves a tab id. Anything that is not a gust id, including the
    /// backend's precipitation/temperature/humidity tabs, falls back to
    /// average wind.
    pub fn from_id(id: &str) -> Tab {
        match id.trim() {
            "gust" => Tab::Gust,
            _ => Tab::AverageWind,
        }
    }

    /// Query-string id understood by the backend.
    pub fn id(self) -> &'static str {
        match self {
            Tab::AverageWind => "avg-wind",
            Tab::Gust => "gust",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::AverageWind => "平均風",
            Tab::Gust => "陣風",
        }
    }
}

impl<'de> Deserialize<'de> for Tab {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Ok(Tab::from_id(&id))
    }
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// Body of `GET /api/data`.
///
/// Absent or null `rows` decode as an empty collection. `groups` is `None`
/// when the backend did not report any, which leaves the group bar as it was.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DataResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rows: Vec<Record>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_groups")]
    pub groups: Option<Vec<String>>,
}

impl DataResponse {
    pub fn from_json(body: &str) -> Result<Self, BoardError> {
        serde_json::from_str(body).map_err(|e| BoardError::ParseError(e.to_string()))
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn group_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GroupTags, D::Error> {
    Ok(GroupTags::from_value(Value::deserialize(deserializer)?))
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Record>, D::Error> {
    Ok(Option::<Vec<Record>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_groups<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(tag) => Some(tag),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise while fetching, decoding or publishing the board.
#[derive(Debug, PartialEq)]
pub enum BoardError {
    /// Non-2xx HTTP response from the data endpoint.
    HttpError(u16),
    /// The request never produced a response (connect failure, timeout).
    RequestError(String),
    /// The response body could not be deserialized.
    ParseError(String),
    /// Invalid configuration file, value or endpoint URL.
    ConfigError(String),
    /// Writing a rendered surface failed.
    Io(String),
}

impl std::fmt::Display for BoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardError::HttpError(code) => write!(f, "HTTP error: {}", code),
            BoardError::RequestError(msg) => write!(f, "Request error: {}", msg),
            BoardError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            BoardError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            BoardError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for BoardError {}

impl From<std::io::Error> for BoardError {
    fn from(err: std::io::Error) -> Self {
        BoardError::Io(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
