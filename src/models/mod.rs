//! Records mirrored from the marketplace tables
//!
//! Field names are Rust names; the serde attributes carry the remote column
//! names, which mix Spanish, camelCase and snake_case.

mod cart;
mod category;
mod comment;
mod fair;
mod participation;
mod product;
mod user;

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use cart::*;
pub use category::*;
pub use comment::*;
pub use fair::*;
pub use participation::*;
pub use product::*;
pub use user::*;

/// Identifier of a remote row. Tables use integer keys or UUIDs, so both are
/// accepted and the id is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        RecordId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId(id)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId(id.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(id) => RecordId::from(id),
            RawId::Text(id) => RecordId(id),
        })
    }
}

impl Serialize for RecordId {
    /// Integer keys go back out as numbers so `eq`/insert payloads match the
    /// column type.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<i64>() {
            Ok(id) if id.to_string() == self.0 => serializer.serialize_i64(id),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

/// Optional foreign key; an empty string counts as null.
pub(crate) fn optional_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<RecordId>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?.and_then(|raw| match raw {
        RawId::Int(id) => Some(RecordId::from(id)),
        RawId::Text(id) if id.trim().is_empty() => None,
        RawId::Text(id) => Some(RecordId(id)),
    }))
}

/// Parse a timestamp column. Postgres sends `timestamptz` as RFC 3339 and
/// `timestamp` without an offset, which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

/// Unparseable timestamps decode as `None` instead of failing the row.
pub(crate) fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .as_deref()
        .and_then(parse_timestamp))
}

/// Dates may arrive as `YYYY-MM-DD` or as a full timestamp.
pub(crate) fn lenient_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|raw| {
        raw.trim()
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_id_accepts_numbers_and_strings() {
        let numeric: RecordId = serde_json::from_value(json!(42)).unwrap();
        let uuid: RecordId =
            serde_json::from_value(json!("5f0c7a2e-1f4b-4c55-9a51-2bd1e7f0c001")).unwrap();
        assert_eq!(numeric.as_str(), "42");
        assert_eq!(uuid.to_string(), "5f0c7a2e-1f4b-4c55-9a51-2bd1e7f0c001");
    }

    #[test]
    fn numeric_ids_serialize_as_numbers() {
        assert_eq!(serde_json::to_value(RecordId::from(7)).unwrap(), json!(7));
        assert_eq!(serde_json::to_value(RecordId::from("007")).unwrap(), json!("007"));
        assert_eq!(serde_json::to_value(RecordId::from("u-1")).unwrap(), json!("u-1"));
    }

    #[test]
    fn timestamps_accept_offset_and_naive_forms() {
        let with_offset = parse_timestamp("2024-03-01T10:00:00+02:00").unwrap();
        let naive = parse_timestamp("2024-03-01T08:00:00.123456").unwrap();
        assert_eq!(with_offset.timestamp(), 1709280000);
        assert_eq!(naive.timestamp(), 1709280000);
        assert!(parse_timestamp("ayer").is_none());
    }
}
