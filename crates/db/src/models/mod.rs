pub mod assignment;
pub mod attendance;
pub mod class;
pub mod enrollment;
pub mod grade;
pub mod notification;
pub mod student;

pub use assignment::*;
pub use attendance::*;
pub use class::*;
pub use enrollment::*;
pub use grade::*;
pub use notification::*;
pub use student::*;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use tracing::warn;

/// Identifier assigned by the record store.
pub type RecordId = i64;

/// A row of a named record-store table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    /// Field projection requested on every read.
    const FIELDS: &'static [&'static str];

    fn id(&self) -> Option<RecordId>;
    fn set_id(&mut self, id: RecordId);
}

/// The hosted store returns `null` for empty text fields.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp (its date part), `""` or
/// `null`. Anything else decodes as no date instead of failing the row.
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(parse_lenient_date(&raw))
}

pub fn parse_lenient_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    // Timestamps without an offset, e.g. `2025-03-10T08:00:00`.
    let parsed = raw
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok());
    if parsed.is_none() {
        warn!(value = raw, "Ignoring unparseable date");
    }
    parsed
}
