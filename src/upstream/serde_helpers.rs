//! Lenient deserializers for the vehicle-tracking API.
//!
//! Identifiers arrive as JSON numbers on some endpoints and strings on others;
//! timestamps arrive as RFC 3339 strings or epoch seconds.

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};
use tracing::warn;

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(serde_json::Number),
}

impl From<IdRepr> for String {
    fn from(value: IdRepr) -> Self {
        match value {
            IdRepr::Text(s) => s,
            IdRepr::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimestampRepr {
    Seconds(i64),
    Text(String),
}

pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    IdRepr::deserialize(deserializer).map(String::from)
}

pub fn option_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(String::from))
}

pub fn option_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<TimestampRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(TimestampRepr::Seconds(secs)) => DateTime::from_timestamp(secs, 0)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {secs}"))),
        Some(TimestampRepr::Text(text)) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| D::Error::custom(format!("invalid timestamp `{text}`: {e}"))),
    }
}

/// Decodes a list one element at a time, dropping elements that do not decode.
///
/// A `null` or absent list is empty.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect())
}
