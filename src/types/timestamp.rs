use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer};

use super::ValidationError;

// Offset-less inputs are taken as UTC. `%.f` also matches an absent fraction.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// Numbers above this magnitude are epoch milliseconds rather than seconds.
const MILLIS_THRESHOLD: f64 = 2e10;

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
    {
        return Ok(naive.and_utc());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }
    if let Ok(epoch) = trimmed.parse::<f64>() {
        return from_epoch(epoch).ok_or_else(|| ValidationError::InvalidTimestamp(raw.to_string()));
    }
    Err(ValidationError::InvalidTimestamp(raw.to_string()))
}

/// Unix epoch seconds, or milliseconds past [`MILLIS_THRESHOLD`].
pub fn from_epoch(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let millis = if value.abs() > MILLIS_THRESHOLD {
        value
    } else {
        value * 1000.0
    };
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis.round() as i64)
}

/// Wire shapes accepted for a timestamp field.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Epoch(f64),
}

/// `deserialize_with` adapter accepting strings via [`parse_timestamp`] and
/// bare numbers via [`from_epoch`].
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Text(raw) => parse_timestamp(&raw).map_err(de::Error::custom),
        RawTimestamp::Epoch(value) => from_epoch(value)
            .ok_or_else(|| de::Error::custom(ValidationError::InvalidTimestamp(value.to_string()))),
    }
}
