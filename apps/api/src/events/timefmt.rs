//! Date-time (de)serialization for event timestamps.
//!
//! Events are written as `YYYY-MM-DDTHH:MM:SS` with no offset. Producers are less
//! consistent (model replies, calendar payloads, hand edits), so reading accepts a
//! handful of shapes and keeps the wall-clock part of anything carrying an offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const ACCEPTED: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses any accepted timestamp shape. A bare date means midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Some(dt) = ACCEPTED
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// `#[serde(with = "timefmt::datetime")]`
pub mod datetime {
    use chrono::NaiveDateTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&dt.format(super::FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_datetime(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid date-time '{raw}'")))
    }
}

/// Optional timestamp where `null`, a missing field and `""` all mean "not supplied".
pub mod optional_datetime {
    use chrono::NaiveDateTime;
    use serde::{de::Error, Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_datetime(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date-time '{raw}'"))),
        }
    }
}
