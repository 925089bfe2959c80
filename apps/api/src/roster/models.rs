use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An employee as the manager maintains them in the roster.
///
/// `pto` entries are opaque to the service; they are stored and handed to the model
/// exactly as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub shift: TimeWindow,
    pub lunch: TimeWindow,
    /// Weekly hours target.
    #[serde(default = "default_hours")]
    pub hours: f64,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub specialist_task: String,
    /// Hours per week the specialist task should get.
    #[serde(default)]
    pub specialist_target: f64,
    #[serde(default)]
    pub pto: Vec<Value>,
    #[serde(default)]
    pub scheduling_notes: String,
}

fn default_hours() -> f64 {
    40.0
}

/// A daily clock window, written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

/// Free-form office rules (coverage, role limits, …), stored and returned verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchedulingRules(pub Map<String, Value>);

mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&t.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
            .map_err(|_| D::Error::custom(format!("invalid time '{raw}', expected HH:MM")))
    }
}
