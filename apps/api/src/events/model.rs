use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::events::timefmt;

/// One scheduled task instance assigned to an employee.
///
/// `employee_id` is not checked against the roster here. `start < end` is expected
/// but never enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub employee_id: String,
    pub title: String,
    pub task_id: String,
    pub date: NaiveDate,
    #[serde(with = "timefmt::datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "timefmt::datetime")]
    pub end: NaiveDateTime,
}

/// Identity of an event in the log: `(employeeId, taskId)`.
pub type EventKey = (String, String);

impl Event {
    pub fn key(&self) -> EventKey {
        (self.employee_id.clone(), self.task_id.clone())
    }

    pub fn matches(&self, employee_id: &str, task_id: &str) -> bool {
        self.employee_id == employee_id && self.task_id == task_id
    }
}

/// Partial update for a manual edit. Missing, `null` and empty fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "timefmt::optional_datetime::deserialize")]
    pub start: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "timefmt::optional_datetime::deserialize")]
    pub end: Option<NaiveDateTime>,
}

/// Result of folding a batch of events into the log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub added: Vec<Event>,
    pub duplicates_skipped: usize,
}
