use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::events::model::{Event, EventPatch, MergeOutcome};
use crate::events::reconcile;
use crate::storage::{JsonFileStore, StoreError};

/// The canonical event log, persisted as one JSON array.
///
/// Each method is one locked read-modify-write of the file; nothing is cached between
/// calls. Methods that end up changing nothing leave the file untouched.
#[derive(Clone)]
pub struct EventStore {
    file: JsonFileStore<Vec<Event>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloverReport {
    pub week_start: NaiveDate,
    pub moved: usize,
    pub total: usize,
}

impl EventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFileStore::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub async fn list(&self) -> Result<Vec<Event>, StoreError> {
        self.file.read().await
    }

    pub async fn list_week(&self, week: NaiveDate) -> Result<Vec<Event>, StoreError> {
        let log = self.file.read().await?;
        Ok(reconcile::events_in_week(&log, week))
    }

    pub async fn rollover(&self, week_start: NaiveDate) -> Result<RolloverReport, StoreError> {
        let report = self
            .file
            .mutate(|log| {
                let moved = reconcile::rollover(log, week_start);
                let report = RolloverReport {
                    week_start,
                    moved,
                    total: log.len(),
                };
                (report, moved > 0)
            })
            .await?;

        info!(
            "Rollover to week {}: moved {} of {} events",
            report.week_start, report.moved, report.total
        );
        Ok(report)
    }

    /// Folds a generated week plus calendar-derived events into the log.
    pub async fn merge_generated(
        &self,
        generated: Vec<Event>,
        external: Vec<Event>,
    ) -> Result<MergeOutcome, StoreError> {
        let outcome = self
            .file
            .mutate(|log| {
                let outcome = reconcile::merge_generated(log, generated, external);
                let changed = !outcome.added.is_empty();
                (outcome, changed)
            })
            .await?;

        info!(
            "Merged generated schedule: {} added, {} duplicates skipped",
            outcome.added.len(),
            outcome.duplicates_skipped
        );
        Ok(outcome)
    }

    /// Imports externally produced events, skipping identities already stored.
    pub async fn import(&self, incoming: Vec<Event>) -> Result<MergeOutcome, StoreError> {
        let outcome = self
            .file
            .mutate(|log| {
                let outcome = reconcile::merge(log, incoming);
                let changed = !outcome.added.is_empty();
                (outcome, changed)
            })
            .await?;

        info!(
            "Imported events: {} added, {} duplicates skipped",
            outcome.added.len(),
            outcome.duplicates_skipped
        );
        Ok(outcome)
    }

    /// Returns the updated event, or `None` when no event has this identity.
    pub async fn update(
        &self,
        employee_id: &str,
        task_id: &str,
        patch: &EventPatch,
    ) -> Result<Option<Event>, StoreError> {
        self.file
            .mutate(|log| {
                match reconcile::update_event(log, employee_id, task_id, patch) {
                    Some((updated, changed)) => (Some(updated), changed),
                    None => (None, false),
                }
            })
            .await
    }

    /// Returns the number of events removed.
    pub async fn delete(&self, employee_id: &str, task_id: &str) -> Result<usize, StoreError> {
        self.file
            .mutate(|log| {
                let removed = reconcile::delete_event(log, employee_id, task_id);
                (removed, removed > 0)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn event(employee: &str, task: &str, start: &str, end: &str) -> Event {
        let start = at(start);
        Event {
            employee_id: employee.to_string(),
            title: "Dispatch".to_string(),
            task_id: task.to_string(),
            date: start.date(),
            start,
            end: at(end),
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> (EventStore, PathBuf) {
        let path = dir.path().join("events.json");
        (EventStore::new(&path), path)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = store_in(&dir);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_then_reimport_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (store, path) = store_in(&dir);
        let batch = vec![event(
            "E1",
            "T1",
            "2025-07-14T08:00:00",
            "2025-07-14T12:00:00",
        )];

        let first = store.import(batch.clone()).await.unwrap();
        assert_eq!(first.added.len(), 1);
        let bytes = std::fs::read(&path).unwrap();

        let second = store.import(batch).await.unwrap();
        assert!(second.added.is_empty());
        assert_eq!(second.duplicates_skipped, 1);
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_update_missing_leaves_file_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let (store, path) = store_in(&dir);
        store
            .import(vec![event(
                "E1",
                "T1",
                "2025-07-14T08:00:00",
                "2025-07-14T12:00:00",
            )])
            .await
            .unwrap();
        let before = std::fs::read(&path).unwrap();

        let patch = EventPatch {
            title: Some("Lunch".to_string()),
            ..Default::default()
        };
        assert!(store.update("E1", "nope", &patch).await.unwrap().is_none());
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_empty_patch_leaves_file_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let (store, path) = store_in(&dir);
        let compact = serde_json::to_vec(&vec![event(
            "E1",
            "T1",
            "2025-07-14T08:00:00",
            "2025-07-14T12:00:00",
        )])
        .unwrap();
        std::fs::write(&path, &compact).unwrap();

        let patch = EventPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        let updated = store.update("E1", "T1", &patch).await.unwrap().unwrap();
        assert_eq!(updated.title, "Dispatch");
        assert!(store.update("E1", "T1", &EventPatch::default()).await.unwrap().is_some());
        assert_eq!(std::fs::read(&path).unwrap(), compact);
    }

    #[tokio::test]
    async fn test_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = store_in(&dir);
        store
            .import(vec![event(
                "E1",
                "T1",
                "2025-07-14T08:00:00",
                "2025-07-14T12:00:00",
            )])
            .await
            .unwrap();

        let patch = EventPatch {
            end: Some(at("2025-07-14T10:00:00")),
            ..Default::default()
        };
        store.update("E1", "T1", &patch).await.unwrap().unwrap();

        let log = store.list().await.unwrap();
        assert_eq!(log[0].end, at("2025-07-14T10:00:00"));
        assert_eq!(log[0].title, "Dispatch");
    }

    #[tokio::test]
    async fn test_delete_and_rollover_round_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = store_in(&dir);
        store
            .import(vec![
                event("E1", "T1", "2025-07-07T08:00:00", "2025-07-07T12:00:00"),
                event("E1", "T2", "2025-07-08T08:00:00", "2025-07-08T12:00:00"),
            ])
            .await
            .unwrap();

        assert_eq!(store.delete("E1", "T2").await.unwrap(), 1);
        assert_eq!(store.delete("E1", "T2").await.unwrap(), 0);

        let week = NaiveDate::from_ymd_opt(2025, 7, 14).unwrap();
        let report = store.rollover(week).await.unwrap();
        assert_eq!(report.moved, 1);
        assert_eq!(report.total, 1);

        let current = store.list_week(week).await.unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].start, at("2025-07-14T08:00:00"));
    }

    #[tokio::test]
    async fn test_concurrent_merge_and_edit_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = store_in(&dir);
        store
            .import(vec![event(
                "E0",
                "T0",
                "2025-07-14T08:00:00",
                "2025-07-14T12:00:00",
            )])
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 1..=20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let e = event(
                    &format!("E{i}"),
                    &format!("T{i}"),
                    "2025-07-15T08:00:00",
                    "2025-07-15T12:00:00",
                );
                store.merge_generated(vec![e], Vec::new()).await.map(|_| ())
            }));
        }
        let editor = store.clone();
        handles.push(tokio::spawn(async move {
            let patch = EventPatch {
                title: Some("Lunch".to_string()),
                ..Default::default()
            };
            editor.update("E0", "T0", &patch).await.map(|_| ())
        }));

        for h in handles {
            h.await.unwrap().unwrap();
        }

        let log = store.list().await.unwrap();
        assert_eq!(log.len(), 21);
        assert_eq!(log[0].title, "Lunch");
    }
}
