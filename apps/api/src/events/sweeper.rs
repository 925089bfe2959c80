//! Weekly rollover sweep.
//!
//! Every Monday shortly after midnight (process-local time) stale events from
//! earlier weeks are carried into the current week. The sweep also runs once at
//! startup so a server that was down over a Monday catches up.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::events::reconcile::week_start;
use crate::events::store::EventStore;

const SWEEP_HOUR: u32 = 0;
const SWEEP_MINUTE: u32 = 5;

fn sweep_time() -> NaiveTime {
    NaiveTime::from_hms_opt(SWEEP_HOUR, SWEEP_MINUTE, 0).unwrap_or(NaiveTime::MIN)
}

/// First sweep instant strictly after `now`.
pub fn next_sweep_after(now: NaiveDateTime) -> NaiveDateTime {
    let this_week = week_start(now.date()).and_time(sweep_time());
    if this_week > now {
        this_week
    } else {
        this_week + Duration::weeks(1)
    }
}

pub fn spawn_weekly_rollover(store: EventStore) -> JoinHandle<()> {
    tokio::spawn(async move {
        sweep(&store, Local::now().date_naive()).await;

        loop {
            let now = Local::now().naive_local();
            let next = next_sweep_after(now);
            let wait = (next - now)
                .to_std()
                .unwrap_or(std::time::Duration::from_secs(60));
            info!("Next rollover sweep at {next}");
            tokio::time::sleep(wait).await;

            sweep(&store, Local::now().date_naive()).await;
        }
    })
}

async fn sweep(store: &EventStore, today: NaiveDate) {
    let week = week_start(today);
    if let Err(e) = store.rollover(week).await {
        error!("Rollover sweep for week {week} failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_next_sweep_midweek_is_next_monday() {
        assert_eq!(
            next_sweep_after(at("2025-07-09T15:30:00")),
            at("2025-07-14T00:05:00")
        );
    }

    #[test]
    fn test_next_sweep_early_monday_is_same_day() {
        assert_eq!(
            next_sweep_after(at("2025-07-14T00:01:00")),
            at("2025-07-14T00:05:00")
        );
    }

    #[test]
    fn test_next_sweep_exactly_at_sweep_time_moves_a_week() {
        assert_eq!(
            next_sweep_after(at("2025-07-14T00:05:00")),
            at("2025-07-21T00:05:00")
        );
    }

    #[test]
    fn test_next_sweep_sunday_night() {
        assert_eq!(
            next_sweep_after(at("2025-07-20T23:59:59")),
            at("2025-07-21T00:05:00")
        );
    }

    #[tokio::test]
    async fn test_sweep_moves_stale_events() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::new(dir.path().join("events.json"));
        let stale = crate::events::Event {
            employee_id: "E1".to_string(),
            title: "Network".to_string(),
            task_id: "T1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 7, 8).unwrap(),
            start: at("2025-07-08T09:00:00"),
            end: at("2025-07-08T11:00:00"),
        };
        store.import(vec![stale]).await.unwrap();

        sweep(&store, NaiveDate::from_ymd_opt(2025, 7, 16).unwrap()).await;

        let log = store.list().await.unwrap();
        assert_eq!(log[0].start, at("2025-07-15T09:00:00"));
    }
}
