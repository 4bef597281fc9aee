use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{time_entry::elapsed_millis, TimeEntry};

/// Timer state for one (task, user) pair. `Idle` is the initial state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub task_id: String,
    pub user_id: String,
    pub status: TimerStatus,
    pub open_entry: Option<TimeEntry>,
    /// Live elapsed time of the open entry as of `as_of`; zero when idle.
    pub elapsed_millis: u64,
    pub as_of: DateTime<Utc>,
}

impl TimerSnapshot {
    pub fn from_open_entry(
        task_id: &str,
        user_id: &str,
        open_entry: Option<TimeEntry>,
        as_of: DateTime<Utc>,
    ) -> Self {
        let (status, elapsed) = match &open_entry {
            Some(entry) => (TimerStatus::Running, elapsed_millis(entry.start_time, as_of)),
            None => (TimerStatus::Idle, 0),
        };

        Self {
            task_id: task_id.to_string(),
            user_id: user_id.to_string(),
            status,
            open_entry,
            elapsed_millis: elapsed,
            as_of,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTimeEntry;
    use chrono::{Duration, TimeZone};

    #[test]
    fn idle_without_open_entry() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let snapshot = TimerSnapshot::from_open_entry("t", "u", None, now);
        assert_eq!(snapshot.status, TimerStatus::Idle);
        assert_eq!(snapshot.elapsed_millis, 0);
        assert!(!snapshot.is_running());
    }

    #[test]
    fn running_reports_live_elapsed() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let entry = NewTimeEntry::new("t", "u", start).into_open_entry();
        let snapshot =
            TimerSnapshot::from_open_entry("t", "u", Some(entry), start + Duration::seconds(42));
        assert!(snapshot.is_running());
        assert_eq!(snapshot.elapsed_millis, 42_000);
    }
}
