//! Time entry records.
//!
//! A [`TimeEntry`] is one contiguous work session by one user on one task. It
//! is created open (no `end_time`) and closed exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::report::TaskTimeSummary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    pub task_id: String,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Set when the entry is closed; zero while it is still running.
    pub duration_millis: u64,
}

impl TimeEntry {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Closes the entry at `end_time`. The stored duration never goes negative,
    /// even when `end_time` precedes `start_time`.
    pub(crate) fn close(&mut self, end_time: DateTime<Utc>) {
        self.duration_millis = elapsed_millis(self.start_time, end_time);
        self.end_time = Some(end_time);
    }
}

/// An entry that has not been written yet.
#[derive(Debug, Clone)]
pub struct NewTimeEntry {
    pub id: String,
    pub task_id: String,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
}

impl NewTimeEntry {
    pub fn new(task_id: &str, user_id: &str, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.to_string(),
            user_id: user_id.to_string(),
            start_time,
        }
    }

    pub fn into_open_entry(self) -> TimeEntry {
        TimeEntry {
            id: self.id,
            task_id: self.task_id,
            user_id: self.user_id,
            start_time: self.start_time,
            end_time: None,
            duration_millis: 0,
        }
    }
}

/// Time tracking view of a task: entries in display order plus the derived totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTime {
    pub task_id: String,
    pub entries: Vec<TimeEntry>,
    pub summary: TaskTimeSummary,
}

/// Milliseconds from `start` to `end`, clamped at zero.
pub fn elapsed_millis(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    (end - start).num_milliseconds().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn close_records_end_and_duration() {
        let mut entry = NewTimeEntry::new("task-1", "u1", t0()).into_open_entry();
        assert!(entry.is_open());

        entry.close(t0() + Duration::minutes(90));

        assert!(!entry.is_open());
        assert_eq!(entry.end_time, Some(t0() + Duration::minutes(90)));
        assert_eq!(entry.duration_millis, 5_400_000);
    }

    #[test]
    fn close_before_start_clamps_to_zero() {
        let mut entry = NewTimeEntry::new("task-1", "u1", t0()).into_open_entry();
        entry.close(t0() - Duration::seconds(3));
        assert_eq!(entry.duration_millis, 0);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let entry = NewTimeEntry::new("task-1", "u1", t0()).into_open_entry();
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["taskId"], "task-1");
        assert_eq!(value["userId"], "u1");
        assert!(value["endTime"].is_null());
        assert_eq!(value["durationMillis"], 0);
        assert!(value.get("startTime").is_some());
    }
}
