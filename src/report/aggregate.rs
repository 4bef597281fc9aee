use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    models::{time_entry::elapsed_millis, TimeEntry},
    report::format::format_duration,
};

/// Tracked time for one user on one task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserTimeSummary {
    pub user_id: String,
    pub total_millis: u64,
    pub is_running: bool,
    /// Latest `start_time` across the user's entries, open or closed.
    pub last_active: DateTime<Utc>,
    pub formatted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskTimeSummary {
    pub as_of: DateTime<Utc>,
    pub total_millis: u64,
    pub formatted: String,
    /// Most recently active user first.
    pub users: Vec<UserTimeSummary>,
}

struct UserAccumulator {
    total_millis: u64,
    is_running: bool,
    last_active: DateTime<Utc>,
}

/// Folds a task's entries into per-user and task-level totals as of `as_of`.
///
/// Open entries contribute `as_of - start_time`, clamped at zero, so re-running
/// this with a later `as_of` is how callers get a live ticking total.
pub fn aggregate(entries: &[TimeEntry], as_of: DateTime<Utc>) -> TaskTimeSummary {
    let mut per_user: BTreeMap<&str, UserAccumulator> = BTreeMap::new();

    for entry in entries {
        let contribution = match entry.end_time {
            Some(_) => entry.duration_millis,
            None => elapsed_millis(entry.start_time, as_of),
        };

        let acc = per_user
            .entry(entry.user_id.as_str())
            .or_insert_with(|| UserAccumulator {
                total_millis: 0,
                is_running: false,
                last_active: entry.start_time,
            });

        acc.total_millis = acc.total_millis.saturating_add(contribution);
        acc.is_running |= entry.is_open();
        if entry.start_time > acc.last_active {
            acc.last_active = entry.start_time;
        }
    }

    let mut users: Vec<UserTimeSummary> = per_user
        .into_iter()
        .map(|(user_id, acc)| UserTimeSummary {
            user_id: user_id.to_string(),
            total_millis: acc.total_millis,
            is_running: acc.is_running,
            last_active: acc.last_active,
            formatted: format_duration(acc.total_millis),
        })
        .collect();

    users.sort_by(|a, b| {
        b.last_active
            .cmp(&a.last_active)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    let total_millis = users
        .iter()
        .fold(0u64, |sum, user| sum.saturating_add(user.total_millis));

    TaskTimeSummary {
        as_of,
        total_millis,
        formatted: format_duration(total_millis),
        users,
    }
}
