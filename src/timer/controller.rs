use std::sync::Arc;

use log::debug;

use crate::{
    clock::Clock,
    log_error, log_info, log_warn,
    models::{NewTimeEntry, TaskTime, TimeEntry},
    report::{aggregate, history},
    store::{StoreError, TimeEntryStore},
};

use super::{
    error::{TimerError, TimerResult},
    TimerSnapshot,
};

const ENABLE_LOGS: bool = true;

/// Timer engine. Enforces one open entry per (task, user) and is the only
/// writer of time entries.
///
/// Cheap to clone; clones share the store and clock.
#[derive(Clone)]
pub struct TimerController {
    store: Arc<dyn TimeEntryStore>,
    clock: Arc<dyn Clock>,
}

impl TimerController {
    pub fn new(store: Arc<dyn TimeEntryStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Opens a session for `user_id` on `task_id`, starting now.
    pub async fn start_timer(&self, task_id: &str, user_id: &str) -> TimerResult<TimeEntry> {
        validate_identifier(task_id, "task_id")?;
        validate_identifier(user_id, "user_id")?;

        let entry = NewTimeEntry::new(task_id, user_id, self.clock.now());

        match self.store.append_if_idle(entry).await {
            Ok(entry) => {
                log_info!(
                    "Started timer {} for user {} on task {}",
                    entry.id,
                    user_id,
                    task_id
                );
                Ok(entry)
            }
            Err(StoreError::Conflict) => {
                debug!("Start rejected, timer already running for {user_id} on {task_id}");
                Err(TimerError::AlreadyRunning {
                    task_id: task_id.to_string(),
                    user_id: user_id.to_string(),
                })
            }
            Err(err) => Err(self.store_failure("start", task_id, user_id, err)),
        }
    }

    /// Closes the open session for `user_id` on `task_id` at now.
    pub async fn stop_timer(&self, task_id: &str, user_id: &str) -> TimerResult<TimeEntry> {
        validate_identifier(task_id, "task_id")?;
        validate_identifier(user_id, "user_id")?;

        let stopped_at = self.clock.now();

        match self.store.close_open(task_id, user_id, stopped_at).await {
            Ok(entry) => {
                if stopped_at < entry.start_time {
                    log_warn!(
                        "Clock went backwards closing timer {} ({} < {}); duration clamped to 0",
                        entry.id,
                        stopped_at,
                        entry.start_time
                    );
                }
                log_info!(
                    "Stopped timer {} for user {} on task {} after {} ms",
                    entry.id,
                    user_id,
                    task_id,
                    entry.duration_millis
                );
                Ok(entry)
            }
            Err(StoreError::NotFound) => {
                debug!("Stop rejected, no active timer for {user_id} on {task_id}");
                Err(TimerError::NoActiveTimer {
                    task_id: task_id.to_string(),
                    user_id: user_id.to_string(),
                })
            }
            Err(err) => Err(self.store_failure("stop", task_id, user_id, err)),
        }
    }

    pub async fn timer_status(&self, task_id: &str, user_id: &str) -> TimerResult<TimerSnapshot> {
        validate_identifier(task_id, "task_id")?;
        validate_identifier(user_id, "user_id")?;

        let open = self
            .store
            .find_open(task_id, user_id)
            .await
            .map_err(TimerError::from_read)?;

        Ok(TimerSnapshot::from_open_entry(
            task_id,
            user_id,
            open,
            self.clock.now(),
        ))
    }

    /// Read path for a task: entries newest first plus totals as of now.
    pub async fn task_time(&self, task_id: &str) -> TimerResult<TaskTime> {
        validate_identifier(task_id, "task_id")?;

        let entries = self
            .store
            .entries_for_task(task_id)
            .await
            .map_err(TimerError::from_read)?;
        let summary = aggregate(&entries, self.clock.now());

        Ok(TaskTime {
            task_id: task_id.to_string(),
            entries: history(&entries),
            summary,
        })
    }

    /// Every open entry for `user_id`, across tasks.
    pub async fn active_timers(&self, user_id: &str) -> TimerResult<Vec<TimeEntry>> {
        validate_identifier(user_id, "user_id")?;

        self.store
            .open_entries_for_user(user_id)
            .await
            .map_err(TimerError::from_read)
    }

    fn store_failure(
        &self,
        operation: &str,
        task_id: &str,
        user_id: &str,
        err: StoreError,
    ) -> TimerError {
        log_error!("Timer {operation} failed for user {user_id} on task {task_id}: {err}");
        match err {
            StoreError::Unavailable(inner) => TimerError::StoreUnavailable(inner),
            other => TimerError::StoreUnavailable(anyhow::Error::new(other)),
        }
    }
}

fn validate_identifier(value: &str, field: &'static str) -> TimerResult<()> {
    if value.trim().is_empty() {
        return Err(TimerError::InvalidIdentifier { field });
    }
    Ok(())
}
