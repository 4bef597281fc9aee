//! Adapters for the task API boundary.
//!
//! `POST /tasks/{taskId}/timer/start` and `POST /tasks/{taskId}/timer/stop`
//! map onto [`start_timer`] and [`stop_timer`]; the task read path uses
//! [`get_task_time`]. Failures become a serialisable [`CommandError`].

use serde::{Deserialize, Serialize};

use crate::{
    models::{TaskTime, TimeEntry},
    timer::{TimerController, TimerError, TimerSnapshot},
};

/// Identity of the caller, already verified by the auth layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    pub user_id: String,
}

impl CallerIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub status: u16,
    pub message: String,
}

impl From<TimerError> for CommandError {
    fn from(err: TimerError) -> Self {
        let (code, status) = match &err {
            TimerError::InvalidIdentifier { .. } => ("InvalidIdentifier", 400),
            TimerError::AlreadyRunning { .. } => ("AlreadyRunning", 409),
            TimerError::NoActiveTimer { .. } => ("NoActiveTimer", 409),
            TimerError::StoreUnavailable(_) => ("StoreUnavailable", 503),
        };

        Self {
            code: code.to_string(),
            status,
            message: err.to_string(),
        }
    }
}

pub async fn start_timer(
    controller: &TimerController,
    task_id: &str,
    caller: &CallerIdentity,
) -> Result<TimeEntry, CommandError> {
    controller
        .start_timer(task_id, &caller.user_id)
        .await
        .map_err(CommandError::from)
}

pub async fn stop_timer(
    controller: &TimerController,
    task_id: &str,
    caller: &CallerIdentity,
) -> Result<TimeEntry, CommandError> {
    controller
        .stop_timer(task_id, &caller.user_id)
        .await
        .map_err(CommandError::from)
}

pub async fn get_timer_state(
    controller: &TimerController,
    task_id: &str,
    caller: &CallerIdentity,
) -> Result<TimerSnapshot, CommandError> {
    controller
        .timer_status(task_id, &caller.user_id)
        .await
        .map_err(CommandError::from)
}

pub async fn get_task_time(
    controller: &TimerController,
    task_id: &str,
) -> Result<TaskTime, CommandError> {
    controller
        .task_time(task_id)
        .await
        .map_err(CommandError::from)
}

pub async fn list_active_timers(
    controller: &TimerController,
    caller: &CallerIdentity,
) -> Result<Vec<TimeEntry>, CommandError> {
    controller
        .active_timers(&caller.user_id)
        .await
        .map_err(CommandError::from)
}
