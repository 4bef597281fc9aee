use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("{field} must not be empty")]
    InvalidIdentifier { field: &'static str },
    #[error("timer already running for user {user_id} on task {task_id}")]
    AlreadyRunning { task_id: String, user_id: String },
    #[error("no active timer for user {user_id} on task {task_id}")]
    NoActiveTimer { task_id: String, user_id: String },
    #[error("time entry store unavailable")]
    StoreUnavailable(#[source] anyhow::Error),
}

impl TimerError {
    /// Expected outcomes the caller reflects back to the user rather than retrying.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TimerError::AlreadyRunning { .. } | TimerError::NoActiveTimer { .. }
        )
    }

    /// Store errors seen on a read path carry no domain meaning.
    pub(crate) fn from_read(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(inner) => TimerError::StoreUnavailable(inner),
            other => TimerError::StoreUnavailable(anyhow::Error::new(other)),
        }
    }
}

pub type TimerResult<T> = Result<T, TimerError>;
