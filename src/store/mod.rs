//! Storage seam for time entries.
//!
//! Every mutating call is a single atomic step against the backing store:
//! `append_if_idle` checks and appends in one go, `close_open` locates and
//! closes in one go. Callers never read-then-write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{NewTimeEntry, TimeEntry};

pub mod memory;

pub use memory::MemoryTimeEntryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// An open entry already exists for the (task, user) pair.
    #[error("an open time entry already exists")]
    Conflict,
    /// No open entry exists for the (task, user) pair.
    #[error("no open time entry found")]
    NotFound,
    #[error("time entry store unavailable: {0:#}")]
    Unavailable(#[source] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TimeEntryStore: Send + Sync {
    /// Appends `entry` as an open entry unless its (task, user) pair already has one.
    async fn append_if_idle(&self, entry: NewTimeEntry) -> StoreResult<TimeEntry>;

    /// Closes the open entry for (task, user) at `end_time`, storing the clamped duration.
    async fn close_open(
        &self,
        task_id: &str,
        user_id: &str,
        end_time: DateTime<Utc>,
    ) -> StoreResult<TimeEntry>;

    async fn find_open(&self, task_id: &str, user_id: &str) -> StoreResult<Option<TimeEntry>>;

    async fn entries_for_task(&self, task_id: &str) -> StoreResult<Vec<TimeEntry>>;

    async fn open_entries_for_user(&self, user_id: &str) -> StoreResult<Vec<TimeEntry>>;
}
