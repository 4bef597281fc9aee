use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    models::{NewTimeEntry, TimeEntry},
    store::{StoreError, StoreResult, TimeEntryStore},
};

/// Process-local store. Each operation runs under a single lock acquisition.
#[derive(Debug, Default)]
pub struct MemoryTimeEntryStore {
    tasks: Mutex<HashMap<String, Vec<TimeEntry>>>,
}

impl MemoryTimeEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<TimeEntry>>> {
        match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl TimeEntryStore for MemoryTimeEntryStore {
    async fn append_if_idle(&self, entry: NewTimeEntry) -> StoreResult<TimeEntry> {
        let mut tasks = self.lock();
        let entries = tasks.entry(entry.task_id.clone()).or_default();

        if entries
            .iter()
            .any(|existing| existing.user_id == entry.user_id && existing.is_open())
        {
            return Err(StoreError::Conflict);
        }

        let record = entry.into_open_entry();
        entries.push(record.clone());
        Ok(record)
    }

    async fn close_open(
        &self,
        task_id: &str,
        user_id: &str,
        end_time: DateTime<Utc>,
    ) -> StoreResult<TimeEntry> {
        let mut tasks = self.lock();
        let open = tasks
            .get_mut(task_id)
            .and_then(|entries| {
                entries
                    .iter_mut()
                    .find(|entry| entry.user_id == user_id && entry.is_open())
            })
            .ok_or(StoreError::NotFound)?;

        open.close(end_time);
        Ok(open.clone())
    }

    async fn find_open(&self, task_id: &str, user_id: &str) -> StoreResult<Option<TimeEntry>> {
        let tasks = self.lock();
        Ok(tasks.get(task_id).and_then(|entries| {
            entries
                .iter()
                .find(|entry| entry.user_id == user_id && entry.is_open())
                .cloned()
        }))
    }

    async fn entries_for_task(&self, task_id: &str) -> StoreResult<Vec<TimeEntry>> {
        let tasks = self.lock();
        Ok(tasks.get(task_id).cloned().unwrap_or_default())
    }

    async fn open_entries_for_user(&self, user_id: &str) -> StoreResult<Vec<TimeEntry>> {
        let tasks = self.lock();
        let mut open: Vec<TimeEntry> = tasks
            .values()
            .flatten()
            .filter(|entry| entry.user_id == user_id && entry.is_open())
            .cloned()
            .collect();
        open.sort_by(|a, b| b.start_time.cmp(&a.start_time).then_with(|| a.id.cmp(&b.id)));
        Ok(open)
    }
}
