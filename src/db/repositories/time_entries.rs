use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};

use crate::{
    db::{
        connection::Database,
        helpers::{is_unique_violation, parse_datetime, parse_optional_datetime, to_i64, to_u64},
    },
    models::{NewTimeEntry, TimeEntry},
    store::{StoreError, StoreResult, TimeEntryStore},
};

const ENTRY_COLUMNS: &str = "id, task_id, user_id, start_time, end_time, duration_ms";

fn row_to_entry(row: &Row) -> Result<TimeEntry> {
    let start_time: String = row.get("start_time")?;
    let end_time: Option<String> = row.get("end_time")?;
    let duration_ms: i64 = row.get("duration_ms")?;

    Ok(TimeEntry {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        user_id: row.get("user_id")?,
        start_time: parse_datetime(&start_time, "start_time")?,
        end_time: parse_optional_datetime(end_time, "end_time")?,
        duration_millis: to_u64(duration_ms, "duration_ms")?,
    })
}

impl Database {
    /// Inserts `entry` as open inside one IMMEDIATE transaction, or returns
    /// `None` when the (task, user) pair already has an open entry.
    pub async fn insert_open_time_entry(&self, entry: NewTimeEntry) -> Result<Option<TimeEntry>> {
        self.execute(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let existing: Option<String> = tx
                .query_row(
                    "SELECT id FROM time_entries
                     WHERE task_id = ?1 AND user_id = ?2 AND end_time IS NULL",
                    params![entry.task_id, entry.user_id],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO time_entries (id, task_id, user_id, start_time, end_time, duration_ms, created_at)
                 VALUES (?1, ?2, ?3, ?4, NULL, 0, ?5)",
                params![
                    entry.id,
                    entry.task_id,
                    entry.user_id,
                    entry.start_time.to_rfc3339(),
                    entry.start_time.to_rfc3339(),
                ],
            )?;
            tx.commit()?;

            Ok(Some(entry.into_open_entry()))
        })
        .await
    }

    /// Closes the open entry for (task, user) inside one IMMEDIATE transaction,
    /// or returns `None` when there is nothing open.
    pub async fn close_open_time_entry(
        &self,
        task_id: &str,
        user_id: &str,
        end_time: DateTime<Utc>,
    ) -> Result<Option<TimeEntry>> {
        let task_id = task_id.to_string();
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let open = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {ENTRY_COLUMNS} FROM time_entries
                     WHERE task_id = ?1 AND user_id = ?2 AND end_time IS NULL"
                ))?;
                let mut rows = stmt.query(params![task_id, user_id])?;
                match rows.next()? {
                    Some(row) => Some(row_to_entry(row)?),
                    None => None,
                }
            };

            let Some(mut entry) = open else {
                return Ok(None);
            };

            entry.close(end_time);

            let rows_affected = tx.execute(
                "UPDATE time_entries
                 SET end_time = ?1,
                     duration_ms = ?2
                 WHERE id = ?3 AND end_time IS NULL",
                params![
                    end_time.to_rfc3339(),
                    to_i64(entry.duration_millis)?,
                    entry.id,
                ],
            )?;
            if rows_affected == 0 {
                return Ok(None);
            }

            tx.commit()?;
            Ok(Some(entry))
        })
        .await
    }

    pub async fn get_open_time_entry(
        &self,
        task_id: &str,
        user_id: &str,
    ) -> Result<Option<TimeEntry>> {
        let task_id = task_id.to_string();
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM time_entries
                 WHERE task_id = ?1 AND user_id = ?2 AND end_time IS NULL"
            ))?;

            let mut rows = stmt.query(params![task_id, user_id])?;
            let entry = match rows.next()? {
                Some(row) => Some(row_to_entry(row)?),
                None => None,
            };
            Ok(entry)
        })
        .await
    }

    pub async fn list_time_entries_for_task(&self, task_id: &str) -> Result<Vec<TimeEntry>> {
        let task_id = task_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM time_entries
                 WHERE task_id = ?1
                 ORDER BY start_time ASC, id ASC"
            ))?;

            let mut rows = stmt.query(params![task_id])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(row_to_entry(row)?);
            }

            Ok(entries)
        })
        .await
    }

    pub async fn list_open_time_entries_for_user(&self, user_id: &str) -> Result<Vec<TimeEntry>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM time_entries
                 WHERE user_id = ?1 AND end_time IS NULL
                 ORDER BY start_time DESC, id ASC"
            ))?;

            let mut rows = stmt.query(params![user_id])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(row_to_entry(row)?);
            }

            Ok(entries)
        })
        .await
    }
}

/// [`TimeEntryStore`] backed by the SQLite worker.
#[derive(Clone)]
pub struct SqliteTimeEntryStore {
    db: Database,
}

impl SqliteTimeEntryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TimeEntryStore for SqliteTimeEntryStore {
    async fn append_if_idle(&self, entry: NewTimeEntry) -> StoreResult<TimeEntry> {
        match self.db.insert_open_time_entry(entry).await {
            Ok(Some(entry)) => Ok(entry),
            Ok(None) => Err(StoreError::Conflict),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Conflict),
            Err(err) => Err(StoreError::Unavailable(err)),
        }
    }

    async fn close_open(
        &self,
        task_id: &str,
        user_id: &str,
        end_time: DateTime<Utc>,
    ) -> StoreResult<TimeEntry> {
        self.db
            .close_open_time_entry(task_id, user_id, end_time)
            .await
            .map_err(StoreError::Unavailable)?
            .ok_or(StoreError::NotFound)
    }

    async fn find_open(&self, task_id: &str, user_id: &str) -> StoreResult<Option<TimeEntry>> {
        self.db
            .get_open_time_entry(task_id, user_id)
            .await
            .map_err(StoreError::Unavailable)
    }

    async fn entries_for_task(&self, task_id: &str) -> StoreResult<Vec<TimeEntry>> {
        self.db
            .list_time_entries_for_task(task_id)
            .await
            .map_err(StoreError::Unavailable)
    }

    async fn open_entries_for_user(&self, user_id: &str) -> StoreResult<Vec<TimeEntry>> {
        self.db
            .list_open_time_entries_for_user(user_id)
            .await
            .map_err(StoreError::Unavailable)
    }
}
