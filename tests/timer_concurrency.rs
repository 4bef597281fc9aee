use std::{sync::Arc, time::Duration};

use chrono::{TimeZone, Utc};
use tasktime::{
    Database, FixedClock, MemoryTimeEntryStore, SqliteTimeEntryStore, TimeEntryStore,
    TimerController, TimerError,
};
use tokio::task::JoinSet;

const CONTENDERS: usize = 50;

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 9, 9, 9, 0, 0).unwrap(),
    ))
}

async fn race_starts(controller: TimerController) -> (usize, usize) {
    let mut set = JoinSet::new();
    for _ in 0..CONTENDERS {
        let controller = controller.clone();
        set.spawn(async move { controller.start_timer("task-1", "u1").await });
    }

    let mut started = 0;
    let mut already_running = 0;
    while let Some(joined) = set.join_next().await {
        match joined.unwrap() {
            Ok(_) => started += 1,
            Err(TimerError::AlreadyRunning { .. }) => already_running += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    (started, already_running)
}

async fn race_stops(controller: TimerController) -> (usize, usize) {
    let mut set = JoinSet::new();
    for _ in 0..CONTENDERS {
        let controller = controller.clone();
        set.spawn(async move { controller.stop_timer("task-1", "u1").await });
    }

    let mut stopped = 0;
    let mut idle = 0;
    while let Some(joined) = set.join_next().await {
        match joined.unwrap() {
            Ok(_) => stopped += 1,
            Err(TimerError::NoActiveTimer { .. }) => idle += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    (stopped, idle)
}

async fn assert_single_winner(store: Arc<dyn TimeEntryStore>) {
    let controller = TimerController::new(store.clone(), clock());

    let (started, already_running) = race_starts(controller.clone()).await;
    assert_eq!(started, 1);
    assert_eq!(already_running, CONTENDERS - 1);

    let entries = store.entries_for_task("task-1").await.unwrap();
    assert_eq!(entries.iter().filter(|entry| entry.is_open()).count(), 1);

    let (stopped, idle) = race_stops(controller.clone()).await;
    assert_eq!(stopped, 1);
    assert_eq!(idle, CONTENDERS - 1);

    let entries = store.entries_for_task("task-1").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries.iter().all(|entry| !entry.is_open()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_starts_in_memory_have_one_winner() {
    assert_single_winner(Arc::new(MemoryTimeEntryStore::new())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_starts_in_sqlite_have_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("race.sqlite3"), Duration::from_secs(5)).unwrap();
    assert_single_winner(Arc::new(SqliteTimeEntryStore::new(db))).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_users_on_one_task_all_start() {
    let store = Arc::new(MemoryTimeEntryStore::new());
    let controller = TimerController::new(store.clone(), clock());

    let mut set = JoinSet::new();
    for user in 0..CONTENDERS {
        let controller = controller.clone();
        set.spawn(async move { controller.start_timer("task-1", &format!("user-{user}")).await });
    }
    while let Some(joined) = set.join_next().await {
        joined.unwrap().unwrap();
    }

    let view = controller.task_time("task-1").await.unwrap();
    assert_eq!(view.summary.users.len(), CONTENDERS);
    assert!(view.summary.users.iter().all(|user| user.is_running));
}

#[tokio::test]
async fn sqlite_entries_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("persist.sqlite3");

    {
        let db = Database::new(path.clone(), Duration::from_secs(5)).unwrap();
        let controller = TimerController::new(Arc::new(SqliteTimeEntryStore::new(db)), clock());
        controller.start_timer("task-1", "u1").await.unwrap();
    }

    let db = Database::new(path, Duration::from_secs(5)).unwrap();
    let controller = TimerController::new(Arc::new(SqliteTimeEntryStore::new(db)), clock());

    let err = controller.start_timer("task-1", "u1").await.unwrap_err();
    assert!(matches!(err, TimerError::AlreadyRunning { .. }));
    controller.stop_timer("task-1", "u1").await.unwrap();
}
