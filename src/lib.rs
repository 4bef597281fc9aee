pub mod clock;
pub mod db;
pub mod models;
pub mod report;
pub mod settings;
pub mod store;
pub mod timer;
pub mod utils;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use log::info;

pub use clock::{Clock, FixedClock, ScriptedClock, SystemClock};
pub use db::{Database, SqliteTimeEntryStore};
pub use models::{NewTimeEntry, TaskTime, TimeEntry};
pub use report::{aggregate, format_duration, history, TaskTimeSummary, UserTimeSummary};
pub use settings::{SettingsStore, TrackerSettings};
pub use store::{MemoryTimeEntryStore, StoreError, TimeEntryStore};
pub use timer::{TimerController, TimerError, TimerSnapshot, TimerStatus};

/// Wired-up tracker: settings, SQLite-backed store, system clock, and the timer engine.
#[derive(Clone)]
pub struct Tracker {
    pub settings: Arc<SettingsStore>,
    pub db: Database,
    pub timer: TimerController,
}

impl Tracker {
    /// Opens the database named by `settings_store`, after environment overrides.
    pub fn open(settings_store: SettingsStore) -> Result<Self> {
        let settings = settings_store.settings().with_env_overrides();
        let database = Database::new(
            settings.database_path.clone(),
            Duration::from_millis(settings.busy_timeout_ms),
        )?;
        let store = SqliteTimeEntryStore::new(database.clone());
        let timer = TimerController::new(Arc::new(store), Arc::new(SystemClock));

        Ok(Self {
            settings: Arc::new(settings_store),
            db: database,
            timer,
        })
    }
}

/// Loads the settings file at `settings_path`, initialises logging and opens the tracker.
pub fn bootstrap(settings_path: PathBuf) -> Result<Tracker> {
    let settings_store = SettingsStore::new(settings_path)?;
    let settings = settings_store.settings().with_env_overrides();
    utils::logging::init_logging(&settings.log_level);

    info!(
        "tasktime starting up with database at {}",
        settings.database_path.display()
    );

    Tracker::open(settings_store)
}
