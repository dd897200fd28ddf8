//! Background re-scan loop for reminders.
//!
//! # Invariants
//! - One worker thread per scheduler; it owns its own task source.
//! - `stop()` (or drop) signals the worker and joins it before returning.
//! - A failed load is logged and skipped; the loop keeps running.

use super::planner::{tick, ReminderSettings};
use super::Notifier;
use crate::db::open_db;
use crate::model::maintenance::MaintenanceTask;
use crate::repo::maintenance_repo::{MaintenanceRepository, SqliteMaintenanceRepository};
use crate::repo::RepoResult;
use chrono::Utc;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Supplies the task snapshot for each tick.
pub trait TaskSource: Send + 'static {
    fn load_tasks(&mut self) -> RepoResult<Vec<MaintenanceTask>>;
}

/// Task source that opens the database file on every load.
///
/// SQLite connections are not shared across threads, so the worker keeps a
/// path rather than a connection.
#[derive(Debug, Clone)]
pub struct DbTaskSource {
    path: PathBuf,
}

impl DbTaskSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TaskSource for DbTaskSource {
    fn load_tasks(&mut self) -> RepoResult<Vec<MaintenanceTask>> {
        let conn = open_db(&self.path)?;
        SqliteMaintenanceRepository::new(&conn).list_tasks()
    }
}

impl<F> TaskSource for F
where
    F: FnMut() -> RepoResult<Vec<MaintenanceTask>> + Send + 'static,
{
    fn load_tasks(&mut self) -> RepoResult<Vec<MaintenanceTask>> {
        self()
    }
}

/// Handle to the running re-scan thread.
pub struct NotificationScheduler {
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl NotificationScheduler {
    /// Spawns the worker; the first tick runs after one full `interval`.
    pub fn start<S: TaskSource>(
        mut source: S,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
        settings: ReminderSettings,
    ) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        info!(
            "event=scheduler_start module=notify status=ok interval_ms={}",
            interval.as_millis()
        );

        let worker = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => match source.load_tasks() {
                    Ok(tasks) => {
                        tick(notifier.as_ref(), &tasks, Utc::now(), &settings);
                    }
                    Err(err) => {
                        warn!("event=scheduler_tick module=notify status=error error={err}");
                    }
                },
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Signals the worker to exit and waits for it.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("event=scheduler_stop module=notify status=error error_code=worker_panicked");
                return;
            }
            info!("event=scheduler_stop module=notify status=ok");
        }
    }
}

impl Drop for NotificationScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
