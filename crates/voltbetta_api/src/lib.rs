//! JSON HTTP backend for VoltBetta clients.
//!
//! # Responsibility
//! - Expose record CRUD and the record-level actions under `/api`.
//! - Translate core errors into HTTP status codes.
//!
//! # Invariants
//! - One SQLite connection per process, serialized through an async mutex.
//! - Handlers never hold the connection lock across an `.await`.

pub mod error;
pub mod inputs;
pub mod routes;

use axum::routing::{get, post};
use axum::Router;
use rusqlite::Connection;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use voltbetta_core::notify::ReminderSettings;
use voltbetta_core::{ImageStore, LogNotifier, Notifier};

pub use error::{ApiError, ApiResult};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    images: Arc<ImageStore>,
    notifier: Arc<dyn Notifier>,
    reminders: ReminderSettings,
}

impl AppState {
    /// State whose task reminders only reach the log.
    pub fn new(conn: Connection, images: ImageStore) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            images: Arc::new(images),
            notifier: Arc::new(LogNotifier),
            reminders: ReminderSettings::default(),
        }
    }

    /// Routes task reminder changes to `notifier`.
    pub fn with_notifier(
        mut self,
        notifier: Arc<dyn Notifier>,
        reminders: ReminderSettings,
    ) -> Self {
        self.notifier = notifier;
        self.reminders = reminders;
        self
    }

    pub async fn db(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().await
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.notifier)
    }

    pub fn reminder_settings(&self) -> ReminderSettings {
        self.reminders
    }
}

/// Builds the full route table.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        // fish profile
        .route("/api/fish", get(routes::list_fish))
        .route("/api/fish/:id", get(routes::get_fish).put(routes::update_fish))
        // tank logs
        .route("/api/logs", get(routes::list_logs).post(routes::create_log))
        .route(
            "/api/logs/:id",
            get(routes::get_log)
                .put(routes::update_log)
                .delete(routes::delete_log),
        )
        // maintenance tasks
        .route("/api/tasks", get(routes::list_tasks).post(routes::create_task))
        .route(
            "/api/tasks/:id",
            get(routes::get_task)
                .put(routes::update_task)
                .delete(routes::delete_task),
        )
        .route("/api/tasks/:id/complete", post(routes::complete_task))
        // plants
        .route("/api/plants", get(routes::list_plants).post(routes::create_plant))
        .route(
            "/api/plants/:id",
            get(routes::get_plant)
                .put(routes::update_plant)
                .delete(routes::delete_plant),
        )
        .route("/api/plants/:id/issues", post(routes::add_plant_issue))
        .route(
            "/api/plants/:id/issues/:index/resolve",
            post(routes::resolve_plant_issue),
        )
        // treatment plans
        .route(
            "/api/treatments",
            get(routes::list_treatments).post(routes::create_treatment),
        )
        .route(
            "/api/treatments/:id",
            get(routes::get_treatment)
                .put(routes::update_treatment)
                .delete(routes::delete_treatment),
        )
        .route("/api/treatments/:id/logs", post(routes::add_treatment_log))
        .route("/api/treatments/:id/symptoms", post(routes::add_symptom))
        .route(
            "/api/treatments/:id/symptoms/:index",
            post(routes::update_symptom),
        )
        .route("/api/treatments/:id/complete", post(routes::complete_treatment))
        .route(
            "/api/treatments/:id/discontinue",
            post(routes::discontinue_treatment),
        )
        // photos
        .route("/api/photos", get(routes::list_photos).post(routes::create_photo))
        .route(
            "/api/photos/:id",
            get(routes::get_photo)
                .put(routes::update_photo)
                .delete(routes::delete_photo),
        )
        .route("/api/photos/:id/thumbnail", get(routes::photo_thumbnail))
        // notes
        .route("/api/notes", get(routes::list_notes).post(routes::create_note))
        .route(
            "/api/notes/:id",
            get(routes::get_note)
                .put(routes::update_note)
                .delete(routes::delete_note),
        )
        .with_state(state)
}
