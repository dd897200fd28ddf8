//! Core domain logic for the VoltBetta aquarium tracker.
//! This crate is the single source of truth for record rules and storage.

pub mod config;
pub mod db;
pub mod logging;
pub mod media;
pub mod model;
pub mod notify;
pub mod repo;
pub mod seed;
pub mod service;
pub mod view;

pub use config::{Config, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use media::{fit_within, ImageStore, MediaError};
pub use model::fish::{FishProfile, DEFAULT_FISH_ID};
pub use model::maintenance::{MaintenanceCategory, MaintenanceStatus, MaintenanceTask};
pub use model::note::Note;
pub use model::photo::FishPhoto;
pub use model::plant::{IssueSeverity, LightLevel, Plant, PlantIssue, PlantLocation};
pub use model::tank_log::{TankLog, WaterParameters};
pub use model::treatment::{
    Symptom, SymptomHistory, SymptomSeverity, TreatmentLog, TreatmentPlan, TreatmentStatus,
};
pub use model::{RecordId, ValidationError};
pub use notify::{LogNotifier, NotificationScheduler, Notifier, RecordingNotifier, Reminder};
pub use repo::{RepoError, RepoResult};
pub use seed::{seed_sample_data, SeedSummary};
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
