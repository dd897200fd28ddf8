//! Application configuration loaded from TOML.
//!
//! # Invariants
//! - Every field has a serde default, so partial files are valid.
//! - A missing config file is created with defaults on first load.
//! - Loaded notification timings are within the `MAX_*` bounds below.

use crate::media::{ImageStore, DEFAULT_THUMBNAIL_SIZE};
use crate::notify::ReminderSettings;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "voltbetta";
const CONFIG_FILE: &str = "config.toml";

/// One day.
pub const MAX_CHECK_INTERVAL_MINUTES: u64 = 24 * 60;
/// One week.
pub const MAX_LEAD_MINUTES: i64 = 7 * 24 * 60;
/// One year.
pub const MAX_WINDOW_HOURS: i64 = 365 * 24;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    /// A value parsed but lies outside its accepted range.
    OutOfRange {
        key: &'static str,
        value: i128,
        min: i128,
        max: i128,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "config file error at {}: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Serialize(err) => write!(f, "cannot write config: {err}"),
            Self::OutOfRange {
                key,
                value,
                min,
                max,
            } => write!(f, "`{key}` = {value} is outside {min}..={max}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::OutOfRange { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub notifications: NotificationsConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagesConfig {
    #[serde(default = "default_image_root")]
    pub root: PathBuf,

    #[serde(default = "default_thumbnail_dir")]
    pub thumbnail_dir: PathBuf,

    /// Longest thumbnail edge in pixels.
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            root: default_image_root(),
            thumbnail_dir: default_thumbnail_dir(),
            thumbnail_size: default_thumbnail_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Minutes between background re-scans.
    #[serde(default = "default_check_interval_minutes")]
    pub check_interval_minutes: u64,

    /// Minutes before `scheduled_at` a reminder fires.
    #[serde(default = "default_lead_minutes")]
    pub lead_minutes: i64,

    /// Hours ahead a re-scan looks for due tasks.
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            check_interval_minutes: default_check_interval_minutes(),
            lead_minutes: default_lead_minutes(),
            window_hours: default_window_hours(),
        }
    }
}

impl NotificationsConfig {
    /// Rejects timings the scheduler cannot represent sensibly.
    pub fn validate(&self) -> ConfigResult<()> {
        in_range(
            "notifications.check_interval_minutes",
            i128::from(self.check_interval_minutes),
            1,
            i128::from(MAX_CHECK_INTERVAL_MINUTES),
        )?;
        in_range(
            "notifications.lead_minutes",
            i128::from(self.lead_minutes),
            0,
            i128::from(MAX_LEAD_MINUTES),
        )?;
        in_range(
            "notifications.window_hours",
            i128::from(self.window_hours),
            1,
            i128::from(MAX_WINDOW_HOURS),
        )
    }

    /// Reminder timings, clamped to the accepted ranges.
    pub fn reminder_settings(&self) -> ReminderSettings {
        let fallback = ReminderSettings::default();
        ReminderSettings {
            lead: chrono::Duration::try_minutes(self.lead_minutes.clamp(0, MAX_LEAD_MINUTES))
                .unwrap_or(fallback.lead),
            window: chrono::Duration::try_hours(self.window_hours.clamp(1, MAX_WINDOW_HOURS))
                .unwrap_or(fallback.window),
        }
    }

    pub fn check_interval(&self) -> std::time::Duration {
        let minutes = self
            .check_interval_minutes
            .clamp(1, MAX_CHECK_INTERVAL_MINUTES);
        std::time::Duration::from_secs(minutes.saturating_mul(60))
    }
}

fn in_range(key: &'static str, value: i128, min: i128, max: i128) -> ConfigResult<()> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            key,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn default_db_path() -> PathBuf {
    data_dir().join("voltbetta.db")
}

fn default_log_dir() -> PathBuf {
    data_dir().join("logs")
}

fn default_log_level() -> String {
    crate::logging::default_log_level().to_string()
}

fn default_image_root() -> PathBuf {
    data_dir().join("images")
}

fn default_thumbnail_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join(APP_DIR)
        .join("thumbnails")
}

fn default_thumbnail_size() -> u32 {
    DEFAULT_THUMBNAIL_SIZE
}

fn default_check_interval_minutes() -> u64 {
    15
}

fn default_lead_minutes() -> i64 {
    60
}

fn default_window_hours() -> i64 {
    24
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_dir: default_log_dir(),
            log_level: default_log_level(),
            images: ImagesConfig::default(),
            notifications: NotificationsConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl Config {
    /// Loads the user config, writing defaults when the file is missing.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
            config.notifications.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content).map_err(io_error)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    pub fn image_store(&self) -> ImageStore {
        ImageStore::new(
            self.images.root.clone(),
            self.images.thumbnail_dir.clone(),
            self.images.thumbnail_size,
        )
    }
}
