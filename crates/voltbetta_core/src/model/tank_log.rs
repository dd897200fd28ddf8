//! Tank log entries: dated observations about the tank.

use super::{require_text, RecordId, ValidationError, DEFAULT_CATEGORY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Optional water test readings attached to a log entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterParameters {
    pub ammonia: Option<f64>,
    pub nitrite: Option<f64>,
    pub nitrate: Option<f64>,
    pub ph: Option<f64>,
    /// Degrees Fahrenheit, as recorded on the tank thermometer.
    pub temperature: Option<f64>,
}

impl WaterParameters {
    /// Returns whether no reading was recorded.
    pub fn is_empty(&self) -> bool {
        self.ammonia.is_none()
            && self.nitrite.is_none()
            && self.nitrate.is_none()
            && self.ph.is_none()
            && self.temperature.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankLog {
    pub id: Option<RecordId>,
    pub title: String,
    pub description: String,
    pub logged_at: DateTime<Utc>,
    pub category: String,
    #[serde(default)]
    pub water: Option<WaterParameters>,
}

impl TankLog {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        logged_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            logged_at,
            category: DEFAULT_CATEGORY.to_string(),
            water: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }
}

impl Display for TankLog {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.logged_at.format("%Y-%m-%d %H:%M"), self.title)
    }
}
