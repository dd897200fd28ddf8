//! Sample dataset for a fresh install.
//!
//! # Invariants
//! - Seeding is all-or-nothing (one transaction).
//! - Seeding is skipped when any task, log or plant already exists.

use crate::model::maintenance::{MaintenanceCategory, MaintenanceTask};
use crate::model::plant::{LightLevel, Plant};
use crate::model::tank_log::{TankLog, WaterParameters};
use crate::repo::maintenance_repo::{MaintenanceRepository, SqliteMaintenanceRepository};
use crate::repo::plant_repo::{PlantRepository, SqlitePlantRepository};
use crate::repo::tank_log_repo::{SqliteTankLogRepository, TankLogRepository};
use crate::repo::RepoResult;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::info;
use rusqlite::Connection;

/// Counts of inserted sample records; all zero when seeding was skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub tasks: usize,
    pub logs: usize,
    pub plants: usize,
}

impl SeedSummary {
    pub fn is_empty(&self) -> bool {
        self.tasks == 0 && self.logs == 0 && self.plants == 0
    }
}

struct TaskSeed {
    title: &'static str,
    category: MaintenanceCategory,
    due: (i32, u32, u32),
    last_done: (i32, u32, u32),
    every_days: u32,
}

const TASKS: &[TaskSeed] = &[
    TaskSeed {
        title: "Water Change (25%)",
        category: MaintenanceCategory::WaterChange,
        due: (2025, 4, 19),
        last_done: (2025, 4, 12),
        every_days: 7,
    },
    TaskSeed {
        title: "Replace Filter Media",
        category: MaintenanceCategory::FilterCleaning,
        due: (2025, 5, 10),
        last_done: (2025, 4, 10),
        every_days: 30,
    },
    TaskSeed {
        title: "Clean Gravel",
        category: MaintenanceCategory::Other,
        due: (2025, 4, 24),
        last_done: (2025, 4, 10),
        every_days: 14,
    },
    TaskSeed {
        title: "Test Water Parameters",
        category: MaintenanceCategory::Other,
        due: (2025, 4, 18),
        last_done: (2025, 4, 11),
        every_days: 7,
    },
    TaskSeed {
        title: "Trim Plants",
        category: MaintenanceCategory::PlantMaintenance,
        due: (2025, 4, 21),
        last_done: (2025, 4, 7),
        every_days: 14,
    },
];

struct LogSeed {
    date: (i32, u32, u32),
    notes: &'static str,
    nitrate: f64,
    ph: f64,
    temperature: f64,
}

const LOGS: &[LogSeed] = &[
    LogSeed {
        date: (2025, 4, 10),
        notes: "Parameters looking good. Added 1mL of plant fertilizer.",
        nitrate: 5.0,
        ph: 7.2,
        temperature: 78.0,
    },
    LogSeed {
        date: (2025, 4, 3),
        notes: "Did a 25% water change. Replaced filter media.",
        nitrate: 10.0,
        ph: 7.0,
        temperature: 79.0,
    },
    LogSeed {
        date: (2025, 3, 27),
        notes: "Volt seems very active today. Rearranged plants slightly.",
        nitrate: 15.0,
        ph: 7.1,
        temperature: 78.0,
    },
];

struct PlantSeed {
    name: &'static str,
    scientific_name: &'static str,
    planted: (i32, u32, u32),
    light: LightLevel,
    care_notes: &'static str,
}

const PLANTS: &[PlantSeed] = &[
    PlantSeed {
        name: "Java Fern",
        scientific_name: "Microsorum pteropus",
        planted: (2025, 1, 15),
        light: LightLevel::Low,
        care_notes: "No fertilizer required. Attached to driftwood, do not bury rhizome.",
    },
    PlantSeed {
        name: "Anubias",
        scientific_name: "Anubias barteri",
        planted: (2025, 1, 15),
        light: LightLevel::Low,
        care_notes: "Weekly liquid fertilizer. Attached to rock, slow growing.",
    },
    PlantSeed {
        name: "Amazon Sword",
        scientific_name: "Echinodorus amazonicus",
        planted: (2025, 2, 1),
        light: LightLevel::Medium,
        care_notes: "Root tabs every 3 months. Center background plant, may grow large.",
    },
];

fn day(date: (i32, u32, u32)) -> DateTime<Utc> {
    let (year, month, day) = date;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(9, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or_default()
}

/// Inserts the sample tasks, tank logs and plants into an empty database.
pub fn seed_sample_data(conn: &mut Connection) -> RepoResult<SeedSummary> {
    let tx = conn.transaction()?;
    let tasks = SqliteMaintenanceRepository::new(&tx);
    let logs = SqliteTankLogRepository::new(&tx);
    let plants = SqlitePlantRepository::new(&tx);

    if !tasks.list_tasks()?.is_empty()
        || !logs.list_logs()?.is_empty()
        || !plants.list_plants()?.is_empty()
    {
        info!("event=seed module=core status=skipped reason=not_empty");
        return Ok(SeedSummary::default());
    }

    let mut summary = SeedSummary::default();

    for seed in TASKS {
        let last_done = day(seed.last_done);
        let mut task = MaintenanceTask::new(seed.title, seed.category, last_done)
            .recurring_every(seed.every_days);
        task.scheduled_at = day(seed.due);
        task.last_completed_at = Some(last_done);
        tasks.create_task(&task)?;
        summary.tasks += 1;
    }

    for seed in LOGS {
        let mut log = TankLog::new("Water test", seed.notes, day(seed.date))
            .with_category("Water Parameters");
        log.water = Some(WaterParameters {
            ammonia: Some(0.0),
            nitrite: Some(0.0),
            nitrate: Some(seed.nitrate),
            ph: Some(seed.ph),
            temperature: Some(seed.temperature),
        });
        logs.create_log(&log)?;
        summary.logs += 1;
    }

    for seed in PLANTS {
        let mut plant = Plant::new(seed.name, day(seed.planted));
        plant.scientific_name = Some(seed.scientific_name.to_string());
        plant.light = seed.light;
        plant.care_notes = seed.care_notes.to_string();
        plants.create_plant(&plant)?;
        summary.plants += 1;
    }

    tx.commit()?;

    info!(
        "event=seed module=core status=ok tasks={} logs={} plants={}",
        summary.tasks, summary.logs, summary.plants
    );
    Ok(summary)
}
