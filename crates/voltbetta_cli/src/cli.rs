//! Command-line surface.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use std::fmt::Display;
use std::path::PathBuf;
use voltbetta_core::{
    IssueSeverity, LightLevel, MaintenanceCategory, PlantLocation, RecordId, SymptomSeverity,
    TreatmentStatus,
};

#[derive(Parser, Debug)]
#[command(name = "voltbetta")]
#[command(about = "Track tank logs, maintenance, plants and treatments for Volt")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file (overrides config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the fish profile
    Fish,
    /// Tank log entries
    #[command(subcommand)]
    Log(LogCommands),
    /// Maintenance tasks
    #[command(subcommand)]
    Task(TaskCommands),
    /// Aquarium plants
    #[command(subcommand)]
    Plant(PlantCommands),
    /// Treatment plans
    #[command(subcommand)]
    Treatment(TreatmentCommands),
    /// Fish photos
    #[command(subcommand)]
    Photo(PhotoCommands),
    /// Free-form notes
    #[command(subcommand)]
    Note(NoteCommands),
    /// Show overdue alerts and schedule upcoming reminders once
    Remind,
    /// Re-scan tasks for reminders until stdin closes
    Watch,
    /// Insert the sample dataset into an empty database
    Seed,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive text search
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum LogCommands {
    /// Record a tank log entry
    Add(LogAddArgs),
    /// List entries, newest first
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Only this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete an entry
    Delete { id: RecordId },
}

#[derive(Args, Debug)]
pub struct LogAddArgs {
    pub title: String,
    #[arg(short, long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "General")]
    pub category: String,
    /// When the entry was made (defaults to now)
    #[arg(long, value_parser = when)]
    pub at: Option<DateTime<Utc>>,
    #[arg(long)]
    pub ammonia: Option<f64>,
    #[arg(long)]
    pub nitrite: Option<f64>,
    #[arg(long)]
    pub nitrate: Option<f64>,
    #[arg(long)]
    pub ph: Option<f64>,
    /// Water temperature in °F
    #[arg(long)]
    pub temperature: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Schedule a maintenance task
    Add(TaskAddArgs),
    /// List tasks, overdue first
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long, value_parser = category)]
        category: Option<MaintenanceCategory>,
        /// Include completed one-off tasks
        #[arg(long)]
        all: bool,
    },
    /// Mark a task done now
    Complete { id: RecordId },
    /// Delete a task
    Delete { id: RecordId },
}

#[derive(Args, Debug)]
pub struct TaskAddArgs {
    pub title: String,
    #[arg(long, value_parser = category)]
    pub category: MaintenanceCategory,
    /// Due time, `YYYY-MM-DD` or `YYYY-MM-DD HH:MM` local time
    #[arg(long, value_parser = when)]
    pub due: DateTime<Utc>,
    #[arg(short, long, default_value = "")]
    pub description: String,
    /// Repeat every N days after each completion
    #[arg(long)]
    pub every: Option<u32>,
    /// Never remind about this task
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum PlantCommands {
    /// Add a plant
    Add(PlantAddArgs),
    /// List plants by name
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long, value_parser = location)]
        location: Option<PlantLocation>,
    },
    /// Record a health issue
    Issue {
        id: RecordId,
        description: String,
        #[arg(long, value_parser = issue_severity, default_value = "minor")]
        severity: IssueSeverity,
    },
    /// Resolve the issue at INDEX (as shown by `plant list`)
    Resolve {
        id: RecordId,
        index: usize,
        #[arg(short, long, default_value = "")]
        notes: String,
    },
    /// Delete a plant
    Delete { id: RecordId },
}

#[derive(Args, Debug)]
pub struct PlantAddArgs {
    pub name: String,
    #[arg(long)]
    pub scientific_name: Option<String>,
    #[arg(long, value_parser = location, default_value = "in_tank")]
    pub location: PlantLocation,
    #[arg(long, value_parser = light, default_value = "medium")]
    pub light: LightLevel,
    #[arg(long, default_value = "")]
    pub care_notes: String,
}

#[derive(Subcommand, Debug)]
pub enum TreatmentCommands {
    /// Open a treatment plan
    Start {
        illness: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        medication: String,
    },
    /// List plans, most recent first
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long, value_parser = treatment_status)]
        status: Option<TreatmentStatus>,
    },
    /// Add a diary entry
    Log {
        id: RecordId,
        actions: String,
        #[arg(short, long, default_value = "")]
        notes: String,
    },
    /// Start tracking a symptom
    Symptom {
        id: RecordId,
        name: String,
        #[arg(long, value_parser = symptom_severity, default_value = "mild")]
        severity: SymptomSeverity,
    },
    /// Record a new severity for the symptom at INDEX
    Severity {
        id: RecordId,
        index: usize,
        #[arg(value_parser = symptom_severity)]
        severity: SymptomSeverity,
        #[arg(short, long, default_value = "")]
        notes: String,
    },
    /// Close a plan as completed
    Complete {
        id: RecordId,
        #[arg(default_value = "")]
        outcome: String,
    },
    /// Close a plan as discontinued
    Discontinue {
        id: RecordId,
        #[arg(default_value = "")]
        reason: String,
    },
    /// Delete a plan
    Delete { id: RecordId },
}

#[derive(Subcommand, Debug)]
pub enum PhotoCommands {
    /// Copy an image into the library
    Add {
        path: PathBuf,
        #[arg(long, default_value = "")]
        caption: String,
        #[arg(long, default_value = "General")]
        category: String,
        /// Attach to this treatment plan
        #[arg(long)]
        treatment: Option<RecordId>,
    },
    /// List photos, newest first
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        category: Option<String>,
        /// Also show photos attached to treatment plans
        #[arg(long)]
        with_treatment: bool,
    },
    /// Print the thumbnail path, generating it when needed
    Thumb { id: RecordId },
    /// Delete a photo and its file
    Delete { id: RecordId },
}

#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// Write a note
    Add {
        title: String,
        #[arg(default_value = "")]
        content: String,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// List notes, recently edited first
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Replace a note's title, content and tags
    Edit {
        id: RecordId,
        title: String,
        #[arg(default_value = "")]
        content: String,
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Delete a note
    Delete { id: RecordId },
}

fn text_value<T: Copy + Display>(
    raw: &str,
    all: &[T],
    parse: fn(&str) -> Option<T>,
) -> Result<T, String> {
    parse(raw).ok_or_else(|| {
        let choices = all
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("expected one of: {choices}")
    })
}

fn category(raw: &str) -> Result<MaintenanceCategory, String> {
    text_value(raw, MaintenanceCategory::ALL, MaintenanceCategory::parse)
}

fn location(raw: &str) -> Result<PlantLocation, String> {
    text_value(raw, PlantLocation::ALL, PlantLocation::parse)
}

fn light(raw: &str) -> Result<LightLevel, String> {
    text_value(raw, LightLevel::ALL, LightLevel::parse)
}

fn issue_severity(raw: &str) -> Result<IssueSeverity, String> {
    text_value(raw, IssueSeverity::ALL, IssueSeverity::parse)
}

fn treatment_status(raw: &str) -> Result<TreatmentStatus, String> {
    text_value(raw, TreatmentStatus::ALL, TreatmentStatus::parse)
}

fn symptom_severity(raw: &str) -> Result<SymptomSeverity, String> {
    text_value(raw, SymptomSeverity::ALL, SymptomSeverity::parse)
}

/// Parses RFC 3339, or `YYYY-MM-DD[ HH:MM]` in local time.
pub fn when(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(9, 0, 0))
        })
        .ok_or_else(|| format!("cannot read `{raw}` as a date"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| format!("`{raw}` does not exist in the local time zone"))
}

#[cfg(test)]
mod tests {
    use super::{category, when, Cli};
    use chrono::{TimeZone, Utc};
    use clap::{CommandFactory, Parser};
    use voltbetta_core::MaintenanceCategory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn enum_values_parse_case_insensitively() {
        assert_eq!(
            category("Water_Change").unwrap(),
            MaintenanceCategory::WaterChange
        );
        assert!(category("vacuum").unwrap_err().contains("water_change"));
    }

    #[test]
    fn rfc3339_timestamps_are_taken_as_is() {
        assert_eq!(
            when("2025-04-19T09:00:00Z").unwrap(),
            Utc.with_ymd_and_hms(2025, 4, 19, 9, 0, 0).unwrap()
        );
        assert!(when("next tuesday").is_err());
    }

    #[test]
    fn task_add_arguments_parse() {
        let cli = Cli::try_parse_from([
            "voltbetta",
            "task",
            "add",
            "Water Change (25%)",
            "--category",
            "water_change",
            "--due",
            "2025-04-19T09:00:00Z",
            "--every",
            "7",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            super::Commands::Task(super::TaskCommands::Add(ref args))
                if args.every == Some(7) && args.category == MaintenanceCategory::WaterChange
        ));
    }

    #[test]
    fn photo_list_hides_treatment_photos_unless_flagged() {
        let plain = Cli::try_parse_from(["voltbetta", "photo", "list"]).unwrap();
        assert!(matches!(
            plain.command,
            super::Commands::Photo(super::PhotoCommands::List {
                with_treatment: false,
                ..
            })
        ));

        let flagged =
            Cli::try_parse_from(["voltbetta", "photo", "list", "--with-treatment"]).unwrap();
        assert!(matches!(
            flagged.command,
            super::Commands::Photo(super::PhotoCommands::List {
                with_treatment: true,
                ..
            })
        ));
    }
}
