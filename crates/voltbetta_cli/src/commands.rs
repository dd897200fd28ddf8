//! Subcommand execution.
//!
//! # Invariants
//! - Every command opens the configured database once and runs to completion
//!   on that connection; `watch` additionally hands the path to the
//!   background scheduler.

use crate::cli::{
    Commands, LogAddArgs, LogCommands, NoteCommands, PhotoCommands, PlantAddArgs, PlantCommands,
    TaskAddArgs, TaskCommands, TreatmentCommands,
};
use crate::console::ConsoleNotifier;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use std::io::BufRead;
use std::sync::Arc;
use voltbetta_core::notify::{overdue_alerts, setup_from_tasks, DbTaskSource};
use voltbetta_core::repo::fish_repo::SqliteFishRepository;
use voltbetta_core::repo::maintenance_repo::SqliteMaintenanceRepository;
use voltbetta_core::repo::note_repo::SqliteNoteRepository;
use voltbetta_core::repo::photo_repo::SqlitePhotoRepository;
use voltbetta_core::repo::plant_repo::SqlitePlantRepository;
use voltbetta_core::repo::tank_log_repo::SqliteTankLogRepository;
use voltbetta_core::repo::treatment_repo::SqliteTreatmentRepository;
use voltbetta_core::service::fish_service::FishService;
use voltbetta_core::service::maintenance_service::MaintenanceService;
use voltbetta_core::service::note_service::NoteService;
use voltbetta_core::service::photo_service::PhotoService;
use voltbetta_core::service::plant_service::PlantService;
use voltbetta_core::service::tank_log_service::TankLogService;
use voltbetta_core::service::treatment_service::TreatmentService;
use voltbetta_core::view::{
    distinct_log_categories, distinct_note_tags, distinct_photo_categories, filter_sorted,
    NoteFilter, PhotoFilter, PlantFilter, TankLogFilter, TaskFilter, TreatmentFilter,
};
use voltbetta_core::{
    open_db, seed_sample_data, Config, MaintenanceTask, NotificationScheduler, Note, Plant,
    TankLog, TreatmentPlan, WaterParameters,
};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

fn local(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format(DISPLAY_FORMAT).to_string()
}

pub fn run(command: Commands, config: &Config) -> Result<()> {
    let mut conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let now = Utc::now();

    match command {
        Commands::Fish => {
            let fish = FishService::new(SqliteFishRepository::new(&conn)).default_profile()?;
            println!("{} {} ({})", fish.profile_picture, fish.name, fish.species);
            for (label, value) in [
                ("variant", &fish.variant),
                ("color", &fish.color),
                ("age", &fish.age),
                ("tank", &fish.tank),
            ] {
                if let Some(value) = value {
                    println!("  {label}: {value}");
                }
            }
            if let Some(acquired_on) = fish.acquired_on {
                println!("  acquired: {acquired_on}");
            }
        }
        Commands::Log(command) => run_log(
            command,
            &TankLogService::new(SqliteTankLogRepository::new(&conn)),
            now,
        )?,
        Commands::Task(command) => run_task(
            command,
            &MaintenanceService::new(SqliteMaintenanceRepository::new(&conn)).with_reminders(
                Arc::new(ConsoleNotifier),
                config.notifications.reminder_settings(),
            ),
            now,
        )?,
        Commands::Plant(command) => {
            run_plant(command, &PlantService::new(SqlitePlantRepository::new(&conn)), now)?
        }
        Commands::Treatment(command) => run_treatment(
            command,
            &TreatmentService::new(SqliteTreatmentRepository::new(&conn)),
            now,
        )?,
        Commands::Photo(command) => {
            let service = PhotoService::new(
                SqlitePhotoRepository::new(&conn),
                SqliteTreatmentRepository::new(&conn),
                config.image_store(),
            );
            run_photo(command, &service, now)?
        }
        Commands::Note(command) => {
            run_note(command, &NoteService::new(SqliteNoteRepository::new(&conn)), now)?
        }
        Commands::Remind => {
            let tasks =
                MaintenanceService::new(SqliteMaintenanceRepository::new(&conn)).list_tasks()?;
            let notifier = ConsoleNotifier;
            let alerts = overdue_alerts(&notifier, &tasks, now);
            let scheduled = setup_from_tasks(
                &notifier,
                &tasks,
                now,
                &config.notifications.reminder_settings(),
            );
            println!("{alerts} overdue, {scheduled} reminder(s) scheduled");
        }
        Commands::Watch => {
            let tasks =
                MaintenanceService::new(SqliteMaintenanceRepository::new(&conn)).list_tasks()?;
            let settings = config.notifications.reminder_settings();
            overdue_alerts(&ConsoleNotifier, &tasks, now);
            setup_from_tasks(&ConsoleNotifier, &tasks, now, &settings);
            drop(conn);

            let scheduler = NotificationScheduler::start(
                DbTaskSource::new(&config.db_path),
                Arc::new(ConsoleNotifier),
                config.notifications.check_interval(),
                settings,
            );
            println!(
                "watching every {} min; close stdin (Ctrl-D) to stop",
                config.notifications.check_interval_minutes
            );
            for line in std::io::stdin().lock().lines() {
                line?;
            }
            scheduler.stop();
        }
        Commands::Seed => {
            let summary = seed_sample_data(&mut conn)?;
            if summary.is_empty() {
                println!("database already has records; nothing seeded");
            } else {
                println!(
                    "seeded {} tasks, {} logs, {} plants",
                    summary.tasks, summary.logs, summary.plants
                );
            }
        }
    }
    Ok(())
}

fn run_log(
    command: LogCommands,
    service: &TankLogService<SqliteTankLogRepository<'_>>,
    now: DateTime<Utc>,
) -> Result<()> {
    match command {
        LogCommands::Add(args) => {
            let log = service.create_log(&log_from_args(args, now))?;
            println!("log {} recorded", log.id.unwrap_or_default());
        }
        LogCommands::List { list, category } => {
            let logs = service.list_logs()?;
            let filter = TankLogFilter {
                search: list.search.unwrap_or_default(),
                category,
            };
            for log in filter_sorted(&logs, &filter) {
                println!(
                    "#{:<4} {}  [{}] {}",
                    log.id.unwrap_or_default(),
                    local(log.logged_at),
                    log.category,
                    log.title
                );
                if let Some(water) = &log.water {
                    println!("       {}", describe_water(water));
                }
            }
            println!("categories: {}", distinct_log_categories(&logs).join(", "));
        }
        LogCommands::Delete { id } => {
            service.delete_log(id)?;
            println!("log {id} deleted");
        }
    }
    Ok(())
}

fn log_from_args(args: LogAddArgs, now: DateTime<Utc>) -> TankLog {
    let mut log = TankLog::new(args.title, args.description, args.at.unwrap_or(now))
        .with_category(args.category);
    let water = WaterParameters {
        ammonia: args.ammonia,
        nitrite: args.nitrite,
        nitrate: args.nitrate,
        ph: args.ph,
        temperature: args.temperature,
    };
    if !water.is_empty() {
        log.water = Some(water);
    }
    log
}

fn describe_water(water: &WaterParameters) -> String {
    [
        ("NH3", water.ammonia, "ppm"),
        ("NO2", water.nitrite, "ppm"),
        ("NO3", water.nitrate, "ppm"),
        ("pH", water.ph, ""),
        ("temp", water.temperature, "°F"),
    ]
    .into_iter()
    .filter_map(|(label, value, unit)| value.map(|value| format!("{label} {value}{unit}")))
    .collect::<Vec<_>>()
    .join("  ")
}

fn run_task(
    command: TaskCommands,
    service: &MaintenanceService<SqliteMaintenanceRepository<'_>>,
    now: DateTime<Utc>,
) -> Result<()> {
    match command {
        TaskCommands::Add(args) => {
            let task = service.create_task(&task_from_args(args, now))?;
            println!(
                "task {} due {}",
                task.id.unwrap_or_default(),
                local(task.scheduled_at)
            );
        }
        TaskCommands::List {
            list,
            category,
            all,
        } => {
            let tasks = service.list_tasks()?;
            let filter = TaskFilter {
                search: list.search.unwrap_or_default(),
                category,
                show_completed: all,
                now,
            };
            for task in filter_sorted(&tasks, &filter) {
                let repeat = if task.is_recurring {
                    format!(" every {}d", task.recurrence_days)
                } else {
                    String::new()
                };
                println!(
                    "#{:<4} {:<9} {}  {}{}",
                    task.id.unwrap_or_default(),
                    task.status_at(now),
                    local(task.next_scheduled_at()),
                    task.title,
                    repeat
                );
            }
        }
        TaskCommands::Complete { id } => {
            let task = service.complete_task(id, now)?;
            if task.is_recurring {
                println!("done; next due {}", local(task.scheduled_at));
            } else {
                println!("done");
            }
        }
        TaskCommands::Delete { id } => {
            service.delete_task(id)?;
            println!("task {id} deleted");
        }
    }
    Ok(())
}

fn task_from_args(args: TaskAddArgs, now: DateTime<Utc>) -> MaintenanceTask {
    let mut task = MaintenanceTask::new(args.title, args.category, now);
    task.description = args.description;
    task.scheduled_at = args.due;
    task.notifications_enabled = !args.quiet;
    match args.every {
        Some(days) => task.recurring_every(days),
        None => task,
    }
}

fn run_plant(
    command: PlantCommands,
    service: &PlantService<SqlitePlantRepository<'_>>,
    now: DateTime<Utc>,
) -> Result<()> {
    match command {
        PlantCommands::Add(args) => {
            let plant = service.create_plant(&plant_from_args(args, now))?;
            println!("plant {} added", plant.id.unwrap_or_default());
        }
        PlantCommands::List { list, location } => {
            let plants = service.list_plants()?;
            let filter = PlantFilter {
                search: list.search.unwrap_or_default(),
                location,
            };
            for plant in filter_sorted(&plants, &filter) {
                println!(
                    "#{:<4} {} ({}) light={} location={}",
                    plant.id.unwrap_or_default(),
                    plant.name,
                    plant.scientific_name.as_deref().unwrap_or("-"),
                    plant.light,
                    plant.location
                );
                for (index, issue) in plant.issues.iter().enumerate() {
                    let state = if issue.is_resolved { "resolved" } else { "open" };
                    println!(
                        "       [{index}] {} ({}, {state})",
                        issue.description, issue.severity
                    );
                }
            }
        }
        PlantCommands::Issue {
            id,
            description,
            severity,
        } => {
            let plant = service.add_issue(id, &description, severity, now)?;
            println!("{} open issue(s) on {}", plant.open_issues().count(), plant.name);
        }
        PlantCommands::Resolve { id, index, notes } => {
            let plant = service.resolve_issue(id, index, &notes, now)?;
            println!("{} open issue(s) on {}", plant.open_issues().count(), plant.name);
        }
        PlantCommands::Delete { id } => {
            service.delete_plant(id)?;
            println!("plant {id} deleted");
        }
    }
    Ok(())
}

fn plant_from_args(args: PlantAddArgs, now: DateTime<Utc>) -> Plant {
    let mut plant = Plant::new(args.name, now);
    plant.scientific_name = args.scientific_name;
    plant.location = args.location;
    plant.light = args.light;
    plant.care_notes = args.care_notes;
    plant
}

fn run_treatment(
    command: TreatmentCommands,
    service: &TreatmentService<SqliteTreatmentRepository<'_>>,
    now: DateTime<Utc>,
) -> Result<()> {
    match command {
        TreatmentCommands::Start {
            illness,
            description,
            medication,
        } => {
            let mut plan = TreatmentPlan::new(illness, now);
            plan.description = description;
            plan.medication_notes = medication;
            let plan = service.create_plan(&plan)?;
            println!("treatment {} started", plan.id.unwrap_or_default());
        }
        TreatmentCommands::List { list, status } => {
            let plans = service.list_plans()?;
            let filter = TreatmentFilter {
                search: list.search.unwrap_or_default(),
                status,
            };
            for plan in filter_sorted(&plans, &filter) {
                println!(
                    "#{:<4} {:<12} {}  {}",
                    plan.id.unwrap_or_default(),
                    plan.status,
                    local(plan.started_at),
                    plan.illness_name
                );
                for (index, symptom) in plan.symptoms.iter().enumerate() {
                    println!("       [{index}] {} ({})", symptom.name, symptom.severity);
                }
                for entry in &plan.logs {
                    println!("       {}  {}", local(entry.date), entry.actions);
                }
            }
        }
        TreatmentCommands::Log { id, actions, notes } => {
            let plan = service.add_log(id, &actions, &notes, now)?;
            println!("{} diary entries", plan.logs.len());
        }
        TreatmentCommands::Symptom { id, name, severity } => {
            service.add_symptom(id, &name, severity, now)?;
            println!("tracking {name}");
        }
        TreatmentCommands::Severity {
            id,
            index,
            severity,
            notes,
        } => {
            let plan = service.update_symptom(id, index, severity, &notes, now)?;
            println!("{} is now {severity}", plan.symptoms[index].name);
        }
        TreatmentCommands::Complete { id, outcome } => {
            service.complete(id, &outcome, now)?;
            println!("treatment {id} completed");
        }
        TreatmentCommands::Discontinue { id, reason } => {
            service.discontinue(id, &reason, now)?;
            println!("treatment {id} discontinued");
        }
        TreatmentCommands::Delete { id } => {
            service.delete_plan(id)?;
            println!("treatment {id} deleted");
        }
    }
    Ok(())
}

fn run_photo(
    command: PhotoCommands,
    service: &PhotoService<SqlitePhotoRepository<'_>, SqliteTreatmentRepository<'_>>,
    now: DateTime<Utc>,
) -> Result<()> {
    match command {
        PhotoCommands::Add {
            path,
            caption,
            category,
            treatment,
        } => {
            let photo = service.add_photo(&path, &caption, &category, treatment, now)?;
            println!(
                "photo {} stored as {}",
                photo.id.unwrap_or_default(),
                photo.full_path().display()
            );
        }
        PhotoCommands::List {
            list,
            category,
            with_treatment,
        } => {
            let photos = service.list_photos()?;
            let filter = PhotoFilter {
                search: list.search.unwrap_or_default(),
                category,
                include_treatment: with_treatment,
            };
            for photo in filter_sorted(&photos, &filter) {
                println!(
                    "#{:<4} {}  [{}] {}",
                    photo.id.unwrap_or_default(),
                    local(photo.taken_at),
                    photo.category,
                    photo.caption
                );
            }
            println!("categories: {}", distinct_photo_categories(&photos).join(", "));
        }
        PhotoCommands::Thumb { id } => {
            println!("{}", service.thumbnail(id)?.display());
        }
        PhotoCommands::Delete { id } => {
            service.delete_photo(id)?;
            println!("photo {id} deleted");
        }
    }
    Ok(())
}

fn run_note(
    command: NoteCommands,
    service: &NoteService<SqliteNoteRepository<'_>>,
    now: DateTime<Utc>,
) -> Result<()> {
    match command {
        NoteCommands::Add {
            title,
            content,
            tags,
        } => {
            let note = service.create_note(&Note::new(title, content, tags, now))?;
            println!("note {} saved", note.id.unwrap_or_default());
        }
        NoteCommands::List { list, tag } => {
            let notes = service.list_notes()?;
            let filter = NoteFilter {
                search: list.search.unwrap_or_default(),
                tag,
            };
            for note in filter_sorted(&notes, &filter) {
                println!(
                    "#{:<4} {}  {}  [{}]",
                    note.id.unwrap_or_default(),
                    local(note.modified_at),
                    note.title,
                    note.tag_list().join(", ")
                );
            }
            println!("tags: {}", distinct_note_tags(&notes).join(", "));
        }
        NoteCommands::Edit {
            id,
            title,
            content,
            tags,
        } => {
            service.update_note(id, &title, &content, &tags, now)?;
            println!("note {id} updated");
        }
        NoteCommands::Delete { id } => {
            service.delete_note(id)?;
            println!("note {id} deleted");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{describe_water, log_from_args, task_from_args};
    use crate::cli::{LogAddArgs, TaskAddArgs};
    use chrono::{TimeZone, Utc};
    use voltbetta_core::{MaintenanceCategory, WaterParameters};

    #[test]
    fn log_without_readings_has_no_water_block() {
        let args = LogAddArgs {
            title: "Added driftwood".to_string(),
            description: String::new(),
            category: "Decor".to_string(),
            at: None,
            ammonia: None,
            nitrite: None,
            nitrate: None,
            ph: None,
            temperature: None,
        };
        let now = Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap();
        let log = log_from_args(args, now);
        assert_eq!(log.logged_at, now);
        assert_eq!(log.category, "Decor");
        assert!(log.water.is_none());
    }

    #[test]
    fn water_summary_skips_missing_readings() {
        let water = WaterParameters {
            ph: Some(7.2),
            temperature: Some(78.0),
            ..WaterParameters::default()
        };
        assert_eq!(describe_water(&water), "pH 7.2  temp 78°F");
    }

    #[test]
    fn every_flag_makes_task_recurring() {
        let now = Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap();
        let due = Utc.with_ymd_and_hms(2025, 4, 8, 9, 0, 0).unwrap();
        let task = task_from_args(
            TaskAddArgs {
                title: "Water Change (25%)".to_string(),
                category: MaintenanceCategory::WaterChange,
                due,
                description: String::new(),
                every: Some(7),
                quiet: true,
            },
            now,
        );
        assert!(task.is_recurring);
        assert_eq!(task.recurrence_days, 7);
        assert_eq!(task.scheduled_at, due);
        assert!(!task.notifications_enabled);
    }
}
