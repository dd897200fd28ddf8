use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use voltbetta_api::{router, AppState};
use voltbetta_core::notify::{overdue_alerts, setup_from_tasks, DbTaskSource};
use voltbetta_core::repo::maintenance_repo::{MaintenanceRepository, SqliteMaintenanceRepository};
use voltbetta_core::{init_logging, open_db, Config, LogNotifier, NotificationScheduler, Notifier};

#[derive(Parser)]
#[command(name = "voltbetta-api")]
#[command(about = "HTTP backend for the VoltBetta aquarium tracker")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "VOLTBETTA_CONFIG")]
    config: Option<PathBuf>,

    /// Database file (overrides config)
    #[arg(long, env = "VOLTBETTA_DB")]
    db: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(short, long, env = "VOLTBETTA_BIND")]
    bind: Option<String>,

    /// Do not run the background reminder scan
    #[arg(long)]
    no_reminders: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load config")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(bind) = cli.bind {
        config.api.bind = bind;
    }

    init_logging("api", &config.log_level, &config.log_dir).context("failed to start logging")?;

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let settings = config.notifications.reminder_settings();

    let _scheduler = if cli.no_reminders {
        None
    } else {
        let tasks = SqliteMaintenanceRepository::new(&conn)
            .list_tasks()
            .context("failed to load tasks for reminders")?;
        let now = Utc::now();
        overdue_alerts(notifier.as_ref(), &tasks, now);
        setup_from_tasks(notifier.as_ref(), &tasks, now, &settings);
        Some(NotificationScheduler::start(
            DbTaskSource::new(&config.db_path),
            Arc::clone(&notifier),
            config.notifications.check_interval(),
            settings,
        ))
    };
    let state = AppState::new(conn, config.image_store()).with_notifier(notifier, settings);

    let listener = tokio::net::TcpListener::bind(&config.api.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.api.bind))?;
    info!("event=api_listen module=api status=ok addr={}", config.api.bind);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
