//! `voltbetta` command-line front end.
//!
//! # Responsibility
//! - Parse arguments, load config, start logging, dispatch one subcommand.

mod cli;
mod commands;
mod console;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use voltbetta_core::{init_logging, Config};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load config")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    init_logging("cli", &config.log_level, &config.log_dir).context("failed to start logging")?;

    commands::run(cli.command, &config)
}
