//! Cadence CLI - Recurring cash-flow forecasting
//!
//! Usage:
//!   cadence init                                  Initialize database
//!   cadence import --file CSV                     Import transactions
//!   cadence detect                                Find recurring payments
//!   cadence distribute --total 900 --categories A,B,C
//!   cadence advance --date 2024-01-01 --frequency weekly
//!   cadence schedules                             List income schedules

mod cli;
mod commands;


use anyhow::{Context, Result};
use cadence_core::config::ForecastConfig;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use commands::{DetectSource, DistributeArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config =
        ForecastConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Import { file } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_import(&db, &file)
        }
        Commands::Detect { file, since, json } => {
            let source = match &file {
                Some(file) => DetectSource::Csv(file),
                None => DetectSource::Database(&cli.db),
            };
            commands::cmd_detect(source, since, &config.detection, json)
        }
        Commands::Distribute {
            total,
            categories,
            strategy,
            manual,
            expected,
            json,
        } => {
            let args = DistributeArgs {
                total: &total,
                categories: &categories,
                strategy: &strategy,
                manual: &manual,
                expected: expected.as_deref(),
                json,
            };
            commands::cmd_distribute(&cli.db, &args, config.history_window_days)
        }
        Commands::Advance {
            date,
            frequency,
            today,
        } => commands::cmd_advance(&date, &frequency, today),
        Commands::Schedules { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None => {
                    commands::cmd_schedules_list(&db, None, config.writer_queue_capacity).await
                }
                Some(SchedulesAction::List { today }) => {
                    commands::cmd_schedules_list(&db, today, config.writer_queue_capacity).await
                }
                Some(SchedulesAction::Add {
                    id,
                    name,
                    amount,
                    frequency,
                    next,
                }) => commands::cmd_schedules_add(
                    &db,
                    &id,
                    name.as_deref(),
                    amount.as_deref(),
                    &frequency,
                    next,
                ),
            }
        }
    }
}
