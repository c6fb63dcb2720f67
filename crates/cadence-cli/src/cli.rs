//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Cadence - Forecast recurring cash flow
#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Recurring cash-flow forecasting engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "cadence.db", global = true)]
    pub db: PathBuf,

    /// Config file (defaults to $CADENCE_CONFIG, then the data dir override)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import transactions from CSV (Date,Description,Amount[,Category])
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Find recurring series in transaction history
    Detect {
        /// Read transactions from this CSV instead of the database
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Only consider transactions on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Print patterns as JSON
        #[arg(long)]
        json: bool,
    },

    /// Spread a budget amount across categories
    Distribute {
        /// Amount to distribute (e.g. 1500.00)
        #[arg(short, long, allow_hyphen_values = true)]
        total: String,

        /// Categories, comma separated, in priority order
        #[arg(short, long, value_delimiter = ',', required = true)]
        categories: Vec<String>,

        /// Strategy: equal, proportional, manual
        #[arg(short, long, default_value = "equal")]
        strategy: String,

        /// Manual amount per category (CATEGORY=AMOUNT, repeatable)
        #[arg(short, long)]
        manual: Vec<String>,

        /// Total the distribution is audited against (defaults to --total)
        #[arg(long, allow_hyphen_values = true)]
        expected: Option<String>,

        /// Print the distribution as JSON
        #[arg(long)]
        json: bool,
    },

    /// Roll a stale date forward to its next occurrence
    Advance {
        /// Stored next-occurrence date
        #[arg(short, long)]
        date: String,

        /// weekly, fortnightly, monthly, bi-monthly, quarterly, yearly
        #[arg(short, long)]
        frequency: String,

        /// Reference date (defaults to today, UTC)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Manage income source schedules
    Schedules {
        #[command(subcommand)]
        action: Option<SchedulesAction>,
    },
}

#[derive(Subcommand)]
pub enum SchedulesAction {
    /// List schedules, advancing and persisting any stale dates
    List {
        /// Reference date (defaults to today, UTC)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Add or replace an income source
    Add {
        /// Stable identifier
        #[arg(long)]
        id: String,

        /// Display name (defaults to the id)
        #[arg(long)]
        name: Option<String>,

        /// Expected amount (e.g. 2500.00)
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,

        /// Payment frequency
        #[arg(short, long)]
        frequency: String,

        /// Next expected date (YYYY-MM-DD)
        #[arg(long)]
        next: NaiveDate,
    },
}
