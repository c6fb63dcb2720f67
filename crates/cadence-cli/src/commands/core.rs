//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `parse_amount_arg` - Decimal amount arguments to minor units
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use cadence_core::{db::Database, import::parse_amount};

/// Open (creating if needed) the database at `db_path`
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    Database::new(path_str).context("Failed to open database")
}

/// Parse a decimal amount argument (e.g. "1,500.00") into minor units
pub fn parse_amount_arg(value: &str) -> Result<i64> {
    parse_amount(value).with_context(|| format!("Invalid amount: {}", value))
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    let transactions = db.count_transactions()?;
    let schedules = db.list_income_sources()?.len();
    println!(
        "   {} transactions, {} income sources",
        transactions, schedules
    );

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import transactions: cadence import --file statement.csv");
    println!("  2. Find recurring payments: cadence detect");

    Ok(())
}
