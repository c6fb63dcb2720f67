//! CSV import command

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use cadence_core::{db::Database, import::parse_csv};
use tracing::info;

/// Counts from one import run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Import a CSV file into the database, skipping rows already stored
pub fn import_file(db: &Database, file: &Path) -> Result<ImportSummary> {
    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let transactions = parse_csv(csv_file)
        .with_context(|| format!("Failed to parse CSV: {}", file.display()))?;

    let mut summary = ImportSummary::default();
    for tx in &transactions {
        match db.insert_transaction(tx)? {
            Some(_) => summary.imported += 1,
            None => summary.skipped += 1,
        }
    }

    info!(
        "Imported {} transactions from {} ({} duplicates skipped)",
        summary.imported,
        file.display(),
        summary.skipped
    );
    Ok(summary)
}

pub fn cmd_import(db: &Database, file: &Path) -> Result<()> {
    println!("📥 Importing from {}...", file.display());

    let summary = import_file(db, file)?;

    println!();
    println!("✅ Import complete!");
    println!("   Imported: {}", summary.imported);
    if summary.skipped > 0 {
        println!("   Skipped (duplicates): {}", summary.skipped);
    }

    Ok(())
}
