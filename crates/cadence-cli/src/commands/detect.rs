//! Recurring pattern detection command

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use cadence_core::{
    detect::{DetectionConfig, RecurrenceDetector},
    import::parse_csv,
    models::{format_minor_units, RecurringPattern, Transaction},
};
use chrono::NaiveDate;
use tracing::info;

use super::{open_db, truncate};

/// Where detection reads its transactions from
pub enum DetectSource<'a> {
    Database(&'a Path),
    Csv(&'a Path),
}

/// Load transactions on or after `since` from the chosen source
pub fn load_transactions(
    source: DetectSource<'_>,
    since: Option<NaiveDate>,
) -> Result<Vec<Transaction>> {
    match source {
        DetectSource::Database(db_path) => {
            let db = open_db(db_path)?;
            Ok(db.list_transactions(since)?)
        }
        DetectSource::Csv(file) => {
            let csv_file = File::open(file)
                .with_context(|| format!("Failed to open file: {}", file.display()))?;
            let rows = parse_csv(csv_file)
                .with_context(|| format!("Failed to parse CSV: {}", file.display()))?;
            Ok(rows
                .into_iter()
                .filter(|row| since.map_or(true, |s| row.date >= s))
                .map(|row| Transaction::on_date(row.description, row.amount_minor_units, row.date))
                .collect())
        }
    }
}

pub fn cmd_detect(
    source: DetectSource<'_>,
    since: Option<NaiveDate>,
    config: &DetectionConfig,
    json: bool,
) -> Result<()> {
    let transactions = load_transactions(source, since)?;
    let patterns = RecurrenceDetector::with_config(config.clone()).detect(&transactions);

    info!(
        "Found {} recurring series in {} transactions",
        patterns.len(),
        transactions.len()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&patterns)?);
        return Ok(());
    }

    print_patterns(&patterns);
    Ok(())
}

fn print_patterns(patterns: &[RecurringPattern]) {
    if patterns.is_empty() {
        println!("No recurring payments found.");
        return;
    }

    println!();
    println!("🔁 Recurring Payments");
    println!("   ─────────────────────────────────────────────────────────────────────");

    for pattern in patterns {
        println!(
            "   {:24} │ {:>10}/{:<11} │ x{:<3} │ last {} │ next {} │ {}",
            truncate(&pattern.description, 24),
            format_minor_units(pattern.average_amount_minor_units),
            pattern.frequency.as_str(),
            pattern.occurrence_count,
            pattern.last_occurrence,
            pattern.next_expected_occurrence,
            pattern.category_hint.as_str()
        );
    }
}
