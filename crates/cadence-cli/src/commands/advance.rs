//! One-off date advancement command

use anyhow::Result;
use cadence_core::{
    models::ScheduleFrequency,
    schedule::{advance_occurrence, today},
};
use chrono::NaiveDate;

/// Advance `date` by `frequency` relative to `reference` (today when `None`)
///
/// Mirrors the read-path behavior: unknown frequencies and unparseable dates
/// come back unchanged.
pub fn advanced_date(date: &str, frequency: &str, reference: Option<NaiveDate>) -> String {
    let reference = reference.unwrap_or_else(today);
    advance_occurrence(Some(date), Some(frequency), reference).unwrap_or_else(|| date.to_string())
}

pub fn cmd_advance(date: &str, frequency: &str, reference: Option<NaiveDate>) -> Result<()> {
    if let Err(e) = frequency.parse::<ScheduleFrequency>() {
        eprintln!("⚠️  {} (date left unchanged)", e);
    }

    println!("{}", advanced_date(date, frequency, reference));
    Ok(())
}
