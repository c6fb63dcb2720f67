//! Income source schedule commands

use std::sync::Arc;

use anyhow::{bail, Result};
use cadence_core::{
    db::Database,
    models::{format_minor_units, IncomeSource, ScheduleFrequency},
    schedule::{advance_stale_schedules, today},
    writer::{ScheduleWriter, WriterStats},
};
use chrono::NaiveDate;
use tracing::info;

use super::{parse_amount_arg, truncate};

/// Read all schedules, advancing stale dates and persisting the corrections
///
/// Waits for the write-back worker to drain before returning.
pub async fn refresh_schedules(
    db: &Database,
    reference: Option<NaiveDate>,
    queue_capacity: usize,
) -> Result<(Vec<IncomeSource>, WriterStats)> {
    let sources = db.list_income_sources()?;
    let reference = reference.unwrap_or_else(today);

    let (writer, handle) = ScheduleWriter::spawn(Arc::new(db.clone()), queue_capacity);
    let sources = advance_stale_schedules(sources, reference, &writer);
    drop(writer);

    let stats = handle.finish().await;
    if stats.written > 0 || stats.failed > 0 {
        info!(
            "Schedule write-back: {} persisted, {} failed",
            stats.written, stats.failed
        );
    }

    Ok((sources, stats))
}

pub async fn cmd_schedules_list(
    db: &Database,
    reference: Option<NaiveDate>,
    queue_capacity: usize,
) -> Result<()> {
    let (sources, _) = refresh_schedules(db, reference, queue_capacity).await?;

    if sources.is_empty() {
        println!("No income sources yet. Add one with:");
        println!("  cadence schedules add --id salary --frequency monthly --next 2024-01-31");
        return Ok(());
    }

    println!();
    println!("📅 Income Schedules");
    println!("   ─────────────────────────────────────────────────────────────");

    for source in sources {
        let amount = source
            .amount_minor_units
            .map(format_minor_units)
            .unwrap_or_else(|| "?".to_string());
        println!(
            "   {:20} │ {:>10} │ {:<11} │ next {}",
            truncate(&source.name, 20),
            amount,
            source.frequency.as_deref().unwrap_or("?"),
            source.next_expected_date.as_deref().unwrap_or("?")
        );
    }

    Ok(())
}

pub fn cmd_schedules_add(
    db: &Database,
    id: &str,
    name: Option<&str>,
    amount: Option<&str>,
    frequency: &str,
    next: NaiveDate,
) -> Result<()> {
    let frequency: ScheduleFrequency = match frequency.parse() {
        Ok(f) => f,
        Err(e) => bail!("{}", e),
    };
    if id.trim().is_empty() {
        bail!("Income source id must not be empty");
    }

    let source = IncomeSource {
        id: id.to_string(),
        name: name.unwrap_or(id).to_string(),
        amount_minor_units: amount.map(parse_amount_arg).transpose()?,
        frequency: Some(frequency.as_str().to_string()),
        next_expected_date: Some(next.format("%Y-%m-%d").to_string()),
    };
    db.upsert_income_source(&source)?;

    println!(
        "✅ Saved income source '{}' ({}, next {})",
        source.name, frequency, next
    );
    Ok(())
}
