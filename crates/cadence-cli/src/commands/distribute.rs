//! Budget distribution command

use std::path::Path;

use anyhow::{Context, Result};
use cadence_core::{
    distribute::{
        distribute, historical_spending_or_empty, validate_distribution, HistoricalSpending,
        ManualAmounts,
    },
    models::{format_minor_units, CategoryDistribution, DistributionStrategy, DistributionValidation},
    schedule::today,
};
use chrono::{Duration, NaiveDate};
use serde_json::json;

use super::{open_db, parse_amount_arg};

/// Parsed arguments of `cadence distribute`
pub struct DistributeArgs<'a> {
    pub total: &'a str,
    pub categories: &'a [String],
    pub strategy: &'a str,
    pub manual: &'a [String],
    pub expected: Option<&'a str>,
    pub json: bool,
}

/// Parse repeated `CATEGORY=AMOUNT` arguments
pub fn parse_manual_amounts(entries: &[String]) -> Result<ManualAmounts> {
    entries
        .iter()
        .map(|entry| {
            let (category, amount) = entry
                .split_once('=')
                .with_context(|| format!("Expected CATEGORY=AMOUNT, got '{}'", entry))?;
            Ok((category.trim().to_string(), parse_amount_arg(amount)?))
        })
        .collect()
}

/// First day of a window of `days` ending at `today`
///
/// A window reaching past the representable calendar covers all history.
pub fn history_start(today: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|window| today.checked_sub_signed(window))
        .unwrap_or(NaiveDate::MIN)
}

/// Spending per category over the configured window, empty on any failure
fn recent_spending(
    db_path: &Path,
    categories: &[String],
    history_window_days: i64,
) -> HistoricalSpending {
    let since = history_start(today(), history_window_days);
    historical_spending_or_empty(|| -> Result<HistoricalSpending> {
        let db = open_db(db_path)?;
        Ok(db.historical_spending(categories, since)?)
    })
}

/// Compute a distribution and its audit without printing
pub fn plan_distribution(
    db_path: &Path,
    args: &DistributeArgs<'_>,
    history_window_days: i64,
) -> Result<(DistributionStrategy, Vec<CategoryDistribution>, DistributionValidation)> {
    let total = parse_amount_arg(args.total)?;
    let expected = args.expected.map(parse_amount_arg).transpose()?.unwrap_or(total);
    let strategy = DistributionStrategy::from_name(args.strategy);

    let manual = parse_manual_amounts(args.manual)?;
    let manual = (!manual.is_empty()).then_some(manual);

    // History is only consulted when it can influence the result
    let historical = if strategy == DistributionStrategy::Proportional {
        recent_spending(db_path, args.categories, history_window_days)
    } else {
        HistoricalSpending::new()
    };

    let distribution = distribute(
        total,
        args.categories,
        &historical,
        strategy,
        manual.as_ref(),
    );
    let validation = validate_distribution(&distribution, expected);

    Ok((strategy, distribution, validation))
}

pub fn cmd_distribute(
    db_path: &Path,
    args: &DistributeArgs<'_>,
    history_window_days: i64,
) -> Result<()> {
    let (strategy, distribution, validation) =
        plan_distribution(db_path, args, history_window_days)?;

    if args.json {
        let output = json!({
            "strategy": strategy,
            "distribution": distribution,
            "validation": validation,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!("💰 Distribution ({})", strategy);
    println!("   ─────────────────────────────────────────");
    for entry in &distribution {
        println!(
            "   {:20} │ {:>12} │ {:>6.2}%",
            entry.category_name,
            format_minor_units(entry.amount_minor_units),
            entry.percentage_of_total
        );
    }
    println!("   ─────────────────────────────────────────");
    println!(
        "   {:20} │ {:>12}",
        "Total",
        format_minor_units(validation.actual_total)
    );

    if validation.valid {
        println!("✅ Distribution adds up");
    } else {
        println!(
            "⚠️  Distribution is off by {}",
            format_minor_units(validation.difference)
        );
    }

    Ok(())
}
