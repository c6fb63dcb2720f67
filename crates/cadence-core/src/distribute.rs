//! Budget allocation across categories
//!
//! Spreads one budget amount (in minor units) over the underlying categories of
//! a methodology category. Three strategies:
//! - `equal`: same share each, the first category absorbs the remainder
//! - `proportional`: weighted by recent historical spending, the last category
//!   absorbs the rounding remainder
//! - `manual`: caller-supplied amounts taken verbatim (may not add up; see
//!   [`validate_distribution`])
//!
//! All arithmetic is integer; no minor unit is ever dropped by rounding.

use std::collections::HashMap;
use std::fmt::Display;

use tracing::{debug, warn};

use crate::models::{CategoryDistribution, DistributionStrategy, DistributionValidation};

/// Category name -> summed absolute spend over a recent window
pub type HistoricalSpending = HashMap<String, i64>;

/// Category name -> amount chosen by the user
pub type ManualAmounts = HashMap<String, i64>;

/// Distribute `total` across `categories`
///
/// Returns one entry per input category, in input order (duplicates included).
/// Never fails: `proportional` without usable history and `manual` without a
/// manual map both fall back to `equal`.
pub fn distribute<S: AsRef<str>>(
    total: i64,
    categories: &[S],
    historical: &HistoricalSpending,
    strategy: DistributionStrategy,
    manual: Option<&ManualAmounts>,
) -> Vec<CategoryDistribution> {
    if categories.is_empty() {
        return Vec::new();
    }

    match (strategy, manual) {
        (DistributionStrategy::Equal, _) => distribute_equal(total, categories),
        (DistributionStrategy::Proportional, _) => {
            distribute_proportional(total, categories, historical)
        }
        (DistributionStrategy::Manual, Some(amounts)) => {
            distribute_manual(total, categories, amounts)
        }
        (DistributionStrategy::Manual, None) => {
            debug!("Manual distribution requested without amounts, using equal");
            distribute_equal(total, categories)
        }
    }
}

/// Distribute using a strategy name; unknown names fall back to `equal`
pub fn distribute_by_name<S: AsRef<str>>(
    total: i64,
    categories: &[S],
    historical: &HistoricalSpending,
    strategy: &str,
    manual: Option<&ManualAmounts>,
) -> Vec<CategoryDistribution> {
    distribute(
        total,
        categories,
        historical,
        DistributionStrategy::from_name(strategy),
        manual,
    )
}

fn distribute_equal<S: AsRef<str>>(total: i64, categories: &[S]) -> Vec<CategoryDistribution> {
    let count = categories.len() as i64;
    let per_category = total.div_euclid(count);
    let remainder = total - per_category * count;
    let percentage = 100.0 / count as f64;

    categories
        .iter()
        .enumerate()
        .map(|(i, name)| CategoryDistribution {
            category_name: name.as_ref().to_string(),
            amount_minor_units: if i == 0 {
                per_category + remainder
            } else {
                per_category
            },
            percentage_of_total: percentage,
        })
        .collect()
}

fn distribute_proportional<S: AsRef<str>>(
    total: i64,
    categories: &[S],
    historical: &HistoricalSpending,
) -> Vec<CategoryDistribution> {
    // Spend is a magnitude; negative entries carry no weight
    let weights: Vec<i64> = categories
        .iter()
        .map(|name| historical.get(name.as_ref()).copied().unwrap_or(0).max(0))
        .collect();
    let weight_sum: i128 = weights.iter().map(|&w| i128::from(w)).sum();

    if weight_sum == 0 {
        debug!("No historical spending for categories, using equal distribution");
        return distribute_equal(total, categories);
    }

    let last = categories.len() - 1;
    let mut allocated: i64 = 0;

    categories
        .iter()
        .zip(&weights)
        .enumerate()
        .map(|(i, (name, &weight))| {
            let amount = if i == last {
                total - allocated
            } else {
                // floor(total * share) without going through floating point
                let share = (i128::from(total) * i128::from(weight)).div_euclid(weight_sum);
                let share = share as i64;
                allocated += share;
                share
            };
            CategoryDistribution {
                category_name: name.as_ref().to_string(),
                amount_minor_units: amount,
                percentage_of_total: weight as f64 / weight_sum as f64 * 100.0,
            }
        })
        .collect()
}

fn distribute_manual<S: AsRef<str>>(
    total: i64,
    categories: &[S],
    amounts: &ManualAmounts,
) -> Vec<CategoryDistribution> {
    categories
        .iter()
        .map(|name| {
            let amount = amounts.get(name.as_ref()).copied().unwrap_or(0);
            let percentage = if total > 0 {
                amount as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            CategoryDistribution {
                category_name: name.as_ref().to_string(),
                amount_minor_units: amount,
                percentage_of_total: percentage,
            }
        })
        .collect()
}

/// Audit a distribution against the total it was meant to add up to
pub fn validate_distribution(
    distribution: &[CategoryDistribution],
    expected_total: i64,
) -> DistributionValidation {
    let actual_total: i64 = distribution.iter().map(|d| d.amount_minor_units).sum();
    let difference = actual_total - expected_total;

    DistributionValidation {
        valid: difference == 0,
        actual_total,
        difference,
    }
}

/// Run a historical-spending lookup, treating any failure as "no history"
///
/// `proportional` degrades to `equal` on an empty map, so a failed lookup
/// costs accuracy, never availability.
pub fn historical_spending_or_empty<F, E>(lookup: F) -> HistoricalSpending
where
    F: FnOnce() -> std::result::Result<HistoricalSpending, E>,
    E: Display,
{
    match lookup() {
        Ok(spending) => spending,
        Err(e) => {
            warn!("Historical spending lookup failed, continuing without history: {}", e);
            HistoricalSpending::new()
        }
    }
}
