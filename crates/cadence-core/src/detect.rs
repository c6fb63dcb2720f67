//! Recurrence detection
//!
//! Finds recurring payment series in raw transaction history:
//! - Groups transactions by normalized description
//! - Requires consistent gaps between occurrences (within 30% of the mean gap)
//! - Requires consistent amounts (within 20% of the mean amount)
//! - Classifies the mean gap into weekly / fortnightly / monthly bands
//!
//! Detection is a pure function of its input. Groups are built up front by a
//! single fold and each group is analyzed independently.

use std::collections::HashMap;

use chrono::Duration;
use tracing::debug;

use crate::models::{Frequency, RecurringPattern, Transaction};
use crate::normalize::{category_hint, normalized_key};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Detection configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Maximum relative deviation of any gap from the mean gap (exclusive)
    pub interval_tolerance: f64,
    /// Maximum relative deviation of any amount from the mean amount (exclusive)
    pub amount_tolerance: f64,
    /// Minimum occurrences for a series (never below 2)
    pub min_occurrences: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            interval_tolerance: 0.30,
            amount_tolerance: 0.20,
            min_occurrences: 2,
        }
    }
}

/// Transactions sharing a normalized key, in input encounter order
#[derive(Debug)]
struct SeriesGroup<'a> {
    key: String,
    members: Vec<&'a Transaction>,
}

/// Detects recurring series in a window of transactions
#[derive(Debug, Clone, Default)]
pub struct RecurrenceDetector {
    config: DetectionConfig,
}

impl RecurrenceDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Detect recurring patterns, soonest next occurrence first
    ///
    /// Never fails: groups that are too small, irregular, or outside every
    /// frequency band are dropped. Patterns with the same next occurrence keep
    /// the order in which their series first appeared in the input.
    pub fn detect(&self, transactions: &[Transaction]) -> Vec<RecurringPattern> {
        let groups = group_by_key(transactions);
        let group_count = groups.len();

        let mut patterns: Vec<RecurringPattern> = groups
            .iter()
            .filter_map(|group| self.analyze_group(group))
            .collect();

        // Stable: ties keep group encounter order
        patterns.sort_by_key(|p| p.next_expected_occurrence);

        debug!(
            "Recurrence detection: {} transactions, {} series, {} recurring",
            transactions.len(),
            group_count,
            patterns.len()
        );

        patterns
    }

    fn analyze_group(&self, group: &SeriesGroup<'_>) -> Option<RecurringPattern> {
        if group.key.is_empty() {
            return None;
        }

        let min_occurrences = self.config.min_occurrences.max(2);
        if group.members.len() < min_occurrences {
            return None;
        }

        let mut sorted = group.members.clone();
        sorted.sort_by_key(|t| t.occurred_at);

        let gaps = day_gaps(&sorted);
        let gap_values: Vec<f64> = gaps.iter().map(|&g| g as f64).collect();
        let avg_interval = mean(&gap_values);

        if avg_interval <= 0.0 {
            debug!("Skipping '{}' - occurrences share a single day", group.key);
            return None;
        }

        if !all_within(&gap_values, avg_interval, self.config.interval_tolerance) {
            debug!(
                "Skipping '{}' - irregular gaps {:?} (mean {:.1} days)",
                group.key, gaps, avg_interval
            );
            return None;
        }

        let amounts: Vec<f64> = sorted
            .iter()
            .map(|t| t.amount_minor_units.unsigned_abs() as f64)
            .collect();
        let avg_amount = mean(&amounts);

        if avg_amount <= 0.0 {
            debug!("Skipping '{}' - zero amounts", group.key);
            return None;
        }

        if !all_within(&amounts, avg_amount, self.config.amount_tolerance) {
            debug!(
                "Skipping '{}' - inconsistent amounts (mean {:.0})",
                group.key, avg_amount
            );
            return None;
        }

        let Some(frequency) = Frequency::classify(avg_interval) else {
            debug!(
                "Skipping '{}' - mean gap {:.1} days matches no frequency band",
                group.key, avg_interval
            );
            return None;
        };

        let latest = sorted.last()?;
        let last_occurrence = latest.occurred_at.date_naive();
        let next_expected_occurrence = last_occurrence
            .checked_add_signed(Duration::days(avg_interval.round() as i64))?;

        Some(RecurringPattern {
            description: latest.description.clone(),
            average_amount_minor_units: avg_amount.round() as i64,
            frequency,
            last_occurrence,
            next_expected_occurrence,
            occurrence_count: sorted.len(),
            category_hint: category_hint(&group.key),
        })
    }
}

/// Detect recurring patterns with the default thresholds
pub fn detect_recurring(transactions: &[Transaction]) -> Vec<RecurringPattern> {
    RecurrenceDetector::new().detect(transactions)
}

/// Group transactions by normalized key, preserving first-encounter order
fn group_by_key(transactions: &[Transaction]) -> Vec<SeriesGroup<'_>> {
    let (_, groups) = transactions.iter().fold(
        (HashMap::<String, usize>::new(), Vec::<SeriesGroup<'_>>::new()),
        |(mut index, mut groups), tx| {
            let key = normalized_key(&tx.description);
            match index.get(&key) {
                Some(&i) => groups[i].members.push(tx),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(SeriesGroup {
                        key,
                        members: vec![tx],
                    });
                }
            }
            (index, groups)
        },
    );
    groups
}

/// Whole-day gaps between consecutive (sorted) occurrences
fn day_gaps(sorted: &[&Transaction]) -> Vec<i64> {
    sorted
        .windows(2)
        .map(|w| {
            let seconds = (w[1].occurred_at - w[0].occurred_at).num_seconds() as f64;
            (seconds / SECONDS_PER_DAY).round() as i64
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// True if every value deviates from `mean` by strictly less than `tolerance`
fn all_within(values: &[f64], mean: f64, tolerance: f64) -> bool {
    values
        .iter()
        .all(|v| (v - mean).abs() / mean < tolerance)
}
