//! Domain models for Cadence

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single money movement fed to the recurrence detector.
///
/// Read-only input: the engine never mutates or persists these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub description: String,
    /// Signed amount in minor currency units (negative = expense)
    pub amount_minor_units: i64,
    pub occurred_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        description: impl Into<String>,
        amount_minor_units: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            description: description.into(),
            amount_minor_units,
            occurred_at,
        }
    }

    /// Build a transaction that occurred at midnight UTC on `date`
    pub fn on_date(description: impl Into<String>, amount_minor_units: i64, date: NaiveDate) -> Self {
        Self::new(description, amount_minor_units, date.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

/// A transaction parsed from an import file, before it is stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount_minor_units: i64,
    pub category: Option<String>,
    /// Hash for deduplication
    pub import_hash: String,
}

/// Detected cadence of a recurring series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Fortnightly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Fortnightly => "fortnightly",
            Self::Monthly => "monthly",
        }
    }

    /// Classify an average day-gap into a cadence.
    ///
    /// Bands are closed and non-overlapping; anything outside them
    /// (including quarterly-looking gaps) is not a detectable cadence.
    pub fn classify(avg_interval_days: f64) -> Option<Self> {
        if (5.0..=9.0).contains(&avg_interval_days) {
            Some(Self::Weekly)
        } else if (12.0..=16.0).contains(&avg_interval_days) {
            Some(Self::Fortnightly)
        } else if (26.0..=34.0).contains(&avg_interval_days) {
            Some(Self::Monthly)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cadence of a stored schedule (income sources, bills)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleFrequency {
    Weekly,
    Fortnightly,
    Monthly,
    BiMonthly,
    Quarterly,
    Yearly,
}

impl ScheduleFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Fortnightly => "fortnightly",
            Self::Monthly => "monthly",
            Self::BiMonthly => "bi-monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Date one period after `from`.
    ///
    /// Calendar periods clamp to the end of a shorter month, and the clamped
    /// day carries into later steps (Jan 31 -> Feb 29 -> Mar 29).
    /// Returns `None` past chrono's representable range.
    pub fn step(&self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Weekly => from.checked_add_days(Days::new(7)),
            Self::Fortnightly => from.checked_add_days(Days::new(14)),
            Self::Monthly => from.checked_add_months(Months::new(1)),
            Self::BiMonthly => from.checked_add_months(Months::new(2)),
            Self::Quarterly => from.checked_add_months(Months::new(3)),
            Self::Yearly => from.checked_add_months(Months::new(12)),
        }
    }
}

impl std::str::FromStr for ScheduleFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "fortnightly" => Ok(Self::Fortnightly),
            "monthly" => Ok(Self::Monthly),
            "bi-monthly" | "bimonthly" => Ok(Self::BiMonthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for ScheduleFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Best-effort spending category guessed from a description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryHint {
    Housing,
    Vehicle,
    Telecom,
    Utilities,
    Subscription,
    Other,
}

impl CategoryHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Housing => "housing",
            Self::Vehicle => "vehicle",
            Self::Telecom => "telecom",
            Self::Utilities => "utilities",
            Self::Subscription => "subscription",
            Self::Other => "other",
        }
    }
}

/// A recurring series found in transaction history.
///
/// Derived view, recomputed on every detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPattern {
    /// Original-case label of the most recent occurrence
    pub description: String,
    pub average_amount_minor_units: i64,
    pub frequency: Frequency,
    pub last_occurrence: NaiveDate,
    pub next_expected_occurrence: NaiveDate,
    pub occurrence_count: usize,
    pub category_hint: CategoryHint,
}

/// How a budget amount is spread across categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionStrategy {
    Equal,
    Proportional,
    Manual,
}

impl DistributionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Proportional => "proportional",
            Self::Manual => "manual",
        }
    }

    /// Resolve a strategy name, degrading unknown names to `Equal`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "proportional" => Self::Proportional,
            "manual" => Self::Manual,
            "equal" => Self::Equal,
            other => {
                tracing::debug!("Unknown distribution strategy '{}', using equal", other);
                Self::Equal
            }
        }
    }
}

impl std::fmt::Display for DistributionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One category's share of a distributed amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDistribution {
    pub category_name: String,
    pub amount_minor_units: i64,
    pub percentage_of_total: f64,
}

/// Outcome of auditing a distribution against its expected total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionValidation {
    pub valid: bool,
    pub actual_total: i64,
    /// `actual_total - expected_total`
    pub difference: i64,
}

/// An income source with schedule fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSource {
    pub id: String,
    pub name: String,
    pub amount_minor_units: Option<i64>,
    pub frequency: Option<String>,
    /// Stored as text (YYYY-MM-DD); may be stale or malformed
    pub next_expected_date: Option<String>,
}

/// Format minor units as a decimal amount (e.g. -1549 -> "-15.49")
pub fn format_minor_units(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
