//! Cadence Core Library
//!
//! Recurring cash-flow forecasting:
//! - Recurrence detection over transaction history
//! - Allocation of a total across budget categories
//! - Advancement of stale scheduled dates, with detached write-back
//! - SQLite persistence and CSV import
//! - TOML configuration

pub mod config;
pub mod db;
pub mod detect;
pub mod distribute;
pub mod error;
pub mod import;
pub mod models;
pub mod normalize;
pub mod schedule;
pub mod writer;

pub use config::ForecastConfig;
pub use db::Database;
pub use detect::{detect_recurring, DetectionConfig, RecurrenceDetector};
pub use distribute::{
    distribute, distribute_by_name, validate_distribution, HistoricalSpending, ManualAmounts,
};
pub use error::{Error, Result};
pub use models::{
    CategoryDistribution, CategoryHint, DistributionStrategy, DistributionValidation, Frequency,
    IncomeSource, NewTransaction, RecurringPattern, ScheduleFrequency, Transaction,
};
pub use schedule::{advance_date, advance_occurrence, advance_stale_schedules, ScheduleBearing};
pub use writer::{ScheduleStore, ScheduleUpdate, ScheduleWriter, WriterHandle, WriterStats};
