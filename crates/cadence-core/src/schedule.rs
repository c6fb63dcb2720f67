//! Occurrence advancing for stored schedules
//!
//! Income sources (and anything else with a "next expected date") go stale as
//! calendar time passes without a matching transaction arriving. Reading such a
//! schedule rolls the stored date forward by whole periods until it is no
//! longer in the past. The batch variant queues a write-back for every entity
//! it corrected; see [`crate::writer`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use crate::models::{IncomeSource, ScheduleFrequency};
use crate::writer::{ScheduleUpdate, ScheduleWriter};

/// Upper bound on periods added in one advance
pub const MAX_ADVANCE_ITERATIONS: u32 = 200;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// An entity carrying a stored next-occurrence date and a frequency tag
pub trait ScheduleBearing {
    fn schedule_id(&self) -> &str;
    fn next_expected_date(&self) -> Option<&str>;
    fn frequency(&self) -> Option<&str>;
    fn set_next_expected_date(&mut self, date: String);
}

impl ScheduleBearing for IncomeSource {
    fn schedule_id(&self) -> &str {
        &self.id
    }

    fn next_expected_date(&self) -> Option<&str> {
        self.next_expected_date.as_deref()
    }

    fn frequency(&self) -> Option<&str> {
        self.frequency.as_deref()
    }

    fn set_next_expected_date(&mut self, date: String) {
        self.next_expected_date = Some(date);
    }
}

/// Today's date (UTC), time of day dropped
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Roll `date` forward one period at a time until it is on or after `today`
///
/// Stops after [`MAX_ADVANCE_ITERATIONS`] steps even if still in the past.
pub fn advance_date(date: NaiveDate, frequency: ScheduleFrequency, today: NaiveDate) -> NaiveDate {
    let mut current = date;
    let mut iterations = 0;

    while current < today && iterations < MAX_ADVANCE_ITERATIONS {
        iterations += 1;
        match frequency.step(current) {
            Some(next) => current = next,
            None => break,
        }
    }

    current
}

/// Parse a stored date: `YYYY-MM-DD`, RFC 3339, or SQLite datetime text
pub fn parse_stored_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Advance a stored date string; `None` when nothing changes
fn corrected_date(
    stored: Option<&str>,
    frequency: Option<&str>,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let stored = stored?;
    let frequency: ScheduleFrequency = match frequency?.parse() {
        Ok(f) => f,
        Err(e) => {
            debug!("Leaving '{}' unchanged: {}", stored, e);
            return None;
        }
    };
    let Some(date) = parse_stored_date(stored) else {
        debug!("Leaving unparseable stored date '{}' unchanged", stored);
        return None;
    };

    let advanced = advance_date(date, frequency, today);
    (advanced != date).then_some(advanced)
}

/// Advance a stored next-occurrence date to the first date >= `today`
///
/// Returns the input unchanged when the date is missing, unparseable,
/// already current, or the frequency is missing or unknown. A corrected
/// date is formatted `YYYY-MM-DD`.
pub fn advance_occurrence(
    stored: Option<&str>,
    frequency: Option<&str>,
    today: NaiveDate,
) -> Option<String> {
    match corrected_date(stored, frequency, today) {
        Some(date) => Some(date.format(DATE_FORMAT).to_string()),
        None => stored.map(str::to_string),
    }
}

/// Advance every stale schedule and queue a write-back for each one corrected
///
/// The corrected entities are returned immediately; persistence happens on
/// the writer's worker and its outcome is only visible in the logs.
pub fn advance_stale_schedules<T: ScheduleBearing>(
    mut entities: Vec<T>,
    today: NaiveDate,
    writer: &ScheduleWriter,
) -> Vec<T> {
    let mut corrected = 0;

    for entity in entities.iter_mut() {
        let Some(date) = corrected_date(entity.next_expected_date(), entity.frequency(), today)
        else {
            continue;
        };

        debug!(
            "Advancing schedule {} from {:?} to {}",
            entity.schedule_id(),
            entity.next_expected_date(),
            date
        );
        entity.set_next_expected_date(date.format(DATE_FORMAT).to_string());
        writer.enqueue(ScheduleUpdate {
            id: entity.schedule_id().to_string(),
            next_expected_date: date,
        });
        corrected += 1;
    }

    if corrected > 0 {
        debug!("Advanced {} of {} schedules", corrected, entities.len());
    }

    entities
}
