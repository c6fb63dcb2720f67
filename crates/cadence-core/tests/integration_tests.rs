//! Integration tests for cadence-core
//!
//! These tests exercise the import → store → detect workflow, budget
//! distribution from stored history, and schedule advancement with the
//! database as the write-back sink.

use std::sync::Arc;

use chrono::NaiveDate;
use cadence_core::{
    db::Database,
    detect::RecurrenceDetector,
    distribute::{distribute, historical_spending_or_empty, validate_distribution},
    import::parse_csv,
    models::{CategoryHint, DistributionStrategy, Frequency, IncomeSource},
    schedule::advance_stale_schedules,
    writer::{ScheduleWriter, WriterStats},
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Two monthly subscriptions, a weekly gym fee, and irregular coffee runs
fn history_csv() -> &'static str {
    r#"Date,Description,Amount,Category
2023-07-15,NETFLIX.COM 0715,-15.49,Entertainment
2023-08-15,NETFLIX.COM 0815,-15.49,Entertainment
2023-09-15,NETFLIX.COM 0915,-15.49,Entertainment
2023-10-15,NETFLIX.COM 1015,-15.49,Entertainment
07/20/2023,SPOTIFY USA,-10.99,Entertainment
08/20/2023,SPOTIFY USA,-10.99,Entertainment
09/20/2023,SPOTIFY USA,-11.99,Entertainment
10/20/2023,SPOTIFY USA,-10.99,Entertainment
2023-10-02,CITY GYM,-12.00,Fitness
2023-10-09,CITY GYM,-12.00,Fitness
2023-10-16,CITY GYM,-12.00,Fitness
2023-10-01,CORNER COFFEE,-4.50,Dining
2023-10-03,CORNER COFFEE,-6.25,Dining
2023-10-20,CORNER COFFEE,-4.75,Dining"#
}

// =============================================================================
// Import and Detection
// =============================================================================

#[test]
fn test_import_then_detect() {
    let db = Database::in_memory().expect("Failed to create database");

    let transactions = parse_csv(history_csv().as_bytes()).expect("Failed to parse CSV");
    assert_eq!(transactions.len(), 14);

    let mut imported = 0;
    for tx in &transactions {
        if db.insert_transaction(tx).unwrap().is_some() {
            imported += 1;
        }
    }
    assert_eq!(imported, 14);

    let stored = db.list_transactions(None).unwrap();
    let patterns = RecurrenceDetector::new().detect(&stored);

    // Coffee gaps (2, 17 days) are too irregular
    assert_eq!(patterns.len(), 3);

    // Sorted by next expected occurrence
    let gym = &patterns[0];
    assert_eq!(gym.description, "CITY GYM");
    assert_eq!(gym.frequency, Frequency::Weekly);
    assert_eq!(gym.next_expected_occurrence, date(2023, 10, 23));
    assert_eq!(gym.average_amount_minor_units, 1200);

    let netflix = &patterns[1];
    assert_eq!(netflix.description, "NETFLIX.COM 1015");
    assert_eq!(netflix.frequency, Frequency::Monthly);
    assert_eq!(netflix.occurrence_count, 4);
    assert_eq!(netflix.last_occurrence, date(2023, 10, 15));
    // Gaps 31, 31, 30 average to 30.67, rounded to 31
    assert_eq!(netflix.next_expected_occurrence, date(2023, 11, 15));
    assert_eq!(netflix.category_hint, CategoryHint::Subscription);

    let spotify = &patterns[2];
    assert_eq!(spotify.frequency, Frequency::Monthly);
    // (1099 * 3 + 1199) / 4 = 1124
    assert_eq!(spotify.average_amount_minor_units, 1124);
    assert_eq!(spotify.next_expected_occurrence, date(2023, 11, 20));

    for window in patterns.windows(2) {
        assert!(window[0].next_expected_occurrence <= window[1].next_expected_occurrence);
    }
}

#[test]
fn test_reimport_is_deduplicated() {
    let db = Database::in_memory().unwrap();

    for _ in 0..2 {
        for tx in parse_csv(history_csv().as_bytes()).unwrap() {
            db.insert_transaction(&tx).unwrap();
        }
    }

    assert_eq!(db.count_transactions().unwrap(), 14);
}

#[test]
fn test_detection_window() {
    let db = Database::in_memory().unwrap();
    for tx in parse_csv(history_csv().as_bytes()).unwrap() {
        db.insert_transaction(&tx).unwrap();
    }

    // Only one Netflix and one Spotify charge fall in October
    let recent = db.list_transactions(Some(date(2023, 10, 1))).unwrap();
    let patterns = RecurrenceDetector::new().detect(&recent);

    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].description, "CITY GYM");
}

// =============================================================================
// Distribution from Stored History
// =============================================================================

#[test]
fn test_proportional_distribution_from_history() {
    let db = Database::in_memory().unwrap();
    let csv = "Date,Description,Amount,Category
2024-01-03,GROCER,-200.00,Groceries
2024-01-17,GROCER,-100.00,Groceries
2024-01-10,BISTRO,-100.00,Dining";
    for tx in parse_csv(csv.as_bytes()).unwrap() {
        db.insert_transaction(&tx).unwrap();
    }

    let categories = ["Groceries", "Dining"];
    let historical =
        historical_spending_or_empty(|| db.historical_spending(&categories, date(2024, 1, 1)));
    assert_eq!(historical.get("Groceries"), Some(&30_000));

    let distribution = distribute(
        100,
        &categories,
        &historical,
        DistributionStrategy::Proportional,
        None,
    );

    let amounts: Vec<i64> = distribution.iter().map(|d| d.amount_minor_units).collect();
    assert_eq!(amounts, vec![75, 25]);
    assert!(validate_distribution(&distribution, 100).valid);
}

#[test]
fn test_proportional_without_history_matches_equal() {
    let db = Database::in_memory().unwrap();
    let categories = ["A", "B", "C"];

    let historical =
        historical_spending_or_empty(|| db.historical_spending(&categories, date(2024, 1, 1)));
    assert!(historical.is_empty());

    let proportional = distribute(
        100,
        &categories,
        &historical,
        DistributionStrategy::Proportional,
        None,
    );
    let equal = distribute(100, &categories, &historical, DistributionStrategy::Equal, None);

    assert_eq!(proportional, equal);
}

// =============================================================================
// Schedule Advancement with Write-Back
// =============================================================================

fn income(id: &str, frequency: &str, next: &str) -> IncomeSource {
    IncomeSource {
        id: id.to_string(),
        name: id.to_string(),
        amount_minor_units: Some(100_000),
        frequency: Some(frequency.to_string()),
        next_expected_date: Some(next.to_string()),
    }
}

#[tokio::test]
async fn test_stale_schedules_written_back() {
    let db = Database::in_memory().unwrap();
    db.upsert_income_source(&income("salary", "weekly", "2024-01-01"))
        .unwrap();
    db.upsert_income_source(&income("rent", "monthly", "2024-01-31"))
        .unwrap();
    db.upsert_income_source(&income("bonus", "yearly", "2024-06-30"))
        .unwrap();
    db.upsert_income_source(&income("odd", "sometimes", "2023-01-01"))
        .unwrap();

    let (writer, handle) = ScheduleWriter::spawn(Arc::new(db.clone()), 8);

    let today = date(2024, 3, 15);
    let sources = advance_stale_schedules(db.list_income_sources().unwrap(), today, &writer);

    let next = |id: &str| {
        sources
            .iter()
            .find(|s| s.id == id)
            .and_then(|s| s.next_expected_date.clone())
    };
    // The corrected values are visible before anything is persisted
    assert_eq!(next("salary").as_deref(), Some("2024-03-18"));
    // Jan 31 -> Feb 29 -> Mar 29
    assert_eq!(next("rent").as_deref(), Some("2024-03-29"));
    assert_eq!(next("bonus").as_deref(), Some("2024-06-30"));
    assert_eq!(next("odd").as_deref(), Some("2023-01-01"));

    drop(writer);
    let stats = handle.finish().await;
    assert_eq!(stats, WriterStats { written: 2, failed: 0 });

    let stored = |id: &str| {
        db.get_income_source(id)
            .unwrap()
            .and_then(|s| s.next_expected_date)
    };
    assert_eq!(stored("salary").as_deref(), Some("2024-03-18"));
    assert_eq!(stored("rent").as_deref(), Some("2024-03-29"));
    assert_eq!(stored("odd").as_deref(), Some("2023-01-01"));
}

#[tokio::test]
async fn test_write_back_failure_is_isolated() {
    let db = Database::in_memory().unwrap();
    db.upsert_income_source(&income("salary", "weekly", "2024-01-01"))
        .unwrap();

    // Not stored, so its write-back fails with NotFound
    let ghost = income("ghost", "weekly", "2024-01-01");
    let mut sources = db.list_income_sources().unwrap();
    sources.insert(0, ghost);

    let (writer, handle) = ScheduleWriter::spawn(Arc::new(db.clone()), 8);
    let sources = advance_stale_schedules(sources, date(2024, 1, 20), &writer);
    assert_eq!(sources.len(), 2);
    drop(writer);

    let stats = handle.finish().await;
    assert_eq!(stats, WriterStats { written: 1, failed: 1 });
    assert_eq!(
        db.get_income_source("salary")
            .unwrap()
            .and_then(|s| s.next_expected_date)
            .as_deref(),
        Some("2024-01-22")
    );
}
