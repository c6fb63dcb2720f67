//! Database tests

use super::*;
use crate::models::*;
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_tx(
    day: NaiveDate,
    description: &str,
    amount: i64,
    category: Option<&str>,
) -> NewTransaction {
    NewTransaction {
        date: day,
        description: description.to_string(),
        amount_minor_units: amount,
        category: category.map(str::to_string),
        import_hash: format!("{}|{}|{}", day, description, amount),
    }
}

fn source(id: &str, frequency: Option<&str>, next: Option<&str>) -> IncomeSource {
    IncomeSource {
        id: id.to_string(),
        name: format!("Source {}", id),
        amount_minor_units: Some(250_000),
        frequency: frequency.map(str::to_string),
        next_expected_date: next.map(str::to_string),
    }
}

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    assert_eq!(db.count_transactions().unwrap(), 0);
    assert!(db.list_income_sources().unwrap().is_empty());
}

#[test]
fn test_schema_exists() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let columns: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('income_sources') WHERE name IN ('id', 'name', 'amount', 'frequency', 'next_expected_date', 'updated_at')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(columns, 6, "income_sources table should have 6 expected columns");
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::in_memory().unwrap();
    db.insert_transaction(&new_tx(date(2024, 1, 1), "RENT", -120_000, None))
        .unwrap();

    // Reopening the same file runs migrations again without losing data
    let reopened = Database::new(db.path()).unwrap();
    assert_eq!(reopened.count_transactions().unwrap(), 1);
}

#[test]
fn test_insert_skips_duplicate_hash() {
    let db = Database::in_memory().unwrap();
    let tx = new_tx(date(2024, 1, 15), "NETFLIX", -1599, Some("Entertainment"));

    let first = db.insert_transaction(&tx).unwrap();
    assert!(first.is_some());

    let second = db.insert_transaction(&tx).unwrap();
    assert_eq!(second, None);
    assert_eq!(db.count_transactions().unwrap(), 1);
}

#[test]
fn test_list_transactions_window_and_order() {
    let db = Database::in_memory().unwrap();
    db.insert_transaction(&new_tx(date(2024, 3, 1), "C", -300, None))
        .unwrap();
    db.insert_transaction(&new_tx(date(2024, 1, 1), "A", -100, None))
        .unwrap();
    db.insert_transaction(&new_tx(date(2024, 2, 1), "B", -200, None))
        .unwrap();

    let all = db.list_transactions(None).unwrap();
    let descriptions: Vec<&str> = all.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descriptions, vec!["A", "B", "C"]);
    assert_eq!(all[0].occurred_at.date_naive(), date(2024, 1, 1));
    assert_eq!(all[0].amount_minor_units, -100);

    let recent = db.list_transactions(Some(date(2024, 2, 1))).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].description, "B");
}

#[test]
fn test_historical_spending() {
    let db = Database::in_memory().unwrap();
    db.insert_transaction(&new_tx(date(2024, 1, 5), "grocer", -5_000, Some("Groceries")))
        .unwrap();
    db.insert_transaction(&new_tx(date(2024, 1, 20), "grocer", -2_500, Some("Groceries")))
        .unwrap();
    db.insert_transaction(&new_tx(date(2024, 1, 10), "refund", 1_000, Some("Dining")))
        .unwrap();
    db.insert_transaction(&new_tx(date(2023, 12, 1), "old", -9_999, Some("Dining")))
        .unwrap();
    db.insert_transaction(&new_tx(date(2024, 1, 11), "bus", -300, Some("Transit")))
        .unwrap();
    db.insert_transaction(&new_tx(date(2024, 1, 12), "misc", -700, None))
        .unwrap();

    let spending = db
        .historical_spending(&["Groceries", "Dining", "Travel"], date(2024, 1, 1))
        .unwrap();

    assert_eq!(spending.len(), 2);
    assert_eq!(spending.get("Groceries"), Some(&7_500));
    // Absolute amounts, and the December row falls outside the window
    assert_eq!(spending.get("Dining"), Some(&1_000));
    assert!(!spending.contains_key("Travel"));
    assert!(!spending.contains_key("Transit"));
}

#[test]
fn test_income_source_upsert_and_get() {
    let db = Database::in_memory().unwrap();
    db.upsert_income_source(&source("salary", Some("monthly"), Some("2024-01-31")))
        .unwrap();

    let mut updated = source("salary", Some("fortnightly"), Some("2024-02-02"));
    updated.name = "Paycheck".to_string();
    db.upsert_income_source(&updated).unwrap();

    let sources = db.list_income_sources().unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0], updated);

    assert_eq!(db.get_income_source("salary").unwrap(), Some(updated));
    assert_eq!(db.get_income_source("missing").unwrap(), None);
}

#[test]
fn test_income_source_optional_fields() {
    let db = Database::in_memory().unwrap();
    let mut bare = source("gift", None, None);
    bare.amount_minor_units = None;
    db.upsert_income_source(&bare).unwrap();

    let stored = db.get_income_source("gift").unwrap().unwrap();
    assert_eq!(stored.frequency, None);
    assert_eq!(stored.next_expected_date, None);
    assert_eq!(stored.amount_minor_units, None);
}

#[test]
fn test_income_source_requires_id() {
    let db = Database::in_memory().unwrap();
    let result = db.upsert_income_source(&source(" ", Some("weekly"), None));
    assert!(matches!(result, Err(crate::error::Error::InvalidData(_))));
}

#[test]
fn test_update_next_expected_date() {
    let db = Database::in_memory().unwrap();
    db.upsert_income_source(&source("salary", Some("weekly"), Some("2024-01-01")))
        .unwrap();

    db.update_next_expected_date("salary", date(2024, 1, 22))
        .unwrap();
    let stored = db.get_income_source("salary").unwrap().unwrap();
    assert_eq!(stored.next_expected_date.as_deref(), Some("2024-01-22"));

    let missing = db.update_next_expected_date("nobody", date(2024, 1, 22));
    assert!(matches!(missing, Err(crate::error::Error::NotFound(_))));
}

#[tokio::test]
async fn test_database_as_schedule_store() {
    use crate::writer::ScheduleStore;

    let db = Database::in_memory().unwrap();
    db.upsert_income_source(&source("rent", Some("monthly"), Some("2024-01-31")))
        .unwrap();

    db.persist_next_expected_date("rent", date(2024, 2, 29))
        .await
        .unwrap();

    let stored = db.get_income_source("rent").unwrap().unwrap();
    assert_eq!(stored.next_expected_date.as_deref(), Some("2024-02-29"));
}
