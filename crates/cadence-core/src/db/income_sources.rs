//! Income source schedule operations

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::{Error, Result};
use crate::models::IncomeSource;
use crate::writer::ScheduleStore;

fn income_source_from_row(row: &Row<'_>) -> rusqlite::Result<IncomeSource> {
    Ok(IncomeSource {
        id: row.get(0)?,
        name: row.get(1)?,
        amount_minor_units: row.get(2)?,
        frequency: row.get(3)?,
        next_expected_date: row.get(4)?,
    })
}

impl Database {
    /// Insert or replace an income source by id
    pub fn upsert_income_source(&self, source: &IncomeSource) -> Result<()> {
        if source.id.trim().is_empty() {
            return Err(Error::InvalidData("income source id is empty".into()));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO income_sources (id, name, amount, frequency, next_expected_date)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                amount = excluded.amount,
                frequency = excluded.frequency,
                next_expected_date = excluded.next_expected_date,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![
                source.id,
                source.name,
                source.amount_minor_units,
                source.frequency,
                source.next_expected_date,
            ],
        )?;
        Ok(())
    }

    /// List all income sources, ordered by name
    pub fn list_income_sources(&self) -> Result<Vec<IncomeSource>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, amount, frequency, next_expected_date
            FROM income_sources
            ORDER BY name, id
            "#,
        )?;

        let sources = stmt
            .query_map([], income_source_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sources)
    }

    /// Get a single income source
    pub fn get_income_source(&self, id: &str) -> Result<Option<IncomeSource>> {
        let conn = self.conn()?;
        let source = conn
            .query_row(
                r#"
                SELECT id, name, amount, frequency, next_expected_date
                FROM income_sources
                WHERE id = ?
                "#,
                params![id],
                income_source_from_row,
            )
            .optional()?;
        Ok(source)
    }

    /// Overwrite the stored next expected date of an existing income source
    pub fn update_next_expected_date(&self, id: &str, date: NaiveDate) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE income_sources
            SET next_expected_date = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
            params![date.format("%Y-%m-%d").to_string(), id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("income source {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for Database {
    async fn persist_next_expected_date(&self, id: &str, date: NaiveDate) -> Result<()> {
        self.update_next_expected_date(id, date)
    }
}
