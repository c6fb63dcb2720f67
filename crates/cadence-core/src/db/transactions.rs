//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::distribute::HistoricalSpending;
use crate::error::Result;
use crate::models::{NewTransaction, Transaction};

impl Database {
    /// Insert a transaction (skips duplicates based on import_hash)
    ///
    /// Returns the new row id, or `None` if the transaction was already stored.
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<Option<i64>> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM transactions WHERE import_hash = ?",
                params![tx.import_hash],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(None); // Duplicate, skip
        }

        conn.execute(
            r#"
            INSERT INTO transactions (date, description, amount, category, import_hash)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                tx.date.to_string(),
                tx.description,
                tx.amount_minor_units,
                tx.category,
                tx.import_hash,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// List transactions on or after `since` (all when `None`), oldest first
    pub fn list_transactions(&self, since: Option<NaiveDate>) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let since = since.map(|d| d.to_string()).unwrap_or_default();

        let mut stmt = conn.prepare(
            r#"
            SELECT date, description, amount
            FROM transactions
            WHERE date >= ?
            ORDER BY date, id
            "#,
        )?;

        let rows = stmt
            .query_map(params![since], |row| {
                let date_str: String = row.get(0)?;
                let description: String = row.get(1)?;
                let amount: i64 = row.get(2)?;
                Ok((date_str, description, amount))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Rows with a malformed date cannot be placed in time; skip them
        let transactions = rows
            .into_iter()
            .filter_map(|(date_str, description, amount)| {
                NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                    .ok()
                    .map(|date| Transaction::on_date(description, amount, date))
            })
            .collect();

        Ok(transactions)
    }

    /// Count stored transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Sum absolute spend per category since `since`, limited to `categories`
    ///
    /// Categories with no matching transactions are absent from the result.
    pub fn historical_spending<S: AsRef<str>>(
        &self,
        categories: &[S],
        since: NaiveDate,
    ) -> Result<HistoricalSpending> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT category, SUM(ABS(amount))
            FROM transactions
            WHERE category IS NOT NULL AND date >= ?
            GROUP BY category
            "#,
        )?;

        let totals = stmt
            .query_map(params![since.to_string()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(totals
            .into_iter()
            .filter(|(category, _)| categories.iter().any(|c| c.as_ref() == category))
            .collect())
    }
}
