//! CSV import of transaction history
//!
//! Expected header: `Date,Description,Amount` with an optional `Category`
//! column. Columns are located by header name (case-insensitive), so their
//! order does not matter and extra columns are ignored.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use sha2::{Digest, Sha256};
use std::io::Read;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::NewTransaction;

/// Column positions resolved from the header row
struct Columns {
    date: usize,
    description: usize,
    amount: usize,
    category: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::Import(format!("Missing '{}' column", name)))
        };

        Ok(Self {
            date: require("Date")?,
            description: require("Description")?,
            amount: require("Amount")?,
            category: find("Category"),
        })
    }
}

/// Parse CSV data into transactions
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<NewTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut transactions = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = index + 2;

        let field = |col: usize, name: &str| {
            record
                .get(col)
                .ok_or_else(|| Error::Import(format!("Line {}: missing {}", line, name)))
        };

        let date = parse_date(field(columns.date, "date")?)
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;

        let description = field(columns.description, "description")?.trim().to_string();

        let amount_minor_units = parse_amount(field(columns.amount, "amount")?)
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;

        let category = columns
            .category
            .and_then(|col| record.get(col))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let import_hash = generate_hash(&date, &description, amount_minor_units);

        transactions.push(NewTransaction {
            date,
            description,
            amount_minor_units,
            category,
            import_hash,
        });
    }

    debug!("Parsed {} transactions from CSV", transactions.len());
    Ok(transactions)
}

/// Generate a unique hash for deduplication
pub fn generate_hash(date: &NaiveDate, description: &str, amount_minor_units: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount_minor_units.to_be_bytes());
    hex::encode(hasher.finalize())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse a decimal amount string into minor units without going through floats
///
/// Handles currency symbols and thousands separators, plus a leading sign or
/// accounting-style parentheses for negatives.
pub fn parse_amount(s: &str) -> Result<i64> {
    let invalid = || Error::Import(format!("Unable to parse amount: {}", s));

    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();

    let (negative, digits) = if let Some(inner) = cleaned
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        (true, inner)
    } else if let Some(rest) = cleaned.strip_prefix('-') {
        (true, rest)
    } else {
        (false, cleaned.strip_prefix('+').unwrap_or(&cleaned))
    };

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }
    // Sub-cent precision is only accepted when it is zero padding
    if fraction.len() > 2 && fraction[2..].chars().any(|c| c != '0') {
        return Err(invalid());
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction[..2].parse().map_err(|_| invalid())?,
    };

    let magnitude = whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(cents))
        .ok_or_else(invalid)?;

    Ok(if negative { -magnitude } else { magnitude })
}
