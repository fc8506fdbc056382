use crate::model::{Amount, Partition};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// The category used when none is given.
pub const DEFAULT_CATEGORY: &str = "general";

pub(crate) const DATE_STR: &str = "Date";
pub(crate) const DATE_IDX: usize = 0;

pub(crate) const DESCRIPTION_STR: &str = "Description";
pub(crate) const DESCRIPTION_IDX: usize = 1;

pub(crate) const AMOUNT_STR: &str = "Amount";
pub(crate) const AMOUNT_IDX: usize = 2;

pub(crate) const CATEGORY_STR: &str = "Category";
pub(crate) const CATEGORY_IDX: usize = 3;

/// The header row every ledger partition starts with.
pub const HEADER: [&str; 4] = [DATE_STR, DESCRIPTION_STR, AMOUNT_STR, CATEGORY_STR];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One row of a ledger partition.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExpenseRecord {
    pub(crate) date: NaiveDate,
    pub(crate) description: String,
    pub(crate) amount: Amount,
    pub(crate) category: String,
}

impl ExpenseRecord {
    /// Creates a record. An empty `category` becomes `general`.
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Amount,
        category: impl Into<String>,
    ) -> Self {
        let category = category.into();
        Self {
            date,
            description: description.into(),
            amount,
            category: if category.trim().is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                category
            },
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// The category as it was stored.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The form used to compare and aggregate categories.
    pub fn category_key(&self) -> String {
        normalize_category(&self.category)
    }

    /// The cells written to the backend, in `HEADER` order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.format(DATE_FORMAT).to_string(),
            self.description.clone(),
            self.amount.to_cell(),
            self.category.clone(),
        ]
    }
}

/// Lower-cased, trimmed category used for comparisons.
pub fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

/// Display form of a category: first letter upper case, the rest lower case.
pub fn display_category(category: &str) -> String {
    let lower = normalize_category(category);
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Locates the ledger columns within the header row of a stored table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Columns {
    date: usize,
    description: usize,
    amount: usize,
    category: usize,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            date: DATE_IDX,
            description: DESCRIPTION_IDX,
            amount: AMOUNT_IDX,
            category: CATEGORY_IDX,
        }
    }
}

impl Columns {
    /// Finds each column by header name, case-insensitively. A header that cannot be found keeps
    /// its fixed position.
    pub(crate) fn from_header<S: AsRef<str>>(header: &[S]) -> Self {
        let find = |name: &str, fallback: usize| {
            header
                .iter()
                .position(|h| h.as_ref().trim().eq_ignore_ascii_case(name))
                .unwrap_or(fallback)
        };
        Self {
            date: find(DATE_STR, DATE_IDX),
            description: find(DESCRIPTION_STR, DESCRIPTION_IDX),
            amount: find(AMOUNT_STR, AMOUNT_IDX),
            category: find(CATEGORY_STR, CATEGORY_IDX),
        }
    }

    /// Rebuilds a record from a stored row. Nothing here fails: an unreadable amount counts as
    /// zero and an unreadable date falls back to the first day of `partition`.
    pub(crate) fn record<S: AsRef<str>>(&self, partition: Partition, row: &[S]) -> ExpenseRecord {
        let cell = |ix: usize| row.get(ix).map(|s| s.as_ref().trim()).unwrap_or_default();

        let amount_cell = cell(self.amount);
        let amount = Amount::from_str(amount_cell).unwrap_or_else(|e| {
            warn!("Treating unreadable amount '{amount_cell}' in {partition} as zero: {e}");
            Amount::ZERO
        });

        let date_cell = cell(self.date);
        let date = parse_date(date_cell)
            .or_else(|| partition.first_day())
            .unwrap_or_default();

        ExpenseRecord::new(date, cell(self.description), amount, cell(self.category))
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(s, "%m/%d/%Y").ok())
}
