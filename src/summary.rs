//! Aggregation over expense records.
//!
//! Everything here is pure: no rounding, no I/O. Categories are grouped case-insensitively and
//! reported in the order in which they first appear. Sums are checked, a sum that does not fit in
//! a `Decimal` is an `AmountOverflow` error.

use crate::error::{Error, ErrorType};
use crate::model::{display_category, Amount, ExpenseRecord};
use crate::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Running totals for one category.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct CategoryTotals {
    total: Amount,
    count: usize,
}

impl CategoryTotals {
    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `total / count`, or zero for an empty category.
    pub fn average(&self) -> Amount {
        if self.count == 0 {
            return Amount::ZERO;
        }
        Amount::new(self.total.value() / Decimal::from(self.count as u64))
    }

    fn add(&mut self, amount: Amount) -> Option<()> {
        self.total = self.total.checked_add(amount)?;
        self.count += 1;
        Some(())
    }
}

/// One category of a `Summary`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategoryLine {
    key: String,
    display: String,
    totals: CategoryTotals,
}

impl CategoryLine {
    /// The normalized (lower-case) category.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The capitalized category used in replies.
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn totals(&self) -> &CategoryTotals {
        &self.totals
    }
}

/// Per-category totals in first-seen order.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct Summary {
    lines: Vec<CategoryLine>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryLine> {
        self.lines.iter()
    }

    /// Looks up a category, ignoring letter case.
    pub fn get(&self, category: &str) -> Option<&CategoryTotals> {
        let key = crate::model::normalize_category(category);
        self.index.get(&key).map(|&ix| &self.lines[ix].totals)
    }

    /// The sum over every category.
    pub fn grand_total(&self) -> Result<Amount> {
        Amount::checked_sum(self.lines.iter().map(|l| l.totals.total)).ok_or_else(overflow)
    }

    fn add(&mut self, record: &ExpenseRecord) -> Result<()> {
        let key = record.category_key();
        let ix = match self.index.get(&key) {
            Some(&ix) => ix,
            None => {
                self.lines.push(CategoryLine {
                    key: key.clone(),
                    display: display_category(record.category()),
                    totals: CategoryTotals::default(),
                });
                self.index.insert(key, self.lines.len() - 1);
                self.lines.len() - 1
            }
        };
        let line = &mut self.lines[ix];
        line.totals.add(record.amount()).ok_or_else(|| {
            Error::msg(
                ErrorType::AmountOverflow,
                format!("The amounts in '{}' are too large to add up", line.display),
            )
        })
    }
}

/// Groups `records` by category.
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a ExpenseRecord>) -> Result<Summary> {
    let mut summary = Summary::default();
    for record in records {
        summary.add(record)?;
    }
    Ok(summary)
}

/// The sum of every record's amount.
pub fn grand_total<'a>(records: impl IntoIterator<Item = &'a ExpenseRecord>) -> Result<Amount> {
    Amount::checked_sum(records.into_iter().map(ExpenseRecord::amount)).ok_or_else(overflow)
}

fn overflow() -> Error {
    Error::msg(
        ErrorType::AmountOverflow,
        "The amounts are too large to add up",
    )
}
