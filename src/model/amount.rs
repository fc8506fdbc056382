//! Amount type for monetary values.
//!
//! Amounts typed by a user are parsed strictly with `Amount::parse_input`: integers or decimals,
//! no currency symbols and no grouping separators. Amounts read back out of a ledger table are
//! parsed leniently with `FromStr`, because a spreadsheet may have rendered them as `$1,200.00`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents an amount of money in the ledger.
///
/// `Display` renders the value for replies: dollar sign, thousands separators and two decimal
/// places. Rounding happens only there, the wrapped `Decimal` is never rounded.
///
/// # Examples
///
/// ```
/// # use chat_ledger::model::Amount;
/// let amount = Amount::parse_input("1234.5").unwrap();
/// assert_eq!(amount.to_string(), "$1,234.50");
/// assert_eq!(amount.to_cell(), "1234.5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Parses an amount typed by a user. Accepts an optional leading `-`, digits, and at most one
    /// `.` that is followed by at least one digit.
    pub fn parse_input(s: &str) -> Result<Self, AmountError> {
        let digits = s.strip_prefix('-').unwrap_or(s);
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (digits, None),
        };
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        let well_formed = !whole.is_empty()
            && all_digits(whole)
            && fraction.map_or(true, |f| !f.is_empty() && all_digits(f));
        if !well_formed {
            return Err(AmountError::Syntax(s.to_string()));
        }
        Decimal::from_str(s).map(Self).map_err(AmountError::Decimal)
    }

    /// `self + rhs`, or `None` if the sum does not fit in a `Decimal`.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// The sum of `amounts`, or `None` if it does not fit in a `Decimal`.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Amount>) -> Option<Amount> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, Amount::checked_add)
    }

    /// The plain form written into a ledger table, e.g. `12.50`.
    pub fn to_cell(&self) -> String {
        self.0.to_string()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub enum AmountError {
    /// The text is not a plain integer or decimal.
    Syntax(String),
    /// The text looked like a number but did not fit a `Decimal`.
    Decimal(rust_decimal::Error),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Syntax(s) => write!(f, "Syntax({s:?})"),
            AmountError::Decimal(e) => Debug::fmt(e, f),
        }
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Syntax(s) => write!(f, "'{s}' is not a number"),
            AmountError::Decimal(e) => Display::fmt(e, f),
        }
    }
}

impl Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::Syntax(_) => None,
            AmountError::Decimal(e) => Some(e),
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Lenient parsing for stored cells: `-$1,200.50`, `$3`, ` 12 ` and the empty string (zero)
    /// are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
            match after_minus.strip_prefix('$') {
                Some(after_dollar) => format!("-{after_dollar}"),
                None => trimmed.to_string(),
            }
        } else {
            trimmed.strip_prefix('$').unwrap_or(trimmed).to_string()
        };

        let without_commas = without_dollar.replace(',', "");
        Amount::parse_input(&without_commas)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.0.abs().round_dp(2);
        if num < Decimal::from(F64_EXACT_CENTS) {
            if let Some(value) = num.to_f64() {
                return write!(f, "{sign}${}", format_num::format_num!(",.2", value));
            }
        }
        write!(f, "{sign}${}", group_thousands(num))
    }
}

/// Below this magnitude an `f64` still carries every cent.
const F64_EXACT_CENTS: i64 = 1_000_000_000_000;

/// Formats a non-negative value with at most two decimal places as `1,234.50`.
fn group_thousands(num: Decimal) -> String {
    let plain = num.to_string();
    let (whole, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), ""));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{grouped}.{fraction:0<2}")
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_cell())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
