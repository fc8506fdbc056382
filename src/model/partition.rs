use chrono::{Datelike, Month, NaiveDate};
use std::fmt::{Display, Formatter};

/// Identifies one month of the ledger. Its `Display` form, e.g. `December 2025`, is the name of
/// the backing table.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Partition {
    month: Month,
    year: i32,
}

impl Partition {
    pub fn new(month: Month, year: i32) -> Self {
        Self { month, year }
    }

    /// The partition that `date` falls into.
    pub fn from_date(date: NaiveDate) -> Self {
        // `month()` is always in 1..=12, so the fallback is never taken.
        let month = Month::try_from(date.month() as u8).unwrap_or(Month::January);
        Self {
            month,
            year: date.year(),
        }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// The table name, e.g. `November 2025`.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// The first day of the month, if it is representable.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month.number_from_month(), 1)
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month.name(), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_name() {
        let p = Partition::new(Month::December, 2025);
        assert_eq!(p.name(), "December 2025");
    }

    #[test]
    fn test_from_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let p = Partition::from_date(date);
        assert_eq!(p, Partition::new(Month::January, 2026));

        let date = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(Partition::from_date(date).name(), "December 2025");
    }

    #[test]
    fn test_from_date_every_month() {
        for m in 1..=12 {
            let date = NaiveDate::from_ymd_opt(2026, m, 15).unwrap();
            let p = Partition::from_date(date);
            assert_eq!(p.month().number_from_month(), m);
            assert_eq!(p.first_day(), NaiveDate::from_ymd_opt(2026, m, 1));
        }
    }

    #[test]
    fn test_first_day() {
        let p = Partition::new(Month::February, 2024);
        assert_eq!(p.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1));
    }
}
