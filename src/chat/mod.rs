//! The chat interface: turning message text into commands and commands into replies.
//!
//! ```text
//! /total
//! csv
//! /delete
//! /delete <n>
//! /catsummary [<MonthName> [<Year>]]
//! <description> <amount> [<category>]
//! /help
//! ```

mod dispatch;
mod parse;

pub use dispatch::Dispatcher;
pub use parse::parse;

use crate::model::{Amount, Partition};
use std::fmt::{Display, Formatter};

/// A parsed chat message.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command {
    /// `/total`: the grand total of the current month.
    Total,
    /// `csv`: a link to the ledger.
    SheetLink,
    /// `/delete`: remove the last row of the current month.
    DeleteLast,
    /// `/delete <n>`: remove the n-th (1-based) row of the current month.
    DeleteByIndex(usize),
    /// `/catsummary [<MonthName> [<Year>]]`.
    CategorySummary {
        partition: Partition,
        /// True when the month was named in the message rather than defaulted.
        explicit: bool,
    },
    /// `<description> <amount> [<category>]`.
    SaveExpense {
        description: String,
        amount: Amount,
        category: String,
    },
    /// `/help` or `/start`.
    Help,
    /// Anything that could not be understood.
    Malformed(Malformed),
}

/// Why a message could not be parsed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Malformed {
    Empty,
    MissingAmount,
    InvalidAmount(String),
    TooManyTokens,
    UnknownMonth(String),
    InvalidIndex(String),
    UnknownCommand(String),
}

impl Display for Malformed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Malformed::Empty => write!(f, "The message is empty."),
            Malformed::MissingAmount => write!(f, "An amount is missing after the description."),
            Malformed::InvalidAmount(s) => write!(
                f,
                "'{s}' is not an amount. Use plain numbers like 120 or 12.50."
            ),
            Malformed::TooManyTokens => write!(
                f,
                "Too many words. Use a single word for the description and for the category."
            ),
            Malformed::UnknownMonth(s) => write!(f, "'{s}' is not a month name."),
            Malformed::InvalidIndex(s) => write!(f, "'{s}' is not a row number."),
            Malformed::UnknownCommand(s) => write!(f, "'{s}' is not a command."),
        }
    }
}
