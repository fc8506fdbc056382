//! Types that represent the ledger data model, such as `ExpenseRecord` and `Partition`.
mod amount;
mod expense;
mod partition;

pub use amount::{Amount, AmountError};
pub(crate) use expense::Columns;
pub use expense::{display_category, normalize_category, ExpenseRecord, DEFAULT_CATEGORY, HEADER};
pub use partition::Partition;
