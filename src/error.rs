//! Error types for the ledger.
//!
//! Internally, backends and file helpers use `anyhow` through the `Res<T>` alias so that errors
//! can collect context as they bubble up. At the public surface those errors are wrapped in
//! `Error`, which remembers an `ErrorType` so that callers (the dispatcher, `main`) can decide how
//! to present the failure without inspecting message text.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

pub(crate) type Res<T> = std::result::Result<T, anyhow::Error>;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of an `Error`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The input text could not be understood.
    MalformedInput,
    /// The requested ledger partition does not exist.
    NotFound,
    /// A delete index was zero or past the end of the partition.
    RowNotFound,
    /// A delete-last was requested on a partition with no data rows.
    EmptyPartition,
    /// A sum of amounts does not fit in a `Decimal`.
    AmountOverflow,
    /// The storage backend failed.
    Backend,
    /// The configuration could not be created or loaded.
    Config,
    /// Local I/O outside of the backend failed.
    Io,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An error paired with its `ErrorType`.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    /// Creates an error from a plain message.
    pub fn msg(error_type: ErrorType, message: impl Display + Debug + Send + Sync + 'static) -> Self {
        Self::new(error_type, anyhow::Error::msg(message))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// True for both kinds of bad delete request.
    pub fn is_row_index_invalid(&self) -> bool {
        matches!(
            self.error_type,
            ErrorType::RowNotFound | ErrorType::EmptyPartition
        )
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Converts any result whose error can become an `anyhow::Error` into a public `Result`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_pub_result_keeps_type_and_context() {
        let res: Res<()> = Err(anyhow::anyhow!("disk on fire")).context("Unable to append row");
        let err = res.pub_result(ErrorType::Backend).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Backend);
        assert_eq!(err.to_string(), "Unable to append row");
        assert!(format!("{err:?}").contains("disk on fire"));
    }

    #[test]
    fn test_row_index_invalid() {
        assert!(Error::msg(ErrorType::RowNotFound, "x").is_row_index_invalid());
        assert!(Error::msg(ErrorType::EmptyPartition, "x").is_row_index_invalid());
        assert!(!Error::msg(ErrorType::NotFound, "x").is_row_index_invalid());
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::EmptyPartition.to_string(), "empty_partition");
        assert_eq!(
            "row_not_found".parse::<ErrorType>().unwrap(),
            ErrorType::RowNotFound
        );
    }
}
