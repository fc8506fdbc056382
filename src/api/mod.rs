//! The persistent-table backend behind the ledger.
//!
//! A backend opens a named catalog (a spreadsheet, a directory of files) which holds any number
//! of named tables. Each table is an ordered list of rows of string cells. The `Sheet` trait is
//! deliberately small so that a test double can stand in for a real store.

mod csv_sheet;
mod sheet_test_client;

use crate::error::Res;
use crate::Config;
use tracing::debug;

pub use csv_sheet::CsvSheet;
pub use sheet_test_client::TestSheet;

/// Setting this environment variable to a non-empty value selects `Mode::Test`.
pub const TEST_MODE_ENV: &str = "CHAT_LEDGER_IN_TEST_MODE";

/// A reference to a table that a backend has resolved. It is only good for the call sequence that
/// produced it: the ledger resolves tables again for every operation.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TableRef {
    name: String,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A catalog of named tables.
#[async_trait::async_trait]
pub trait Sheet {
    /// A URL where a person can look at the catalog.
    fn url(&self) -> &str;

    /// Looks up a table without creating it.
    async fn find(&mut self, name: &str) -> Res<Option<TableRef>>;

    /// Looks up a table, creating an empty one if it does not exist.
    async fn get_or_create(&mut self, name: &str) -> Res<TableRef>;

    /// Returns every row of the table, header included.
    async fn get(&mut self, table: &TableRef) -> Res<Vec<Vec<String>>>;

    /// Appends a row after the last row of the table.
    async fn append_row(&mut self, table: &TableRef, cells: &[String]) -> Res<()>;

    /// Removes the row at the 0-based `row_ix`, counting the header as row 0.
    async fn delete_row(&mut self, table: &TableRef, row_ix: usize) -> Res<()>;
}

/// Which backend to open.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// One CSV file per table under the configured data directory.
    #[default]
    Files,
    /// Everything in memory, nothing persists beyond the process.
    Test,
}

impl Mode {
    /// `Mode::Test` when `CHAT_LEDGER_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Files`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Files,
        }
    }
}

/// Opens the catalog named in `config` with the backend chosen by `mode`.
pub async fn sheet(config: &Config, mode: Mode) -> Res<Box<dyn Sheet + Send>> {
    debug!("Opening catalog '{}' in {mode:?} mode", config.catalog_name());
    let sheet: Box<dyn Sheet + Send> = match mode {
        Mode::Files => Box::new(CsvSheet::open(config.data_dir(), config.catalog_name()).await?),
        Mode::Test => Box::new(TestSheet::new(config.catalog_name())),
    };
    Ok(sheet)
}
