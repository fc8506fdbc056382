//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::TestSheet;
use crate::chat::Dispatcher;
use crate::ledger::LedgerStore;
use crate::Config;
use tempfile::TempDir;

/// Test environment that sets up a home directory with a Config, plus an in-memory sheet named
/// after the configured catalog. Holds TempDir to keep the directory alive for the duration of
/// the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
    sheet: TestSheet,
}

impl TestEnv {
    /// Creates a test environment with a freshly initialized home directory.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("chat-ledger");
        let config = Config::create(&root, None).await.unwrap();
        let sheet = TestSheet::new(config.catalog_name());
        Self {
            _temp_dir: temp_dir,
            config,
            sheet,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// The in-memory sheet. Clones share their tables, so this sees everything a dispatcher from
    /// `dispatcher()` writes.
    pub fn sheet(&self) -> &TestSheet {
        &self.sheet
    }

    /// A dispatcher over the in-memory sheet.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(LedgerStore::new(Box::new(self.sheet.clone())))
    }
}
