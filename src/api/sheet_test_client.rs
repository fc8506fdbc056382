//! Implements the `Sheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without touching the filesystem.

use crate::api::{Sheet, TableRef};
use crate::error::Res;
use anyhow::{bail, Context};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Tables = BTreeMap<String, Vec<Vec<String>>>;

/// An implementation of the `Sheet` trait that holds its tables in memory. Clones share the same
/// tables, so a test can keep one handle for inspection while the ledger owns another.
#[derive(Debug, Clone)]
pub struct TestSheet {
    url: String,
    tables: Arc<Mutex<Tables>>,
    offline: Arc<AtomicBool>,
}

impl TestSheet {
    /// Create a new, empty catalog named `catalog`.
    pub fn new(catalog: &str) -> Self {
        Self {
            url: format!("memory://{catalog}"),
            tables: Arc::new(Mutex::new(BTreeMap::new())),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replaces the rows of `name`, creating the table if needed.
    pub fn put(&self, name: &str, rows: Vec<Vec<String>>) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.insert(name.to_string(), rows);
        }
    }

    /// A copy of the rows of `name`, if the table exists.
    pub fn rows(&self, name: &str) -> Option<Vec<Vec<String>>> {
        self.tables.lock().ok()?.get(name).cloned()
    }

    /// Removes a table, as if someone deleted it behind the ledger's back.
    pub fn remove(&self, name: &str) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.remove(name);
        }
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables
            .lock()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// While offline, every call fails the way an unreachable backend would.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn lock(&self) -> Res<MutexGuard<'_, Tables>> {
        if self.offline.load(Ordering::SeqCst) {
            bail!("The test sheet at {} is offline", self.url);
        }
        self.tables
            .lock()
            .map_err(|_| anyhow::anyhow!("The test sheet lock is poisoned"))
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    fn url(&self) -> &str {
        &self.url
    }

    async fn find(&mut self, name: &str) -> Res<Option<TableRef>> {
        Ok(self.lock()?.contains_key(name).then(|| TableRef::new(name)))
    }

    async fn get_or_create(&mut self, name: &str) -> Res<TableRef> {
        self.lock()?.entry(name.to_string()).or_default();
        Ok(TableRef::new(name))
    }

    async fn get(&mut self, table: &TableRef) -> Res<Vec<Vec<String>>> {
        self.lock()?
            .get(table.name())
            .cloned()
            .with_context(|| format!("Sheet '{}' not found", table.name()))
    }

    async fn append_row(&mut self, table: &TableRef, cells: &[String]) -> Res<()> {
        self.lock()?
            .get_mut(table.name())
            .with_context(|| format!("Sheet '{}' not found", table.name()))?
            .push(cells.to_vec());
        Ok(())
    }

    async fn delete_row(&mut self, table: &TableRef, row_ix: usize) -> Res<()> {
        let mut tables = self.lock()?;
        let rows = tables
            .get_mut(table.name())
            .with_context(|| format!("Sheet '{}' not found", table.name()))?;
        if row_ix >= rows.len() {
            bail!(
                "Row {row_ix} is out of range for sheet '{}' with {} rows",
                table.name(),
                rows.len()
            );
        }
        rows.remove(row_ix);
        Ok(())
    }
}
