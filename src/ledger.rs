//! The month-partitioned ledger on top of a `Sheet` backend.
//!
//! Every public operation resolves its partition from scratch. A `TableRef` never outlives the
//! call that produced it, so a table renamed or removed between two messages is simply looked up
//! (or recreated) again. There is no locking: two writers racing on the same partition get
//! last-write-wins behavior from the backend, and a row index may point somewhere else by the time
//! a delete runs.

use crate::api::{Sheet, TableRef};
use crate::error::{Error, ErrorType, IntoResult, Res};
use crate::model::{Columns, ExpenseRecord, Partition, HEADER};
use crate::Result;
use anyhow::Context;
use tracing::{debug, info, warn};

/// A resolved partition: its table and, at the instant of resolution, its rows.
#[derive(Debug, Clone)]
pub struct PartitionHandle {
    partition: Partition,
    table: TableRef,
    rows: Vec<Vec<String>>,
}

impl PartitionHandle {
    pub fn partition(&self) -> Partition {
        self.partition
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// The number of data rows, header excluded.
    pub fn row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    fn columns(&self) -> Columns {
        self.rows
            .first()
            .map(|header| Columns::from_header(header))
            .unwrap_or_default()
    }

    fn records(&self) -> Vec<ExpenseRecord> {
        let columns = self.columns();
        self.rows
            .iter()
            .skip(1)
            .map(|row| columns.record(self.partition, row))
            .collect()
    }
}

/// Reads and writes expense records in month partitions.
pub struct LedgerStore {
    sheet: Box<dyn Sheet + Send>,
}

impl LedgerStore {
    /// Create a new `LedgerStore` that uses a dynamically-dispatched `sheet` to store its data.
    pub fn new(sheet: Box<dyn Sheet + Send>) -> Self {
        Self { sheet }
    }

    /// Where a person can look at the ledger.
    pub fn url(&self) -> &str {
        self.sheet.url()
    }

    /// Resolves `partition`, creating its table and writing the header if needed. Safe to repeat:
    /// the header is only written when the table is empty.
    pub async fn get_or_create_partition(&mut self, partition: Partition) -> Result<PartitionHandle> {
        self.resolve(partition, true)
            .await
            .pub_result(ErrorType::Backend)?
            .ok_or_else(|| {
                Error::msg(
                    ErrorType::Backend,
                    format!("The backend did not create a table for {partition}"),
                )
            })
    }

    /// Resolves `partition` without creating anything.
    pub async fn find_partition(&mut self, partition: Partition) -> Result<Option<PartitionHandle>> {
        self.resolve(partition, false)
            .await
            .pub_result(ErrorType::Backend)
    }

    /// Appends `record` as the last row of `partition`. The caller stamps the record's date.
    pub async fn append(&mut self, partition: Partition, record: &ExpenseRecord) -> Result<()> {
        let handle = self.get_or_create_partition(partition).await?;
        self.sheet
            .append_row(handle.table(), &record.to_row())
            .await
            .with_context(|| format!("Unable to append a row to {partition}"))
            .pub_result(ErrorType::Backend)?;
        info!(
            "Appended '{}' {} ({}) to {partition}",
            record.description(),
            record.amount(),
            record.category()
        );
        Ok(())
    }

    /// Every record of `partition`, in row order, creating the partition if it does not exist.
    pub async fn list_records(&mut self, partition: Partition) -> Result<Vec<ExpenseRecord>> {
        Ok(self.get_or_create_partition(partition).await?.records())
    }

    /// Every record of an existing `partition`. Fails with `NotFound` rather than creating it.
    pub async fn list_existing(&mut self, partition: Partition) -> Result<Vec<ExpenseRecord>> {
        match self.find_partition(partition).await? {
            Some(handle) => Ok(handle.records()),
            None => Err(Error::msg(
                ErrorType::NotFound,
                format!("There is no ledger for {partition}"),
            )),
        }
    }

    /// The number of data rows in `partition`.
    pub async fn row_count(&mut self, partition: Partition) -> Result<usize> {
        Ok(self.get_or_create_partition(partition).await?.row_count())
    }

    /// Removes the data row at the 1-based `index` and returns it.
    pub async fn delete_row(&mut self, partition: Partition, index: usize) -> Result<ExpenseRecord> {
        let handle = self.get_or_create_partition(partition).await?;
        let count = handle.row_count();
        if index == 0 || index > count {
            return Err(Error::msg(
                ErrorType::RowNotFound,
                format!(
                    "Row {index} does not exist in {partition}, which has {count} row{}",
                    if count == 1 { "" } else { "s" }
                ),
            ));
        }
        self.remove(&handle, index).await
    }

    /// Removes the last data row and returns it.
    pub async fn delete_last(&mut self, partition: Partition) -> Result<ExpenseRecord> {
        let handle = self.get_or_create_partition(partition).await?;
        match handle.row_count() {
            0 => Err(Error::msg(
                ErrorType::EmptyPartition,
                format!("There is nothing to delete in {partition}"),
            )),
            last => self.remove(&handle, last).await,
        }
    }

    async fn remove(&mut self, handle: &PartitionHandle, index: usize) -> Result<ExpenseRecord> {
        let record = handle.columns().record(handle.partition, &handle.rows[index]);
        self.sheet
            .delete_row(handle.table(), index)
            .await
            .with_context(|| format!("Unable to delete row {index} of {}", handle.partition))
            .pub_result(ErrorType::Backend)?;
        info!(
            "Deleted row {index} '{}' {} from {}",
            record.description(),
            record.amount(),
            handle.partition
        );
        Ok(record)
    }

    async fn resolve(&mut self, partition: Partition, create: bool) -> Res<Option<PartitionHandle>> {
        let name = partition.name();
        let table = if create {
            self.sheet.get_or_create(&name).await?
        } else {
            match self.sheet.find(&name).await? {
                Some(table) => table,
                None => {
                    debug!("No table exists for {partition}");
                    return Ok(None);
                }
            }
        };

        let mut rows = self
            .sheet
            .get(&table)
            .await
            .with_context(|| format!("Unable to read {partition}"))?;

        if rows.is_empty() {
            let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
            self.sheet
                .append_row(&table, &header)
                .await
                .with_context(|| format!("Unable to write the header of {partition}"))?;
            debug!("Wrote the header of {partition}");
            rows.push(header);
        } else if !is_header(&rows[0]) {
            warn!(
                "The first row of {partition} is not the expected header {:?}: {:?}",
                HEADER, rows[0]
            );
        }

        Ok(Some(PartitionHandle {
            partition,
            table,
            rows,
        }))
    }
}

fn is_header(row: &[String]) -> bool {
    row.len() >= HEADER.len()
        && HEADER
            .iter()
            .zip(row)
            .all(|(expected, found)| found.trim().eq_ignore_ascii_case(expected))
}
