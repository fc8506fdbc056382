//! Implements the `Sheet` trait with one CSV file per table.
//!
//! A catalog is a directory, `<data_dir>/<catalog>/`, and the table `November 2025` is the file
//! `<data_dir>/<catalog>/November 2025.csv`.

use crate::api::{Sheet, TableRef};
use crate::error::Res;
use crate::utils;
use anyhow::{bail, Context};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace};

const EXTENSION: &str = "csv";

/// A catalog of CSV files in a directory.
#[derive(Debug, Clone)]
pub struct CsvSheet {
    dir: PathBuf,
    url: String,
}

impl CsvSheet {
    /// Opens (creating if necessary) the catalog directory `data_dir/catalog`.
    pub async fn open(data_dir: &Path, catalog: &str) -> Res<Self> {
        if catalog.is_empty() || catalog.contains(is_separator) || catalog == ".." {
            bail!("Invalid catalog name '{catalog}'");
        }
        let dir = data_dir.join(catalog);
        utils::make_dir(&dir).await?;
        let dir = utils::canonicalize(&dir).await?;
        let url = url::Url::from_directory_path(&dir)
            .map_err(|_| anyhow::anyhow!("Unable to express {} as a URL", dir.display()))?
            .to_string();
        debug!("Opened CSV catalog at {}", dir.display());
        Ok(Self { dir, url })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> Res<PathBuf> {
        if name.is_empty() || name.contains(is_separator) || name.starts_with('.') {
            bail!("Invalid table name '{name}'");
        }
        Ok(self.dir.join(format!("{name}.{EXTENSION}")))
    }

    async fn existing_path(&self, table: &TableRef) -> Res<PathBuf> {
        let path = self.path(table.name())?;
        if !utils::is_file(&path).await? {
            bail!("Sheet '{}' not found at {}", table.name(), path.display());
        }
        Ok(path)
    }

    async fn write_rows(&self, path: &Path, rows: &[Vec<String>]) -> Res<()> {
        let mut bytes = Vec::new();
        for row in rows {
            bytes.extend(encode_row(row)?);
        }
        utils::write(path, bytes).await
    }
}

#[async_trait::async_trait]
impl Sheet for CsvSheet {
    fn url(&self) -> &str {
        &self.url
    }

    async fn find(&mut self, name: &str) -> Res<Option<TableRef>> {
        let path = self.path(name)?;
        Ok(utils::is_file(&path).await?.then(|| TableRef::new(name)))
    }

    async fn get_or_create(&mut self, name: &str) -> Res<TableRef> {
        let path = self.path(name)?;
        // Opening in append mode creates the file without truncating a concurrent writer's rows.
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("Unable to create {}", path.display()))?;
        Ok(TableRef::new(name))
    }

    async fn get(&mut self, table: &TableRef) -> Res<Vec<Vec<String>>> {
        let path = self.existing_path(table).await?;
        trace!("get for {}", path.display());
        let content = utils::read(&path).await?;
        load_csv(&content).with_context(|| format!("Unable to parse {}", path.display()))
    }

    async fn append_row(&mut self, table: &TableRef, cells: &[String]) -> Res<()> {
        let path = self.existing_path(table).await?;
        let bytes = encode_row(cells)?;
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("Unable to open {} for appending", path.display()))?;
        file.write_all(&bytes)
            .await
            .with_context(|| format!("Unable to append to {}", path.display()))?;
        file.flush()
            .await
            .with_context(|| format!("Unable to flush {}", path.display()))
    }

    async fn delete_row(&mut self, table: &TableRef, row_ix: usize) -> Res<()> {
        let mut rows = self.get(table).await?;
        if row_ix >= rows.len() {
            bail!(
                "Row {row_ix} is out of range for sheet '{}' with {} rows",
                table.name(),
                rows.len()
            );
        }
        rows.remove(row_ix);
        let path = self.existing_path(table).await?;
        self.write_rows(&path, &rows).await
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, '/' | '\\')
}

/// Loads rows from a CSV-formatted string. Rows may have differing lengths.
fn load_csv(csv_data: &str) -> Res<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

/// Encodes a single row, terminator included.
fn encode_row(cells: &[String]) -> Res<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(Vec::new());
    wtr.write_record(cells)?;
    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to encode CSV row: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_open_creates_catalog_dir() {
        let dir = TempDir::new().unwrap();
        let sheet = CsvSheet::open(dir.path(), "expenses").await.unwrap();
        assert!(sheet.dir().is_dir());
        assert!(sheet.url().starts_with("file://"));
        assert!(sheet.url().ends_with("expenses/"));
    }

    #[tokio::test]
    async fn test_open_rejects_bad_catalog() {
        let dir = TempDir::new().unwrap();
        assert!(CsvSheet::open(dir.path(), "../elsewhere").await.is_err());
        assert!(CsvSheet::open(dir.path(), "").await.is_err());
    }

    #[tokio::test]
    async fn test_round_trip_rows() {
        let dir = TempDir::new().unwrap();
        let mut sheet = CsvSheet::open(dir.path(), "expenses").await.unwrap();
        assert!(sheet.find("October 2026").await.unwrap().is_none());

        let t = sheet.get_or_create("October 2026").await.unwrap();
        assert_eq!(sheet.find("October 2026").await.unwrap(), Some(t.clone()));
        assert!(sheet.get(&t).await.unwrap().is_empty());

        sheet.append_row(&t, &row(&["Date", "Description"])).await.unwrap();
        sheet
            .append_row(&t, &row(&["2026-10-19", "pan, leche \"fresca\""]))
            .await
            .unwrap();
        sheet.append_row(&t, &row(&["2026-10-20", "bus", "2"])).await.unwrap();

        let rows = sheet.get(&t).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][1], "pan, leche \"fresca\"");
        assert_eq!(rows[2], row(&["2026-10-20", "bus", "2"]));

        sheet.delete_row(&t, 1).await.unwrap();
        let rows = sheet.get(&t).await.unwrap();
        assert_eq!(rows, vec![row(&["Date", "Description"]), row(&["2026-10-20", "bus", "2"])]);
        assert!(dir.path().join("expenses").join("October 2026.csv").is_file());
    }

    #[tokio::test]
    async fn test_get_or_create_keeps_existing_rows() {
        let dir = TempDir::new().unwrap();
        let mut sheet = CsvSheet::open(dir.path(), "expenses").await.unwrap();
        let t = sheet.get_or_create("May 2026").await.unwrap();
        sheet.append_row(&t, &row(&["a"])).await.unwrap();
        let t = sheet.get_or_create("May 2026").await.unwrap();
        assert_eq!(sheet.get(&t).await.unwrap(), vec![row(&["a"])]);
    }

    #[tokio::test]
    async fn test_missing_table_errors() {
        let dir = TempDir::new().unwrap();
        let mut sheet = CsvSheet::open(dir.path(), "expenses").await.unwrap();
        let t = TableRef::new("May 2026");
        assert!(sheet.get(&t).await.is_err());
        assert!(sheet.append_row(&t, &row(&["a"])).await.is_err());
        assert!(sheet.delete_row(&t, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_out_of_range() {
        let dir = TempDir::new().unwrap();
        let mut sheet = CsvSheet::open(dir.path(), "expenses").await.unwrap();
        let t = sheet.get_or_create("May 2026").await.unwrap();
        sheet.append_row(&t, &row(&["a"])).await.unwrap();
        assert!(sheet.delete_row(&t, 1).await.is_err());
        assert_eq!(sheet.get(&t).await.unwrap().len(), 1);
    }
}
