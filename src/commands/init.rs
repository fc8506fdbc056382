use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the home directory, the data directory and an initial `config.json`.
///
/// # Arguments
/// - `home` - The directory that will be the root of the home directory, e.g.
///   `$HOME/chat-ledger`
/// - `catalog_name` - The catalog holding the month tables, `expenses` when `None`.
///
/// # Errors
/// - Returns an error if any file operations fail or if the directory is already initialized.
pub async fn init(home: &Path, catalog_name: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(home, catalog_name).await?;
    Ok(format!(
        "Successfully created the chat-ledger directory and config at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let out = init(&home, Some("trip")).await.unwrap();
        assert!(out.message().starts_with("Successfully created"));
        assert!(out.structure().is_none());
        assert_eq!(Config::load(&home).await.unwrap().catalog_name(), "trip");
    }
}
