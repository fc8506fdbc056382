//! Configuration file handling for the chat ledger.
//!
//! The configuration file is stored at `$CHAT_LEDGER_HOME/config.json`. It names the catalog that
//! holds the month partitions and, optionally, where the file backend keeps its data.

use crate::error::{ErrorType, IntoResult, Res};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "chat-ledger";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DATA: &str = "data";
const DEFAULT_CATALOG: &str = "expenses";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$CHAT_LEDGER_HOME` and from there it loads `$CHAT_LEDGER_HOME/config.json`. It
/// provides paths to other items that are either configurable or are expected in a certain
/// location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    data_dir: PathBuf,
}

impl Config {
    /// Creates the home directory, the data directory and an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g.
    ///   `$HOME/chat-ledger`
    /// - `catalog_name` - The name of the catalog holding the month partitions. Defaults to
    ///   `expenses`.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or if `config.json` already exists.
    pub async fn create(dir: impl Into<PathBuf>, catalog_name: Option<&str>) -> Result<Self> {
        Self::create_inner(dir.into(), catalog_name)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(maybe_relative: PathBuf, catalog_name: Option<&str>) -> Res<Self> {
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the chat-ledger home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if utils::is_file(&config_path).await? {
            bail!(
                "The config file already exists '{}'",
                config_path.display()
            )
        }

        let config_file = ConfigFile {
            catalog_name: catalog_name.unwrap_or(DEFAULT_CATALOG).to_string(),
            ..ConfigFile::default()
        };
        config_file.validate()?;
        config_file.save(&config_path).await?;

        let data_dir = config_file.data_dir(&root);
        utils::make_dir(&data_dir)
            .await
            .context("Unable to create the data directory")?;

        debug!("Created config at {}", config_path.display());
        Ok(Self {
            root,
            config_path,
            config_file,
            data_dir,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The chat-ledger home directory is missing, run `chat-ledger init` first")?;

        let config_path = root.join(CONFIG_JSON);
        if !utils::is_file(&config_path).await? {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let data_dir = config_file.data_dir(&root);

        debug!("Loaded config from {}", config_path.display());
        Ok(Self {
            root,
            config_path,
            config_file,
            data_dir,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn catalog_name(&self) -> &str {
        &self.config_file.catalog_name
    }

    /// Where the file backend keeps its catalogs.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "chat-ledger",
///   "config_version": 1,
///   "catalog_name": "expenses",
///   "data_path": "data"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "chat-ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The catalog holding the month partitions
    #[serde(default = "default_catalog")]
    catalog_name: String,

    /// Where the file backend keeps its data (optional, relative to the home directory or
    /// absolute). Defaults to $CHAT_LEDGER_HOME/data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_path: Option<PathBuf>,
}

fn default_catalog() -> String {
    DEFAULT_CATALOG.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            catalog_name: default_catalog(),
            data_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it is not ours
    async fn load(path: &Path) -> Res<Self> {
        let content = utils::read(path).await?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: &Path) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }

    fn validate(&self) -> Res<()> {
        anyhow::ensure!(
            self.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            self.app_name
        );
        anyhow::ensure!(
            !self.catalog_name.trim().is_empty(),
            "The catalog_name in the config file is empty"
        );
        Ok(())
    }

    /// Returns `data_path` if it is absolute, otherwise resolves it against `root`.
    fn data_dir(&self, root: &Path) -> PathBuf {
        match &self.data_path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => root.join(DATA),
        }
    }
}
