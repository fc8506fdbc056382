//! Command handlers for the chat-ledger CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod chat;
mod init;
mod say;

use crate::chat::Dispatcher;
use crate::error::{ErrorType, IntoResult};
use crate::ledger::LedgerStore;
use crate::{api, Config, Mode, Result};
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use chat::{chat, chat_loop, ChatStats};
pub use init::init;
pub use say::{say, Exchange};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Opens the backend selected by `mode` and wraps it in a dispatcher.
pub async fn dispatcher(config: &Config, mode: Mode) -> Result<Dispatcher> {
    let sheet = api::sheet(config, mode)
        .await
        .with_context(|| format!("Unable to open the catalog '{}'", config.catalog_name()))
        .pub_result(ErrorType::Backend)?;
    Ok(Dispatcher::new(LedgerStore::new(sheet)))
}
