pub mod api;
pub mod args;
pub mod chat;
pub mod commands;
mod config;
mod error;
pub mod ledger;
pub mod model;
pub mod sender;
pub mod summary;
mod utils;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use config::Config;
pub use error::{Error, ErrorType, Result};
