//! These structs provide the CLI interface for the chat-ledger CLI.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// chat-ledger: log expenses by chatting.
///
/// Each message is either a command (`/total`, `/catsummary`, `/delete`, `csv`, `/help`) or an
/// expense written as `<description> <amount> [<category>]`, for example `comida 120 food`.
/// Expenses are stored in one table per calendar month.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and initialize the configuration file.
    ///
    /// This is the first command you should run. By default the home directory is
    /// $HOME/chat-ledger, pass --home or set CHAT_LEDGER_HOME to put it somewhere else.
    Init(InitArgs),
    /// Handle a single message and print the reply.
    Say(SayArgs),
    /// Handle every line read from stdin as a message.
    Chat(ChatArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where configuration and data are held. Defaults to ~/chat-ledger
    #[arg(long, env = "CHAT_LEDGER_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// (Not shown): Args for the `chat-ledger init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The name of the catalog that holds the month tables. Defaults to "expenses".
    #[arg(long)]
    catalog_name: Option<String>,
}

impl InitArgs {
    pub fn new(catalog_name: Option<String>) -> Self {
        Self { catalog_name }
    }

    pub fn catalog_name(&self) -> Option<&str> {
        self.catalog_name.as_deref()
    }
}

/// (Not shown): Args for the `chat-ledger say` command.
#[derive(Debug, Parser, Clone)]
pub struct SayArgs {
    /// The message, e.g. `comida 120 food` or `/catsummary November 2025`.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    text: Vec<String>,
}

impl SayArgs {
    pub fn new(text: Vec<String>) -> Self {
        Self { text }
    }

    /// The words of the message joined by single spaces.
    pub fn text(&self) -> String {
        self.text.join(" ")
    }
}

/// (Not shown): Args for the `chat-ledger chat` command.
#[derive(Debug, Parser, Clone)]
pub struct ChatArgs {
    /// The chat that replies are addressed to.
    #[arg(long, default_value = "local")]
    chat_id: String,
}

impl ChatArgs {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
        }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("chat-ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or CHAT_LEDGER_HOME instead of relying on the default \
                home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("chat-ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_say_joins_words() {
        let args = Args::try_parse_from([
            "chat-ledger",
            "--home",
            "/tmp/x",
            "say",
            "comida",
            "120",
            "food",
        ])
        .unwrap();
        assert_eq!(args.common().home().path(), Path::new("/tmp/x"));
        match args.command() {
            Command::Say(say) => assert_eq!(say.text(), "comida 120 food"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_say_accepts_slash_commands_and_negative_amounts() {
        let args =
            Args::try_parse_from(["chat-ledger", "say", "refund", "-5"]).unwrap();
        match args.command() {
            Command::Say(say) => assert_eq!(say.text(), "refund -5"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_log_level_and_chat_defaults() {
        let args =
            Args::try_parse_from(["chat-ledger", "--log-level", "debug", "chat"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        match args.command() {
            Command::Chat(chat) => assert_eq!(chat.chat_id(), "local"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_init_catalog_name() {
        let args =
            Args::try_parse_from(["chat-ledger", "init", "--catalog-name", "trip"]).unwrap();
        match args.command() {
            Command::Init(init) => assert_eq!(init.catalog_name(), Some("trip")),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
