use crate::chat::Dispatcher;
use crate::commands::{dispatcher, Out};
use crate::error::{ErrorType, IntoResult};
use crate::sender::{MessageSender, StdoutSender};
use crate::{Config, Mode, Result};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// What happened during a chat session.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct ChatStats {
    /// Messages handled.
    pub handled: usize,
    /// Replies that could not be delivered.
    pub undelivered: usize,
}

/// Reads messages from stdin, one per line, and writes each reply to stdout addressed to
/// `chat_id`. Ends at end of input.
pub async fn chat(config: Config, mode: Mode, chat_id: &str) -> Result<Out<ChatStats>> {
    let mut dispatcher = dispatcher(&config, mode).await?;
    let input = BufReader::new(tokio::io::stdin());
    let mut sender = StdoutSender::new();
    info!("Reading messages for chat {chat_id} from stdin");
    let stats = chat_loop(&mut dispatcher, input, &mut sender, chat_id, || {
        chrono::Local::now().date_naive()
    })
    .await?;
    Ok(Out::new(
        format!(
            "Handled {} message(s), {} reply(ies) undelivered",
            stats.handled, stats.undelivered
        ),
        stats,
    ))
}

/// Handles every non-blank line of `input` as a message dated by `today` and hands the reply to
/// `sender`. A failed send is logged and the loop goes on.
pub async fn chat_loop<R, S, F>(
    dispatcher: &mut Dispatcher,
    input: R,
    sender: &mut S,
    chat_id: &str,
    today: F,
) -> Result<ChatStats>
where
    R: AsyncBufRead + Unpin,
    S: MessageSender + Send,
    F: Fn() -> NaiveDate,
{
    let mut stats = ChatStats::default();
    let mut lines = input.lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("Unable to read the next message")
        .pub_result(ErrorType::Io)?
    {
        if line.trim().is_empty() {
            continue;
        }
        debug!("Message from chat {chat_id}: {line}");
        let reply = dispatcher.handle(&line, today()).await;
        stats.handled += 1;
        if let Err(e) = sender.send(chat_id, &reply).await {
            warn!("Unable to deliver the reply to chat {chat_id}: {e:#}");
            stats.undelivered += 1;
        }
    }
    Ok(stats)
}
