//! Outbound delivery of replies.

use crate::error::Res;
use anyhow::Context;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Delivers a reply to a chat. Delivery is fire-and-forget from the point of view of the ledger:
/// a failed send is reported to the caller but nothing is retried.
#[async_trait::async_trait]
pub trait MessageSender {
    async fn send(&mut self, chat_id: &str, text: &str) -> Res<()>;
}

/// Writes each reply to an `AsyncWrite`, stdout by default.
pub struct StdoutSender<W = tokio::io::Stdout> {
    out: W,
}

impl StdoutSender {
    pub fn new() -> Self {
        Self {
            out: tokio::io::stdout(),
        }
    }
}

impl Default for StdoutSender {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> StdoutSender<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[async_trait::async_trait]
impl<W> MessageSender for StdoutSender<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, chat_id: &str, text: &str) -> Res<()> {
        let message = format!("[{chat_id}] {text}\n");
        self.out
            .write_all(message.as_bytes())
            .await
            .with_context(|| format!("Unable to deliver a reply to chat {chat_id}"))?;
        self.out.flush().await.context("Unable to flush the reply")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stdout_sender_writes_lines() {
        let mut sender = StdoutSender::with_writer(Vec::<u8>::new());
        sender.send("42", "hello").await.unwrap();
        sender.send("42", "two\nlines").await.unwrap();
        let written = String::from_utf8(sender.into_inner()).unwrap();
        assert_eq!(written, "[42] hello\n[42] two\nlines\n");
    }
}
