use crate::commands::{dispatcher, Out};
use crate::{Config, Mode, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// The reply to a single message, as structured output.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    text: String,
    reply: String,
}

/// Handles one message as of `today`. The reply becomes the message of the returned `Out`. Only
/// a failure to open the backend is an error here, everything else is a reply.
pub async fn say(config: Config, mode: Mode, text: &str, today: NaiveDate) -> Result<Out<Exchange>> {
    let mut dispatcher = dispatcher(&config, mode).await?;
    let reply = dispatcher.handle(text, today).await;
    Ok(Out::new(
        reply.clone(),
        Exchange {
            text: text.to_string(),
            reply,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_say_persists_in_files() {
        let env = TestEnv::new().await;
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let out = say(env.config(), Mode::Files, "comida 120", today)
            .await
            .unwrap();
        assert!(out.message().starts_with("✔️ Saved"), "{}", out.message());

        let out = say(env.config(), Mode::Files, "/total", today)
            .await
            .unwrap();
        assert_eq!(out.message(), "💰 Total spent in October 2026: $120.00");
        assert!(env
            .config()
            .data_dir()
            .join("expenses")
            .join("October 2026.csv")
            .is_file());
    }
}
