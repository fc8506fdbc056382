use crate::chat::{parse, Command};
use crate::error::{Error, ErrorType};
use crate::ledger::LedgerStore;
use crate::model::{display_category, Amount, ExpenseRecord, Partition};
use crate::summary;
use crate::Result;
use chrono::NaiveDate;
use std::fmt::Write;
use tracing::{debug, error, trace};

const EXAMPLE: &str = "Invalid format. Example:\n\ncomida 120";

const HELP: &str = "\
Send an expense as: <description> <amount> [<category>]
e.g. comida 120 food

/total - total spent this month
/catsummary [<Month> [<Year>]] - totals per category
/delete - remove the last expense of this month
/delete <n> - remove expense number n of this month
csv - link to the ledger";

/// Turns chat messages into ledger operations and replies.
///
/// The dispatcher keeps no state between messages other than what it writes to the ledger, and
/// it never fails: every error becomes a reply.
pub struct Dispatcher {
    store: LedgerStore,
}

impl Dispatcher {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Parses and executes `text` as of `today`, returning the reply.
    pub async fn handle(&mut self, text: &str, today: NaiveDate) -> String {
        let command = parse(text, today);
        trace!("Parsed {text:?} as {command:?}");
        let reply = self.dispatch(command, today).await;
        debug!("Reply: {reply}");
        reply
    }

    /// Executes an already-parsed `command` as of `today`.
    pub async fn dispatch(&mut self, command: Command, today: NaiveDate) -> String {
        match self.execute(command, today).await {
            Ok(reply) => reply,
            Err(e) => error_reply(&e),
        }
    }

    async fn execute(&mut self, command: Command, today: NaiveDate) -> Result<String> {
        let current = Partition::from_date(today);
        match command {
            Command::Total => {
                let records = self.store.list_records(current).await?;
                let total = summary::grand_total(&records)?;
                Ok(format!("💰 Total spent in {current}: {total}"))
            }

            Command::SheetLink => Ok(format!("📄 Ledger: {}", self.store.url())),

            Command::DeleteLast => {
                let removed = self.store.delete_last(current).await?;
                Ok(format!("🗑️ Deleted: {}", describe(&removed)))
            }

            Command::DeleteByIndex(index) => {
                let removed = self.store.delete_row(current, index).await?;
                Ok(format!("🗑️ Deleted #{index}: {}", describe(&removed)))
            }

            Command::CategorySummary {
                partition,
                explicit,
            } => {
                let records = if explicit {
                    match self.store.list_existing(partition).await {
                        Err(e) if e.error_type() == ErrorType::NotFound => {
                            return Ok(no_data(partition))
                        }
                        other => other?,
                    }
                } else {
                    self.store.list_records(partition).await?
                };
                category_summary(partition, &records)
            }

            Command::SaveExpense {
                description,
                amount,
                category,
            } => {
                let record = ExpenseRecord::new(today, description, amount, category);
                self.store.append(current, &record).await?;
                Ok(format!("✔️ Saved: {}", describe(&record)))
            }

            Command::Help => Ok(HELP.to_string()),

            Command::Malformed(reason) => Err(Error::msg(ErrorType::MalformedInput, reason)),
        }
    }
}

fn describe(record: &ExpenseRecord) -> String {
    format!(
        "{} {} ({})",
        record.description(),
        record.amount(),
        display_category(record.category())
    )
}

fn no_data(partition: Partition) -> String {
    format!("No data for {partition}.")
}

fn category_summary(partition: Partition, records: &[ExpenseRecord]) -> Result<String> {
    let summary = summary::summarize(records)?;
    if summary.is_empty() {
        return Ok(no_data(partition));
    }

    let mut reply = format!("📊 Category summary for {partition}:");
    for line in summary.iter() {
        let totals = line.totals();
        let _ = write!(
            reply,
            "\n• {}: {} ({} expense{}, avg {})",
            line.display(),
            totals.total(),
            totals.count(),
            if totals.count() == 1 { "" } else { "s" },
            totals.average()
        );
    }
    let total: Amount = summary.grand_total()?;
    let _ = write!(reply, "\n\nTotal: {total}");
    Ok(reply)
}

fn error_reply(e: &Error) -> String {
    match e.error_type() {
        ErrorType::MalformedInput => {
            format!("{e}\n\n{EXAMPLE}\n\nSend /help for all commands.")
        }
        ErrorType::NotFound => format!("{e}."),
        ErrorType::RowNotFound | ErrorType::EmptyPartition | ErrorType::AmountOverflow => {
            format!("⚠️ {e}.")
        }
        ErrorType::Backend | ErrorType::Config | ErrorType::Io => {
            error!("Unable to handle the message: {e:?}");
            "❌ Something went wrong while talking to the ledger. Please try again later."
                .to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestSheet;
    use crate::model::HEADER;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn dispatcher() -> (Dispatcher, TestSheet) {
        let sheet = TestSheet::new("expenses");
        let store = LedgerStore::new(Box::new(sheet.clone()));
        (Dispatcher::new(store), sheet)
    }

    async fn say(d: &mut Dispatcher, text: &str) -> String {
        d.handle(text, today()).await
    }

    #[tokio::test]
    async fn test_save_expense() {
        let (mut d, sheet) = dispatcher();
        let reply = say(&mut d, "comida 120").await;
        assert_eq!(reply, "✔️ Saved: comida $120.00 (General)");
        let rows = sheet.rows("October 2026").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["2026-10-19", "comida", "120", "general"]);
    }

    #[tokio::test]
    async fn test_malformed_has_no_side_effect() {
        let (mut d, sheet) = dispatcher();
        let reply = say(&mut d, "comida").await;
        assert!(reply.contains("comida 120"), "{reply}");
        let reply = say(&mut d, "/catsummary Frodo").await;
        assert!(reply.contains("'Frodo' is not a month name"), "{reply}");
        assert!(sheet.table_names().is_empty());
    }

    #[tokio::test]
    async fn test_total() {
        let (mut d, _sheet) = dispatcher();
        say(&mut d, "comida 120").await;
        say(&mut d, "cafe 2.5 food").await;
        assert_eq!(
            say(&mut d, "/total").await,
            "💰 Total spent in October 2026: $122.50"
        );
    }

    #[tokio::test]
    async fn test_total_on_new_month_is_zero() {
        let (mut d, sheet) = dispatcher();
        assert_eq!(
            say(&mut d, "/total").await,
            "💰 Total spent in October 2026: $0.00"
        );
        assert_eq!(
            sheet.rows("October 2026").unwrap(),
            vec![HEADER.iter().map(|s| s.to_string()).collect::<Vec<_>>()]
        );
    }

    #[tokio::test]
    async fn test_sheet_link() {
        let (mut d, _sheet) = dispatcher();
        assert_eq!(say(&mut d, "csv").await, "📄 Ledger: memory://expenses");
    }

    #[tokio::test]
    async fn test_category_summary() {
        let (mut d, _sheet) = dispatcher();
        say(&mut d, "pan 10 food").await;
        say(&mut d, "bus 5 transport").await;
        say(&mut d, "leche 20 Food").await;
        let reply = say(&mut d, "/catsummary").await;
        assert_eq!(
            reply,
            "📊 Category summary for October 2026:\n\
             • Food: $30.00 (2 expenses, avg $15.00)\n\
             • Transport: $5.00 (1 expense, avg $5.00)\n\
             \n\
             Total: $35.00"
        );
    }

    #[tokio::test]
    async fn test_category_summary_rounds_only_for_display() {
        let (mut d, sheet) = dispatcher();
        say(&mut d, "a 10 food").await;
        say(&mut d, "b 0 food").await;
        say(&mut d, "c 0 food").await;
        let reply = say(&mut d, "/catsummary").await;
        assert!(reply.contains("avg $3.33"), "{reply}");
        assert_eq!(sheet.rows("October 2026").unwrap()[1][2], "10");
    }

    #[tokio::test]
    async fn test_category_summary_empty_current_month() {
        let (mut d, _sheet) = dispatcher();
        assert_eq!(say(&mut d, "/catsummary").await, "No data for October 2026.");
    }

    #[tokio::test]
    async fn test_category_summary_missing_named_month() {
        let (mut d, sheet) = dispatcher();
        let reply = say(&mut d, "/catsummary November 2025").await;
        assert_eq!(reply, "No data for November 2025.");
        assert!(sheet.table_names().is_empty());
    }

    #[tokio::test]
    async fn test_category_summary_named_month() {
        let (mut d, _sheet) = dispatcher();
        let november = NaiveDate::from_ymd_opt(2025, 11, 2).unwrap();
        d.handle("pan 4 food", november).await;
        let reply = say(&mut d, "/catsummary november 2025").await;
        assert!(reply.starts_with("📊 Category summary for November 2025:"), "{reply}");
        assert!(reply.contains("• Food: $4.00 (1 expense, avg $4.00)"), "{reply}");
    }

    #[tokio::test]
    async fn test_delete_last() {
        let (mut d, sheet) = dispatcher();
        say(&mut d, "pan 10 food").await;
        say(&mut d, "bus 5").await;
        assert_eq!(
            say(&mut d, "/delete").await,
            "🗑️ Deleted: bus $5.00 (General)"
        );
        assert_eq!(sheet.rows("October 2026").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_last_empty() {
        let (mut d, _sheet) = dispatcher();
        assert_eq!(
            say(&mut d, "/delete").await,
            "⚠️ There is nothing to delete in October 2026."
        );
    }

    #[tokio::test]
    async fn test_delete_by_index() {
        let (mut d, sheet) = dispatcher();
        say(&mut d, "pan 10 food").await;
        say(&mut d, "bus 5").await;
        assert_eq!(
            say(&mut d, "/delete 1").await,
            "🗑️ Deleted #1: pan $10.00 (Food)"
        );
        let rows = sheet.rows("October 2026").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "bus");

        assert_eq!(
            say(&mut d, "/delete 5").await,
            "⚠️ Row 5 does not exist in October 2026, which has 1 row."
        );
    }

    #[tokio::test]
    async fn test_help() {
        let (mut d, _sheet) = dispatcher();
        assert!(say(&mut d, "/help").await.contains("/catsummary"));
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_generic_reply() {
        let (mut d, sheet) = dispatcher();
        sheet.set_offline(true);
        let reply = say(&mut d, "comida 120").await;
        assert!(reply.starts_with("❌ Something went wrong"), "{reply}");
        sheet.set_offline(false);
        assert_eq!(say(&mut d, "/total").await, "💰 Total spent in October 2026: $0.00");
    }

    #[tokio::test]
    async fn test_malformed_reply_names_the_reason() {
        let (mut d, _sheet) = dispatcher();
        let reply = d
            .dispatch(Command::Malformed(crate::chat::Malformed::Empty), today())
            .await;
        assert!(reply.starts_with("The message is empty.\n\nInvalid format."), "{reply}");
        assert!(reply.ends_with("Send /help for all commands."), "{reply}");
    }

    #[tokio::test]
    async fn test_totals_too_large_become_a_reply() {
        let (mut d, sheet) = dispatcher();
        let max = "79228162514264337593543950335";
        assert_eq!(
            say(&mut d, &format!("a {max}")).await,
            "✔️ Saved: a $79,228,162,514,264,337,593,543,950,335.00 (General)"
        );
        say(&mut d, &format!("b {max}")).await;

        assert_eq!(
            say(&mut d, "/total").await,
            "⚠️ The amounts are too large to add up."
        );
        assert_eq!(
            say(&mut d, "/catsummary").await,
            "⚠️ The amounts in 'General' are too large to add up."
        );
        assert_eq!(sheet.rows("October 2026").unwrap().len(), 3);

        say(&mut d, "/delete").await;
        assert_eq!(
            say(&mut d, "/total").await,
            "💰 Total spent in October 2026: $79,228,162,514,264,337,593,543,950,335.00"
        );
    }

    #[tokio::test]
    async fn test_stored_amounts_too_large_become_a_reply() {
        let (mut d, sheet) = dispatcher();
        let row = |cells: &[&str]| cells.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        sheet.put(
            "October 2026",
            vec![
                row(&HEADER),
                row(&["2026-10-01", "a", "$79,228,162,514,264,337,593,543,950,335", "rent"]),
                row(&["2026-10-02", "b", "79228162514264337593543950335", "food"]),
            ],
        );
        let reply = say(&mut d, "/catsummary October 2026").await;
        assert_eq!(reply, "⚠️ The amounts are too large to add up.");
    }
}
