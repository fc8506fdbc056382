use crate::chat::{Command, Malformed};
use crate::model::{Amount, Partition, DEFAULT_CATEGORY};
use chrono::{Datelike, Month, NaiveDate};
use std::str::FromStr;

const TOTAL: &str = "/total";
const SHEET_LINK: &str = "csv";
const DELETE: &str = "/delete";
const CATEGORY_SUMMARY: &str = "/catsummary";
const HELP: &str = "/help";
const START: &str = "/start";

/// Parses a chat message. `today` supplies the default month and year for `/catsummary`.
pub fn parse(text: &str, today: NaiveDate) -> Command {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let Some((&first, args)) = tokens.split_first() else {
        return Command::Malformed(Malformed::Empty);
    };

    if first.starts_with('/') {
        return parse_slash(first, args, today);
    }
    if args.is_empty() && first.eq_ignore_ascii_case(SHEET_LINK) {
        return Command::SheetLink;
    }
    parse_expense(first, args)
}

fn parse_slash(command: &str, args: &[&str], today: NaiveDate) -> Command {
    let is = |name: &str| command.eq_ignore_ascii_case(name);
    if is(TOTAL) {
        Command::Total
    } else if is(DELETE) {
        parse_delete(args)
    } else if is(CATEGORY_SUMMARY) {
        parse_category_summary(args, today)
    } else if is(HELP) || is(START) {
        Command::Help
    } else {
        Command::Malformed(Malformed::UnknownCommand(command.to_string()))
    }
}

fn parse_delete(args: &[&str]) -> Command {
    match args.first() {
        None => Command::DeleteLast,
        Some(&arg) => match arg.parse::<usize>() {
            Ok(index) if index > 0 && arg.chars().all(|c| c.is_ascii_digit()) => {
                Command::DeleteByIndex(index)
            }
            _ => Command::Malformed(Malformed::InvalidIndex(arg.to_string())),
        },
    }
}

fn parse_category_summary(args: &[&str], today: NaiveDate) -> Command {
    let current = Partition::from_date(today);
    let Some(&month_arg) = args.first() else {
        return Command::CategorySummary {
            partition: current,
            explicit: false,
        };
    };

    let month = match Month::from_str(month_arg) {
        Ok(month) => month,
        Err(_) => return Command::Malformed(Malformed::UnknownMonth(month_arg.to_string())),
    };

    // A year that is not all digits is ignored in favor of the current year.
    let year = args
        .get(1)
        .filter(|y| !y.is_empty() && y.chars().all(|c| c.is_ascii_digit()))
        .and_then(|y| y.parse::<i32>().ok())
        .unwrap_or_else(|| today.year());

    Command::CategorySummary {
        partition: Partition::new(month, year),
        explicit: true,
    }
}

fn parse_expense(description: &str, args: &[&str]) -> Command {
    let (amount, category) = match args {
        [] => return Command::Malformed(Malformed::MissingAmount),
        [amount] => (*amount, DEFAULT_CATEGORY),
        [amount, category] => (*amount, *category),
        _ => return Command::Malformed(Malformed::TooManyTokens),
    };

    match Amount::parse_input(amount) {
        Ok(amount) => Command::SaveExpense {
            description: description.to_string(),
            amount,
            category: category.to_string(),
        },
        Err(_) => Command::Malformed(Malformed::InvalidAmount(amount.to_string())),
    }
}
