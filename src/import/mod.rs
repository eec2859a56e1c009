//! Free-text import: the AI parsing collaborator and merging its output
//! into ledger entries

mod merge;

pub use merge::merge_parsed_items;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{check_month, Result};

/// A candidate ledger row extracted from free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLineItem {
    pub name: String,
    pub category: String,
    pub amount: f64,

    /// Month the item belongs to; `None` means the caller's default month
    #[serde(default, alias = "monthIndex")]
    pub month_index: Option<usize>,
}

/// Turns raw text into candidate ledger rows
pub trait LineItemParser {
    fn parse(&self, text: &str, default_month: usize) -> Result<Vec<ParsedLineItem>>;
}

/// Parser backed by a text-completion call that answers in JSON
///
/// The closure receives the raw text and default month and returns the
/// model's reply; the reply is decoded with [`decode_reply`].
pub struct CompletionParser<F> {
    complete: F,
}

impl<F> CompletionParser<F>
where
    F: Fn(&str, usize) -> Result<String>,
{
    pub fn new(complete: F) -> Self {
        Self { complete }
    }
}

impl<F> LineItemParser for CompletionParser<F>
where
    F: Fn(&str, usize) -> Result<String>,
{
    fn parse(&self, text: &str, default_month: usize) -> Result<Vec<ParsedLineItem>> {
        check_month(default_month)?;
        let reply = (self.complete)(text, default_month)?;
        decode_reply(&reply)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Reply {
    Items(Vec<ParsedLineItem>),
    Wrapped { items: Vec<ParsedLineItem> },
}

/// Decode a JSON reply: either an array of items or `{"items": [...]}`,
/// optionally inside a Markdown code fence.
///
/// Items without a name, with a non-positive amount or with a month index
/// outside 0-11 are dropped.
pub fn decode_reply(reply: &str) -> Result<Vec<ParsedLineItem>> {
    let body = strip_code_fence(reply);
    let items = match serde_json::from_str::<Reply>(body)? {
        Reply::Items(items) | Reply::Wrapped { items } => items,
    };

    let mut accepted = Vec::with_capacity(items.len());
    for mut item in items {
        item.name = item.name.trim().to_string();
        item.category = item.category.trim().to_string();
        if item.name.is_empty() {
            warn!("Dropping imported item without a name");
            continue;
        }
        if !item.amount.is_finite() || item.amount <= 0.0 {
            warn!("Dropping imported item '{}' with amount {}", item.name, item.amount);
            continue;
        }
        if let Some(month) = item.month_index.filter(|m| check_month(*m).is_err()) {
            warn!("Dropping imported item '{}' with month index {}", item.name, month);
            continue;
        }
        accepted.push(item);
    }

    Ok(accepted)
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the language tag line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BudgetError;

    #[test]
    fn test_decode_plain_array() {
        let reply = r#"[{"name": "Nafta", "category": "Transporte", "amount": 1800, "monthIndex": 2},
                        {"name": "Feria", "category": "Alimentación", "amount": 650.5, "monthIndex": null}]"#;
        let items = decode_reply(reply).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].month_index, Some(2));
        assert_eq!(items[1].month_index, None);
    }

    #[test]
    fn test_decode_fenced_wrapped() {
        let reply = "```json\n{\"items\": [{\"name\": \" Luz \", \"category\": \"Hogar\", \"amount\": 2100}]}\n```";
        let items = decode_reply(reply).unwrap();
        assert_eq!(items[0].name, "Luz");
        assert_eq!(items[0].month_index, None);
    }

    #[test]
    fn test_decode_drops_unusable_items() {
        let reply = r#"[{"name": "", "category": "X", "amount": 10},
                        {"name": "Devolución", "category": "X", "amount": -50},
                        {"name": "Agua", "category": "Hogar", "amount": 900}]"#;
        let items = decode_reply(reply).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Agua");
    }

    #[test]
    fn test_decode_drops_bad_month_and_rejects_garbage() {
        let reply = r#"[{"name": "Gas", "category": "Hogar", "amount": 10, "monthIndex": 12},
                        {"name": "Agua", "category": "Hogar", "amount": 900, "monthIndex": 11}]"#;
        let items = decode_reply(reply).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Agua");
        assert!(matches!(decode_reply("no json here"), Err(BudgetError::Json(_))));
        assert!(decode_reply("[]").unwrap().is_empty());
    }

    #[test]
    fn test_completion_parser() {
        let parser = CompletionParser::new(|text: &str, month: usize| {
            Ok(format!(
                r#"[{{"name": "{}", "category": "Varios", "amount": 100, "monthIndex": {}}}]"#,
                text, month
            ))
        });
        let items = parser.parse("Regalo", 4).unwrap();
        assert_eq!(items[0].name, "Regalo");
        assert_eq!(items[0].month_index, Some(4));
        assert!(parser.parse("Regalo", 12).is_err());
    }
}
