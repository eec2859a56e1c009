//! Merge parsed line items into ledger entries

use chrono::{DateTime, Utc};
use log::debug;

use super::ParsedLineItem;
use crate::error::{check_month, Result};
use crate::ledger::{LedgerEntry, Transaction};

/// Merge `items` into a copy of `entries`.
///
/// Each item goes to the entry with the same name (case-insensitive), or to
/// a new entry in the item's category. Itemized months receive the item as
/// a transaction so their breakdown still adds up.
pub fn merge_parsed_items(
    entries: &[LedgerEntry],
    items: &[ParsedLineItem],
    default_month: usize,
    now: DateTime<Utc>,
) -> Result<Vec<LedgerEntry>> {
    let default_month = check_month(default_month)?;
    let mut merged = entries.to_vec();

    for (idx, item) in items.iter().enumerate() {
        let month = check_month(item.month_index.unwrap_or(default_month))?;
        let key = item.name.to_lowercase();

        let position = merged.iter().position(|e| e.name.to_lowercase() == key);
        let entry = match position {
            Some(pos) => &mut merged[pos],
            None => {
                debug!("Creating entry '{}' in '{}'", item.name, item.category);
                merged.push(LedgerEntry::new(
                    format!("import-{}-{}", now.timestamp_millis(), idx),
                    item.category.clone(),
                    item.name.clone(),
                ));
                let last = merged.len() - 1;
                &mut merged[last]
            }
        };

        if entry.is_itemized(month) {
            entry.add_transaction(month, Transaction::new(item.name.clone(), item.amount, now))?;
        } else {
            let total = entry.amount(month) + item.amount;
            entry.set_amount(month, total)?;
        }
    }

    Ok(merged)
}
