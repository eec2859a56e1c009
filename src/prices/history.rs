//! Per-product price history built from ledger transactions

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::legacy;
use crate::ledger::{LedgerEntry, Product, Transaction};
use crate::valuation::present_value;

/// One purchase of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,

    /// Month the purchase is recorded under
    pub month_index: usize,

    /// Unit price paid (nominal)
    pub unit_price: f64,

    /// Unit price brought to the current month
    pub real_price: f64,

    pub quantity: Option<f64>,
    pub description: String,

    /// Price came from the description text rather than a stored field
    pub from_description: bool,
}

/// Whether a transaction belongs to `product`: explicit link first, then a
/// case-insensitive name match on the description
pub fn transaction_matches(transaction: &Transaction, product: &Product) -> bool {
    if transaction.product_id.as_deref() == Some(product.id.as_str()) {
        return true;
    }
    let name = product.name.trim().to_lowercase();
    !name.is_empty() && transaction.description.to_lowercase().contains(&name)
}

/// Unit price of a purchase: stored field, else the legacy description suffix
pub fn resolve_unit_price(transaction: &Transaction) -> Option<(f64, bool)> {
    match transaction.unit_price.filter(|p| p.is_finite()) {
        Some(price) => Some((price, false)),
        None => legacy::parse_unit_price(&transaction.description).map(|p| (p, true)),
    }
}

/// Reads price histories out of ledger entries
#[derive(Debug, Clone, Copy)]
pub struct PriceHistoryAnalyzer<'a> {
    entries: &'a [LedgerEntry],
    rates: &'a [f64],
    current_month: usize,
}

impl<'a> PriceHistoryAnalyzer<'a> {
    pub fn new(entries: &'a [LedgerEntry], rates: &'a [f64], current_month: usize) -> Self {
        Self {
            entries,
            rates,
            current_month,
        }
    }

    /// Price points of `product`, oldest first
    pub fn history(&self, product: &Product) -> Vec<PricePoint> {
        let mut points = Vec::new();

        for entry in self.entries {
            for (&month, transactions) in &entry.transactions {
                for transaction in transactions.iter().filter(|t| transaction_matches(t, product)) {
                    let Some((unit_price, from_description)) = resolve_unit_price(transaction) else {
                        warn!(
                            "Skipping '{}' in '{}': no unit price recorded or parseable",
                            transaction.description, entry.name
                        );
                        continue;
                    };

                    points.push(PricePoint {
                        timestamp: transaction.timestamp,
                        month_index: month,
                        unit_price,
                        real_price: present_value(unit_price, month, self.current_month, self.rates),
                        quantity: transaction.quantity,
                        description: transaction.description.clone(),
                        from_description,
                    });
                }
            }
        }

        points.sort_by_key(|p| p.timestamp);
        debug!("{} price point(s) for product '{}'", points.len(), product.name);
        points
    }
}
