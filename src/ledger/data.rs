//! Ledger records: monthly series, expense/income rows, line items and products

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{check_month, BudgetError, Result};

/// Number of months in every series
pub const MONTHS: usize = 12;

/// Tolerance used when checking that line items add up to a month total
const BREAKDOWN_TOLERANCE: f64 = 1e-6;

/// Twelve monthly amounts, index 0 = January .. 11 = December
///
/// Missing months are explicit zeros; the fixed array keeps the length at 12.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlySeries(pub [f64; MONTHS]);

impl MonthlySeries {
    pub fn zeros() -> Self {
        Self([0.0; MONTHS])
    }

    /// Build a series by evaluating `f` for each month index
    pub fn from_fn(f: impl FnMut(usize) -> f64) -> Self {
        Self(std::array::from_fn(f))
    }

    /// Amount for a month; non-finite or out-of-range reads as 0
    pub fn get(&self, month: usize) -> f64 {
        self.0
            .get(month)
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    pub fn values(&self) -> &[f64; MONTHS] {
        &self.0
    }

    pub fn total(&self) -> f64 {
        (0..MONTHS).map(|m| self.get(m)).sum()
    }

    /// Element-wise sum of many series
    pub fn sum_of<'a, I>(series: I) -> Self
    where
        I: IntoIterator<Item = &'a MonthlySeries>,
    {
        series.into_iter().fold(Self::zeros(), |acc, s| acc.plus(s))
    }

    pub fn plus(&self, other: &MonthlySeries) -> Self {
        Self::from_fn(|m| self.get(m) + other.get(m))
    }

    pub fn minus(&self, other: &MonthlySeries) -> Self {
        Self::from_fn(|m| self.get(m) - other.get(m))
    }
}

impl From<[f64; MONTHS]> for MonthlySeries {
    fn from(values: [f64; MONTHS]) -> Self {
        Self(values)
    }
}

/// A single purchase or line item inside a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub description: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,

    /// Catalog product this purchase belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
}

impl Transaction {
    pub fn new(description: impl Into<String>, amount: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            description: description.into(),
            amount,
            timestamp,
            product_id: None,
            unit_price: None,
            quantity: None,
        }
    }

    /// Purchase of `quantity` units of a catalog product; amount is price times quantity
    pub fn purchase(
        product: &Product,
        unit_price: f64,
        quantity: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            description: format!("{} ({} x ${})", product.name, quantity, unit_price),
            amount: unit_price * quantity,
            timestamp,
            product_id: Some(product.id.clone()),
            unit_price: Some(unit_price),
            quantity: Some(quantity),
        }
    }
}

/// An expense or income row of the yearly spreadsheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub category: String,
    pub name: String,
    pub amounts: MonthlySeries,

    /// Optional line-item breakdown keyed by month index.
    /// When a month has items, they sum to that month's amount.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub transactions: BTreeMap<usize, Vec<Transaction>>,
}

impl LedgerEntry {
    pub fn new(id: impl Into<String>, category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            name: name.into(),
            amounts: MonthlySeries::zeros(),
            transactions: BTreeMap::new(),
        }
    }

    pub fn with_amounts(mut self, amounts: impl Into<MonthlySeries>) -> Self {
        self.amounts = amounts.into();
        self
    }

    pub fn amount(&self, month: usize) -> f64 {
        self.amounts.get(month)
    }

    pub fn transactions_for(&self, month: usize) -> &[Transaction] {
        self.transactions.get(&month).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the month total is driven by a line-item breakdown
    pub fn is_itemized(&self, month: usize) -> bool {
        !self.transactions_for(month).is_empty()
    }

    /// Overwrite a month total. Refused for itemized months.
    pub fn set_amount(&mut self, month: usize, amount: f64) -> Result<()> {
        let month = check_month(month)?;
        if self.is_itemized(month) {
            return Err(BudgetError::ItemizedMonth {
                entry: self.name.clone(),
                month,
            });
        }
        self.amounts.0[month] = amount;
        Ok(())
    }

    /// Append a line item.
    ///
    /// A month that already holds a plain (non-itemized) amount keeps it as
    /// its first line item so the total stays consistent.
    pub fn add_transaction(&mut self, month: usize, transaction: Transaction) -> Result<()> {
        let month = check_month(month)?;
        let existing = self.amount(month);
        let items = self.transactions.entry(month).or_default();
        if items.is_empty() && existing != 0.0 {
            items.push(Transaction::new("Saldo anterior", existing, transaction.timestamp));
        }
        items.push(transaction);
        self.recompute_month(month);
        Ok(())
    }

    /// Remove the line item at `index`, returning it
    pub fn remove_transaction(&mut self, month: usize, index: usize) -> Result<Transaction> {
        let month = check_month(month)?;
        let removed = match self.transactions.get_mut(&month) {
            Some(items) if index < items.len() => items.remove(index),
            _ => {
                return Err(BudgetError::NotFound(format!(
                    "transaction {} in month {} of '{}'",
                    index, month, self.name
                )))
            }
        };
        if self.transactions.get(&month).map_or(false, Vec::is_empty) {
            self.transactions.remove(&month);
        }
        self.recompute_month(month);
        Ok(removed)
    }

    /// Replace the whole breakdown of a month
    pub fn set_transactions(&mut self, month: usize, transactions: Vec<Transaction>) -> Result<()> {
        let month = check_month(month)?;
        if transactions.is_empty() {
            self.transactions.remove(&month);
            self.amounts.0[month] = 0.0;
        } else {
            self.transactions.insert(month, transactions);
            self.recompute_month(month);
        }
        Ok(())
    }

    fn recompute_month(&mut self, month: usize) {
        self.amounts.0[month] = self.transactions_for(month).iter().map(|t| t.amount).sum();
    }

    /// Check that every itemized month sums to its total
    pub fn breakdown_consistent(&self) -> bool {
        self.transactions.iter().all(|(&month, items)| {
            let total: f64 = items.iter().map(|t| t.amount).sum();
            (total - self.amount(month)).abs() < BREAKDOWN_TOLERANCE
        })
    }
}

/// Catalog product with its reference unit price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,

    /// Reference (default) unit price
    pub unit_price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit_price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            image: None,
            tag_id: None,
        }
    }

    /// Create a product from a search term that matched nothing in the catalog
    pub fn quick_create(term: &str, unit_price: f64, now: DateTime<Utc>) -> Self {
        let name = term.trim();
        let slug: String = name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect();
        Self::new(format!("{}-{}", slug, now.timestamp_millis()), name, unit_price)
    }

    /// Update the reference price from a purchase.
    ///
    /// Back-dated purchases never move the reference price; only purchases
    /// dated today or later do. Returns whether the price changed.
    pub fn apply_purchase_price(&mut self, unit_price: f64, purchase_date: NaiveDate, today: NaiveDate) -> bool {
        if purchase_date < today || !unit_price.is_finite() || unit_price == self.unit_price {
            return false;
        }
        self.unit_price = unit_price;
        true
    }
}

/// Per-year configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearConfig {
    pub year: i32,

    /// First month (0-11) with trustworthy data
    pub start_month_index: usize,
}

impl YearConfig {
    /// Start month configured for `year`, or January when none is set
    pub fn start_month_for(configs: &[YearConfig], year: i32) -> usize {
        configs
            .iter()
            .find(|c| c.year == year)
            .map(|c| c.start_month_index.min(MONTHS))
            .unwrap_or(0)
    }
}

/// Everything the persistence collaborator holds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub expenses: Vec<LedgerEntry>,

    #[serde(default)]
    pub income: Vec<LedgerEntry>,

    #[serde(default)]
    pub opening_balance: f64,

    #[serde(default)]
    pub year_configs: Vec<YearConfig>,

    #[serde(default)]
    pub products: Vec<Product>,
}

impl LedgerSnapshot {
    /// Income minus expenses for every month
    pub fn net_savings(&self) -> MonthlySeries {
        net_savings(&self.income, &self.expenses)
    }
}

/// Income minus expenses for every month
pub fn net_savings(income: &[LedgerEntry], expenses: &[LedgerEntry]) -> MonthlySeries {
    let income_total = MonthlySeries::sum_of(income.iter().map(|e| &e.amounts));
    let expense_total = MonthlySeries::sum_of(expenses.iter().map(|e| &e.amounts));
    income_total.minus(&expense_total)
}

/// Copy of `entries` with every month before `start_month` zeroed and its
/// breakdown dropped
pub fn cleanup_before_start(entries: &[LedgerEntry], start_month: usize) -> Vec<LedgerEntry> {
    let start = start_month.min(MONTHS);
    entries
        .iter()
        .map(|entry| {
            let mut cleaned = entry.clone();
            for month in 0..start {
                cleaned.amounts.0[month] = 0.0;
                cleaned.transactions.remove(&month);
            }
            cleaned
        })
        .collect()
}
