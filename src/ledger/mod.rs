//! Ledger data structures and the persistence collaborator

mod data;
pub mod store;

pub use data::{
    cleanup_before_start, net_savings, LedgerEntry, LedgerSnapshot, MonthlySeries, Product,
    Transaction, YearConfig, MONTHS,
};
pub use store::{JsonLedgerStore, LedgerStore};
