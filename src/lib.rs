//! Household Budget - projection and price analysis engine for a monthly budget
//!
//! This library provides:
//! - Nominal/real value adjustment from monthly inflation
//! - 12-month balance projections that fork actual and projected paths at the current month
//! - Product price histories and catalog-wide real price variation
//! - Long-range wealth simulation with optional investment compounding
//! - Ledger records, persistence and free-text import collaborators

pub mod error;
pub mod ledger;
pub mod inflation;
pub mod valuation;
pub mod projection;
pub mod prices;
pub mod simulation;
pub mod dashboard;
pub mod import;

// Re-export commonly used types
pub use error::{BudgetError, Result};
pub use ledger::{LedgerEntry, LedgerSnapshot, MonthlySeries, Product, Transaction, YearConfig};
pub use inflation::{InflationRates, InflationSource, FALLBACK_MONTHLY_INFLATION};
pub use projection::{ProjectionEngine, ProjectionInput, ProjectionPoint, ProjectionResult};
pub use prices::{PriceHistoryAnalyzer, VariationReport};
pub use simulation::{FutureSimulator, SimulationResult, YearMonth};
pub use dashboard::{build_dashboard, Dashboard, DashboardRequest, DashboardRunner};
