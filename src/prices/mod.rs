//! Product price history and catalog price variation

mod history;
pub mod legacy;
mod variation;

pub use history::{resolve_unit_price, transaction_matches, PriceHistoryAnalyzer, PricePoint};
pub use variation::{PriceTrend, ProductVariation, VariationReport, VARIATION_THRESHOLD_PCT};
