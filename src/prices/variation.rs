//! Catalog-wide first-vs-last real price variation

use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::history::{PriceHistoryAnalyzer, PricePoint};
use crate::ledger::Product;

/// Variation (percent) beyond which a product counts as moving
pub const VARIATION_THRESHOLD_PCT: f64 = 1.0;

/// Direction of a product's real price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceTrend {
    /// Price went up: alert
    Increase,
    /// Price went down: buying opportunity
    Decrease,
    Stable,
}

impl PriceTrend {
    pub fn classify(variation_pct: f64) -> Self {
        if variation_pct > VARIATION_THRESHOLD_PCT {
            PriceTrend::Increase
        } else if variation_pct < -VARIATION_THRESHOLD_PCT {
            PriceTrend::Decrease
        } else {
            PriceTrend::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceTrend::Increase => "increase",
            PriceTrend::Decrease => "decrease",
            PriceTrend::Stable => "stable",
        }
    }
}

/// First-vs-last comparison for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariation {
    pub product_id: String,
    pub product_name: String,
    pub first_real_price: f64,
    pub last_real_price: f64,
    pub variation_pct: f64,
    pub trend: PriceTrend,
    pub points: usize,
}

impl ProductVariation {
    /// Compare first and last points of a history.
    ///
    /// `None` with fewer than two points, or when the first real price is
    /// zero (no meaningful percentage).
    pub fn from_history(product: &Product, history: &[PricePoint]) -> Option<Self> {
        if history.len() < 2 {
            return None;
        }
        let first = history.first()?.real_price;
        let last = history.last()?.real_price;
        if first == 0.0 || !first.is_finite() {
            warn!("Product '{}' has a zero first price; left out of the report", product.name);
            return None;
        }

        let variation_pct = (last - first) / first * 100.0;
        Some(Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            first_real_price: first,
            last_real_price: last,
            variation_pct,
            trend: PriceTrend::classify(variation_pct),
            points: history.len(),
        })
    }
}

/// Catalog analysis grouped by trend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariationReport {
    /// Largest increase first
    pub increases: Vec<ProductVariation>,

    /// Largest drop first
    pub decreases: Vec<ProductVariation>,

    pub stable: Vec<ProductVariation>,

    /// Ids of products with fewer than two comparable points
    pub insufficient_data: Vec<String>,
}

impl VariationReport {
    pub fn all(&self) -> impl Iterator<Item = &ProductVariation> {
        self.increases.iter().chain(&self.decreases).chain(&self.stable)
    }

    pub fn len(&self) -> usize {
        self.increases.len() + self.decreases.len() + self.stable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> PriceHistoryAnalyzer<'a> {
    /// Variation of a single product, if it has enough history
    pub fn variation(&self, product: &Product) -> Option<ProductVariation> {
        ProductVariation::from_history(product, &self.history(product))
    }

    /// Variation report over the whole catalog
    pub fn report(&self, products: &[Product]) -> VariationReport {
        let results: Vec<(String, Option<ProductVariation>)> = products
            .par_iter()
            .map(|product| (product.id.clone(), self.variation(product)))
            .collect();

        let mut report = VariationReport::default();
        for (id, variation) in results {
            match variation {
                Some(v) => match v.trend {
                    PriceTrend::Increase => report.increases.push(v),
                    PriceTrend::Decrease => report.decreases.push(v),
                    PriceTrend::Stable => report.stable.push(v),
                },
                None => report.insufficient_data.push(id),
            }
        }

        report
            .increases
            .sort_by(|a, b| b.variation_pct.total_cmp(&a.variation_pct));
        report
            .decreases
            .sort_by(|a, b| a.variation_pct.total_cmp(&b.variation_pct));
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LedgerEntry, Transaction};
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn buy(entry: &mut LedgerEntry, product: &Product, month: usize, price: f64) {
        let ts = Utc
            .with_ymd_and_hms(2024, month as u32 + 1, 10, 9, 0, 0)
            .unwrap();
        entry
            .add_transaction(month, Transaction::purchase(product, price, 1.0, ts))
            .unwrap();
    }

    fn point(real_price: f64, day: u32) -> PricePoint {
        PricePoint {
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            month_index: 0,
            unit_price: real_price,
            real_price,
            quantity: None,
            description: String::new(),
            from_description: false,
        }
    }

    #[test]
    fn test_ten_percent_increase() {
        let product = Product::new("p1", "Aceite", 100.0);
        let variation = ProductVariation::from_history(&product, &[point(100.0, 1), point(110.0, 2)]).unwrap();

        assert_relative_eq!(variation.variation_pct, 10.0, epsilon = 1e-9);
        assert_eq!(variation.trend, PriceTrend::Increase);
    }

    #[test]
    fn test_classification_threshold() {
        assert_eq!(PriceTrend::classify(1.0), PriceTrend::Stable);
        assert_eq!(PriceTrend::classify(-1.0), PriceTrend::Stable);
        assert_eq!(PriceTrend::classify(1.01), PriceTrend::Increase);
        assert_eq!(PriceTrend::classify(-3.0), PriceTrend::Decrease);
    }

    #[test]
    fn test_single_point_and_zero_price_excluded() {
        let product = Product::new("p1", "Aceite", 100.0);
        assert!(ProductVariation::from_history(&product, &[point(100.0, 1)]).is_none());
        assert!(ProductVariation::from_history(&product, &[]).is_none());
        assert!(ProductVariation::from_history(&product, &[point(0.0, 1), point(10.0, 2)]).is_none());
    }

    #[test]
    fn test_report_groups_and_orders() {
        let catalog = vec![
            Product::new("p1", "Aceite", 100.0),
            Product::new("p2", "Arroz", 50.0),
            Product::new("p3", "Café", 300.0),
            Product::new("p4", "Harina", 40.0),
            Product::new("p5", "Sal", 20.0),
            Product::new("p6", "Té", 90.0),
        ];
        let mut entry = LedgerEntry::new("e1", "Alimentación", "Supermercado");
        buy(&mut entry, &catalog[0], 0, 100.0);
        buy(&mut entry, &catalog[0], 3, 120.0); // +20%
        buy(&mut entry, &catalog[1], 0, 50.0);
        buy(&mut entry, &catalog[1], 2, 52.5); // +5%
        buy(&mut entry, &catalog[2], 1, 300.0);
        buy(&mut entry, &catalog[2], 4, 240.0); // -20%
        buy(&mut entry, &catalog[3], 0, 40.0);
        buy(&mut entry, &catalog[3], 5, 38.0); // -5%
        buy(&mut entry, &catalog[4], 0, 20.0);
        buy(&mut entry, &catalog[4], 1, 20.1); // +0.5%
        buy(&mut entry, &catalog[5], 2, 90.0); // single point

        let entries = vec![entry];
        let analyzer = PriceHistoryAnalyzer::new(&entries, &[0.0; 12], 6);
        let report = analyzer.report(&catalog);

        let ids = |list: &[ProductVariation]| list.iter().map(|v| v.product_id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&report.increases), vec!["p1", "p2"]);
        assert_eq!(ids(&report.decreases), vec!["p3", "p4"]);
        assert_eq!(ids(&report.stable), vec!["p5"]);
        assert_eq!(report.insufficient_data, vec!["p6".to_string()]);
        assert_eq!(report.len(), 5);
    }

    #[test]
    fn test_inflation_can_turn_nominal_rise_into_real_drop() {
        let product = Product::new("p1", "Aceite", 100.0);
        let mut entry = LedgerEntry::new("e1", "Alimentación", "Supermercado");
        buy(&mut entry, &product, 0, 100.0);
        buy(&mut entry, &product, 6, 102.0);

        let entries = vec![entry];
        let rates = [1.0; 12];
        let analyzer = PriceHistoryAnalyzer::new(&entries, &rates, 6);
        let variation = analyzer.variation(&product).unwrap();

        // January price compounds six months to ~106.15
        assert_eq!(variation.trend, PriceTrend::Decrease);
        assert!(variation.variation_pct < 0.0);
    }
}
