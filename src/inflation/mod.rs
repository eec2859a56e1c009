//! Monthly inflation series and the collaborators that supply them

pub mod loader;

pub use loader::CsvInflationSource;

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{BudgetError, Result};
use crate::ledger::{MonthlySeries, MONTHS};

/// Monthly inflation (percent) assumed when no series has been loaded
pub const FALLBACK_MONTHLY_INFLATION: f64 = 0.5;

/// Twelve monthly inflation rates for one year, in percent (0.52 = 0.52%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InflationRates {
    pub year: i32,
    pub rates: MonthlySeries,
}

impl InflationRates {
    pub fn new(year: i32, rates: impl Into<MonthlySeries>) -> Self {
        Self {
            year,
            rates: rates.into(),
        }
    }

    /// All-zero series: projections become inflation-free
    pub fn zero(year: i32) -> Self {
        Self::new(year, MonthlySeries::zeros())
    }

    /// Rate for a month; missing or non-finite rates read as 0
    pub fn rate(&self, month: usize) -> f64 {
        self.rates.get(month)
    }

    pub fn as_slice(&self) -> &[f64] {
        self.rates.values()
    }

    /// Mean of the published (finite, non-zero) rates, if any
    pub fn average_monthly(&self) -> Option<f64> {
        average_published(self.as_slice())
    }
}

/// Mean of the finite, non-zero rates in `rates`
pub fn average_published(rates: &[f64]) -> Option<f64> {
    let published: Vec<f64> = rates
        .iter()
        .copied()
        .filter(|r| r.is_finite() && *r != 0.0)
        .collect();
    if published.is_empty() {
        None
    } else {
        Some(published.iter().sum::<f64>() / published.len() as f64)
    }
}

/// Supplier of monthly inflation for a year (network, cache, file, fixture)
pub trait InflationSource {
    fn monthly_inflation(&self, year: i32) -> Result<InflationRates>;

    /// Rates for `year`, degrading to an all-zero series when the source fails
    fn monthly_inflation_or_zero(&self, year: i32) -> InflationRates {
        self.monthly_inflation(year).unwrap_or_else(|e| {
            warn!("Inflation for {} unavailable ({}); projecting without inflation", year, e);
            InflationRates::zero(year)
        })
    }
}

impl<T: InflationSource + ?Sized> InflationSource for Box<T> {
    fn monthly_inflation(&self, year: i32) -> Result<InflationRates> {
        (**self).monthly_inflation(year)
    }
}

/// In-memory inflation source
#[derive(Debug, Clone, Default)]
pub struct FixedInflationSource {
    years: BTreeMap<i32, InflationRates>,
}

impl FixedInflationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32, rates: [f64; MONTHS]) -> Self {
        self.years.insert(year, InflationRates::new(year, rates));
        self
    }

    pub fn insert(&mut self, rates: InflationRates) {
        self.years.insert(rates.year, rates);
    }
}

impl InflationSource for FixedInflationSource {
    fn monthly_inflation(&self, year: i32) -> Result<InflationRates> {
        self.years
            .get(&year)
            .copied()
            .ok_or_else(|| BudgetError::NotFound(format!("inflation rates for {}", year)))
    }
}
