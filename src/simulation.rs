//! Long-range wealth simulation
//!
//! Extends the average-savings model past the current year, optionally
//! compounding an investment return on both the current wealth and the
//! monthly contributions.

use std::cmp::Ordering;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::inflation::{average_published, FALLBACK_MONTHLY_INFLATION};
use crate::ledger::MONTHS;

/// Calendar month (0-based month index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: usize,
}

impl YearMonth {
    pub fn new(year: i32, month: usize) -> Self {
        Self { year, month }
    }

    /// Signed number of months from `self` to `other`
    pub fn months_until(&self, other: &YearMonth) -> i64 {
        (other.year as i64 - self.year as i64) * MONTHS as i64 + (other.month as i64 - self.month as i64)
    }
}

impl PartialOrd for YearMonth {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for YearMonth {
    fn cmp(&self, other: &Self) -> Ordering {
        self.year.cmp(&other.year).then(self.month.cmp(&other.month))
    }
}

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Annual investment return in percent; `None` or <= 0 disables investing
    pub annual_return_pct: Option<f64>,

    /// Monthly inflation assumed when no rates are loaded
    pub fallback_monthly_inflation: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            annual_return_pct: None,
            fallback_monthly_inflation: FALLBACK_MONTHLY_INFLATION,
        }
    }
}

/// Inputs of one simulation
#[derive(Debug, Clone, Copy)]
pub struct SimulationInput {
    pub current: YearMonth,
    pub target: YearMonth,

    /// Liquid wealth today
    pub current_wealth: f64,

    pub avg_savings: f64,
}

/// Outcome when savings are invested
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvestmentOutcome {
    /// Effective monthly rate (decimal)
    pub monthly_rate: f64,
    pub total: f64,
    pub real_total: f64,

    /// Invested total minus the uninvested nominal total
    pub profit: f64,
}

/// Result of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Horizon in months (0 when the target is not in the future)
    pub months: u32,

    /// Uninvested wealth, nominal
    pub nominal: f64,

    /// Uninvested wealth in today's money
    pub real: f64,

    /// Monthly inflation used for discounting (percent)
    pub avg_monthly_inflation: f64,

    pub investment: Option<InvestmentOutcome>,
}

/// Compound growth helpers
pub struct Compounding;

impl Compounding {
    /// Effective monthly rate (decimal) equivalent to an annual percent rate
    pub fn monthly_from_annual(annual_pct: f64) -> f64 {
        (1.0 + annual_pct / 100.0).powf(1.0 / 12.0) - 1.0
    }

    /// Lump sum grown for `months`
    pub fn future_value_lump(amount: f64, monthly_rate: f64, months: u32) -> f64 {
        amount * (1.0 + monthly_rate).powf(f64::from(months))
    }

    /// Future value of an ordinary annuity of `payment` per month
    pub fn future_value_annuity(payment: f64, monthly_rate: f64, months: u32) -> f64 {
        if monthly_rate.abs() < 1e-12 {
            return payment * months as f64;
        }
        payment * ((1.0 + monthly_rate).powf(f64::from(months)) - 1.0) / monthly_rate
    }
}

/// Future wealth simulator
#[derive(Debug, Clone, Default)]
pub struct FutureSimulator {
    config: SimulationConfig,
}

impl FutureSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Simulate up to `input.target`. `rates` are the loaded monthly
    /// inflation percentages; none loaded means the fallback rate.
    pub fn simulate(&self, input: &SimulationInput, rates: &[f64]) -> SimulationResult {
        let avg_monthly_inflation =
            average_published(rates).unwrap_or(self.config.fallback_monthly_inflation);

        if input.target <= input.current {
            return SimulationResult {
                months: 0,
                nominal: input.current_wealth,
                real: input.current_wealth,
                avg_monthly_inflation,
                investment: None,
            };
        }

        let months = u32::try_from(input.current.months_until(&input.target)).unwrap_or_else(|_| {
            warn!("Simulation horizon to {:?} too long; capping at {} months", input.target, u32::MAX);
            u32::MAX
        });
        let discount = (1.0 + avg_monthly_inflation / 100.0).powf(f64::from(months));
        let nominal = input.current_wealth + months as f64 * input.avg_savings;
        let real = nominal / discount;

        let investment = self
            .config
            .annual_return_pct
            .filter(|rate| *rate > 0.0)
            .map(|annual| {
                let monthly_rate = Compounding::monthly_from_annual(annual);
                let total = Compounding::future_value_lump(input.current_wealth, monthly_rate, months)
                    + Compounding::future_value_annuity(input.avg_savings, monthly_rate, months);
                InvestmentOutcome {
                    monthly_rate,
                    total,
                    real_total: total / discount,
                    profit: total - nominal,
                }
            });

        debug!(
            "Simulated {} month(s): nominal {:.2}, real {:.2}, invested {:?}",
            months,
            nominal,
            real,
            investment.map(|i| i.total)
        );

        SimulationResult {
            months,
            nominal,
            real,
            avg_monthly_inflation,
            investment,
        }
    }
}
