//! Savings statistics over the reliable, closed months

use serde::{Deserialize, Serialize};

use crate::ledger::{MonthlySeries, MONTHS};

/// Mean and spread of monthly net savings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SavingsStats {
    pub average: f64,

    /// Population standard deviation
    pub std_dev: f64,

    /// Number of months in the population
    pub months: usize,
}

impl SavingsStats {
    /// Statistics over months `m` with `start_month <= m < current_month`
    ///
    /// The current month is always left out: it is incomplete. An empty
    /// population yields zeros.
    pub fn compute(net_savings: &MonthlySeries, start_month: usize, current_month: usize) -> Self {
        let values: Vec<f64> = reliable_months(start_month, current_month)
            .map(|m| net_savings.get(m))
            .collect();

        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let average = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - average).powi(2)).sum::<f64>() / n;

        Self {
            average,
            std_dev: variance.sqrt(),
            months: values.len(),
        }
    }
}

/// Month indices usable for statistics
pub fn reliable_months(start_month: usize, current_month: usize) -> impl Iterator<Item = usize> {
    start_month..current_month.min(MONTHS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stats_exclude_current_and_unrecorded() {
        let net = MonthlySeries::from([999.0, 100.0, 200.0, 300.0, 5_000.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let stats = SavingsStats::compute(&net, 1, 4);

        assert_eq!(stats.months, 3);
        assert_relative_eq!(stats.average, 200.0, epsilon = 1e-12);
        // population variance: (100^2 + 0 + 100^2) / 3
        assert_relative_eq!(stats.std_dev, (20_000.0_f64 / 3.0).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_no_reliable_months() {
        let net = MonthlySeries::from([100.0; 12]);
        assert_eq!(SavingsStats::compute(&net, 12, 11), SavingsStats::default());
        assert_eq!(SavingsStats::compute(&net, 0, 0), SavingsStats::default());
        assert_eq!(SavingsStats::compute(&net, 5, 5), SavingsStats::default());
    }

    #[test]
    fn test_reliable_month_range() {
        assert_eq!(reliable_months(2, 5).collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(reliable_months(7, 3).count(), 0);
    }
}
