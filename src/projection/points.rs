//! Projection output structures

use serde::{Deserialize, Serialize};

use super::stats::SavingsStats;

/// Uncertainty band around a projected balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorBand {
    pub low: f64,
    pub high: f64,
}

impl ErrorBand {
    pub fn around(center: f64, margin: f64) -> Self {
        Self {
            low: center - margin,
            high: center + margin,
        }
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// One month of the balance trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// 0 = January .. 11 = December
    pub month_index: usize,

    /// Recorded balance (closed and current months)
    pub actual: Option<f64>,

    /// Trend balance (current and future months)
    pub projected: Option<f64>,

    pub real_actual: Option<f64>,
    pub real_projected: Option<f64>,

    /// Present for current and future months only
    pub error_band: Option<ErrorBand>,

    /// Month precedes the configured start month
    pub is_unrecorded: bool,
}

impl ProjectionPoint {
    pub fn new(month_index: usize, is_unrecorded: bool) -> Self {
        Self {
            month_index,
            actual: None,
            projected: None,
            real_actual: None,
            real_projected: None,
            error_band: None,
            is_unrecorded,
        }
    }

    /// Projected balance if any, else the actual one
    pub fn balance(&self) -> Option<f64> {
        self.projected.or(self.actual)
    }

    pub fn real_balance(&self) -> Option<f64> {
        self.real_projected.or(self.real_actual)
    }
}

/// Complete 12-month projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub opening_balance: f64,
    pub current_month: usize,
    pub is_current_year: bool,
    pub stats: SavingsStats,
    pub points: Vec<ProjectionPoint>,
}

impl ProjectionResult {
    pub fn new(opening_balance: f64, current_month: usize, is_current_year: bool, stats: SavingsStats) -> Self {
        Self {
            opening_balance,
            current_month,
            is_current_year,
            stats,
            points: Vec::with_capacity(crate::ledger::MONTHS),
        }
    }

    pub fn add_point(&mut self, point: ProjectionPoint) {
        self.points.push(point);
    }

    /// Balance at the end of the last closed month, or the opening balance
    pub fn closed_balance(&self) -> f64 {
        self.points
            .iter()
            .filter(|p| p.projected.is_none())
            .filter_map(|p| p.actual)
            .last()
            .unwrap_or(self.opening_balance)
    }

    /// Summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let last = self.points.last();
        ProjectionSummary {
            year_end_nominal: last.and_then(ProjectionPoint::balance).unwrap_or(self.opening_balance),
            year_end_real: last.and_then(ProjectionPoint::real_balance).unwrap_or(self.opening_balance),
            closed_balance: self.closed_balance(),
            avg_savings: self.stats.average,
            std_dev: self.stats.std_dev,
            year_end_band: last.and_then(|p| p.error_band),
        }
    }
}

/// Summary of a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub year_end_nominal: f64,
    pub year_end_real: f64,
    pub closed_balance: f64,
    pub avg_savings: f64,
    pub std_dev: f64,
    pub year_end_band: Option<ErrorBand>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_around() {
        let band = ErrorBand::around(1_000.0, 50.0);
        assert_eq!(band.low, 950.0);
        assert_eq!(band.high, 1_050.0);
        assert_eq!(band.width(), 100.0);
    }

    #[test]
    fn test_closed_balance_defaults_to_opening() {
        let result = ProjectionResult::new(750.0, 0, true, SavingsStats::default());
        assert_eq!(result.closed_balance(), 750.0);
        assert_eq!(result.summary().year_end_nominal, 750.0);
    }
}
