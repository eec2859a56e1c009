//! Balance projection engine: 12-month actual/projected trajectory with error band

use log::debug;

use super::points::{ErrorBand, ProjectionPoint, ProjectionResult};
use super::state::{MonthPhase, ProjectionState};
use super::stats::SavingsStats;
use crate::ledger::{MonthlySeries, MONTHS};
use crate::valuation::ValueAdjuster;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Band half-width in the current month, as a multiple of the std dev
    pub current_band_factor: f64,

    /// Band growth for future months: `std_dev * sqrt(months_ahead) * factor`
    pub future_band_factor: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            current_band_factor: 0.5,
            future_band_factor: 1.5,
        }
    }
}

/// Inputs of one projection, taken as a snapshot
#[derive(Debug, Clone)]
pub struct ProjectionInput {
    /// Income minus expenses per month of the selected year
    pub net_savings: MonthlySeries,

    pub opening_balance: f64,

    /// Current calendar month, or 11 for a year that is not the current one
    pub current_month: usize,

    pub is_current_year: bool,

    /// First month with trustworthy data
    pub start_month: usize,
}

/// Projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Build the trajectory for the selected year. `rates` are monthly
    /// inflation percentages; real values are measured from the start month.
    pub fn project(&self, input: &ProjectionInput, rates: &[f64]) -> ProjectionResult {
        let current_month = input.current_month.min(MONTHS - 1);
        let stats = SavingsStats::compute(&input.net_savings, input.start_month, current_month);
        debug!(
            "Projecting from balance {:.2}: avg savings {:.2}, std dev {:.2} over {} month(s)",
            input.opening_balance, stats.average, stats.std_dev, stats.months
        );

        let adjuster = ValueAdjuster::new(rates, input.start_month);
        let mut state = ProjectionState::new(input.opening_balance);
        let mut result = ProjectionResult::new(
            input.opening_balance,
            current_month,
            input.is_current_year,
            stats,
        );

        for month in 0..MONTHS {
            let phase = MonthPhase::classify(month, current_month, input.is_current_year);
            let net = input.net_savings.get(month);
            let mut point = ProjectionPoint::new(month, month < input.start_month);

            match phase {
                MonthPhase::Past => {
                    let actual = state.record_past(net);
                    point.actual = Some(actual);
                    point.real_actual = Some(adjuster.real_at(actual, month));
                }
                MonthPhase::Current => {
                    let actual = state.fork_current(net, stats.average);
                    let projected = state.running_projected;
                    point.actual = Some(actual);
                    point.real_actual = Some(adjuster.real_at(actual, month));
                    point.projected = Some(projected);
                    point.real_projected = Some(adjuster.real_at(projected, month));
                    point.error_band = Some(ErrorBand::around(
                        projected,
                        stats.std_dev * self.config.current_band_factor,
                    ));
                }
                MonthPhase::Future { months_ahead } => {
                    let projected = state.advance_projection(stats.average);
                    let margin = stats.std_dev
                        * (months_ahead as f64).sqrt()
                        * self.config.future_band_factor;
                    point.projected = Some(projected);
                    point.real_projected = Some(adjuster.real_at(projected, month));
                    point.error_band = Some(ErrorBand::around(projected, margin));
                }
            }

            result.add_point(point);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input(net: [f64; 12], current_month: usize, is_current_year: bool, start_month: usize) -> ProjectionInput {
        ProjectionInput {
            net_savings: MonthlySeries::from(net),
            opening_balance: 1_000.0,
            current_month,
            is_current_year,
            start_month,
        }
    }

    #[test]
    fn test_projection_has_twelve_points() {
        let engine = ProjectionEngine::default();
        let result = engine.project(&input([100.0; 12], 4, true, 0), &[0.0; 12]);

        assert_eq!(result.points.len(), 12);
        for (i, point) in result.points.iter().enumerate() {
            assert_eq!(point.month_index, i);
        }
    }

    #[test]
    fn test_current_month_spike_does_not_move_projection() {
        let mut net = [100.0; 12];
        net[3] = 500.0;
        let engine = ProjectionEngine::default();
        let result = engine.project(&input(net, 3, true, 0), &[0.0; 12]);

        assert_relative_eq!(result.stats.average, 100.0);
        let current = &result.points[3];
        // 1000 + 3 * 100 closed months
        assert_eq!(current.actual, Some(1_800.0));
        assert_eq!(current.projected, Some(1_400.0));
        assert_ne!(current.actual, current.projected);
    }

    #[test]
    fn test_past_points_have_no_projection() {
        let engine = ProjectionEngine::default();
        let result = engine.project(&input([50.0; 12], 6, true, 0), &[0.0; 12]);

        for point in &result.points[..6] {
            assert!(point.actual.is_some());
            assert!(point.projected.is_none());
            assert!(point.error_band.is_none());
        }
        // projection continues from the last closed balance
        let last_closed = result.points[5].actual.unwrap();
        assert_eq!(result.points[6].projected, Some(last_closed + 50.0));
    }

    #[test]
    fn test_future_band_widens() {
        let net = [100.0, 300.0, 100.0, 300.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let engine = ProjectionEngine::default();
        let result = engine.project(&input(net, 4, true, 0), &[0.0; 12]);

        assert_relative_eq!(result.stats.std_dev, 100.0, epsilon = 1e-9);
        let current_band = result.points[4].error_band.unwrap();
        assert_relative_eq!(current_band.width(), 100.0, epsilon = 1e-9);

        let next = result.points[5].error_band.unwrap();
        assert_relative_eq!(next.width(), 2.0 * 100.0 * 1.0_f64.sqrt() * 1.5, epsilon = 1e-9);

        let four_ahead = result.points[8].error_band.unwrap();
        assert_relative_eq!(four_ahead.width(), 2.0 * 100.0 * 2.0 * 1.5, epsilon = 1e-9);

        let widths: Vec<f64> = result.points[4..].iter().map(|p| p.error_band.unwrap().width()).collect();
        assert!(widths.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_past_year_is_all_actual() {
        let engine = ProjectionEngine::default();
        let result = engine.project(&input([100.0; 12], 11, false, 0), &[0.0; 12]);

        assert!(result.points.iter().all(|p| p.projected.is_none() && p.error_band.is_none()));
        assert_eq!(result.points[11].actual, Some(2_200.0));
        assert_eq!(result.summary().year_end_nominal, 2_200.0);
    }

    #[test]
    fn test_no_reliable_months_gives_flat_projection() {
        let engine = ProjectionEngine::default();
        let result = engine.project(&input([100.0; 12], 0, true, 12), &[0.0; 12]);

        assert_eq!(result.stats.average, 0.0);
        assert_eq!(result.stats.std_dev, 0.0);
        for point in &result.points[1..] {
            assert_eq!(point.projected, Some(1_000.0));
            assert_eq!(point.error_band.unwrap().width(), 0.0);
        }
    }

    #[test]
    fn test_unrecorded_flag() {
        let engine = ProjectionEngine::default();
        let result = engine.project(&input([0.0; 12], 8, true, 3), &[0.0; 12]);
        let flags: Vec<bool> = result.points.iter().map(|p| p.is_unrecorded).collect();
        assert_eq!(&flags[..4], &[true, true, true, false]);
    }

    #[test]
    fn test_real_values_discount_from_start_month() {
        let engine = ProjectionEngine::default();
        let rates = [1.0; 12];
        let result = engine.project(&input([0.0; 12], 5, true, 2), &rates);

        // before the start month nothing is discounted
        assert_eq!(result.points[1].real_actual, Some(1_000.0));
        assert_relative_eq!(result.points[2].real_actual.unwrap(), 1_000.0 / 1.01, epsilon = 1e-9);
        assert_relative_eq!(
            result.points[11].real_projected.unwrap(),
            1_000.0 / 1.01_f64.powi(10),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_inputs_not_mutated() {
        let engine = ProjectionEngine::default();
        let projection_input = input([120.0; 12], 5, true, 0);
        let before = projection_input.net_savings;
        let first = engine.project(&projection_input, &[0.5; 12]);
        let second = engine.project(&projection_input, &[0.5; 12]);

        assert_eq!(projection_input.net_savings, before);
        assert_eq!(first, second);
    }
}
