//! Nominal/real conversions driven by monthly inflation
//!
//! Two directions that must not be mixed up:
//! - [`real_value`] discounts a future (projected) nominal sum back to today's money
//! - [`present_value`] compounds a past price forward to what it would cost today

/// Rate at `month` in percent; missing or non-finite rates read as 0
fn rate_at(rates: &[f64], month: usize) -> f64 {
    rates
        .get(month)
        .copied()
        .filter(|r| r.is_finite())
        .unwrap_or(0.0)
}

/// Compounded inflation (percent) over months `start..=target`
///
/// Returns 0 when `target < start`.
pub fn cumulative_inflation(rates: &[f64], start: usize, target: usize) -> f64 {
    if target < start {
        return 0.0;
    }
    let factor: f64 = (start..=target)
        .map(|m| 1.0 + rate_at(rates, m) / 100.0)
        .product();
    (factor - 1.0) * 100.0
}

/// Nominal amount restated in today's purchasing power
pub fn real_value(nominal: f64, cumulative_pct: f64) -> f64 {
    let factor = 1.0 + cumulative_pct / 100.0;
    if cumulative_pct == 0.0 || !factor.is_finite() || factor == 0.0 {
        nominal
    } else {
        nominal / factor
    }
}

/// Inverse of [`real_value`]: re-inflate a real amount by the same cumulative inflation
pub fn nominal_value(real: f64, cumulative_pct: f64) -> f64 {
    let factor = 1.0 + cumulative_pct / 100.0;
    if cumulative_pct == 0.0 || !factor.is_finite() || factor == 0.0 {
        real
    } else {
        real * factor
    }
}

/// A price paid in month `from` compounded forward to `current`
///
/// Applies the rates of months `from + 1 ..= current`; unchanged when
/// `from >= current`.
pub fn present_value(past_amount: f64, from: usize, current: usize, rates: &[f64]) -> f64 {
    if from >= current {
        return past_amount;
    }
    ((from + 1)..=current).fold(past_amount, |value, m| value * (1.0 + rate_at(rates, m) / 100.0))
}

/// Rates bundled with the month real values are measured from
#[derive(Debug, Clone, Copy)]
pub struct ValueAdjuster<'a> {
    rates: &'a [f64],
    base_month: usize,
}

impl<'a> ValueAdjuster<'a> {
    pub fn new(rates: &'a [f64], base_month: usize) -> Self {
        Self { rates, base_month }
    }

    /// Cumulative inflation from the base month through `month`
    pub fn cumulative_to(&self, month: usize) -> f64 {
        cumulative_inflation(self.rates, self.base_month, month)
    }

    /// Real value of a nominal amount observed at `month`
    pub fn real_at(&self, nominal: f64, month: usize) -> f64 {
        real_value(nominal, self.cumulative_to(month))
    }

    /// Price paid at `from` brought to `current`
    pub fn present(&self, past_amount: f64, from: usize, current: usize) -> f64 {
        present_value(past_amount, from, current, self.rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_flat_one_percent_three_months() {
        let rates = [1.0; 12];
        let cumulative = cumulative_inflation(&rates, 0, 2);
        assert_relative_eq!(cumulative, (1.01_f64.powi(3) - 1.0) * 100.0, epsilon = 1e-10);
        assert_abs_diff_eq!(cumulative, 3.0301, epsilon = 1e-4);
    }

    #[test]
    fn test_present_value_example() {
        let value = present_value(100.0, 0, 2, &[0.0, 2.0, 1.0]);
        assert_abs_diff_eq!(value, 103.02, epsilon = 1e-9);
    }

    #[test]
    fn test_present_value_no_elapsed_time() {
        let rates = [3.0; 12];
        assert_eq!(present_value(250.0, 5, 5, &rates), 250.0);
        assert_eq!(present_value(250.0, 7, 5, &rates), 250.0);
    }

    #[test]
    fn test_target_before_start_is_zero() {
        let rates = [2.0; 12];
        assert_eq!(cumulative_inflation(&rates, 5, 3), 0.0);
    }

    #[test]
    fn test_real_value_identity_at_zero() {
        assert_eq!(real_value(1234.5, 0.0), 1234.5);
        assert_relative_eq!(real_value(110.0, 10.0), 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_and_nan_rates_are_zero() {
        let rates = [1.0, f64::NAN];
        // months 1 (NaN) and 2..4 (missing) contribute nothing
        assert_relative_eq!(cumulative_inflation(&rates, 0, 4), 1.0, epsilon = 1e-12);
        assert_eq!(present_value(100.0, 0, 5, &rates), 100.0);
    }

    #[test]
    fn test_round_trip_real_nominal() {
        let rates = [0.52, 0.61, 0.38, 0.44, 0.9, 0.1, 0.0, 0.33, 0.27, 0.5, 0.48, 0.71];
        for (start, target) in [(0, 11), (3, 7), (6, 6)] {
            let cumulative = cumulative_inflation(&rates, start, target);
            let real = real_value(98_765.43, cumulative);
            assert_relative_eq!(nominal_value(real, cumulative), 98_765.43, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_pure_functions_repeatable() {
        let rates = [0.7; 12];
        let a = (cumulative_inflation(&rates, 1, 9), present_value(50.0, 2, 8, &rates));
        let b = (cumulative_inflation(&rates, 1, 9), present_value(50.0, 2, 8, &rates));
        assert_eq!(a, b);
    }

    #[test]
    fn test_adjuster_uses_base_month() {
        let rates = [1.0; 12];
        let adjuster = ValueAdjuster::new(&rates, 3);
        assert_eq!(adjuster.cumulative_to(2), 0.0);
        assert_relative_eq!(adjuster.real_at(101.0, 3), 100.0, epsilon = 1e-10);
        assert_relative_eq!(adjuster.present(100.0, 3, 4), 101.0, epsilon = 1e-10);
    }
}
