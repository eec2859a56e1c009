//! Running balances carried month to month through a projection

/// Where a month sits relative to the current calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthPhase {
    /// Closed month (or any month of a year that is not the current one)
    Past,
    /// The current, still incomplete month
    Current,
    /// Months after the current one
    Future {
        /// Months elapsed since the current month (1 = next month)
        months_ahead: usize,
    },
}

impl MonthPhase {
    pub fn classify(month: usize, current_month: usize, is_current_year: bool) -> Self {
        if !is_current_year || month < current_month {
            MonthPhase::Past
        } else if month == current_month {
            MonthPhase::Current
        } else {
            MonthPhase::Future {
                months_ahead: month - current_month,
            }
        }
    }
}

/// Accumulator for the actual and projected balance paths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionState {
    /// Balance built from recorded net savings
    pub running_actual: f64,

    /// Balance of the trend line; equals `running_actual` until the fork
    pub running_projected: f64,
}

impl ProjectionState {
    /// Both paths start at the opening balance
    pub fn new(opening_balance: f64) -> Self {
        Self {
            running_actual: opening_balance,
            running_projected: opening_balance,
        }
    }

    /// Closed month: the projection tracks reality exactly
    pub fn record_past(&mut self, net_savings: f64) -> f64 {
        self.running_actual += net_savings;
        self.running_projected = self.running_actual;
        self.running_actual
    }

    /// Current month: the actual path takes the partial figure, the
    /// projected path takes the average instead. Returns the actual balance.
    pub fn fork_current(&mut self, net_savings: f64, avg_savings: f64) -> f64 {
        let current_actual = self.running_actual + net_savings;
        self.running_projected += avg_savings;
        self.running_actual = current_actual;
        current_actual
    }

    /// Future month: only the projected path moves
    pub fn advance_projection(&mut self, avg_savings: f64) -> f64 {
        self.running_projected += avg_savings;
        self.running_projected
    }
}
