//! Error type for the collaborator edges (loading, parsing, ledger edits)
//!
//! The calculation core never fails: it falls back to neutral values instead.

/// Errors raised while loading data or mutating ledger entries
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid month index: {0} (expected 0-11)")]
    InvalidMonth(usize),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The month owns a transaction breakdown, so its total can only change
    /// through the transactions themselves.
    #[error("Month {month} of '{entry}' is itemized; edit its transactions instead")]
    ItemizedMonth { entry: String, month: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, BudgetError>;

/// Validate a 0-based month index
pub fn check_month(month: usize) -> Result<usize> {
    if month < 12 {
        Ok(month)
    } else {
        Err(BudgetError::InvalidMonth(month))
    }
}
