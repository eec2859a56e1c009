//! Balance projection for the selected year

mod state;
mod engine;
mod points;
mod stats;

pub use state::{MonthPhase, ProjectionState};
pub use engine::{ProjectionEngine, ProjectionConfig, ProjectionInput};
pub use points::{ErrorBand, ProjectionPoint, ProjectionResult, ProjectionSummary};
pub use stats::{reliable_months, SavingsStats};
