//! Value adjustment between nominal and real (today's money) amounts

mod adjuster;

pub use adjuster::{cumulative_inflation, nominal_value, present_value, real_value, ValueAdjuster};
