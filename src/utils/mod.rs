//! Utility functions for forecasting models.

pub mod metrics;
pub mod optimization;
pub mod split;
pub mod stats;

pub use metrics::{evaluate, evaluate_values, MetricSet};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use split::{time_split, Split};
