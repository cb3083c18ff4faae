//! Seasonal decomposition.
//!
//! - STL: Seasonal-Trend decomposition using LOESS, optionally robust to outliers

mod stl;

pub use stl::{STLDecomposition, STLResult, STL};
