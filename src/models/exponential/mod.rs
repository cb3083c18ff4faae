//! Exponential smoothing models.
//!
//! This module provides Holt-Winters triple exponential smoothing with
//! optional additive or multiplicative trend and seasonal components.

mod holt_winters;

pub use holt_winters::{HoltWinters, HoltWintersConfig, SeasonalType, Smoothing, TrendType};
