//! Seasonal ARIMA (Autoregressive Integrated Moving Average) models.
//!
//! This module provides:
//! - SARIMA models with non-seasonal (p, d, q) and seasonal (P, D, Q)\[s\] orders
//! - Differencing and integration helpers built on lag polynomials

mod diff;
mod model;

pub use diff::{
    apply_polynomial, difference, differencing_polynomial, integrate, seasonal_difference,
};
pub use model::{SARIMACoefficients, SARIMAConfig, SARIMA};
