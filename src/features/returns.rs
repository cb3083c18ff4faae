//! Return features derived from a price column.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::features::window::{rolling_mean, rolling_std};
use crate::io::PriceFrame;

/// Window of the rolling statistics in [`add_returns_features`].
pub const RETURNS_WINDOW: usize = 5;

/// Simple returns `p_t / p_{t-1} - 1`; the first value is NaN.
pub fn pct_return(series: &TimeSeries) -> Result<TimeSeries> {
    let v = series.values();
    let values = (0..v.len())
        .map(|i| if i == 0 { f64::NAN } else { v[i] / v[i - 1] - 1.0 })
        .collect();
    series.with_values(values)
}

/// Log returns `ln(p_t / p_{t-1})`; the first value is NaN.
///
/// A non-positive ratio yields NaN.
pub fn log_return(series: &TimeSeries) -> Result<TimeSeries> {
    let v = series.values();
    let values = (0..v.len())
        .map(|i| {
            if i == 0 {
                return f64::NAN;
            }
            let ratio = v[i] / v[i - 1];
            if ratio > 0.0 {
                ratio.ln()
            } else {
                f64::NAN
            }
        })
        .collect();
    series.with_values(values)
}

/// Returns and their short-window statistics, all on the price index.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnsFeatures {
    pub price: TimeSeries,
    pub pct_return: TimeSeries,
    pub log_return: TimeSeries,
    /// Rolling mean of `pct_return` over [`RETURNS_WINDOW`] periods.
    pub rolling_mean: TimeSeries,
    /// Rolling sample std of `pct_return` over [`RETURNS_WINDOW`] periods.
    pub rolling_std: TimeSeries,
}

/// Compute simple and log returns of `price_col` plus their rolling
/// mean and standard deviation.
pub fn add_returns_features(frame: &PriceFrame, price_col: &str) -> Result<ReturnsFeatures> {
    if !frame.has_column(price_col) {
        return Err(ForecastError::invalid_config(format!(
            "column '{}' not found in frame",
            price_col
        )));
    }
    let price = frame.column(price_col)?;
    let pct = pct_return(&price)?;
    let log = log_return(&price)?;
    let mean = pct.with_values(rolling_mean(pct.values(), RETURNS_WINDOW))?;
    let std = pct.with_values(rolling_std(pct.values(), RETURNS_WINDOW))?;

    Ok(ReturnsFeatures {
        price,
        pct_return: pct.with_name("pct_return"),
        log_return: log.with_name("log_return"),
        rolling_mean: mean.with_name(format!("rolling_mean_{}", RETURNS_WINDOW)),
        rolling_std: std.with_name(format!("rolling_std_{}", RETURNS_WINDOW)),
    })
}
