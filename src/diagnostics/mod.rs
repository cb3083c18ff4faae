//! Classical diagnostics on a single series.
//!
//! - Sample ACF and PACF (Yule-Walker via Durbin-Levinson)
//! - Correlogram with the large-sample white-noise band
//! - Log/difference transforms toward stationarity

mod autocorrelation;

pub use autocorrelation::{
    acf_values, autocorrelation, pacf_from_acf, partial_autocorrelation,
};

use crate::core::{MissingValuePolicy, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::utils::stats::normal_critical_value;
use tracing::warn;

fn observed_values(series: &TimeSeries, max_lag: usize) -> Result<Vec<f64>> {
    if series.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    let missing = series.missing_count();
    if missing > 0 {
        warn!(missing, "dropping missing values before autocorrelation");
    }
    let clean = series.sanitized(MissingValuePolicy::Drop)?;
    if clean.len() <= max_lag {
        return Err(ForecastError::InsufficientData {
            needed: max_lag + 1,
            got: clean.len(),
        });
    }
    Ok(clean.values().to_vec())
}

/// Sample autocorrelations for lags `0..=max_lag`, missing values dropped.
pub fn acf(series: &TimeSeries, max_lag: usize) -> Result<Vec<f64>> {
    let values = observed_values(series, max_lag)?;
    Ok(acf_values(&values, max_lag))
}

/// Sample partial autocorrelations for lags `0..=max_lag`, missing values dropped.
pub fn pacf(series: &TimeSeries, max_lag: usize) -> Result<Vec<f64>> {
    let values = observed_values(series, max_lag)?;
    Ok(pacf_from_acf(&acf_values(&values, max_lag)))
}

/// ACF and PACF of a series together with the ±z/√n significance band.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlogram {
    /// Autocorrelations, index = lag.
    pub acf: Vec<f64>,
    /// Partial autocorrelations, index = lag.
    pub pacf: Vec<f64>,
    /// Half-width of the 95% band around zero.
    pub band: f64,
    /// Number of observations used.
    pub n: usize,
}

impl Correlogram {
    /// Lags `>= 1` whose autocorrelation falls outside the band.
    pub fn significant_acf_lags(&self) -> Vec<usize> {
        significant(&self.acf, self.band)
    }

    /// Lags `>= 1` whose partial autocorrelation falls outside the band.
    pub fn significant_pacf_lags(&self) -> Vec<usize> {
        significant(&self.pacf, self.band)
    }

    pub fn max_lag(&self) -> usize {
        self.acf.len().saturating_sub(1)
    }
}

fn significant(values: &[f64], band: f64) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, v)| v.abs() > band)
        .map(|(lag, _)| lag)
        .collect()
}

/// Compute a [`Correlogram`] up to `max_lag`.
pub fn correlogram(series: &TimeSeries, max_lag: usize) -> Result<Correlogram> {
    let values = observed_values(series, max_lag)?;
    let acf = acf_values(&values, max_lag);
    let pacf = pacf_from_acf(&acf);
    let n = values.len();
    Ok(Correlogram {
        acf,
        pacf,
        band: normal_critical_value(0.95) / (n as f64).sqrt(),
        n,
    })
}

/// Optional log transform followed by `diff_order` first differences.
///
/// The index is preserved; the first `diff_order` values become NaN.
pub fn prepare_stationary(series: &TimeSeries, use_log: bool, diff_order: usize) -> TimeSeries {
    let mut out = if use_log { series.ln() } else { series.clone() };
    for _ in 0..diff_order {
        out = out.diff();
    }
    out
}
