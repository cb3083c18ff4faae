//! Accuracy metrics for forecast evaluation.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Guard added to the denominator of MAPE.
///
/// This keeps MAPE finite when an actual value is exactly zero, at the cost
/// of a slight bias for values close to zero.
pub const MAPE_EPSILON: f64 = 1e-8;

/// Point forecast accuracy: MAE, RMSE and MAPE (in percent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    /// Mean Absolute Error
    #[serde(rename = "MAE")]
    pub mae: f64,
    /// Root Mean Squared Error
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    /// Mean Absolute Percentage Error, in percent
    #[serde(rename = "MAPE")]
    pub mape: f64,
}

impl MetricSet {
    /// Metrics of a perfect forecast.
    pub fn zero() -> Self {
        Self {
            mae: 0.0,
            rmse: 0.0,
            mape: 0.0,
        }
    }

    /// Metric name/value pairs in a fixed order.
    pub fn as_map(&self) -> [(&'static str, f64); 3] {
        [("MAE", self.mae), ("RMSE", self.rmse), ("MAPE", self.mape)]
    }

    /// Look a metric up by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<f64> {
        self.as_map()
            .into_iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

impl fmt::Display for MetricSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAE={:.4} RMSE={:.4} MAPE={:.4}%",
            self.mae, self.rmse, self.mape
        )
    }
}

/// Evaluate a forecast series against the held-out series.
///
/// Both series must have the same length and the same timestamp index;
/// anything else is an alignment error.
pub fn evaluate(actual: &TimeSeries, forecast: &TimeSeries) -> Result<MetricSet> {
    if actual.len() != forecast.len() {
        return Err(ForecastError::Alignment {
            expected: actual.len(),
            got: forecast.len(),
        });
    }
    if let Some(position) = actual
        .timestamps()
        .iter()
        .zip(forecast.timestamps())
        .position(|(a, f)| a != f)
    {
        return Err(ForecastError::IndexMismatch { position });
    }
    evaluate_values(actual.values(), forecast.values())
}

/// Evaluate point predictions against actual values.
///
/// # Example
/// ```
/// use aurum_forecast::utils::metrics::evaluate_values;
///
/// let m = evaluate_values(&[10.0, 20.0, 30.0], &[11.0, 19.0, 31.0]).unwrap();
/// assert!((m.mae - 1.0).abs() < 1e-12);
/// assert!((m.rmse - 1.0).abs() < 1e-12);
/// ```
pub fn evaluate_values(actual: &[f64], predicted: &[f64]) -> Result<MetricSet> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::Alignment {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    Ok(MetricSet {
        mae: mae(actual, predicted),
        rmse: rmse(actual, predicted),
        mape: mape(actual, predicted),
    })
}

/// Calculate MAE between two slices.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate MSE between two slices.
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate RMSE between two slices.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

/// Calculate MAPE (percent) between two slices, using [`MAPE_EPSILON`] in
/// the denominator.
pub fn mape(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| ((a - p) / (a + MAPE_EPSILON)).abs())
        .sum();
    100.0 * sum / actual.len() as f64
}
