//! Point forecasts produced by a model.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

/// Point predictions for a forecast horizon.
///
/// A `Forecast` carries no timestamps; it becomes a forecast result series
/// once aligned to the held-out index ([`Forecast::aligned_to`]) or placed
/// after the training window ([`Forecast::after`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    point: Vec<f64>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { point: values }
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Point predictions.
    pub fn values(&self) -> &[f64] {
        &self.point
    }

    pub fn into_values(self) -> Vec<f64> {
        self.point
    }

    /// Attach the timestamp index of `actual`, index for index.
    ///
    /// Fails with an alignment error when the horizon differs from the
    /// length of `actual`.
    pub fn aligned_to(&self, actual: &TimeSeries) -> Result<TimeSeries> {
        if self.horizon() != actual.len() {
            return Err(ForecastError::Alignment {
                expected: actual.len(),
                got: self.horizon(),
            });
        }
        TimeSeries::new(actual.timestamps().to_vec(), self.point.clone())
    }

    /// Place the predictions on the periods immediately following `train`.
    pub fn after(&self, train: &TimeSeries) -> Result<TimeSeries> {
        let timestamps = train.future_timestamps(self.horizon())?;
        TimeSeries::new(timestamps, self.point.clone())
    }
}
