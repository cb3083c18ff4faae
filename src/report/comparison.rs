//! Comparison of several forecasts over one held-out window.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::utils::MetricSet;
use serde::Serialize;

/// One labelled forecast and its accuracy.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub label: String,
    /// Forecast values on the test index.
    pub forecast: TimeSeries,
    pub metrics: MetricSet,
}

/// Train window, held-out actuals and every forecast made for them.
///
/// Pure data; see [`render_table`](super::render_table) and
/// [`render_svg`](super::render_svg) for output.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    train: TimeSeries,
    test: TimeSeries,
    entries: Vec<ForecastEntry>,
}

#[derive(Serialize)]
struct MetricsRow<'a> {
    label: &'a str,
    metrics: &'a MetricSet,
}

impl Comparison {
    pub fn new(train: TimeSeries, test: TimeSeries) -> Self {
        Self {
            train,
            test,
            entries: Vec::new(),
        }
    }

    /// Add a forecast result.
    ///
    /// The forecast must sit on the test index and the label must be new.
    pub fn add(
        &mut self,
        label: impl Into<String>,
        forecast: TimeSeries,
        metrics: MetricSet,
    ) -> Result<()> {
        let label = label.into();
        if self.get(&label).is_some() {
            return Err(ForecastError::invalid_config(format!(
                "duplicate forecast label '{}'",
                label
            )));
        }
        if forecast.len() != self.test.len() {
            return Err(ForecastError::Alignment {
                expected: self.test.len(),
                got: forecast.len(),
            });
        }
        if let Some(position) = forecast
            .timestamps()
            .iter()
            .zip(self.test.timestamps())
            .position(|(f, t)| f != t)
        {
            return Err(ForecastError::IndexMismatch { position });
        }
        self.entries.push(ForecastEntry {
            label,
            forecast,
            metrics,
        });
        Ok(())
    }

    pub fn train(&self) -> &TimeSeries {
        &self.train
    }

    pub fn test(&self) -> &TimeSeries {
        &self.test
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[ForecastEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&ForecastEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    /// Entry with the lowest RMSE; the first one wins ties.
    pub fn best_by_rmse(&self) -> Option<&ForecastEntry> {
        self.entries.iter().fold(None, |best, e| match best {
            Some(b) if b.metrics.rmse <= e.metrics.rmse => Some(b),
            _ if e.metrics.rmse.is_nan() => best,
            _ => Some(e),
        })
    }

    /// Metrics per label as a JSON array of `{"label", "metrics"}` objects.
    pub fn metrics_json(&self) -> Result<String> {
        let rows: Vec<MetricsRow<'_>> = self
            .entries
            .iter()
            .map(|e| MetricsRow {
                label: &e.label,
                metrics: &e.metrics,
            })
            .collect();
        Ok(serde_json::to_string_pretty(&rows)?)
    }
}
