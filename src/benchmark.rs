//! Holdout benchmark of several forecast producers.
//!
//! The last `test_size` observations are held out, every producer is fitted
//! on the same training window and scored on the held-out values.
//!
//! # Example
//!
//! ```no_run
//! use aurum_forecast::benchmark::Benchmark;
//! use aurum_forecast::models::{HoltWinters, HoltWintersConfig, SARIMA, SARIMAConfig};
//! # fn run(series: &aurum_forecast::core::TimeSeries) -> aurum_forecast::Result<()> {
//! let report = Benchmark::new(24)
//!     .with_producer(Box::new(SARIMA::new(SARIMAConfig::default())))
//!     .with_producer(Box::new(HoltWinters::new(HoltWintersConfig::default())))
//!     .run(series)?;
//! println!("best: {:?}", report.best_label());
//! # Ok(())
//! # }
//! ```

use crate::core::{MissingValuePolicy, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::ForecastProducer;
use crate::report::Comparison;
use crate::utils::{evaluate, time_split, MetricSet};
use tracing::{debug, info};

/// Producers to compare and the size of the holdout window.
pub struct Benchmark {
    test_size: usize,
    producers: Vec<Box<dyn ForecastProducer>>,
}

impl Benchmark {
    pub fn new(test_size: usize) -> Self {
        Self {
            test_size,
            producers: Vec::new(),
        }
    }

    /// Add a producer; producers run in insertion order.
    pub fn with_producer(mut self, producer: Box<dyn ForecastProducer>) -> Self {
        self.producers.push(producer);
        self
    }

    pub fn test_size(&self) -> usize {
        self.test_size
    }

    /// Labels of the registered producers.
    pub fn labels(&self) -> Vec<String> {
        self.producers.iter().map(|p| p.label()).collect()
    }

    /// Split, fit, forecast and score every producer.
    ///
    /// Missing values are dropped from the series first. The first failing
    /// producer aborts the run.
    pub fn run(&self, series: &TimeSeries) -> Result<BenchmarkReport> {
        if self.producers.is_empty() {
            return Err(ForecastError::invalid_config("benchmark has no producers"));
        }

        let clean = series.sanitized(MissingValuePolicy::Drop)?;
        let split = time_split(&clean, self.test_size)?;
        let horizon = split.horizon();
        info!(
            train = split.train.len(),
            test = horizon,
            producers = self.producers.len(),
            "running holdout benchmark"
        );

        let mut comparison = Comparison::new(split.train.clone(), split.test.clone());
        for producer in &self.producers {
            let label = producer.label();
            debug!(model = %label, horizon, "fitting");
            let forecast = producer.fit_forecast(&split.train, horizon)?;
            let result = forecast.aligned_to(&split.test)?.with_name(label.as_str());
            let metrics = evaluate(&split.test, &result)?;
            info!(
                model = %label,
                mae = metrics.mae,
                rmse = metrics.rmse,
                mape = metrics.mape,
                "evaluated"
            );
            comparison.add(label, result, metrics)?;
        }

        Ok(BenchmarkReport { comparison })
    }
}

/// Outcome of [`Benchmark::run`].
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    comparison: Comparison,
}

impl BenchmarkReport {
    pub fn comparison(&self) -> &Comparison {
        &self.comparison
    }

    pub fn into_comparison(self) -> Comparison {
        self.comparison
    }

    /// Metrics per producer label, in run order.
    pub fn metrics(&self) -> Vec<(&str, MetricSet)> {
        self.comparison
            .entries()
            .iter()
            .map(|e| (e.label.as_str(), e.metrics))
            .collect()
    }

    pub fn metrics_for(&self, label: &str) -> Option<MetricSet> {
        self.comparison.get(label).map(|e| e.metrics)
    }

    /// Label with the lowest RMSE.
    pub fn best_label(&self) -> Option<&str> {
        self.comparison.best_by_rmse().map(|e| e.label.as_str())
    }
}
