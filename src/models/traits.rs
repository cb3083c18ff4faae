//! Forecaster and producer traits shared by all models.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};

/// Stateful interface for models: fit once, then predict.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the time series data.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Generate point predictions for the specified horizon.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Get the fitted values (in-sample predictions).
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Get the residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Name plus the configuration that distinguishes this instance,
    /// e.g. `SARIMA(1,1,1)(0,1,1)[12]`.
    fn config_label(&self) -> String {
        self.name().to_string()
    }

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
pub type BoxedForecaster = Box<dyn Forecaster>;

/// One-shot capability: fit on a training window and forecast `horizon`
/// steps past its end.
///
/// Every call fits a fresh copy of the model, so a producer can be reused
/// across experiments without sharing state between them.
///
/// # Example
///
/// ```
/// use aurum_forecast::models::ForecastProducer;
/// use aurum_forecast::models::exponential::{HoltWinters, HoltWintersConfig};
///
/// let producer: Box<dyn ForecastProducer> =
///     Box::new(HoltWinters::new(HoltWintersConfig::default()));
/// assert_eq!(producer.label(), "Holt-Winters(add,add,12)");
/// ```
pub trait ForecastProducer {
    /// Label used in reports and logs.
    fn label(&self) -> String;

    /// Fit on `train` and return exactly `horizon` point predictions.
    fn fit_forecast(&self, train: &TimeSeries, horizon: usize) -> Result<Forecast>;
}

impl<T> ForecastProducer for T
where
    T: Forecaster + Clone,
{
    fn label(&self) -> String {
        self.config_label()
    }

    fn fit_forecast(&self, train: &TimeSeries, horizon: usize) -> Result<Forecast> {
        let mut model = self.clone();
        model.fit(train)?;
        let forecast = model.predict(horizon)?;
        if forecast.horizon() != horizon {
            return Err(ForecastError::Alignment {
                expected: horizon,
                got: forecast.horizon(),
            });
        }
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Repeats the last observed value.
    #[derive(Debug, Clone, Default)]
    struct LastValue {
        last: Option<f64>,
        fitted: Option<Vec<f64>>,
        residuals: Option<Vec<f64>>,
    }

    impl Forecaster for LastValue {
        fn fit(&mut self, series: &TimeSeries) -> Result<()> {
            let values = series.values();
            let last = *values.last().ok_or(ForecastError::EmptyData)?;
            let mut fitted = vec![f64::NAN];
            fitted.extend_from_slice(&values[..values.len() - 1]);
            self.residuals = Some(values.iter().zip(&fitted).map(|(y, f)| y - f).collect());
            self.fitted = Some(fitted);
            self.last = Some(last);
            Ok(())
        }

        fn predict(&self, horizon: usize) -> Result<Forecast> {
            let last = self.last.ok_or(ForecastError::FitRequired)?;
            Ok(Forecast::from_values(vec![last; horizon]))
        }

        fn fitted_values(&self) -> Option<&[f64]> {
            self.fitted.as_deref()
        }

        fn residuals(&self) -> Option<&[f64]> {
            self.residuals.as_deref()
        }

        fn name(&self) -> &str {
            "LastValue"
        }
    }

    fn make_series(n: usize) -> TimeSeries {
        let timestamps = (0..n)
            .map(|i| {
                Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i as i64)
            })
            .collect();
        TimeSeries::new(timestamps, (1..=n).map(|i| i as f64).collect()).unwrap()
    }

    #[test]
    fn boxed_forecaster_fit_predict() {
        let mut model: BoxedForecaster = Box::new(LastValue::default());
        assert!(!model.is_fitted());
        assert!(matches!(model.predict(3), Err(ForecastError::FitRequired)));

        model.fit(&make_series(10)).unwrap();
        assert!(model.is_fitted());
        assert_eq!(model.residuals().unwrap().len(), 10);
        assert_eq!(model.predict(3).unwrap().values(), &[10.0, 10.0, 10.0]);
    }

    #[test]
    fn producer_does_not_mutate_template() {
        let template = LastValue::default();
        let forecast = template.fit_forecast(&make_series(5), 4).unwrap();

        assert_eq!(forecast.horizon(), 4);
        assert!(!template.is_fitted());
        assert_eq!(template.label(), "LastValue");
    }

    #[test]
    fn producer_propagates_fit_errors() {
        let empty = TimeSeries::new(vec![], vec![]).unwrap();
        let result = LastValue::default().fit_forecast(&empty, 2);
        assert!(matches!(result, Err(ForecastError::EmptyData)));
    }
}
