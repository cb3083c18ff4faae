//! Forecasting models.
//!
//! Both producers implement [`Forecaster`] for stateful use and, through
//! it, [`ForecastProducer`] for one-shot fit-and-forecast runs.

mod traits;

pub mod arima;
pub mod exponential;

pub use arima::{SARIMAConfig, SARIMA};
pub use exponential::{HoltWinters, HoltWintersConfig, SeasonalType, TrendType};
pub use traits::{BoxedForecaster, ForecastProducer, Forecaster};
