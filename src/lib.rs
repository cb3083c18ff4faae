//! # aurum-forecast
//!
//! Exploratory time series analysis and baseline forecast benchmarking for
//! gold price data.
//!
//! The core pipeline splits a series into a training prefix and a held-out
//! suffix, fits seasonal ARIMA and Holt-Winters models on the prefix,
//! scores their forecasts with MAE, RMSE and MAPE, and collects everything
//! in a [`report::Comparison`]. Around it sit a semicolon CSV loader,
//! ACF/PACF and STL diagnostics, return features and rolling z-score
//! regime flags.

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod benchmark;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod features;
pub mod io;
pub mod models;
pub mod regimes;
pub mod report;
pub mod seasonality;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::benchmark::{Benchmark, BenchmarkReport};
    pub use crate::core::{Forecast, MissingValuePolicy, TimeSeries};
    pub use crate::error::{ErrorKind, ForecastError, Result};
    pub use crate::models::{
        ForecastProducer, Forecaster, HoltWinters, HoltWintersConfig, SARIMAConfig, SeasonalType,
        TrendType, SARIMA,
    };
    pub use crate::report::Comparison;
    pub use crate::utils::{evaluate, evaluate_values, time_split, MetricSet, Split};
}
