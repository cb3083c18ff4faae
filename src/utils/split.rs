//! Train/test splitting for holdout evaluation.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

/// A contiguous train prefix and test suffix of one series.
#[derive(Debug, Clone)]
pub struct Split {
    /// Observations before the holdout window.
    pub train: TimeSeries,
    /// The last `test_size` observations.
    pub test: TimeSeries,
}

impl Split {
    /// Forecast horizon implied by the holdout window.
    pub fn horizon(&self) -> usize {
        self.test.len()
    }
}

/// Split `series` into a training prefix and a test suffix of `test_size`
/// observations, preserving order.
///
/// `test_size` must be in `1..series.len()`; a split that would leave the
/// training window empty is rejected rather than producing a degenerate fit.
///
/// # Example
/// ```
/// use aurum_forecast::core::TimeSeries;
/// use aurum_forecast::utils::split::time_split;
/// use chrono::{Duration, TimeZone, Utc};
///
/// let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let timestamps: Vec<_> = (0..100).map(|i| base + Duration::days(i)).collect();
/// let ts = TimeSeries::new(timestamps, (0..100).map(|i| i as f64).collect()).unwrap();
///
/// let split = time_split(&ts, 24).unwrap();
/// assert_eq!(split.train.len(), 76);
/// assert_eq!(split.test.len(), 24);
/// ```
pub fn time_split(series: &TimeSeries, test_size: usize) -> Result<Split> {
    let n = series.len();
    if n == 0 {
        return Err(ForecastError::EmptyData);
    }
    if test_size == 0 {
        return Err(ForecastError::invalid_config("test_size must be positive"));
    }
    if test_size >= n {
        return Err(ForecastError::InvalidConfiguration(format!(
            "test_size {} leaves no training data in a series of length {}",
            test_size, n
        )));
    }

    let origin = n - test_size;
    Ok(Split {
        train: series.slice(0, origin)?,
        test: series.slice(origin, n)?,
    })
}
