//! Volatility and regime indicators on a price level series.
//!
//! Rolling means and standard deviations act as regime proxies, realized
//! volatility summarizes recent log-return dispersion and a rolling z-score
//! flags observations far from their local mean.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::features::{log_return, rolling_mean, rolling_std};
use chrono::{DateTime, Utc};

/// Default windows for [`rolling_stats`] on monthly data (half-year, year, two years).
pub const DEFAULT_WINDOWS: [usize; 3] = [6, 12, 24];

/// Rolling mean and standard deviation of one window length.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowStats {
    pub window: usize,
    pub mean: TimeSeries,
    pub std: TimeSeries,
}

/// A series together with its rolling statistics for several windows.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingStats {
    pub value: TimeSeries,
    pub windows: Vec<WindowStats>,
}

impl RollingStats {
    /// Statistics for a given window length, if computed.
    pub fn window(&self, window: usize) -> Option<&WindowStats> {
        self.windows.iter().find(|w| w.window == window)
    }
}

fn check_window(window: usize) -> Result<()> {
    if window < 2 {
        return Err(ForecastError::invalid_config(format!(
            "rolling window must be at least 2, got {}",
            window
        )));
    }
    Ok(())
}

/// Rolling mean and sample standard deviation of `series` for each window.
pub fn rolling_stats(series: &TimeSeries, windows: &[usize]) -> Result<RollingStats> {
    let windows = windows
        .iter()
        .map(|&w| {
            check_window(w)?;
            Ok(WindowStats {
                window: w,
                mean: series
                    .with_values(rolling_mean(series.values(), w))?
                    .with_name(format!("roll_mean_{}", w)),
                std: series
                    .with_values(rolling_std(series.values(), w))?
                    .with_name(format!("roll_std_{}", w)),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RollingStats {
        value: series.clone(),
        windows,
    })
}

/// Rolling standard deviation of log returns scaled by `√window`.
pub fn realized_vol(series: &TimeSeries, window: usize) -> Result<TimeSeries> {
    check_window(window)?;
    let returns = log_return(series)?;
    let scale = (window as f64).sqrt();
    let vol = rolling_std(returns.values(), window)
        .into_iter()
        .map(|s| s * scale)
        .collect();
    Ok(series.with_values(vol)?.with_name(format!("realized_vol_{}", window)))
}

/// Rolling z-score table with a binary extreme-regime flag.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeTable {
    pub value: TimeSeries,
    /// `(value - rolling mean) / rolling std`; NaN until the window fills.
    pub zscore: TimeSeries,
    /// 1 where `|zscore| > threshold`, else 0 (including NaN z-scores).
    pub flag: Vec<u8>,
    pub window: usize,
    pub threshold: f64,
}

impl RegimeTable {
    pub fn len(&self) -> usize {
        self.flag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flag.is_empty()
    }

    /// Number of flagged observations.
    pub fn flagged(&self) -> usize {
        self.flag.iter().filter(|&&f| f == 1).count()
    }

    /// The last `n` rows as `(timestamp, value, zscore, flag)`.
    pub fn tail(&self, n: usize) -> Vec<(DateTime<Utc>, f64, f64, u8)> {
        let start = self.len().saturating_sub(n);
        (start..self.len())
            .map(|i| {
                (
                    self.value.timestamps()[i],
                    self.value.values()[i],
                    self.zscore.values()[i],
                    self.flag[i],
                )
            })
            .collect()
    }
}

/// Flag observations whose rolling z-score magnitude exceeds `threshold`.
pub fn zscore_regimes(series: &TimeSeries, window: usize, threshold: f64) -> Result<RegimeTable> {
    check_window(window)?;
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ForecastError::invalid_config(format!(
            "z-score threshold must be a non-negative number, got {}",
            threshold
        )));
    }

    let values = series.values();
    let mean = rolling_mean(values, window);
    let std = rolling_std(values, window);
    let z: Vec<f64> = values
        .iter()
        .zip(mean.iter().zip(&std))
        .map(|(v, (m, s))| (v - m) / s)
        .collect();
    let flag = z
        .iter()
        .map(|z| u8::from(z.abs() > threshold))
        .collect();

    Ok(RegimeTable {
        value: series.clone(),
        zscore: series.with_values(z)?.with_name("zscore"),
        flag,
        window,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Months, TimeZone};

    fn monthly(values: Vec<f64>) -> TimeSeries {
        let base = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let ts = (0..values.len() as u32).map(|i| base + Months::new(i)).collect();
        TimeSeries::new(ts, values).unwrap()
    }

    #[test]
    fn rolling_stats_per_window() {
        let series = monthly((1..=30).map(|i| i as f64).collect());
        let stats = rolling_stats(&series, &[6, 12]).unwrap();

        assert_eq!(stats.windows.len(), 2);
        let w6 = stats.window(6).unwrap();
        assert!(w6.mean.values()[4].is_nan());
        assert_relative_eq!(w6.mean.values()[5], 3.5);
        assert_relative_eq!(w6.std.values()[5], 3.5f64.sqrt(), epsilon = 1e-12);
        assert!(stats.window(24).is_none());
        assert!(rolling_stats(&series, &[1]).is_err());
    }

    #[test]
    fn realized_vol_of_constant_growth_is_zero() {
        let series = monthly((0..30).map(|i| 100.0 * 1.02f64.powi(i)).collect());
        let vol = realized_vol(&series, 12).unwrap();

        // One NaN return, then eleven more to fill the window.
        assert!(vol.values()[11].is_nan());
        assert_relative_eq!(vol.values()[12], 0.0, epsilon = 1e-10);
    }

    #[test]
    fn realized_vol_scales_with_sqrt_window() {
        let values: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 100.0 } else { 110.0 })
            .collect();
        let vol = realized_vol(&monthly(values), 4).unwrap();
        let r = (1.1f64).ln();
        // returns alternate ±r: sample std over 4 = r * sqrt(4/3)
        let expected = r * (4.0f64 / 3.0).sqrt() * 2.0;
        assert_relative_eq!(vol.values()[10], expected, epsilon = 1e-10);
    }

    #[test]
    fn zscore_flags_follow_threshold() {
        let mut values = vec![10.0; 30];
        for (i, v) in values.iter_mut().enumerate() {
            *v += (i % 3) as f64;
        }
        values[25] = 40.0;
        let table = zscore_regimes(&monthly(values), 12, 1.0).unwrap();

        assert_eq!(table.len(), 30);
        // Undefined z-scores are never flagged.
        assert!(table.zscore.values()[10].is_nan());
        assert_eq!(table.flag[10], 0);
        assert_eq!(table.flag[25], 1);
        for (z, f) in table.zscore.values().iter().zip(&table.flag) {
            assert_eq!(*f == 1, z.abs() > 1.0);
        }
        assert!(table.flagged() >= 1);
        assert_eq!(table.tail(3).len(), 3);
        assert_eq!(table.tail(3)[2].1, table.value.values()[29]);
    }

    #[test]
    fn zscore_of_flat_window_is_not_flagged() {
        let table = zscore_regimes(&monthly(vec![5.0; 20]), 5, 1.0).unwrap();
        assert_eq!(table.flagged(), 0);
    }

    #[test]
    fn zscore_rejects_bad_parameters() {
        let series = monthly(vec![1.0; 10]);
        assert!(zscore_regimes(&series, 1, 1.0).is_err());
        assert!(zscore_regimes(&series, 5, -1.0).is_err());
        assert!(zscore_regimes(&series, 5, f64::NAN).is_err());
    }
}
