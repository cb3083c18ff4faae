//! STL (Seasonal-Trend decomposition using LOESS) implementation.
//!
//! STL decomposes a time series into three components:
//! - Trend: The underlying long-term pattern
//! - Seasonal: The repeating seasonal pattern
//! - Remainder: The residual after removing trend and seasonal

use crate::core::{MissingValuePolicy, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::utils::stats::{median, variance};
use tracing::debug;

/// Result of STL decomposition.
#[derive(Debug, Clone)]
pub struct STLResult {
    /// Trend component.
    pub trend: Vec<f64>,
    /// Seasonal component.
    pub seasonal: Vec<f64>,
    /// Remainder component.
    pub remainder: Vec<f64>,
}

impl STLResult {
    /// Get the seasonal strength (0 to 1).
    /// Values close to 1 indicate strong seasonality.
    pub fn seasonal_strength(&self) -> f64 {
        strength(&self.seasonal, &self.remainder)
    }

    /// Get the trend strength (0 to 1).
    /// Values close to 1 indicate strong trend.
    pub fn trend_strength(&self) -> f64 {
        strength(&self.trend, &self.remainder)
    }
}

/// `max(0, 1 - Var(R) / Var(C + R))`
fn strength(component: &[f64], remainder: &[f64]) -> f64 {
    let combined: Vec<f64> = component
        .iter()
        .zip(remainder)
        .map(|(c, r)| c + r)
        .collect();
    let var_combined = variance(&combined);
    if !var_combined.is_finite() || var_combined < 1e-10 {
        return 0.0;
    }
    (1.0 - variance(remainder) / var_combined).clamp(0.0, 1.0)
}

/// STL decomposition of a dated series.
#[derive(Debug, Clone)]
pub struct STLDecomposition {
    pub observed: TimeSeries,
    pub trend: TimeSeries,
    pub seasonal: TimeSeries,
    pub remainder: TimeSeries,
}

impl STLDecomposition {
    pub fn seasonal_strength(&self) -> f64 {
        strength(self.seasonal.values(), self.remainder.values())
    }

    pub fn trend_strength(&self) -> f64 {
        strength(self.trend.values(), self.remainder.values())
    }
}

/// STL decomposition configuration and algorithm.
///
/// Defaults follow Cleveland et al. (1990): seasonal smoother span 7,
/// trend span the smallest odd integer above
/// `1.5 * period / (1 - 1.5 / seasonal_span)`, and low-pass span the
/// smallest odd integer above the period.
#[derive(Debug, Clone)]
pub struct STL {
    /// Seasonal period.
    seasonal_period: usize,
    /// Seasonal LOESS smoothing parameter (ns).
    seasonal_smoothness: usize,
    /// Trend LOESS smoothing parameter (nt).
    trend_smoothness: usize,
    /// Low-pass filter parameter (nl).
    low_pass_smoothness: usize,
    /// Number of inner iterations.
    inner_iterations: usize,
    /// Number of outer (robustness) iterations.
    outer_iterations: usize,
    /// Use robust fitting.
    robust: bool,
}

fn next_odd(n: usize) -> usize {
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

impl STL {
    /// Create a new STL decomposer with the given seasonal period.
    pub fn new(seasonal_period: usize) -> Self {
        let ns = 7;
        let nt = (1.5 * seasonal_period as f64 / (1.0 - 1.5 / ns as f64)).ceil() as usize;

        Self {
            seasonal_period,
            seasonal_smoothness: ns,
            trend_smoothness: next_odd(nt.max(3)),
            low_pass_smoothness: next_odd(seasonal_period + 1),
            inner_iterations: 5,
            outer_iterations: 0,
            robust: false,
        }
    }

    /// Set custom seasonal smoothness (ns parameter).
    pub fn with_seasonal_smoothness(mut self, ns: usize) -> Self {
        self.seasonal_smoothness = next_odd(ns.max(3));
        self
    }

    /// Set custom trend smoothness (nt parameter).
    pub fn with_trend_smoothness(mut self, nt: usize) -> Self {
        self.trend_smoothness = next_odd(nt.max(3));
        self
    }

    /// Enable robust fitting: 2 inner and 15 outer iterations.
    pub fn robust(mut self) -> Self {
        self.robust = true;
        self.inner_iterations = 2;
        self.outer_iterations = 15;
        self
    }

    /// Set number of outer (robustness) iterations.
    pub fn with_outer_iterations(mut self, n: usize) -> Self {
        self.outer_iterations = n;
        self.robust = n > 0;
        self
    }

    /// Set number of inner iterations.
    pub fn with_inner_iterations(mut self, n: usize) -> Self {
        self.inner_iterations = n.max(1);
        self
    }

    pub fn is_robust(&self) -> bool {
        self.robust
    }

    /// Decompose a dated series. Missing values are dropped first.
    pub fn fit(&self, series: &TimeSeries) -> Result<STLDecomposition> {
        let observed = series.sanitized(MissingValuePolicy::Drop)?;
        let result = self.decompose(observed.values())?;
        debug!(
            period = self.seasonal_period,
            robust = self.robust,
            n = observed.len(),
            "STL decomposition finished"
        );
        Ok(STLDecomposition {
            trend: observed.with_values(result.trend)?,
            seasonal: observed.with_values(result.seasonal)?,
            remainder: observed.with_values(result.remainder)?,
            observed,
        })
    }

    /// Decompose the time series.
    pub fn decompose(&self, series: &[f64]) -> Result<STLResult> {
        if self.seasonal_period < 2 {
            return Err(ForecastError::InvalidConfiguration(format!(
                "STL period must be at least 2, got {}",
                self.seasonal_period
            )));
        }
        let n = series.len();
        if n < 2 * self.seasonal_period {
            return Err(ForecastError::InsufficientData {
                needed: 2 * self.seasonal_period,
                got: n,
            });
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }

        let mut seasonal = vec![0.0; n];
        let mut trend = vec![0.0; n];
        let mut weights = vec![1.0; n];

        let outer_iters = if self.robust {
            self.outer_iterations.max(1) + 1
        } else {
            1
        };

        for outer in 0..outer_iters {
            for _ in 0..self.inner_iterations {
                // Detrending
                let detrended: Vec<f64> =
                    series.iter().zip(trend.iter()).map(|(y, t)| y - t).collect();

                // Cycle-subseries smoothing, extended one cycle at each end
                let cycle_subseries = self.smooth_cycle_subseries(&detrended, &weights);

                // Low-pass filter of smoothed cycle-subseries
                let low_pass = self.low_pass_filter(&cycle_subseries);

                let period = self.seasonal_period;
                for i in 0..n {
                    seasonal[i] = cycle_subseries[i + period] - low_pass[i];
                }

                // Deseasonalizing and trend smoothing
                let deseasonalized: Vec<f64> = series
                    .iter()
                    .zip(seasonal.iter())
                    .map(|(y, s)| y - s)
                    .collect();
                trend = loess(&deseasonalized, self.trend_smoothness, &weights);
            }

            if self.robust && outer + 1 < outer_iters {
                let remainder: Vec<f64> = series
                    .iter()
                    .zip(seasonal.iter())
                    .zip(trend.iter())
                    .map(|((y, s), t)| y - s - t)
                    .collect();
                weights = robustness_weights(&remainder);
            }
        }

        let remainder: Vec<f64> = series
            .iter()
            .zip(seasonal.iter())
            .zip(trend.iter())
            .map(|((y, s), t)| y - s - t)
            .collect();

        Ok(STLResult {
            trend,
            seasonal,
            remainder,
        })
    }

    /// Smooth each cycle-subseries (one per position in the seasonal cycle)
    /// and extrapolate it one step before and after.
    ///
    /// The result has length `n + 2 * period`; entry `i + period` belongs to
    /// observation `i`.
    fn smooth_cycle_subseries(&self, detrended: &[f64], weights: &[f64]) -> Vec<f64> {
        let n = detrended.len();
        let period = self.seasonal_period;
        let mut result = vec![0.0; n + 2 * period];

        for cycle_pos in 0..period {
            let indices: Vec<usize> = (cycle_pos..n).step_by(period).collect();
            let values: Vec<f64> = indices.iter().map(|&i| detrended[i]).collect();
            let sub_weights: Vec<f64> = indices.iter().map(|&i| weights[i]).collect();
            let m = values.len();

            result[cycle_pos] = loess_at(&values, &sub_weights, self.seasonal_smoothness, -1.0);
            for (k, &idx) in indices.iter().enumerate() {
                result[idx + period] =
                    loess_at(&values, &sub_weights, self.seasonal_smoothness, k as f64);
            }
            result[cycle_pos + (m + 1) * period] =
                loess_at(&values, &sub_weights, self.seasonal_smoothness, m as f64);
        }

        result
    }

    /// Moving averages of length period, period and 3, then LOESS.
    ///
    /// Takes the extended cycle-subseries and returns `n` values.
    fn low_pass_filter(&self, extended: &[f64]) -> Vec<f64> {
        let period = self.seasonal_period;
        let ma1 = moving_average(extended, period);
        let ma2 = moving_average(&ma1, period);
        let ma3 = moving_average(&ma2, 3);
        let weights = vec![1.0; ma3.len()];
        loess(&ma3, self.low_pass_smoothness, &weights)
    }
}

impl Default for STL {
    fn default() -> Self {
        Self::new(12)
    }
}

/// Moving average over complete windows; the output is shorter than the
/// input by `window - 1`.
fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || series.len() < window {
        return vec![];
    }
    let mut sum: f64 = series[..window].iter().sum();
    let mut out = Vec::with_capacity(series.len() - window + 1);
    out.push(sum / window as f64);
    for i in window..series.len() {
        sum += series[i] - series[i - window];
        out.push(sum / window as f64);
    }
    out
}

/// Locally linear LOESS evaluated at every index of `values`.
fn loess(values: &[f64], span: usize, weights: &[f64]) -> Vec<f64> {
    (0..values.len())
        .map(|i| loess_at(values, weights, span, i as f64))
        .collect()
}

/// Locally linear LOESS fit at position `x` (which may lie outside the
/// data) using the `span` nearest observations, tricube neighbourhood
/// weights and the given robustness `weights`.
fn loess_at(values: &[f64], weights: &[f64], span: usize, x: f64) -> f64 {
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }

    let q = span.clamp(1, n);
    let centre = x.round().clamp(0.0, (n - 1) as f64) as usize;
    let start = centre.saturating_sub(q / 2).min(n - q);
    let end = start + q;
    let widen = span.saturating_sub(n) as f64 / 2.0;
    let reach = (x - start as f64).abs().max(((end - 1) as f64 - x).abs()) + widen + 1.0;

    let mut sw = 0.0;
    let mut sx = 0.0;
    let mut sy = 0.0;
    for j in start..end {
        let u = (j as f64 - x).abs() / reach;
        let w = (1.0 - u.powi(3)).powi(3) * weights[j];
        sw += w;
        sx += w * j as f64;
        sy += w * values[j];
    }
    if sw <= 0.0 {
        return values[centre];
    }

    let x_bar = sx / sw;
    let y_bar = sy / sw;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for j in start..end {
        let u = (j as f64 - x).abs() / reach;
        let w = (1.0 - u.powi(3)).powi(3) * weights[j];
        let dx = j as f64 - x_bar;
        sxy += w * dx * (values[j] - y_bar);
        sxx += w * dx * dx;
    }

    if sxx < 1e-12 {
        y_bar
    } else {
        y_bar + sxy / sxx * (x - x_bar)
    }
}

/// Bisquare weights on `|r| / (6 * median|r|)`.
fn robustness_weights(remainder: &[f64]) -> Vec<f64> {
    let abs_remainder: Vec<f64> = remainder.iter().map(|r| r.abs()).collect();
    let h = 6.0 * median(&abs_remainder);

    remainder
        .iter()
        .map(|r| {
            if h < 1e-10 {
                return 1.0;
            }
            let u = r.abs() / h;
            if u < 1.0 {
                (1.0 - u * u).powi(2)
            } else {
                0.0
            }
        })
        .collect()
}
