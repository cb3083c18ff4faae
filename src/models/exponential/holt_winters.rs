//! Holt-Winters forecasting model.
//!
//! Also known as triple exponential smoothing, this model handles
//! data with trend and seasonality. Each component may be absent,
//! additive or multiplicative.

use crate::core::{Forecast, MissingValuePolicy, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

const SMOOTHING_BOUNDS: (f64, f64) = (0.0001, 0.9999);

/// Type of trend component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendType {
    /// No trend: the level is carried forward.
    None,
    /// Additive trend: `l + h*b`
    #[default]
    #[serde(alias = "add")]
    Additive,
    /// Multiplicative trend: `l * b^h`
    #[serde(alias = "mul")]
    Multiplicative,
}

/// Type of seasonal component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalType {
    /// No seasonality.
    None,
    /// Additive seasonality: y_t = l_t + b_t + s_t + e_t
    #[default]
    #[serde(alias = "add")]
    Additive,
    /// Multiplicative seasonality: y_t = (l_t + b_t) * s_t + e_t
    #[serde(alias = "mul")]
    Multiplicative,
}

fn parse_component(s: &str) -> Result<u8> {
    match s.trim().to_ascii_lowercase().as_str() {
        "none" | "n" => Ok(0),
        "add" | "additive" | "a" => Ok(1),
        "mul" | "multiplicative" | "m" => Ok(2),
        other => Err(ForecastError::InvalidConfiguration(format!(
            "unknown component type '{}'",
            other
        ))),
    }
}

impl FromStr for TrendType {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match parse_component(s)? {
            0 => TrendType::None,
            1 => TrendType::Additive,
            _ => TrendType::Multiplicative,
        })
    }
}

impl FromStr for SeasonalType {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match parse_component(s)? {
            0 => SeasonalType::None,
            1 => SeasonalType::Additive,
            _ => SeasonalType::Multiplicative,
        })
    }
}

impl fmt::Display for TrendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendType::None => "none",
            TrendType::Additive => "add",
            TrendType::Multiplicative => "mul",
        })
    }
}

impl fmt::Display for SeasonalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SeasonalType::None => "none",
            SeasonalType::Additive => "add",
            SeasonalType::Multiplicative => "mul",
        })
    }
}

/// Holt-Winters configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoltWintersConfig {
    pub trend: TrendType,
    pub seasonal: SeasonalType,
    /// Seasonal period (m).
    pub seasonal_periods: usize,
    /// Optimizer iteration cap.
    pub max_iter: usize,
}

impl HoltWintersConfig {
    pub fn new(trend: TrendType, seasonal: SeasonalType, seasonal_periods: usize) -> Self {
        Self {
            trend,
            seasonal,
            seasonal_periods,
            ..Self::default()
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn is_seasonal(&self) -> bool {
        self.seasonal != SeasonalType::None
    }

    fn has_trend(&self) -> bool {
        self.trend != TrendType::None
    }

    fn is_multiplicative(&self) -> bool {
        self.trend == TrendType::Multiplicative || self.seasonal == SeasonalType::Multiplicative
    }

    /// Minimum number of non-missing observations required to fit.
    pub fn min_observations(&self) -> usize {
        if self.is_seasonal() {
            2 * self.seasonal_periods
        } else {
            2
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_seasonal() && self.seasonal_periods < 2 {
            return Err(ForecastError::InvalidConfiguration(format!(
                "seasonal_periods must be at least 2, got {}",
                self.seasonal_periods
            )));
        }
        if self.max_iter == 0 {
            return Err(ForecastError::invalid_config("max_iter must be positive"));
        }
        Ok(())
    }
}

impl Default for HoltWintersConfig {
    /// Additive trend and additive seasonality with period 12.
    fn default() -> Self {
        Self {
            trend: TrendType::Additive,
            seasonal: SeasonalType::Additive,
            seasonal_periods: 12,
            max_iter: 5000,
        }
    }
}

/// Smoothing parameters (0 < α, β, γ < 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Smoothing {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Smoothing {
    fn clamped(alpha: f64, beta: f64, gamma: f64) -> Self {
        let (lo, hi) = SMOOTHING_BOUNDS;
        Self {
            alpha: alpha.clamp(lo, hi),
            beta: beta.clamp(lo, hi),
            gamma: gamma.clamp(lo, hi),
        }
    }
}

/// Level, trend and seasonal state.
#[derive(Debug, Clone)]
struct State {
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
}

/// Output of one pass of the smoothing recursion.
struct Filtered {
    sse: f64,
    fitted: Vec<f64>,
    state: State,
}

/// Smoothing recursion for one component configuration.
#[derive(Debug, Clone, Copy)]
struct Recursion {
    trend: TrendType,
    seasonal: SeasonalType,
    period: usize,
}

impl Recursion {
    fn from_config(config: &HoltWintersConfig) -> Self {
        Self {
            trend: config.trend,
            seasonal: config.seasonal,
            period: if config.is_seasonal() {
                config.seasonal_periods
            } else {
                1
            },
        }
    }

    /// Index of the first observation that is forecast one step ahead.
    fn start(&self) -> usize {
        match self.seasonal {
            SeasonalType::None => 1,
            _ => self.period,
        }
    }

    /// Trend-adjusted level `h` steps ahead.
    fn project(&self, level: f64, trend: f64, h: f64) -> f64 {
        match self.trend {
            TrendType::None => level,
            TrendType::Additive => level + h * trend,
            TrendType::Multiplicative => level * trend.powf(h),
        }
    }

    fn reseason(&self, base: f64, s: f64) -> f64 {
        match self.seasonal {
            SeasonalType::None => base,
            SeasonalType::Additive => base + s,
            SeasonalType::Multiplicative => base * s,
        }
    }

    fn deseason(&self, y: f64, s: f64) -> f64 {
        match self.seasonal {
            SeasonalType::None => y,
            SeasonalType::Additive => y - s,
            SeasonalType::Multiplicative => y / s,
        }
    }

    fn season(&self, t: usize, seasonals: &[f64]) -> f64 {
        match self.seasonal {
            SeasonalType::None => 0.0,
            _ => seasonals[t % self.period],
        }
    }

    /// Heuristic initial state, placed at index `start() - 1`.
    ///
    /// With seasonality the level and trend come from the means of the
    /// first two seasons, centred on the middle of the first season, so a
    /// noiseless trend-plus-seasonal series is reproduced exactly.
    fn initial_state(&self, values: &[f64]) -> State {
        if self.seasonal == SeasonalType::None {
            let trend = match self.trend {
                TrendType::None => 0.0,
                TrendType::Additive => values[1] - values[0],
                TrendType::Multiplicative => values[1] / values[0],
            };
            return State {
                level: values[0],
                trend,
                seasonals: vec![],
            };
        }

        let m = self.period;
        let mean1 = values[..m].iter().sum::<f64>() / m as f64;
        let mean2 = values[m..2 * m].iter().sum::<f64>() / m as f64;
        let trend = match self.trend {
            TrendType::None => 0.0,
            TrendType::Additive => (mean2 - mean1) / m as f64,
            TrendType::Multiplicative => (mean2 / mean1).powf(1.0 / m as f64),
        };
        let centre = (m as f64 - 1.0) / 2.0;
        let level = self.project(mean1, trend, centre);

        let mut seasonals: Vec<f64> = values[..m]
            .iter()
            .enumerate()
            .map(|(i, &y)| {
                let curve = self.project(mean1, trend, i as f64 - centre);
                match self.seasonal {
                    SeasonalType::Multiplicative => y / curve,
                    _ => y - curve,
                }
            })
            .collect();
        normalize_seasonals(&mut seasonals, self.seasonal);

        State {
            level,
            trend,
            seasonals,
        }
    }

    /// Run the smoothing equations over `values` from `init`.
    fn filter(&self, values: &[f64], params: Smoothing, init: State) -> Filtered {
        let Smoothing { alpha, beta, gamma } = params;
        let State {
            mut level,
            mut trend,
            mut seasonals,
        } = init;
        let start = self.start();
        let mut fitted = vec![f64::NAN; values.len()];
        let mut sse = 0.0;

        for (t, &y) in values.iter().enumerate().skip(start) {
            let s = self.season(t, &seasonals);
            let forecast = self.reseason(self.project(level, trend, 1.0), s);
            fitted[t] = forecast;
            sse += (y - forecast).powi(2);

            let level_prev = level;
            level = alpha * self.deseason(y, s)
                + (1.0 - alpha) * self.project(level_prev, trend, 1.0);

            match self.trend {
                TrendType::None => {}
                TrendType::Additive => {
                    trend = beta * (level - level_prev) + (1.0 - beta) * trend;
                }
                TrendType::Multiplicative => {
                    trend = beta * (level / level_prev) + (1.0 - beta) * trend;
                }
            }

            match self.seasonal {
                SeasonalType::None => {}
                SeasonalType::Additive => {
                    seasonals[t % self.period] = gamma * (y - level) + (1.0 - gamma) * s;
                }
                SeasonalType::Multiplicative => {
                    seasonals[t % self.period] = gamma * (y / level) + (1.0 - gamma) * s;
                }
            }
        }

        Filtered {
            sse,
            fitted,
            state: State {
                level,
                trend,
                seasonals,
            },
        }
    }
}

/// Additive seasonals sum to 0, multiplicative seasonals average to 1.
fn normalize_seasonals(seasonals: &mut [f64], seasonal_type: SeasonalType) {
    let period = seasonals.len();
    if period == 0 {
        return;
    }

    match seasonal_type {
        SeasonalType::None => {}
        SeasonalType::Additive => {
            let adjustment = seasonals.iter().sum::<f64>() / period as f64;
            for s in seasonals.iter_mut() {
                *s -= adjustment;
            }
        }
        SeasonalType::Multiplicative => {
            let mean = seasonals.iter().sum::<f64>() / period as f64;
            if mean.abs() > 1e-10 {
                for s in seasonals.iter_mut() {
                    *s /= mean;
                }
            }
        }
    }
}

/// Holt-Winters forecaster.
///
/// The model equations for additive trend and seasonality:
/// - Level: `l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
/// - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
/// - Seasonal: `s_t = γ(y_t - l_t) + (1-γ)s_{t-m}`
/// - Forecast: `ŷ_{t+h} = l_t + h*b_t + s_{t+h-m}`
///
/// Multiplicative components replace the corresponding sums with products
/// (`l_t * b_t^h`, `(l_t + h*b_t) * s_{t+h-m}`).
///
/// Unless smoothing parameters are fixed with [`HoltWinters::with_smoothing`],
/// α, β, γ and the initial level and trend are estimated jointly by
/// minimizing the one-step-ahead SSE.
#[derive(Debug, Clone)]
pub struct HoltWinters {
    config: HoltWintersConfig,
    /// Fixed smoothing parameters; estimated when `None`.
    fixed: Option<Smoothing>,
    smoothing: Option<Smoothing>,
    state: Option<State>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    sse: Option<f64>,
    /// Cleaned series length.
    n: usize,
}

impl HoltWinters {
    /// Create a model that estimates its parameters when fitted.
    pub fn new(config: HoltWintersConfig) -> Self {
        Self {
            config,
            fixed: None,
            smoothing: None,
            state: None,
            fitted: None,
            residuals: None,
            sse: None,
            n: 0,
        }
    }

    /// Additive trend and seasonality with the given period.
    pub fn additive(seasonal_periods: usize) -> Self {
        Self::new(HoltWintersConfig::new(
            TrendType::Additive,
            SeasonalType::Additive,
            seasonal_periods,
        ))
    }

    /// Fix the smoothing parameters instead of estimating them.
    pub fn with_smoothing(mut self, alpha: f64, beta: f64, gamma: f64) -> Self {
        self.fixed = Some(Smoothing::clamped(alpha, beta, gamma));
        self
    }

    pub fn config(&self) -> &HoltWintersConfig {
        &self.config
    }

    /// Smoothing parameters in use after fitting.
    pub fn smoothing(&self) -> Option<Smoothing> {
        self.smoothing
    }

    /// Get the current level.
    pub fn level(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.level)
    }

    /// Get the current trend.
    pub fn trend(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.trend)
    }

    /// Get the seasonal indices.
    pub fn seasonals(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.seasonals.as_slice())
    }

    /// In-sample one-step-ahead sum of squared errors.
    pub fn sse(&self) -> Option<f64> {
        self.sse
    }

    /// Estimate α, β, γ and the initial level/trend.
    fn estimate(
        &self,
        recursion: &Recursion,
        values: &[f64],
        init: &State,
    ) -> (Smoothing, State) {
        let has_trend = self.config.has_trend();
        let is_seasonal = self.config.is_seasonal();
        let positive = self.config.is_multiplicative();

        let mut initial = vec![0.3];
        let mut bounds = vec![SMOOTHING_BOUNDS];
        if has_trend {
            initial.push(0.1);
            bounds.push(SMOOTHING_BOUNDS);
        }
        if is_seasonal {
            initial.push(0.1);
            bounds.push(SMOOTHING_BOUNDS);
        }
        initial.push(init.level);
        bounds.push(if positive {
            (1e-8, f64::INFINITY)
        } else {
            (f64::NEG_INFINITY, f64::INFINITY)
        });
        if has_trend {
            initial.push(init.trend);
            bounds.push(match self.config.trend {
                TrendType::Multiplicative => (1e-8, f64::INFINITY),
                _ => (f64::NEG_INFINITY, f64::INFINITY),
            });
        }

        let unpack = |params: &[f64]| -> (Smoothing, State) {
            let mut it = params.iter().copied();
            let alpha = it.next().unwrap_or(0.3);
            let beta = if has_trend { it.next().unwrap_or(0.1) } else { 0.0 };
            let gamma = if is_seasonal { it.next().unwrap_or(0.1) } else { 0.0 };
            let level = it.next().unwrap_or(init.level);
            let trend = if has_trend {
                it.next().unwrap_or(init.trend)
            } else {
                init.trend
            };
            (
                Smoothing { alpha, beta, gamma },
                State {
                    level,
                    trend,
                    seasonals: init.seasonals.clone(),
                },
            )
        };

        let config = NelderMeadConfig::default().with_max_iter(self.config.max_iter);
        let result = nelder_mead(
            |params| {
                let (smoothing, state) = unpack(params);
                recursion.filter(values, smoothing, state).sse
            },
            &initial,
            Some(&bounds),
            config,
        );

        if !result.converged {
            warn!(
                iterations = result.iterations,
                "Holt-Winters optimizer did not converge, using best parameters found"
            );
        }
        debug!(
            iterations = result.iterations,
            sse = result.optimal_value,
            "Holt-Winters estimation finished"
        );

        unpack(&result.optimal_point)
    }
}

impl Default for HoltWinters {
    fn default() -> Self {
        Self::new(HoltWintersConfig::default())
    }
}

impl Forecaster for HoltWinters {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.config.validate()?;

        let clean = series.sanitized(MissingValuePolicy::Drop)?;
        let values = clean.values();
        let needed = self.config.min_observations();
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }
        if self.config.is_multiplicative() && values.iter().any(|&v| v <= 0.0) {
            return Err(ForecastError::model_fit(
                "multiplicative components require strictly positive data",
            ));
        }

        let recursion = Recursion::from_config(&self.config);
        let init = recursion.initial_state(values);

        let (smoothing, init) = match self.fixed {
            Some(fixed) => (fixed, init),
            None => self.estimate(&recursion, values, &init),
        };

        let filtered = recursion.filter(values, smoothing, init);
        if !filtered.sse.is_finite() {
            return Err(ForecastError::model_fit("sum of squared errors is not finite"));
        }

        let residuals = values
            .iter()
            .zip(&filtered.fitted)
            .map(|(y, f)| y - f)
            .collect();

        debug!(
            model = %self.config_label(),
            alpha = smoothing.alpha,
            beta = smoothing.beta,
            gamma = smoothing.gamma,
            sse = filtered.sse,
            "Holt-Winters fitted"
        );

        self.n = values.len();
        self.smoothing = Some(smoothing);
        self.sse = Some(filtered.sse);
        self.fitted = Some(filtered.fitted);
        self.residuals = Some(residuals);
        self.state = Some(filtered.state);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let state = self.state.as_ref().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let recursion = Recursion::from_config(&self.config);
        let predictions: Vec<f64> = (1..=horizon)
            .map(|h| {
                let s = recursion.season(self.n + h - 1, &state.seasonals);
                recursion.reseason(recursion.project(state.level, state.trend, h as f64), s)
            })
            .collect();

        if predictions.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::model_fit("forecast is not finite"));
        }

        Ok(Forecast::from_values(predictions))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "Holt-Winters"
    }

    /// `Holt-Winters(trend,seasonal,m)`
    fn config_label(&self) -> String {
        format!(
            "Holt-Winters({},{},{})",
            self.config.trend, self.config.seasonal, self.config.seasonal_periods
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn make_timestamps(n: usize) -> Vec<chrono::DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| base + Duration::hours(i as i64)).collect()
    }

    fn make_seasonal_data(n: usize, period: usize, trend: f64, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                let seasonal = amplitude * (2.0 * std::f64::consts::PI * t / period as f64).sin();
                100.0 + trend * t + seasonal
            })
            .collect()
    }

    #[test]
    fn initial_state_is_exact_on_noiseless_data() {
        let values = make_seasonal_data(48, 12, 1.0, 5.0);
        let recursion = Recursion::from_config(&HoltWintersConfig::default());
        let state = recursion.initial_state(&values);

        assert_relative_eq!(state.trend, 1.0, epsilon = 1e-9);
        assert_relative_eq!(state.level, 111.0, epsilon = 1e-9);
        let filtered = recursion.filter(
            &values,
            Smoothing::clamped(0.5, 0.5, 0.5),
            state,
        );
        assert!(filtered.sse < 1e-18);
    }

    #[test]
    fn recovers_noiseless_seasonal_trend() {
        let values = make_seasonal_data(72, 12, 1.0, 5.0);
        let ts = TimeSeries::new(make_timestamps(60), values[..60].to_vec()).unwrap();

        let mut model = HoltWinters::default();
        model.fit(&ts).unwrap();
        let forecast = model.predict(12).unwrap();

        for (pred, actual) in forecast.values().iter().zip(&values[60..]) {
            assert_relative_eq!(pred, actual, epsilon = 1e-3);
        }
    }

    #[test]
    fn fixed_smoothing_is_kept() {
        let values = make_seasonal_data(32, 8, 0.1, 5.0);
        let ts = TimeSeries::new(make_timestamps(32), values).unwrap();

        let mut model = HoltWinters::additive(8).with_smoothing(0.3, 0.2, 0.1);
        model.fit(&ts).unwrap();

        let smoothing = model.smoothing().unwrap();
        assert_relative_eq!(smoothing.alpha, 0.3, epsilon = 1e-12);
        assert_relative_eq!(smoothing.beta, 0.2, epsilon = 1e-12);
        assert_relative_eq!(smoothing.gamma, 0.1, epsilon = 1e-12);
        assert_eq!(model.seasonals().unwrap().len(), 8);
    }

    #[test]
    fn estimated_smoothing_within_bounds() {
        let values: Vec<f64> = make_seasonal_data(48, 12, 0.1, 3.0)
            .iter()
            .enumerate()
            .map(|(i, v)| v + if i % 5 == 0 { 0.8 } else { -0.2 })
            .collect();
        let ts = TimeSeries::new(make_timestamps(48), values).unwrap();

        let mut model = HoltWinters::default();
        model.fit(&ts).unwrap();

        let s = model.smoothing().unwrap();
        for p in [s.alpha, s.beta, s.gamma] {
            assert!((SMOOTHING_BOUNDS.0..=SMOOTHING_BOUNDS.1).contains(&p));
        }
        assert_eq!(model.predict(12).unwrap().horizon(), 12);
    }

    #[test]
    fn multiplicative_seasonal() {
        let values: Vec<f64> = (0..48)
            .map(|i| {
                let base = 100.0 + 0.5 * i as f64;
                let seasonal = 1.0 + 0.2 * (2.0 * std::f64::consts::PI * i as f64 / 8.0).sin();
                base * seasonal
            })
            .collect();
        let ts = TimeSeries::new(make_timestamps(40), values[..40].to_vec()).unwrap();

        let config = HoltWintersConfig::new(TrendType::Additive, SeasonalType::Multiplicative, 8);
        let mut model = HoltWinters::new(config);
        model.fit(&ts).unwrap();

        let forecast = model.predict(8).unwrap();
        for (pred, actual) in forecast.values().iter().zip(&values[40..]) {
            assert!((pred - actual).abs() / actual < 0.05);
        }
        let mean = model.seasonals().unwrap().iter().sum::<f64>() / 8.0;
        assert!((mean - 1.0).abs() < 0.1);
    }

    #[test]
    fn multiplicative_trend_on_exponential_growth() {
        let values: Vec<f64> = (0..30).map(|i| 50.0 * 1.02f64.powi(i)).collect();
        let ts = TimeSeries::new(make_timestamps(30), values).unwrap();

        let config = HoltWintersConfig::new(TrendType::Multiplicative, SeasonalType::None, 12);
        let mut model = HoltWinters::new(config);
        model.fit(&ts).unwrap();

        let forecast = model.predict(3).unwrap();
        for (h, pred) in forecast.values().iter().enumerate() {
            let expected = 50.0 * 1.02f64.powi(30 + h as i32);
            assert!((pred - expected).abs() / expected < 0.01);
        }
    }

    #[test]
    fn level_only_forecast_is_flat() {
        let values = vec![10.0, 12.0, 11.0, 13.0, 12.0, 11.5, 12.5, 12.0];
        let ts = TimeSeries::new(make_timestamps(8), values).unwrap();

        let config = HoltWintersConfig::new(TrendType::None, SeasonalType::None, 1);
        let mut model = HoltWinters::new(config);
        model.fit(&ts).unwrap();

        let preds = model.predict(4).unwrap().into_values();
        assert!(preds.windows(2).all(|w| (w[0] - w[1]).abs() < 1e-12));
    }

    #[test]
    fn multiplicative_rejects_non_positive_values() {
        let mut values = make_seasonal_data(24, 6, 0.1, 2.0);
        values[3] = 0.0;
        let ts = TimeSeries::new(make_timestamps(24), values).unwrap();

        let config = HoltWintersConfig::new(TrendType::Additive, SeasonalType::Multiplicative, 6);
        let err = HoltWinters::new(config).fit(&ts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelFit);
    }

    #[test]
    fn insufficient_data() {
        let ts = TimeSeries::new(make_timestamps(10), make_seasonal_data(10, 8, 0.1, 1.0)).unwrap();
        let mut model = HoltWinters::additive(8);
        assert!(matches!(
            model.fit(&ts),
            Err(ForecastError::InsufficientData {
                needed: 16,
                got: 10
            })
        ));
    }

    #[test]
    fn invalid_period() {
        let ts = TimeSeries::new(make_timestamps(24), make_seasonal_data(24, 6, 0.1, 1.0)).unwrap();
        let err = HoltWinters::additive(1).fit(&ts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn requires_fit_before_predict() {
        let model = HoltWinters::additive(4);
        assert!(matches!(model.predict(4), Err(ForecastError::FitRequired)));
    }

    #[test]
    fn fitted_and_residuals() {
        let values = make_seasonal_data(24, 6, 0.1, 2.0);
        let ts = TimeSeries::new(make_timestamps(24), values.clone()).unwrap();

        let mut model = HoltWinters::additive(6).with_smoothing(0.3, 0.1, 0.1);
        model.fit(&ts).unwrap();

        let fitted = model.fitted_values().unwrap();
        let residuals = model.residuals().unwrap();
        assert_eq!(fitted.len(), 24);
        assert!(fitted[..6].iter().all(|v| v.is_nan()));
        for i in 6..24 {
            assert_relative_eq!(residuals[i], values[i] - fitted[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn component_parsing() {
        assert_eq!("add".parse::<TrendType>().unwrap(), TrendType::Additive);
        assert_eq!("Mul".parse::<SeasonalType>().unwrap(), SeasonalType::Multiplicative);
        assert_eq!("none".parse::<SeasonalType>().unwrap(), SeasonalType::None);
        assert!("cubic".parse::<TrendType>().is_err());

        let config: HoltWintersConfig =
            serde_json::from_str(r#"{"trend":"add","seasonal":"mul","seasonal_periods":4}"#)
                .unwrap();
        assert_eq!(config.seasonal, SeasonalType::Multiplicative);
        assert_eq!(config.max_iter, 5000);
    }

    #[test]
    fn labels() {
        let model = HoltWinters::default();
        assert_eq!(model.name(), "Holt-Winters");
        assert_eq!(model.config_label(), "Holt-Winters(add,add,12)");
    }
}
