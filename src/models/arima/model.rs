//! Seasonal ARIMA model estimated by conditional sum of squares.

use crate::core::{Forecast, MissingValuePolicy, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{apply_polynomial, differencing_polynomial, integrate, poly_mul};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Coefficient bound applied when stationarity or invertibility is enforced.
const COEFFICIENT_BOUND: f64 = 0.99;

/// SARIMA(p,d,q)(P,D,Q)\[s\] configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SARIMAConfig {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
    /// Seasonal AR order (P)
    pub seasonal_p: usize,
    /// Seasonal differencing order (D)
    pub seasonal_d: usize,
    /// Seasonal MA order (Q)
    pub seasonal_q: usize,
    /// Seasonal period (s)
    pub period: usize,
    /// Keep AR coefficients inside (-0.99, 0.99).
    pub enforce_stationarity: bool,
    /// Keep MA coefficients inside (-0.99, 0.99).
    pub enforce_invertibility: bool,
    /// Optimizer iteration cap.
    pub max_iter: usize,
}

impl SARIMAConfig {
    /// Create a configuration from the non-seasonal and seasonal orders.
    pub fn new(order: (usize, usize, usize), seasonal_order: (usize, usize, usize, usize)) -> Self {
        Self {
            p: order.0,
            d: order.1,
            q: order.2,
            seasonal_p: seasonal_order.0,
            seasonal_d: seasonal_order.1,
            seasonal_q: seasonal_order.2,
            period: seasonal_order.3,
            ..Self::default()
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_enforcement(mut self, stationarity: bool, invertibility: bool) -> Self {
        self.enforce_stationarity = stationarity;
        self.enforce_invertibility = invertibility;
        self
    }

    /// Whether any seasonal term is present.
    pub fn is_seasonal(&self) -> bool {
        self.seasonal_p + self.seasonal_d + self.seasonal_q > 0
    }

    /// Total differencing degree, `d + s*D`.
    pub fn differencing_degree(&self) -> usize {
        self.d + self.period * self.seasonal_d
    }

    /// Whether a mean term is estimated (only for undifferenced models).
    pub fn has_mean(&self) -> bool {
        self.d + self.seasonal_d == 0
    }

    /// Number of estimated ARMA coefficients plus the optional mean.
    pub fn num_params(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q + usize::from(self.has_mean())
    }

    /// Minimum number of non-missing observations required to fit.
    pub fn min_observations(&self) -> usize {
        let seasonal = if self.is_seasonal() {
            self.period * (self.seasonal_p + self.seasonal_d + self.seasonal_q + 1)
        } else {
            0
        };
        seasonal + self.p + self.d + self.q + 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.period == 0 {
            return Err(ForecastError::invalid_config(
                "seasonal period must be positive",
            ));
        }
        if self.is_seasonal() && self.period < 2 {
            return Err(ForecastError::InvalidConfiguration(format!(
                "seasonal terms need a period of at least 2, got {}",
                self.period
            )));
        }
        if self.max_iter == 0 {
            return Err(ForecastError::invalid_config("max_iter must be positive"));
        }
        Ok(())
    }
}

impl Default for SARIMAConfig {
    /// SARIMA(1,1,1)(0,1,1)\[12\], the monthly default.
    fn default() -> Self {
        Self {
            p: 1,
            d: 1,
            q: 1,
            seasonal_p: 0,
            seasonal_d: 1,
            seasonal_q: 1,
            period: 12,
            enforce_stationarity: false,
            enforce_invertibility: false,
            max_iter: 5000,
        }
    }
}

/// Coefficients of a fitted SARIMA model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SARIMACoefficients {
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
    pub mean: f64,
}

/// Expanded ARMA lag structure: `w_t - μ = Σ a_k (w_{t-k} - μ) + e_t + Σ m_k e_{t-k}`.
#[derive(Debug, Clone)]
struct LagStructure {
    /// `a_k` for k = 1..; index 0 is unused.
    ar: Vec<f64>,
    /// `m_k` for k = 1..; index 0 is unused.
    ma: Vec<f64>,
    mean: f64,
}

impl LagStructure {
    fn from_coefficients(coef: &SARIMACoefficients, period: usize) -> Self {
        let ar_poly = poly_mul(
            &lag_polynomial(&coef.ar, 1, -1.0),
            &lag_polynomial(&coef.seasonal_ar, period, -1.0),
        );
        let ma_poly = poly_mul(
            &lag_polynomial(&coef.ma, 1, 1.0),
            &lag_polynomial(&coef.seasonal_ma, period, 1.0),
        );
        Self {
            ar: ar_poly.iter().map(|c| -c).collect(),
            ma: ma_poly,
            mean: coef.mean,
        }
    }

    fn ar_order(&self) -> usize {
        self.ar.len().saturating_sub(1)
    }

    /// One-step prediction of `w_t` from the stored history.
    fn predict(&self, w: &[f64], e: &[f64], t: usize) -> f64 {
        let mut pred = self.mean;
        for (k, a) in self.ar.iter().enumerate().skip(1) {
            if t >= k {
                pred += a * (w[t - k] - self.mean);
            }
        }
        for (k, m) in self.ma.iter().enumerate().skip(1) {
            if t >= k {
                pred += m * e[t - k];
            }
        }
        pred
    }

    /// Conditional residuals; observations before the AR order are treated
    /// as given and get zero residuals.
    fn residuals(&self, w: &[f64]) -> Vec<f64> {
        let start = self.ar_order();
        let mut e = vec![0.0; w.len()];
        for t in start..w.len() {
            e[t] = w[t] - self.predict(w, &e, t);
        }
        e
    }
}

/// `1 + sign*(c_1 B^step + c_2 B^{2 step} + ...)`.
fn lag_polynomial(coefficients: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * step + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

/// Seasonal ARIMA forecaster.
///
/// SARIMA(p,d,q)(P,D,Q)\[s\] differences the series with
/// `(1-B)^d (1-B^s)^D` and models what remains as
/// `φ(B)Φ(B^s) w_t = θ(B)Θ(B^s) e_t`. Coefficients minimize the
/// conditional sum of squares; forecasts are the conditional mean with
/// future shocks set to zero, integrated back to the original scale.
///
/// # Example
/// ```
/// use aurum_forecast::core::TimeSeries;
/// use aurum_forecast::models::arima::{SARIMAConfig, SARIMA};
/// use aurum_forecast::models::Forecaster;
/// use chrono::{Months, TimeZone, Utc};
///
/// let base = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
/// let timestamps: Vec<_> = (0..48).map(|i| base + Months::new(i)).collect();
/// let values: Vec<f64> = (0..48)
///     .map(|i| 100.0 + i as f64 + [4.0, -2.0, 1.0, -3.0][i % 4])
///     .collect();
/// let ts = TimeSeries::new(timestamps, values).unwrap();
///
/// let mut model = SARIMA::new(SARIMAConfig::new((0, 1, 1), (0, 1, 1, 4)));
/// model.fit(&ts).unwrap();
/// let forecast = model.predict(4).unwrap();
/// assert_eq!(forecast.horizon(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct SARIMA {
    config: SARIMAConfig,
    coefficients: Option<SARIMACoefficients>,
    /// Cleaned training values (integration history).
    history: Option<Vec<f64>>,
    /// Series on the differenced scale.
    differenced: Option<Vec<f64>>,
    /// Conditional residuals on the differenced scale.
    innovations: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    sigma2: Option<f64>,
    aic: Option<f64>,
    bic: Option<f64>,
    iterations: usize,
}

impl SARIMA {
    /// Create an unfitted model.
    pub fn new(config: SARIMAConfig) -> Self {
        Self {
            config,
            coefficients: None,
            history: None,
            differenced: None,
            innovations: None,
            fitted: None,
            residuals: None,
            sigma2: None,
            aic: None,
            bic: None,
            iterations: 0,
        }
    }

    pub fn config(&self) -> &SARIMAConfig {
        &self.config
    }

    /// Estimated coefficients, once fitted.
    pub fn coefficients(&self) -> Option<&SARIMACoefficients> {
        self.coefficients.as_ref()
    }

    /// Innovation variance estimate.
    pub fn sigma2(&self) -> Option<f64> {
        self.sigma2
    }

    pub fn aic(&self) -> Option<f64> {
        self.aic
    }

    pub fn bic(&self) -> Option<f64> {
        self.bic
    }

    /// Optimizer iterations used by the last fit.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn unpack(&self, params: &[f64]) -> SARIMACoefficients {
        let c = &self.config;
        let mut offset = 0;
        let mut take = |n: usize| {
            let slice = params[offset..offset + n].to_vec();
            offset += n;
            slice
        };
        let ar = take(c.p);
        let seasonal_ar = take(c.seasonal_p);
        let ma = take(c.q);
        let seasonal_ma = take(c.seasonal_q);
        let mean = if c.has_mean() { take(1)[0] } else { 0.0 };
        SARIMACoefficients {
            ar,
            ma,
            seasonal_ar,
            seasonal_ma,
            mean,
        }
    }

    fn conditional_sum_of_squares(&self, w: &[f64], params: &[f64]) -> f64 {
        let lags = LagStructure::from_coefficients(&self.unpack(params), self.config.period);
        let start = lags.ar_order();
        if w.len() <= start {
            return f64::MAX;
        }
        lags.residuals(w)[start..].iter().map(|e| e * e).sum()
    }

    /// Estimate coefficients on the differenced series.
    fn estimate(&self, w: &[f64]) -> Result<(SARIMACoefficients, f64)> {
        let c = &self.config;
        let n_params = c.num_params();
        let mean = w.iter().sum::<f64>() / w.len() as f64;

        if n_params == 0 {
            let css = self.conditional_sum_of_squares(w, &[]);
            return Ok((SARIMACoefficients::default(), css));
        }

        let mut initial = Vec::with_capacity(n_params);
        let mut bounds = Vec::with_capacity(n_params);
        let ar_bound = if c.enforce_stationarity {
            (-COEFFICIENT_BOUND, COEFFICIENT_BOUND)
        } else {
            (f64::NEG_INFINITY, f64::INFINITY)
        };
        let ma_bound = if c.enforce_invertibility {
            (-COEFFICIENT_BOUND, COEFFICIENT_BOUND)
        } else {
            (f64::NEG_INFINITY, f64::INFINITY)
        };

        for i in 0..c.p {
            initial.push(0.1 / (i + 1) as f64);
            bounds.push(ar_bound);
        }
        for i in 0..c.seasonal_p {
            initial.push(0.1 / (i + 1) as f64);
            bounds.push(ar_bound);
        }
        for i in 0..c.q {
            initial.push(0.1 / (i + 1) as f64);
            bounds.push(ma_bound);
        }
        for i in 0..c.seasonal_q {
            initial.push(0.1 / (i + 1) as f64);
            bounds.push(ma_bound);
        }
        if c.has_mean() {
            initial.push(mean);
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }

        let config = NelderMeadConfig::default()
            .with_max_iter(c.max_iter)
            .with_tolerance(1e-10);

        let result = nelder_mead(
            |params| self.conditional_sum_of_squares(w, params),
            &initial,
            Some(&bounds),
            config,
        );

        debug!(
            iterations = result.iterations,
            converged = result.converged,
            css = result.optimal_value,
            "SARIMA estimation finished"
        );

        if !result.optimal_value.is_finite() || result.optimal_value == f64::MAX {
            return Err(ForecastError::model_fit(
                "conditional sum of squares is not finite",
            ));
        }
        if !result.converged {
            warn!(iterations = result.iterations, "SARIMA optimizer did not converge");
            return Err(ForecastError::ModelFit(format!(
                "optimizer did not converge within {} iterations",
                c.max_iter
            )));
        }

        Ok((self.unpack(&result.optimal_point), result.optimal_value))
    }
}

impl Default for SARIMA {
    fn default() -> Self {
        Self::new(SARIMAConfig::default())
    }
}

impl Forecaster for SARIMA {
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

        let poly = differencing_polynomial(
            self.config.d,
            self.config.seasonal_d,
            self.config.period,
        );
        let w = apply_polynomial(values, &poly);
        let (coefficients, css) = self.estimate(&w)?;

        let lags = LagStructure::from_coefficients(&coefficients, self.config.period);
        let start = lags.ar_order();
        let innovations = lags.residuals(&w);
        let n_eff = w.len().saturating_sub(start).max(1) as f64;
        let sigma2 = css / n_eff;

        // Gaussian conditional log-likelihood; sigma2 counts as a parameter.
        let k = (self.config.num_params() + 1) as f64;
        let ll = -0.5 * n_eff * (1.0 + (2.0 * std::f64::consts::PI * sigma2).ln());
        self.aic = Some(-2.0 * ll + 2.0 * k);
        self.bic = Some(-2.0 * ll + k * n_eff.ln());

        let degree = poly.len() - 1;
        let mut fitted = vec![f64::NAN; values.len()];
        let mut residuals = vec![f64::NAN; values.len()];
        for (j, e) in innovations.iter().enumerate().skip(start) {
            let t = j + degree;
            residuals[t] = *e;
            fitted[t] = values[t] - e;
        }

        debug!(
            model = %self.config_label(),
            sigma2,
            n = values.len(),
            "SARIMA fitted"
        );

        self.coefficients = Some(coefficients);
        self.history = Some(values.to_vec());
        self.differenced = Some(w);
        self.innovations = Some(innovations);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        self.sigma2 = Some(sigma2);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let coefficients = self.coefficients.as_ref().ok_or(ForecastError::FitRequired)?;
        let history = self.history.as_ref().ok_or(ForecastError::FitRequired)?;
        let w = self.differenced.as_ref().ok_or(ForecastError::FitRequired)?;
        let e = self.innovations.as_ref().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let lags = LagStructure::from_coefficients(coefficients, self.config.period);
        let mut extended_w = w.clone();
        let mut extended_e = e.clone();
        for _ in 0..horizon {
            let t = extended_w.len();
            let pred = lags.predict(&extended_w, &extended_e, t);
            extended_w.push(pred);
            extended_e.push(0.0);
        }

        let poly = differencing_polynomial(
            self.config.d,
            self.config.seasonal_d,
            self.config.period,
        );
        let predictions = integrate(&extended_w[w.len()..], history, &poly);
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
        "SARIMA"
    }

    /// `SARIMA(p,d,q)(P,D,Q)[s]`
    fn config_label(&self) -> String {
        let c = &self.config;
        format!(
            "SARIMA({},{},{})({},{},{})[{}]",
            c.p, c.d, c.q, c.seasonal_p, c.seasonal_d, c.seasonal_q, c.period
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_relative_eq;
    use chrono::{DateTime, Months, TimeZone, Utc};

    fn monthly(n: usize) -> Vec<DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| base + Months::new(i as u32)).collect()
    }

    fn seasonal_trend(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                100.0 + t + 5.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin()
            })
            .collect()
    }

    fn ar1_series(n: usize, phi: f64) -> Vec<f64> {
        // Deterministic pseudo-noise keeps the test reproducible.
        let mut state = 17u64;
        let mut y = vec![0.0; n];
        for t in 1..n {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let noise = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
            y[t] = phi * y[t - 1] + noise;
        }
        y
    }

    #[test]
    fn default_config_is_monthly_airline_like() {
        let c = SARIMAConfig::default();
        assert_eq!((c.p, c.d, c.q), (1, 1, 1));
        assert_eq!((c.seasonal_p, c.seasonal_d, c.seasonal_q, c.period), (0, 1, 1, 12));
        assert!(!c.enforce_stationarity);
        assert!(!c.has_mean());
        assert_eq!(c.min_observations(), 40);
        assert_eq!(c.num_params(), 3);
    }

    #[test]
    fn recovers_noiseless_seasonal_trend() {
        let values = seasonal_trend(72);
        let train = TimeSeries::new(monthly(60), values[..60].to_vec()).unwrap();

        let mut model = SARIMA::default();
        model.fit(&train).unwrap();
        let forecast = model.predict(12).unwrap();

        assert_eq!(forecast.horizon(), 12);
        for (pred, actual) in forecast.values().iter().zip(&values[60..]) {
            assert_relative_eq!(pred, actual, epsilon = 1e-6);
        }
        assert!(model.sigma2().unwrap() < 1e-12);
    }

    #[test]
    fn fitted_plus_residual_equals_actual() {
        let values = seasonal_trend(60);
        let noisy: Vec<f64> = values
            .iter()
            .enumerate()
            .map(|(i, v)| v + if i % 3 == 0 { 0.4 } else { -0.2 })
            .collect();
        let train = TimeSeries::new(monthly(60), noisy.clone()).unwrap();

        let mut model = SARIMA::default();
        model.fit(&train).unwrap();

        let fitted = model.fitted_values().unwrap();
        let residuals = model.residuals().unwrap();
        assert_eq!(fitted.len(), 60);
        assert!(fitted[..13].iter().all(|v| v.is_nan()));
        for t in 14..60 {
            assert_relative_eq!(fitted[t] + residuals[t], noisy[t], epsilon = 1e-9);
        }
        assert!(model.aic().unwrap().is_finite());
        assert!(model.bic().unwrap() > model.aic().unwrap());
    }

    #[test]
    fn estimates_ar1_coefficient() {
        let values = ar1_series(400, 0.7);
        let ts = TimeSeries::new(monthly(400), values).unwrap();

        let mut model = SARIMA::new(SARIMAConfig::new((1, 0, 0), (0, 0, 0, 12)));
        model.fit(&ts).unwrap();

        let coef = model.coefficients().unwrap();
        assert!((coef.ar[0] - 0.7).abs() < 0.1, "phi = {}", coef.ar[0]);
        assert!(coef.mean.abs() < 0.2);
    }

    #[test]
    fn enforced_coefficients_stay_bounded() {
        let values = ar1_series(200, 0.95);
        let ts = TimeSeries::new(monthly(200), values).unwrap();

        let config = SARIMAConfig::new((1, 0, 1), (0, 0, 0, 12)).with_enforcement(true, true);
        let mut model = SARIMA::new(config);
        model.fit(&ts).unwrap();

        let coef = model.coefficients().unwrap();
        assert!(coef.ar[0].abs() <= COEFFICIENT_BOUND);
        assert!(coef.ma[0].abs() <= COEFFICIENT_BOUND);
    }

    #[test]
    fn missing_values_are_dropped() {
        let mut values = seasonal_trend(61);
        values[30] = f64::NAN;
        let train = TimeSeries::new(monthly(61), values).unwrap();

        let mut model = SARIMA::default();
        assert!(model.fit(&train).is_ok());
        assert_eq!(model.fitted_values().unwrap().len(), 60);
    }

    #[test]
    fn insufficient_data_is_a_fit_error() {
        let train = TimeSeries::new(monthly(39), seasonal_trend(39)).unwrap();
        let err = SARIMA::default().fit(&train).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData {
                needed: 40,
                got: 39
            }
        ));
        assert_eq!(err.kind(), ErrorKind::ModelFit);
    }

    #[test]
    fn invalid_period() {
        let train = TimeSeries::new(monthly(60), seasonal_trend(60)).unwrap();

        let config = SARIMAConfig::new((1, 1, 1), (0, 1, 1, 1));
        let err = SARIMA::new(config).fit(&train).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);

        let config = SARIMAConfig::new((1, 1, 1), (0, 0, 0, 0));
        let err = SARIMA::new(config).fit(&train).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn iteration_cap_reports_model_fit() {
        let values = ar1_series(120, 0.5);
        let ts = TimeSeries::new(monthly(120), values).unwrap();

        let config = SARIMAConfig::new((2, 0, 2), (0, 0, 0, 12)).with_max_iter(2);
        let err = SARIMA::new(config).fit(&ts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelFit);
    }

    #[test]
    fn predict_requires_fit() {
        assert!(matches!(
            SARIMA::default().predict(3),
            Err(ForecastError::FitRequired)
        ));
    }

    #[test]
    fn zero_horizon() {
        let train = TimeSeries::new(monthly(60), seasonal_trend(60)).unwrap();
        let mut model = SARIMA::default();
        model.fit(&train).unwrap();
        assert!(model.predict(0).unwrap().is_empty());
    }

    #[test]
    fn label() {
        assert_eq!(SARIMA::default().config_label(), "SARIMA(1,1,1)(0,1,1)[12]");
        assert_eq!(SARIMA::default().name(), "SARIMA");

        let other = SARIMA::new(SARIMAConfig::new((0, 1, 1), (1, 0, 0, 4)));
        let producer: &dyn crate::models::ForecastProducer = &other;
        assert_eq!(producer.label(), "SARIMA(0,1,1)(1,0,0)[4]");
    }
}
