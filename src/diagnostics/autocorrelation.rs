//! Sample autocorrelation and partial autocorrelation.
//!
//! Autocovariances use the biased (divide by `n`) estimator on the
//! demeaned series; partial autocorrelations solve the Yule-Walker
//! equations with the Durbin-Levinson recursion.

use crate::utils::stats::mean;

/// Returns the autocorrelation at a specific lag.
///
/// # Arguments
/// * `series` - Input time series
/// * `lag` - Lag value
pub fn autocorrelation(series: &[f64], lag: usize) -> f64 {
    if series.len() <= lag {
        return f64::NAN;
    }

    let m = mean(series);

    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (i, &x) in series.iter().enumerate() {
        denominator += (x - m).powi(2);
        if i >= lag {
            numerator += (x - m) * (series[i - lag] - m);
        }
    }

    if denominator < 1e-10 {
        return 0.0;
    }

    numerator / denominator
}

/// Autocorrelations for lags `0..=max_lag`.
///
/// Returns an empty vector when the series is not longer than `max_lag`.
pub fn acf_values(series: &[f64], max_lag: usize) -> Vec<f64> {
    if series.len() <= max_lag {
        return vec![];
    }
    (0..=max_lag).map(|k| autocorrelation(series, k)).collect()
}

/// Partial autocorrelations for lags `0..=max_lag` from the autocorrelations
/// `acf[0..=max_lag]`.
///
/// Lags past a numerically singular step are reported as NaN.
pub fn pacf_from_acf(acf: &[f64]) -> Vec<f64> {
    if acf.is_empty() {
        return vec![];
    }
    let max_lag = acf.len() - 1;
    let mut pacf = vec![f64::NAN; max_lag + 1];
    pacf[0] = 1.0;
    if max_lag == 0 {
        return pacf;
    }

    // Durbin-Levinson: phi holds the AR(k-1) coefficients, 1-based.
    let mut phi = vec![0.0; max_lag + 1];
    phi[1] = acf[1];
    pacf[1] = acf[1];

    for k in 2..=max_lag {
        let mut num = acf[k];
        let mut denom = 1.0;
        for j in 1..k {
            num -= phi[j] * acf[k - j];
            denom -= phi[j] * acf[j];
        }

        if denom.abs() < 1e-10 {
            break;
        }

        let phi_kk = num / denom;
        let previous = phi.clone();
        for j in 1..k {
            phi[j] = previous[j] - phi_kk * previous[k - j];
        }
        phi[k] = phi_kk;
        pacf[k] = phi_kk;
    }

    pacf
}

/// Returns the partial autocorrelation at a specific lag.
///
/// # Arguments
/// * `series` - Input time series
/// * `lag` - Lag value
pub fn partial_autocorrelation(series: &[f64], lag: usize) -> f64 {
    if lag == 0 {
        return 1.0;
    }
    let acf = acf_values(series, lag);
    if acf.is_empty() || acf.iter().any(|x| x.is_nan()) {
        return f64::NAN;
    }
    pacf_from_acf(&acf)[lag]
}
