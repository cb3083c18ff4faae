//! Differencing utilities for seasonal ARIMA models.
//!
//! Non-seasonal and seasonal differencing are both expressed as one lag
//! polynomial `(1-B)^d (1-B^s)^D`, so a forecast made on the differenced
//! scale can be integrated back with a single recursion.

/// Apply differencing to a time series.
///
/// # Arguments
/// * `series` - The input series
/// * `d` - Differencing order (number of times to difference)
///
/// # Returns
/// The differenced series.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || series.is_empty() {
        return series.to_vec();
    }

    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            break;
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply seasonal differencing to a time series.
///
/// # Arguments
/// * `series` - The input series
/// * `d` - Seasonal differencing order
/// * `period` - Seasonal period
///
/// # Returns
/// The seasonally differenced series.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if d == 0 || period == 0 || series.len() <= period {
        return series.to_vec();
    }

    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            break;
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Multiply two lag polynomials given by their coefficients, lowest lag first.
pub(crate) fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return vec![];
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Coefficients of `(1-B)^d (1-B^period)^seasonal_d`, lowest lag first.
///
/// The leading coefficient is always 1 and the polynomial has degree
/// `d + period * seasonal_d`.
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_d {
            poly = poly_mul(&poly, &seasonal);
        }
    }
    poly
}

/// Apply a differencing polynomial: `w_t = Σ c_k y_{t-k}`.
///
/// The first `poly.len() - 1` observations have no complete history and
/// are dropped, so the result is shorter than the input by the polynomial
/// degree.
pub fn apply_polynomial(series: &[f64], poly: &[f64]) -> Vec<f64> {
    let degree = poly.len().saturating_sub(1);
    if poly.is_empty() || series.len() <= degree {
        return vec![];
    }
    (degree..series.len())
        .map(|t| {
            poly.iter()
                .enumerate()
                .map(|(k, c)| c * series[t - k])
                .sum()
        })
        .collect()
}

/// Integrate values forecast on the differenced scale back to levels.
///
/// Inverts [`apply_polynomial`] one step at a time:
/// `y_t = w_t - Σ_{k≥1} c_k y_{t-k}`, seeded with the observed `history`.
/// The history must cover at least the polynomial degree.
pub fn integrate(differenced: &[f64], history: &[f64], poly: &[f64]) -> Vec<f64> {
    let mut extended = history.to_vec();
    let mut out = Vec::with_capacity(differenced.len());

    for &w in differenced {
        let t = extended.len();
        let mut y = w;
        for (k, c) in poly.iter().enumerate().skip(1) {
            if t >= k {
                y -= c * extended[t - k];
            }
        }
        extended.push(y);
        out.push(y);
    }

    out
}
