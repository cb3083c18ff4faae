//! Trailing rolling-window statistics.
//!
//! A value is produced only once the window is full and contains no
//! missing observations; every other position is NaN.

/// Compute rolling mean (moving average).
///
/// # Arguments
/// * `series` - Input values
/// * `window` - Window size
pub fn rolling_mean(series: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(series, window, |s| s.iter().sum::<f64>() / s.len() as f64)
}

/// Compute rolling sample variance (n-1 denominator).
pub fn rolling_var(series: &[f64], window: usize) -> Vec<f64> {
    if window < 2 {
        return vec![f64::NAN; series.len()];
    }
    rolling_apply(series, window, |s| {
        let mean = s.iter().sum::<f64>() / s.len() as f64;
        s.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (s.len() - 1) as f64
    })
}

/// Compute rolling sample standard deviation.
pub fn rolling_std(series: &[f64], window: usize) -> Vec<f64> {
    rolling_var(series, window).iter().map(|v| v.sqrt()).collect()
}

/// Generic trailing rolling window application.
fn rolling_apply<F>(series: &[f64], window: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let n = series.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }

    for end in window..=n {
        let segment = &series[end - window..end];
        if segment.iter().all(|v| v.is_finite()) {
            result[end - 1] = f(segment);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rolling_mean_trailing() {
        let result = rolling_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_relative_eq!(result[2], 2.0);
        assert_relative_eq!(result[3], 3.0);
        assert_relative_eq!(result[4], 4.0);
    }

    #[test]
    fn rolling_std_sample() {
        let result = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        // sample variance of the classic example is 32/7
        assert_relative_eq!(result[7], (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
        assert!(result[..7].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn missing_value_poisons_its_windows() {
        let result = rolling_mean(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_relative_eq!(result[3], 3.5);
        assert_relative_eq!(result[4], 4.5);
    }

    #[test]
    fn degenerate_windows() {
        assert!(rolling_mean(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
        assert!(rolling_mean(&[1.0, 2.0], 3).iter().all(|v| v.is_nan()));
        assert!(rolling_std(&[1.0, 2.0, 3.0], 1).iter().all(|v| v.is_nan()));
        assert!(rolling_mean(&[], 3).is_empty());
    }
}
