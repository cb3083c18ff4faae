//! Forecast comparison data and its renderers.
//!
//! [`Comparison`] only holds data. [`render_table`] turns it into text and
//! [`render_svg`] into a chart; the regime and decomposition renderers
//! cover the diagnostic views.

mod chart;
mod comparison;

pub use chart::{
    render_decomposition_svg, render_regime_svg, render_svg, render_zscore_svg, ChartOptions,
};
pub use comparison::{Comparison, ForecastEntry};

use std::fmt::Write;

/// Fixed-width text table with one row of metrics per forecast.
///
/// ```
/// use aurum_forecast::report::{render_table, Comparison};
/// use aurum_forecast::core::TimeSeries;
/// use chrono::{TimeZone, Utc};
///
/// let ts = vec![Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()];
/// let series = TimeSeries::new(ts, vec![1.0]).unwrap();
/// let table = render_table(&Comparison::new(series.clone(), series));
/// assert!(table.starts_with("model"));
/// ```
pub fn render_table(comparison: &Comparison) -> String {
    let width = comparison
        .entries()
        .iter()
        .map(|e| e.label.len())
        .chain(std::iter::once("model".len()))
        .max()
        .unwrap_or(5);

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "{:<width$}  {:>12}  {:>12}  {:>10}",
        "model",
        "MAE",
        "RMSE",
        "MAPE(%)",
        width = width
    );
    for entry in comparison.entries() {
        let m = &entry.metrics;
        let _ = writeln!(
            out,
            "{:<width$}  {:>12.4}  {:>12.4}  {:>10.4}",
            entry.label,
            m.mae,
            m.rmse,
            m.mape,
            width = width
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimeSeries;
    use crate::utils::MetricSet;
    use chrono::{Months, TimeZone, Utc};

    fn monthly(start: u32, values: Vec<f64>) -> TimeSeries {
        let base = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        let ts = (0..values.len() as u32)
            .map(|i| base + Months::new(start + i))
            .collect();
        TimeSeries::new(ts, values).unwrap()
    }

    fn sample() -> Comparison {
        let train = monthly(0, (0..24).map(|i| 100.0 + i as f64).collect());
        let test = monthly(24, vec![124.0, 125.0, 126.0]);
        let mut c = Comparison::new(train, test);
        c.add(
            "SARIMA",
            monthly(24, vec![124.5, 125.5, 126.5]),
            MetricSet {
                mae: 0.5,
                rmse: 0.5,
                mape: 0.4,
            },
        )
        .unwrap();
        c.add(
            "Holt-Winters",
            monthly(24, vec![123.0, 124.0, 125.0]),
            MetricSet {
                mae: 1.0,
                rmse: 1.0,
                mape: 0.8,
            },
        )
        .unwrap();
        c
    }

    #[test]
    fn table_has_a_row_per_forecast() {
        let table = render_table(&sample());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("RMSE"));
        assert!(lines[1].starts_with("SARIMA"));
        assert!(lines[1].contains("0.5000"));
        assert!(lines[2].starts_with("Holt-Winters"));
        // Columns line up.
        assert_eq!(lines[1].len(), lines[2].len());
    }

    #[test]
    fn svg_chart_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baselines.svg");
        render_svg(&sample(), &path, &ChartOptions::default()).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Baselines forecast comparison"));
        assert!(svg.contains("Holt-Winters"));
    }

    #[test]
    fn regime_chart_is_written() {
        let series = monthly(0, (0..48).map(|i| 100.0 + (i as f64 * 0.4).sin() * 5.0).collect());
        let stats = crate::regimes::rolling_stats(&series, &[6, 12]).unwrap();
        let vol = crate::regimes::realized_vol(&series, 12).unwrap();
        let table = crate::regimes::zscore_regimes(&series, 12, 1.0).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let regime = dir.path().join("regimes.svg");
        let zscore = dir.path().join("zscore.svg");
        let options = ChartOptions::default().with_title("Regime & Volatility overview");
        render_regime_svg(&stats, &vol, &regime, &options).unwrap();
        render_zscore_svg(&table, &zscore, &options.clone().with_size(800, 300)).unwrap();

        assert!(std::fs::read_to_string(&regime).unwrap().contains("Rolling mean 12"));
        assert!(zscore.exists());
    }
}
