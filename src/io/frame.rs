//! Column-oriented price table with a shared timestamp index.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;

/// A table of numeric price columns (open, high, low, close, volume...)
/// sharing one strictly increasing timestamp index.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceFrame {
    timestamps: Vec<DateTime<Utc>>,
    columns: Vec<(String, Vec<f64>)>,
}

impl PriceFrame {
    /// Build a frame, checking column lengths and index ordering.
    pub fn new(timestamps: Vec<DateTime<Utc>>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        for (name, values) in &columns {
            if values.len() != timestamps.len() {
                return Err(ForecastError::invalid_config(format!(
                    "column '{}' has {} values for {} timestamps",
                    name,
                    values.len(),
                    timestamps.len()
                )));
            }
        }
        if let Some(i) = (1..timestamps.len()).find(|&i| timestamps[i] <= timestamps[i - 1]) {
            return Err(ForecastError::TimestampError(format!(
                "timestamps must be strictly increasing (position {})",
                i
            )));
        }
        Ok(Self {
            timestamps,
            columns,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Column names in file order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.values(name).is_some()
    }

    /// Raw values of a column.
    pub fn values(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// A column as a named [`TimeSeries`].
    pub fn column(&self, name: &str) -> Result<TimeSeries> {
        let values = self.values(name).ok_or_else(|| {
            ForecastError::invalid_config(format!("column '{}' not found in frame", name))
        })?;
        Ok(TimeSeries::new(self.timestamps.clone(), values.to_vec())?.with_name(name))
    }

    /// The `close` column.
    pub fn close(&self) -> Result<TimeSeries> {
        self.column("close")
    }
}

/// Per-column data quality summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnQuality {
    pub name: String,
    /// Missing (NaN) cells.
    pub missing: usize,
    /// Distinct non-missing values.
    pub unique: usize,
}

/// Data quality summary of a [`PriceFrame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityReport {
    pub rows: usize,
    pub columns: Vec<ColumnQuality>,
}

impl QualityReport {
    /// Total missing cells over all columns.
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rows: {}", self.rows)?;
        writeln!(f, "{:<12} {:>8} {:>8}", "column", "missing", "unique")?;
        for c in &self.columns {
            writeln!(f, "{:<12} {:>8} {:>8}", c.name, c.missing, c.unique)?;
        }
        Ok(())
    }
}

/// Count missing and distinct values per column.
pub fn quality_report(frame: &PriceFrame) -> QualityReport {
    let columns = frame
        .columns
        .iter()
        .map(|(name, values)| {
            let missing = values.iter().filter(|v| v.is_nan()).count();
            let unique = values
                .iter()
                .filter(|v| !v.is_nan())
                // -0.0 and 0.0 count as one value
                .map(|v| (v + 0.0).to_bits())
                .collect::<HashSet<_>>()
                .len();
            ColumnQuality {
                name: name.clone(),
                missing,
                unique,
            }
        })
        .collect();

    QualityReport {
        rows: frame.len(),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn frame() -> PriceFrame {
        let base = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let ts = (0..4).map(|i| base + Duration::days(i)).collect();
        PriceFrame::new(
            ts,
            vec![
                ("open".to_string(), vec![1.0, 1.0, f64::NAN, 2.0]),
                ("close".to_string(), vec![1.5, 2.5, 3.5, 4.5]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn column_access() {
        let f = frame();
        assert_eq!(f.len(), 4);
        assert_eq!(f.column_names(), vec!["open", "close"]);
        let close = f.close().unwrap();
        assert_eq!(close.values(), &[1.5, 2.5, 3.5, 4.5]);
        assert_eq!(close.name(), Some("close"));
        assert_eq!(close.timestamps(), f.timestamps());
    }

    #[test]
    fn missing_column_is_a_configuration_error() {
        let err = frame().column("volume").unwrap_err();
        assert!(matches!(err, ForecastError::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_ragged_columns() {
        let base = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let result = PriceFrame::new(vec![base], vec![("close".to_string(), vec![1.0, 2.0])]);
        assert!(result.is_err());
    }

    #[test]
    fn quality_counts() {
        let report = quality_report(&frame());
        assert_eq!(report.rows, 4);
        assert_eq!(report.columns[0].missing, 1);
        assert_eq!(report.columns[0].unique, 2);
        assert_eq!(report.columns[1].unique, 4);
        assert_eq!(report.total_missing(), 1);
        assert!(report.to_string().contains("open"));
    }
}
