//! Univariate time series with a strictly increasing timestamp index.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Duration, Months, Utc};
use std::collections::HashMap;

/// Policy for handling missing values (NaN/Inf).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingValuePolicy {
    /// Drop observations with missing values.
    Drop,
    /// Fill with a specific value.
    Fill(f64),
    /// Forward fill (use previous valid value).
    ForwardFill,
    /// Return error if missing values found.
    Error,
}

/// Spacing between consecutive observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// Calendar months (1 = monthly, 3 = quarterly, 12 = yearly).
    Months(u32),
    /// Fixed duration (daily, hourly...).
    Fixed(Duration),
}

impl Frequency {
    /// Advance a timestamp by `steps` periods.
    pub fn advance(&self, from: DateTime<Utc>, steps: u32) -> Result<DateTime<Utc>> {
        match *self {
            Frequency::Months(m) => from
                .checked_add_months(Months::new(m * steps))
                .ok_or_else(|| {
                    ForecastError::TimestampError("timestamp overflow".to_string())
                }),
            Frequency::Fixed(d) => from
                .checked_add_signed(d * steps as i32)
                .ok_or_else(|| {
                    ForecastError::TimestampError("timestamp overflow".to_string())
                }),
        }
    }
}

/// A univariate time series: ordered `(timestamp, value)` pairs.
///
/// Missing observations are represented as `NaN`. The series owns its data;
/// models and evaluators only read it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    name: Option<String>,
}

impl TimeSeries {
    /// Create a series, validating that timestamps are strictly increasing
    /// and match the number of values.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::Alignment {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(ForecastError::TimestampError(format!(
                    "timestamps must be strictly increasing (position {})",
                    i
                )));
            }
        }

        Ok(Self {
            timestamps,
            values,
            name: None,
        })
    }

    /// Alias of [`TimeSeries::new`].
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        Self::new(timestamps, values)
    }

    /// Attach a name (column label) to the series.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// First timestamp, if any.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.timestamps.first().copied()
    }

    /// Last timestamp, if any.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Iterate over `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Extract observations `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::invalid_config("start must be <= end"));
        }
        if end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }

        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            name: self.name.clone(),
        })
    }

    /// Last `n` observations (or the whole series if shorter).
    pub fn tail(&self, n: usize) -> TimeSeries {
        let start = self.len().saturating_sub(n);
        TimeSeries {
            timestamps: self.timestamps[start..].to_vec(),
            values: self.values[start..].to_vec(),
            name: self.name.clone(),
        }
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Number of missing values (NaN or Inf).
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_finite()).count()
    }

    /// Return a sanitized copy with missing values handled.
    pub fn sanitized(&self, policy: MissingValuePolicy) -> Result<TimeSeries> {
        match policy {
            MissingValuePolicy::Error => {
                if self.has_missing_values() {
                    return Err(ForecastError::MissingValues);
                }
                Ok(self.clone())
            }
            MissingValuePolicy::Drop => {
                let (timestamps, values) = self.iter().filter(|(_, v)| v.is_finite()).unzip();
                Ok(TimeSeries {
                    timestamps,
                    values,
                    name: self.name.clone(),
                })
            }
            MissingValuePolicy::Fill(fill_value) => Ok(self.map_values(|v| {
                if v.is_finite() {
                    v
                } else {
                    fill_value
                }
            })),
            MissingValuePolicy::ForwardFill => {
                let mut last_valid = None;
                let values = self
                    .values
                    .iter()
                    .map(|&v| {
                        if v.is_finite() {
                            last_valid = Some(v);
                            v
                        } else {
                            last_valid.unwrap_or(v)
                        }
                    })
                    .collect();
                Ok(TimeSeries {
                    timestamps: self.timestamps.clone(),
                    values,
                    name: self.name.clone(),
                })
            }
        }
    }

    /// Same index, values transformed element-wise.
    pub fn map_values<F>(&self, f: F) -> TimeSeries
    where
        F: Fn(f64) -> f64,
    {
        TimeSeries {
            timestamps: self.timestamps.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
            name: self.name.clone(),
        }
    }

    /// Replace the values, keeping the index. Lengths must match.
    pub fn with_values(&self, values: Vec<f64>) -> Result<TimeSeries> {
        if values.len() != self.len() {
            return Err(ForecastError::Alignment {
                expected: self.len(),
                got: values.len(),
            });
        }
        Ok(TimeSeries {
            timestamps: self.timestamps.clone(),
            values,
            name: self.name.clone(),
        })
    }

    /// Natural logarithm of each value. Non-positive values become NaN.
    pub fn ln(&self) -> TimeSeries {
        self.map_values(|v| if v > 0.0 { v.ln() } else { f64::NAN })
    }

    /// Lagged first difference `y_t - y_{t-1}`; the first value is NaN.
    pub fn diff(&self) -> TimeSeries {
        let mut values = Vec::with_capacity(self.len());
        for i in 0..self.len() {
            if i == 0 {
                values.push(f64::NAN);
            } else {
                values.push(self.values[i] - self.values[i - 1]);
            }
        }
        TimeSeries {
            timestamps: self.timestamps.clone(),
            values,
            name: self.name.clone(),
        }
    }

    /// Infer the observation frequency from the timestamp spacing.
    ///
    /// Series whose consecutive timestamps fall on the same day of
    /// consecutive months (or month ends) are reported as calendar monthly
    /// spacing; everything else uses the modal spacing, which must cover at
    /// least `tolerance` of all gaps.
    pub fn infer_frequency(&self, tolerance: f64) -> Result<Frequency> {
        if self.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: self.len(),
            });
        }

        if let Some(months) = self.calendar_month_step() {
            return Ok(Frequency::Months(months));
        }

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for w in self.timestamps.windows(2) {
            *counts.entry((w[1] - w[0]).num_seconds()).or_insert(0) += 1;
        }

        let (modal_diff, modal_count) = counts
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(&diff, &count)| (diff, count))
            .ok_or_else(|| ForecastError::TimestampError("empty spacing data".to_string()))?;

        let total: usize = counts.values().sum();
        if (modal_count as f64 / total as f64) < tolerance {
            return Err(ForecastError::TimestampError(
                "no unique modal spacing found".to_string(),
            ));
        }

        Ok(Frequency::Fixed(Duration::seconds(modal_diff)))
    }

    /// Constant month step between observations anchored on the same day,
    /// if there is one.
    fn calendar_month_step(&self) -> Option<u32> {
        let month_index = |t: &DateTime<Utc>| t.year() * 12 + t.month0() as i32;
        let first = &self.timestamps[0];
        let step = month_index(&self.timestamps[1]) - month_index(first);
        if step <= 0 {
            return None;
        }

        let same_anchor = self.timestamps.iter().all(|t| {
            t.day() == first.day() || (first.day() >= 28 && is_month_end(t))
        });
        if !same_anchor {
            return None;
        }

        let constant = self
            .timestamps
            .windows(2)
            .all(|w| month_index(&w[1]) - month_index(&w[0]) == step);
        constant.then_some(step as u32)
    }

    /// Timestamps for the `horizon` periods following the last observation.
    pub fn future_timestamps(&self, horizon: usize) -> Result<Vec<DateTime<Utc>>> {
        let last = self.end().ok_or(ForecastError::EmptyData)?;
        let frequency = self.infer_frequency(0.5)?;
        (1..=horizon)
            .map(|h| frequency.advance(last, h as u32))
            .collect()
    }
}

fn is_month_end(t: &DateTime<Utc>) -> bool {
    t.checked_add_signed(Duration::days(1))
        .map(|next| next.month() != t.month())
        .unwrap_or(false)
}
