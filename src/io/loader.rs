//! Semicolon-separated price file loader.

use crate::error::{ForecastError, Result};
use crate::io::PriceFrame;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

const DATE_FORMATS: [&str; 3] = ["%Y.%m.%d", "%Y-%m-%d", "%Y/%m/%d"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Options for [`load_price_csv`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Field separator.
    pub delimiter: u8,
    /// Candidate names of the timestamp column, matched after lowercasing.
    pub date_columns: Vec<String>,
    /// Columns coerced to numbers; the ones absent from the file are skipped.
    pub numeric_columns: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            date_columns: vec!["date".to_string(), "datetime".to_string()],
            numeric_columns: ["open", "high", "low", "close", "volume"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl LoadOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_numeric_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

/// Parse a timestamp in one of the supported layouts.
///
/// Accepts `YYYY.MM.DD`, `YYYY-MM-DD` and `YYYY/MM/DD`, each optionally
/// followed by `HH:MM` or `HH:MM:SS`, as well as RFC 3339. Naive values are
/// taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for date in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, date) {
            return d.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
        for time in TIME_FORMATS {
            for sep in [" ", "T"] {
                let format = format!("{}{}{}", date, sep, time);
                if let Ok(naive) = NaiveDateTime::parse_from_str(raw, &format) {
                    return Some(naive.and_utc());
                }
            }
        }
    }
    None
}

fn parse_number(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return f64::NAN;
    }
    raw.parse::<f64>().unwrap_or(f64::NAN)
}

/// Hashable identity of a row; all NaNs share one bit pattern.
fn row_key(ts: DateTime<Utc>, values: &[f64]) -> (DateTime<Utc>, Vec<u64>) {
    let bits = values
        .iter()
        .map(|v| if v.is_nan() { f64::NAN.to_bits() } else { v.to_bits() })
        .collect();
    (ts, bits)
}

/// Load a price file into a [`PriceFrame`].
///
/// Header names are trimmed and lowercased. Cleaning steps, in order:
/// rows with an unparsable timestamp are dropped, numeric fields that do
/// not parse become NaN, rows whose numeric fields are all missing are
/// dropped, exact duplicate rows are dropped, rows are sorted by time and
/// for a repeated timestamp the row appearing last in the file wins.
pub fn load_price_csv<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<PriceFrame> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let date_idx = options
        .date_columns
        .iter()
        .find_map(|candidate| headers.iter().position(|h| h == candidate))
        .ok_or_else(|| {
            ForecastError::invalid_config(format!(
                "no timestamp column among {:?} in {}",
                options.date_columns,
                path.display()
            ))
        })?;

    let numeric: Vec<(String, usize)> = options
        .numeric_columns
        .iter()
        .filter_map(|name| {
            let name = name.to_lowercase();
            headers.iter().position(|h| *h == name).map(|i| (name, i))
        })
        .collect();
    if numeric.is_empty() {
        return Err(ForecastError::invalid_config(format!(
            "none of the numeric columns {:?} found in {}",
            options.numeric_columns,
            path.display()
        )));
    }

    let mut rows: Vec<(DateTime<Utc>, Vec<f64>)> = Vec::new();
    let mut seen = HashSet::new();
    let mut bad_dates = 0usize;
    let mut empty_rows = 0usize;
    let mut duplicates = 0usize;

    for record in rdr.records() {
        let record = record?;
        let Some(ts) = record.get(date_idx).and_then(parse_timestamp) else {
            bad_dates += 1;
            continue;
        };
        let values: Vec<f64> = numeric
            .iter()
            .map(|(_, i)| record.get(*i).map_or(f64::NAN, parse_number))
            .collect();
        if values.iter().all(|v| v.is_nan()) {
            empty_rows += 1;
            continue;
        }
        if !seen.insert(row_key(ts, &values)) {
            duplicates += 1;
            continue;
        }
        rows.push((ts, values));
    }

    if bad_dates > 0 {
        warn!(rows = bad_dates, "dropped rows with unparsable timestamps");
    }
    if empty_rows > 0 {
        debug!(rows = empty_rows, "dropped rows without numeric values");
    }
    if duplicates > 0 {
        debug!(rows = duplicates, "dropped duplicate rows");
    }

    // Stable sort keeps file order among equal timestamps, so the last
    // occurrence is the one that survives the dedup below.
    rows.sort_by_key(|(ts, _)| *ts);
    let mut deduped: Vec<(DateTime<Utc>, Vec<f64>)> = Vec::with_capacity(rows.len());
    let mut replaced = 0usize;
    for row in rows {
        match deduped.last_mut() {
            Some(last) if last.0 == row.0 => {
                *last = row;
                replaced += 1;
            }
            _ => deduped.push(row),
        }
    }
    if replaced > 0 {
        warn!(rows = replaced, "repeated timestamps, keeping the last row");
    }

    let timestamps: Vec<DateTime<Utc>> = deduped.iter().map(|(ts, _)| *ts).collect();
    let columns = numeric
        .iter()
        .enumerate()
        .map(|(j, (name, _))| (name.clone(), deduped.iter().map(|(_, v)| v[j]).collect()))
        .collect();

    info!(path = %path.display(), rows = timestamps.len(), "loaded price file");
    PriceFrame::new(timestamps, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn parses_supported_layouts() {
        let expected = Utc.with_ymd_and_hms(2021, 3, 4, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2021.03.04"), Some(expected));
        assert_eq!(parse_timestamp("2021-03-04"), Some(expected));
        assert_eq!(parse_timestamp(" 2021/03/04 "), Some(expected));

        let with_time = parse_timestamp("2021.03.04 13:45").unwrap();
        assert_eq!((with_time.hour(), with_time.minute()), (13, 45));
        let with_secs = parse_timestamp("2021-03-04T13:45:10").unwrap();
        assert_eq!(with_secs.second(), 10);

        let rfc = parse_timestamp("2021-03-04T12:00:00+02:00").unwrap();
        assert_eq!(rfc.hour(), 10);
        assert_eq!(rfc.day(), 4);
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2021.13.40"), None);
    }

    #[test]
    fn numbers_coerce_to_nan() {
        assert_eq!(parse_number(" 12.5 "), 12.5);
        assert!(parse_number("n/a").is_nan());
        assert!(parse_number("").is_nan());
    }

    #[test]
    fn duplicate_rows_compare_missing_as_equal() {
        let ts = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(row_key(ts, &[1.0, f64::NAN]), row_key(ts, &[1.0, -f64::NAN]));
        assert_ne!(row_key(ts, &[1.0, f64::NAN]), row_key(ts, &[1.0, 2.0]));
    }
}
