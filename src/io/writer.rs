//! Export of aligned series to delimited text.

use crate::core::TimeSeries;
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::path::Path;

/// Write several series side by side, one row per timestamp.
///
/// Rows cover the union of the indexes; a series without a value at a
/// timestamp leaves its cell empty. The output uses the same `;` layout the
/// loader reads, with a `date` column first.
pub fn write_series_csv<P: AsRef<Path>>(path: P, series: &[(&str, &TimeSeries)]) -> Result<()> {
    let mut rows: BTreeMap<DateTime<Utc>, Vec<Option<f64>>> = BTreeMap::new();
    for (j, (_, s)) in series.iter().enumerate() {
        for (ts, value) in s.iter() {
            let row = rows.entry(ts).or_insert_with(|| vec![None; series.len()]);
            row[j] = Some(value);
        }
    }

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path.as_ref())?;

    let mut header = vec!["date".to_string()];
    header.extend(series.iter().map(|(label, _)| label.to_string()));
    wtr.write_record(&header)?;

    for (ts, values) in rows {
        let mut record = vec![ts.to_rfc3339_opts(SecondsFormat::Secs, true)];
        record.extend(values.into_iter().map(|v| match v {
            Some(x) if !x.is_nan() => x.to_string(),
            _ => String::new(),
        }));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
