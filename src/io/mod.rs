//! Loading, cleaning and exporting price data.
//!
//! Price files are semicolon-separated with a `Date`/`datetime` column and
//! numeric `open`, `high`, `low`, `close`, `volume` columns:
//!
//! ```text
//! Date;Open;High;Low;Close;Volume
//! 2004.01.01;416.25;427.35;399.75;402.20;2120
//! ```

mod frame;
mod loader;
mod writer;

pub use frame::{quality_report, ColumnQuality, PriceFrame, QualityReport};
pub use loader::{load_price_csv, parse_timestamp, LoadOptions};
pub use writer::write_series_csv;
