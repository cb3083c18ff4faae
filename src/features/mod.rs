//! Return and rolling-window features of price series.
//!
//! # Example
//!
//! ```
//! use aurum_forecast::features::{rolling_mean, rolling_std};
//!
//! let returns = vec![0.01, -0.02, 0.015, 0.0, 0.005];
//! let mean = rolling_mean(&returns, 3);
//! let std = rolling_std(&returns, 3);
//! assert!(mean[1].is_nan());
//! assert!(std[4] > 0.0);
//! ```

mod returns;
mod window;

pub use returns::{
    add_returns_features, log_return, pct_return, ReturnsFeatures, RETURNS_WINDOW,
};
pub use window::{rolling_mean, rolling_std, rolling_var};
