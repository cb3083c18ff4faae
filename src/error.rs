//! Error types for the aurum-forecast library.

use thiserror::Error;

/// Result type alias for analysis and forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Coarse classification of a [`ForecastError`].
///
/// Callers that orchestrate experiments usually only care whether a failure
/// came from a bad configuration, a model that could not be fitted, or
/// misaligned inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad split size, model order, period or option.
    InvalidConfiguration,
    /// Optimizer failure, insufficient data or degenerate input.
    ModelFit,
    /// Forecast and actuals do not line up.
    Alignment,
    /// Malformed or missing data.
    Data,
    /// Filesystem, CSV, JSON or chart output failure.
    Io,
}

/// Errors that can occur during analysis and forecasting operations.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points to fit a model.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid configuration (split size, model order, period...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A model could not be fitted to the data.
    #[error("model fit failed: {0}")]
    ModelFit(String),

    /// Length mismatch between actual values and a forecast.
    #[error("alignment error: expected {expected} values, got {got}")]
    Alignment { expected: usize, got: usize },

    /// Same length but the timestamp index differs.
    #[error("alignment error: timestamp index differs at position {position}")]
    IndexMismatch { position: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// A field could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Chart rendering failed.
    #[error("render error: {0}")]
    Render(String),
}

impl ForecastError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            ForecastError::InsufficientData { .. }
            | ForecastError::ModelFit(_)
            | ForecastError::FitRequired => ErrorKind::ModelFit,
            ForecastError::Alignment { .. } | ForecastError::IndexMismatch { .. } => {
                ErrorKind::Alignment
            }
            ForecastError::EmptyData
            | ForecastError::TimestampError(_)
            | ForecastError::MissingValues
            | ForecastError::IndexOutOfBounds { .. }
            | ForecastError::Parse(_) => ErrorKind::Data,
            ForecastError::Io(_)
            | ForecastError::Csv(_)
            | ForecastError::Json(_)
            | ForecastError::Render(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        ForecastError::InvalidConfiguration(msg.into())
    }

    pub(crate) fn model_fit(msg: impl Into<String>) -> Self {
        ForecastError::ModelFit(msg.into())
    }
}
