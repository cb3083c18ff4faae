//! Experiment configuration for the monthly analysis pipeline.
//!
//! Every field has a default, so a JSON file only needs the keys it
//! changes:
//!
//! ```
//! use aurum_forecast::config::ExperimentConfig;
//!
//! let cfg: ExperimentConfig = serde_json::from_str(r#"{"test_size": 12}"#).unwrap();
//! assert_eq!(cfg.test_size, 12);
//! assert_eq!(cfg.column, "close");
//! ```
//!
//! `period` is the seasonal period of the whole run: STL and both models
//! use it. A file that sets `period` without a model-level period passes it
//! on to the models, and [`ExperimentConfig::validate`] rejects a seasonal
//! model whose period disagrees.

use crate::error::{ForecastError, Result};
use crate::models::{HoltWintersConfig, SARIMAConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Price column to analyze.
    pub column: String,
    /// Held-out observations at the end of the series.
    pub test_size: usize,
    /// Seasonal period shared by STL, SARIMA and Holt-Winters.
    pub period: usize,
    /// Largest lag of the correlogram.
    pub max_lag: usize,
    /// Windows of the rolling statistics.
    pub rolling_windows: Vec<usize>,
    /// Window of the realized volatility.
    pub vol_window: usize,
    pub zscore_window: usize,
    pub zscore_threshold: f64,
    pub sarima: SARIMAConfig,
    pub holt_winters: HoltWintersConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            column: "close".to_string(),
            test_size: 24,
            period: 12,
            max_lag: 48,
            rolling_windows: vec![12, 24],
            vol_window: 12,
            zscore_window: 24,
            zscore_threshold: 1.0,
            sarima: SARIMAConfig::default(),
            holt_winters: HoltWintersConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Read a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(text)?;
        let mut config: Self = serde_json::from_value(raw.clone())?;
        if raw.get("period").is_some() {
            if raw.pointer("/sarima/period").is_none() {
                config.sarima.period = config.period;
            }
            if raw.pointer("/holt_winters/seasonal_periods").is_none() {
                config.holt_winters.seasonal_periods = config.period;
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Set the seasonal period of STL and both models.
    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self.sarima.period = period;
        self.holt_winters.seasonal_periods = period;
        self
    }

    /// Apply command-line overrides on top of this configuration and
    /// validate the result.
    pub fn apply(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(v) = overrides.column {
            self.column = v;
        }
        if let Some(v) = overrides.test_size {
            self.test_size = v;
        }
        if let Some(v) = overrides.period {
            self = self.with_period(v);
        }
        if let Some(v) = overrides.max_lag {
            self.max_lag = v;
        }
        if let Some(v) = overrides.zscore_window {
            self.zscore_window = v;
        }
        if let Some(v) = overrides.zscore_threshold {
            self.zscore_threshold = v;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check the values that no downstream step validates on its own.
    pub fn validate(&self) -> Result<()> {
        if self.column.trim().is_empty() {
            return Err(ForecastError::invalid_config("column must not be empty"));
        }
        if self.test_size == 0 {
            return Err(ForecastError::invalid_config("test_size must be positive"));
        }
        if self.period < 2 {
            return Err(ForecastError::invalid_config(format!(
                "period must be at least 2, got {}",
                self.period
            )));
        }
        if self.max_lag == 0 {
            return Err(ForecastError::invalid_config("max_lag must be positive"));
        }
        if self.sarima.is_seasonal() && self.sarima.period != self.period {
            return Err(ForecastError::InvalidConfiguration(format!(
                "sarima.period {} disagrees with period {}",
                self.sarima.period, self.period
            )));
        }
        if self.holt_winters.is_seasonal() && self.holt_winters.seasonal_periods != self.period {
            return Err(ForecastError::InvalidConfiguration(format!(
                "holt_winters.seasonal_periods {} disagrees with period {}",
                self.holt_winters.seasonal_periods, self.period
            )));
        }
        self.sarima.validate()?;
        self.holt_winters.validate()?;
        Ok(())
    }
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub column: Option<String>,
    pub test_size: Option<usize>,
    pub period: Option<usize>,
    pub max_lag: Option<usize>,
    pub zscore_window: Option<usize>,
    pub zscore_threshold: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SeasonalType, TrendType};
    use std::io::Write;

    #[test]
    fn defaults_match_the_monthly_pipeline() {
        let cfg = ExperimentConfig::default();
        assert_eq!(cfg.test_size, 24);
        assert_eq!(cfg.period, 12);
        assert_eq!(cfg.max_lag, 48);
        assert_eq!(cfg.zscore_window, 24);
        assert_eq!(cfg.zscore_threshold, 1.0);
        assert_eq!(cfg.sarima, SARIMAConfig::new((1, 1, 1), (0, 1, 1, 12)));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ExperimentConfig = serde_json::from_str(
            r#"{
                "column": "open",
                "holt_winters": {"trend": "mul", "seasonal": "none"},
                "sarima": {"p": 2}
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.column, "open");
        assert_eq!(cfg.holt_winters.trend, TrendType::Multiplicative);
        assert_eq!(cfg.holt_winters.seasonal, SeasonalType::None);
        assert_eq!(cfg.holt_winters.seasonal_periods, 12);
        assert_eq!(cfg.sarima.p, 2);
        assert_eq!(cfg.sarima.period, 12);
    }

    #[test]
    fn period_override_reaches_the_models() {
        let cfg = ExperimentConfig::default()
            .apply(ConfigOverrides {
                period: Some(4),
                test_size: Some(8),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(cfg.period, 4);
        assert_eq!(cfg.test_size, 8);
        assert_eq!(cfg.sarima.period, 4);
        assert_eq!(cfg.holt_winters.seasonal_periods, 4);
        // (1,1,1)(0,1,1)[4] fits on 28 quarterly points.
        assert!(cfg.sarima.min_observations() <= 28);
        assert_eq!(cfg.holt_winters.min_observations(), 8);
    }

    #[test]
    fn empty_overrides_keep_the_configuration() {
        let cfg = ExperimentConfig::default()
            .apply(ConfigOverrides::default())
            .unwrap();
        assert_eq!(cfg, ExperimentConfig::default());

        let err = ExperimentConfig::default()
            .apply(ConfigOverrides {
                zscore_threshold: Some(2.0),
                test_size: Some(0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidConfiguration(_)));
    }

    #[test]
    fn json_period_propagates_unless_models_set_their_own() {
        let cfg = ExperimentConfig::from_json(r#"{"period": 4}"#).unwrap();
        assert_eq!(cfg.sarima.period, 4);
        assert_eq!(cfg.holt_winters.seasonal_periods, 4);

        let cfg = ExperimentConfig::from_json(
            r#"{"period": 4, "sarima": {"period": 4}, "holt_winters": {"seasonal": "none"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.sarima.period, 4);

        let err = ExperimentConfig::from_json(r#"{"period": 4, "sarima": {"period": 12}}"#)
            .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidConfiguration(_)));
    }

    #[test]
    fn non_seasonal_models_ignore_the_period() {
        let mut cfg = ExperimentConfig::default().with_period(6);
        cfg.sarima = SARIMAConfig::new((1, 1, 0), (0, 0, 0, 12));
        cfg.holt_winters.seasonal = SeasonalType::None;
        cfg.holt_winters.seasonal_periods = 12;
        assert!(cfg.validate().is_ok());

        cfg.holt_winters.seasonal = SeasonalType::Additive;
        assert!(matches!(
            cfg.validate(),
            Err(ForecastError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn from_file_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"test_size": 0}}"#).unwrap();
        let err = ExperimentConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidConfiguration(_)));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            ExperimentConfig::from_file(file.path()),
            Err(ForecastError::Json(_))
        ));
    }
}
