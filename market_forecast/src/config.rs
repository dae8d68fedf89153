//! Dashboard configuration: defaults, validation and TOML loading.
//!
//! Every value that reaches the pipeline goes through
//! [`DashboardConfig::validate`]. A config file may set any subset of the
//! fields; missing ones take the defaults below.
//!
//! ```toml
//! ticker_symbol = "AAPL"
//! training_years = 3
//! forecast_horizon_days = 120
//! trend_flexibility = 0.1
//! seasonality_mode = "additive"
//! ```

use crate::error::{ForecastError, Result};
use crate::models::{Hyperparameters, SeasonalityMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::Path;

pub const TRAINING_YEARS_RANGE: RangeInclusive<u32> = 1..=5;
pub const FORECAST_HORIZON_RANGE: RangeInclusive<usize> = 30..=365;
pub const TREND_FLEXIBILITY_RANGE: RangeInclusive<f64> = 0.01..=0.5;

/// User-adjustable dashboard parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Ticker symbol, stored uppercase
    pub ticker_symbol: String,
    /// Years of history to load
    pub training_years: u32,
    /// Days to forecast, also the backtest holdout length
    pub forecast_horizon_days: usize,
    /// Trend changepoint flexibility
    pub trend_flexibility: f64,
    pub seasonality_mode: SeasonalityMode,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            ticker_symbol: "BTC-USD".to_string(),
            training_years: 2,
            forecast_horizon_days: 90,
            trend_flexibility: 0.05,
            seasonality_mode: SeasonalityMode::Multiplicative,
        }
    }
}

impl DashboardConfig {
    /// Normalize the ticker and check every field against its allowed range
    pub fn validate(mut self) -> Result<Self> {
        self.ticker_symbol = self.ticker_symbol.trim().to_uppercase();
        if self.ticker_symbol.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Ticker symbol must not be empty".to_string(),
            ));
        }

        if !TRAINING_YEARS_RANGE.contains(&self.training_years) {
            return Err(out_of_range(
                "training_years",
                self.training_years,
                &TRAINING_YEARS_RANGE,
            ));
        }
        if !FORECAST_HORIZON_RANGE.contains(&self.forecast_horizon_days) {
            return Err(out_of_range(
                "forecast_horizon_days",
                self.forecast_horizon_days,
                &FORECAST_HORIZON_RANGE,
            ));
        }
        if !TREND_FLEXIBILITY_RANGE.contains(&self.trend_flexibility) {
            return Err(out_of_range(
                "trend_flexibility",
                self.trend_flexibility,
                &TREND_FLEXIBILITY_RANGE,
            ));
        }

        Ok(self)
    }

    /// Copy of this config with one field replaced, validated
    pub fn with_field(&self, field: &str, value: &str) -> Result<Self> {
        let mut updated = self.clone();
        let value = value.trim();

        match field {
            "ticker" | "ticker_symbol" => updated.ticker_symbol = value.to_string(),
            "years" | "training_years" => updated.training_years = parse_field(field, value)?,
            "horizon" | "forecast_horizon_days" => {
                updated.forecast_horizon_days = parse_field(field, value)?
            }
            "trend_flexibility" | "flexibility" => {
                updated.trend_flexibility = parse_field(field, value)?
            }
            "seasonality" | "seasonality_mode" => updated.seasonality_mode = value.parse()?,
            other => {
                return Err(ForecastError::Config(format!("Unknown setting '{}'", other)));
            }
        }

        updated.validate()
    }

    pub fn hyperparameters(&self) -> Result<Hyperparameters> {
        Hyperparameters::new(self.trend_flexibility, self.seasonality_mode)
    }
}

impl fmt::Display for DashboardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticker_symbol         = {}", self.ticker_symbol)?;
        writeln!(f, "training_years        = {}", self.training_years)?;
        writeln!(f, "forecast_horizon_days = {}", self.forecast_horizon_days)?;
        writeln!(f, "trend_flexibility     = {}", self.trend_flexibility)?;
        writeln!(f, "seasonality_mode      = {}", self.seasonality_mode)
    }
}

/// Parse and validate a TOML config string
pub fn load_config_str(toml_str: &str) -> Result<DashboardConfig> {
    let config: DashboardConfig = toml::from_str(toml_str)?;
    config.validate()
}

/// Parse and validate a TOML config file
pub fn load_config_path<P: AsRef<Path>>(path: P) -> Result<DashboardConfig> {
    let contents = std::fs::read_to_string(path)?;
    load_config_str(&contents)
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| ForecastError::InvalidParameter(format!("Invalid value '{}' for {}", value, field)))
}

fn out_of_range<T: fmt::Display>(field: &str, value: T, range: &RangeInclusive<T>) -> ForecastError {
    ForecastError::InvalidParameter(format!(
        "{} must be between {} and {}, got {}",
        field,
        range.start(),
        range.end(),
        value
    ))
}
