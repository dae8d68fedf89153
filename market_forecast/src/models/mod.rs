//! Forecasting models for daily price series
//!
//! The pipeline only sees the two traits defined here: a [`ForecastModel`]
//! is fitted on [`TimePoint`]s and yields a [`FittedModel`] that can be asked
//! for predictions at arbitrary dates.

use crate::data::TimePoint;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;

/// How seasonal effects combine with the trend
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    /// Seasonality is a fixed offset around the trend
    Additive,
    /// Seasonality scales with the trend
    #[default]
    Multiplicative,
}

impl fmt::Display for SeasonalityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonalityMode::Additive => write!(f, "additive"),
            SeasonalityMode::Multiplicative => write!(f, "multiplicative"),
        }
    }
}

impl FromStr for SeasonalityMode {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "additive" => Ok(SeasonalityMode::Additive),
            "multiplicative" => Ok(SeasonalityMode::Multiplicative),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown seasonality mode '{}', expected additive or multiplicative",
                other
            ))),
        }
    }
}

/// Model hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// How readily the fitted trend bends to recent data
    pub trend_flexibility: f64,
    /// Additive or multiplicative seasonality
    pub seasonality_mode: SeasonalityMode,
}

impl Hyperparameters {
    /// Create hyperparameters, rejecting a non-positive trend flexibility
    pub fn new(trend_flexibility: f64, seasonality_mode: SeasonalityMode) -> Result<Self> {
        if !trend_flexibility.is_finite() || trend_flexibility <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Trend flexibility must be positive, got {}",
                trend_flexibility
            )));
        }

        Ok(Self {
            trend_flexibility,
            seasonality_mode,
        })
    }
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            trend_flexibility: 0.05,
            seasonality_mode: SeasonalityMode::Multiplicative,
        }
    }
}

/// A single predicted value with its uncertainty band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ForecastPoint {
    pub fn new(timestamp: NaiveDate, predicted: f64, lower: f64, upper: f64) -> Self {
        Self {
            timestamp,
            predicted,
            lower,
            upper,
        }
    }

    /// Width of the uncertainty band
    pub fn band_width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Fitted history followed by future-horizon predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Predicted points, ascending by timestamp
    points: Vec<ForecastPoint>,
    /// Number of leading points that cover the fitted history
    history_len: usize,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(points: Vec<ForecastPoint>, history_len: usize) -> Result<Self> {
        if history_len > points.len() {
            return Err(ForecastError::Model(format!(
                "History length ({}) exceeds number of points ({})",
                history_len,
                points.len()
            )));
        }

        if points.windows(2).any(|w| w[0].timestamp >= w[1].timestamp) {
            return Err(ForecastError::Model(
                "Forecast points must be strictly ascending by timestamp".to_string(),
            ));
        }

        Ok(Self {
            points,
            history_len,
        })
    }

    /// All points
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Fitted values over the history
    pub fn history(&self) -> &[ForecastPoint] {
        &self.points[..self.history_len]
    }

    /// Predictions past the last historical timestamp
    pub fn future(&self) -> &[ForecastPoint] {
        &self.points[self.history_len..]
    }

    /// Number of future points
    pub fn horizon(&self) -> usize {
        self.points.len() - self.history_len
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Final point, the forecast at the end of the horizon
    pub fn last(&self) -> Option<&ForecastPoint> {
        self.points.last()
    }
}

/// Model fitted on a series, able to predict at any date
pub trait FittedModel: Debug {
    /// Predict values for each timestamp, in the order given
    fn predict(&self, timestamps: &[NaiveDate]) -> Result<Vec<ForecastPoint>>;
}

/// Forecast model that can be fitted on time-indexed values
pub trait ForecastModel: Debug {
    /// The type of fitted model produced
    type Fitted: FittedModel;

    /// Fit the model. Implementations must be deterministic for identical input.
    fn fit(&self, points: &[TimePoint], hyperparams: &Hyperparameters) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod trend_seasonal;

pub use trend_seasonal::TrendSeasonalModel;
