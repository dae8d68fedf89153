//! Error types for the market_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the market_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The series cannot be fitted at all (fewer than two points, or a non-finite close)
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The backtest training window is below the minimum size
    #[error("Insufficient training data: need at least {required} points, have {available}")]
    InsufficientTrainingData { required: usize, available: usize },

    /// Predictions and withheld actuals share no timestamp
    #[error("Predictions do not overlap the withheld test set")]
    NoOverlap,

    /// A zero actual value was met while computing percentage error
    #[error("Division by zero: actual value is zero on {0}")]
    DivisionByZero(chrono::NaiveDate),

    /// Error raised while retrieving or parsing market data
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error reported by a forecast model while fitting or predicting
    #[error("Model error: {0}")]
    Model(String),

    /// Error while reading configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from the numeric kernels
    #[error("Math error: {0}")]
    Math(#[from] trade_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from JSON serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::Config(err.to_string())
    }
}
