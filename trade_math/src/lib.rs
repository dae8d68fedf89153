//! # Trade Math
//!
//! Numeric kernels shared by the forecasting pipeline: trailing moving
//! averages for the indicator overlays and the penalised least-squares solver
//! behind the built-in trend/seasonality model.

use thiserror::Error;

pub mod moving_averages;
pub mod regression;

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;
