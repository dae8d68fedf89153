//! Metrics for evaluating forecast performance

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// MAPE below this is rated excellent
pub const EXCELLENT_MAPE_THRESHOLD: f64 = 5.0;
/// MAPE below this (and not excellent) is rated good
pub const GOOD_MAPE_THRESHOLD: f64 = 10.0;

/// An actual value paired with the prediction made for the same date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedPoint {
    pub timestamp: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

impl AlignedPoint {
    pub fn new(timestamp: NaiveDate, actual: f64, predicted: f64) -> Self {
        Self {
            timestamp,
            actual,
            predicted,
        }
    }

    /// |actual - predicted|
    pub fn absolute_error(&self) -> f64 {
        (self.actual - self.predicted).abs()
    }
}

/// Qualitative accuracy rating derived from MAPE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyTier {
    Excellent,
    Good,
    Poor,
}

impl AccuracyTier {
    /// Rate a mean absolute percentage error given in percent
    pub fn from_mape(mape: f64) -> Self {
        if mape < EXCELLENT_MAPE_THRESHOLD {
            AccuracyTier::Excellent
        } else if mape < GOOD_MAPE_THRESHOLD {
            AccuracyTier::Good
        } else {
            AccuracyTier::Poor
        }
    }
}

impl fmt::Display for AccuracyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccuracyTier::Excellent => write!(f, "excellent"),
            AccuracyTier::Good => write!(f, "good"),
            AccuracyTier::Poor => write!(f, "poor"),
        }
    }
}

/// Mean absolute error over aligned pairs
pub fn mean_absolute_error(aligned: &[AlignedPoint]) -> Result<f64> {
    if aligned.is_empty() {
        return Err(ForecastError::NoOverlap);
    }

    let sum: f64 = aligned.iter().map(AlignedPoint::absolute_error).sum();
    Ok(sum / aligned.len() as f64)
}

/// Mean absolute percentage error over aligned pairs, in percent.
///
/// A zero actual value makes the ratio undefined; the whole computation
/// fails with [`ForecastError::DivisionByZero`] naming the first such date.
pub fn mean_absolute_percentage_error(aligned: &[AlignedPoint]) -> Result<f64> {
    if aligned.is_empty() {
        return Err(ForecastError::NoOverlap);
    }

    if let Some(zero) = aligned.iter().find(|p| p.actual == 0.0) {
        return Err(ForecastError::DivisionByZero(zero.timestamp));
    }

    let sum: f64 = aligned
        .iter()
        .map(|p| p.absolute_error() / p.actual.abs())
        .sum();
    Ok(sum / aligned.len() as f64 * 100.0)
}

/// Forecast accuracy metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Rating of the MAPE
    pub tier: AccuracyTier,
}

impl ForecastAccuracy {
    /// Score a set of aligned pairs
    pub fn score(aligned: &[AlignedPoint]) -> Result<Self> {
        let mae = mean_absolute_error(aligned)?;
        let mape = mean_absolute_percentage_error(aligned)?;

        Ok(Self {
            mae,
            mape,
            tier: AccuracyTier::from_mape(mape),
        })
    }
}

impl fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  Tier:  {}", self.tier)?;
        Ok(())
    }
}
