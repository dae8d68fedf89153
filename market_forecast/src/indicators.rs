//! Technical indicators derived from a price series

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trade_math::moving_averages::rolling_sma;

/// Window of the fast moving average overlay
pub const SMA_FAST_WINDOW: usize = 50;
/// Window of the slow moving average overlay
pub const SMA_SLOW_WINDOW: usize = 200;

/// An indicator value, undefined while the window is still filling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDate,
    pub value: Option<f64>,
}

/// Indicator values aligned 1:1 with a price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    window: usize,
    points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn points(&self) -> &[IndicatorPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Value at the most recent timestamp, if defined
    pub fn latest(&self) -> Option<f64> {
        self.points.last().and_then(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Simple moving average of the close price.
///
/// Fails only for a zero window. A window longer than the series is a valid
/// request and leaves every value undefined.
pub fn compute_sma(series: &PriceSeries, window: usize) -> Result<IndicatorSeries> {
    if window == 0 {
        return Err(ForecastError::InvalidParameter(
            "SMA window must be at least 1".to_string(),
        ));
    }

    let averages = rolling_sma(&series.close_prices(), window)?;

    let points = series
        .bars()
        .iter()
        .zip(averages)
        .map(|(bar, value)| IndicatorPoint {
            timestamp: bar.timestamp,
            value,
        })
        .collect();

    Ok(IndicatorSeries { window, points })
}
