//! Daily price data handling

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading-period observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Trading date
    pub timestamp: NaiveDate,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: u64,
}

impl Bar {
    /// Create a bar from its OHLCV components
    pub fn new(timestamp: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// A (timestamp, value) pair fed to and returned from forecast models
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub timestamp: NaiveDate,
    pub value: f64,
}

impl TimePoint {
    pub fn new(timestamp: NaiveDate, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Daily bars for one symbol, ascending by timestamp with no duplicates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Ticker symbol
    symbol: String,
    /// Bars in ascending timestamp order
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Create a series, sorting the bars by timestamp.
    ///
    /// Fails if two bars share a timestamp. OHLC consistency is assumed from
    /// the upstream source and not checked here.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Result<Self> {
        bars.sort_by_key(|bar| bar.timestamp);

        if let Some(pair) = bars.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(ForecastError::DataFetch(format!(
                "Duplicate bar for {}",
                pair[0].timestamp
            )));
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    /// The empty-state series returned when data could not be loaded
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    /// Get the ticker symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Get the bars
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get the number of bars
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Most recent bar
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Get the close prices as a vector
    pub fn close_prices(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// Get the timestamps as a vector
    pub fn timestamps(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|bar| bar.timestamp).collect()
    }

    /// Close prices keyed by timestamp
    pub fn time_points(&self) -> Vec<TimePoint> {
        to_time_points(&self.bars)
    }

    /// Split into the bars before `index` and the bars from `index` on
    pub fn split_at(&self, index: usize) -> (&[Bar], &[Bar]) {
        self.bars.split_at(index.min(self.bars.len()))
    }

    /// Highest high over the whole series
    pub fn period_high(&self) -> Option<f64> {
        self.bars.iter().map(|bar| bar.high).reduce(f64::max)
    }

    /// Lowest low over the whole series
    pub fn period_low(&self) -> Option<f64> {
        self.bars.iter().map(|bar| bar.low).reduce(f64::min)
    }
}

/// Close prices of `bars` keyed by timestamp
pub fn to_time_points(bars: &[Bar]) -> Vec<TimePoint> {
    bars.iter()
        .map(|bar| TimePoint::new(bar.timestamp, bar.close))
        .collect()
}
