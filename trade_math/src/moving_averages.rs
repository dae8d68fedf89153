//! Moving average calculation implementations
//!
//! Contains the Simple Moving Average (SMA) in two forms:
//! - [`SimpleMovingAverage`], an incremental window fed one value at a time
//! - [`rolling_sma`], the same window applied over a whole slice

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Push a new value into the window and return the current average,
    /// or `None` while fewer than `period` values have been seen.
    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }

        self.value().ok()
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if self.values.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        Ok(self.sum / self.period as f64)
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }
}

/// Trailing simple moving average over `values`.
///
/// The output is aligned 1:1 with the input. Index `i` holds the mean of
/// `values[i + 1 - period..=i]`, and the first `period - 1` entries are `None`.
/// A period longer than the input yields all `None`, which is not an error.
pub fn rolling_sma(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SimpleMovingAverage::new(period)?;
    Ok(values.iter().map(|&value| sma.update(value)).collect())
}
