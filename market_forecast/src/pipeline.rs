//! Forecast and holdout backtest over a daily price series
//!
//! Both operations are stateless: every call converts the bars to time
//! points, fits a fresh model and predicts from it. Nothing is carried
//! between calls, so changing any input simply means calling again.

use crate::data::{to_time_points, Bar, PriceSeries};
use crate::error::{ForecastError, Result};
use crate::metrics::{AccuracyTier, AlignedPoint, ForecastAccuracy};
use crate::models::{FittedModel, ForecastModel, ForecastResult, Hyperparameters};
use chrono::{Days, NaiveDate};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Smallest training window a backtest accepts
pub const MIN_TRAINING_POINTS: usize = 30;

/// Accuracy of a model fitted on history with the last `horizon_days` bars withheld
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Mean absolute error, in price units
    pub mean_absolute_error: f64,
    /// Mean absolute percentage error, in percent
    pub mean_absolute_percentage_error: f64,
    /// Rating of the percentage error
    pub tier: AccuracyTier,
    /// Index of the first withheld bar
    pub split_index: usize,
    /// Withheld actuals matched with predictions for the same date
    pub aligned: Vec<AlignedPoint>,
    /// Fitted training history followed by the predicted horizon
    pub forecast: ForecastResult,
}

/// Runs forecasts and backtests with a given forecast model
#[derive(Debug, Clone)]
pub struct ForecastPipeline<M: ForecastModel> {
    model: M,
}

impl<M: ForecastModel> ForecastPipeline<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Fit on the full history and predict `horizon_days` calendar days past it.
    ///
    /// The result holds one point per bar followed by one per future day.
    pub fn run_forecast(
        &self,
        series: &PriceSeries,
        horizon_days: usize,
        hyperparams: &Hyperparameters,
    ) -> Result<ForecastResult> {
        check_fit_input(series.bars())?;
        check_horizon(horizon_days)?;

        let forecast = self.fit_and_project(series.bars(), horizon_days, hyperparams)?;
        info!(
            "{}: forecast {} days past {} bars with {}",
            series.symbol(),
            horizon_days,
            series.len(),
            self.model.name()
        );

        Ok(forecast)
    }

    /// Withhold the last `horizon_days` bars, fit on the rest and score the
    /// predictions against the withheld actuals.
    pub fn run_backtest(
        &self,
        series: &PriceSeries,
        horizon_days: usize,
        hyperparams: &Hyperparameters,
    ) -> Result<BacktestReport> {
        check_horizon(horizon_days)?;

        let split_index = series.len().saturating_sub(horizon_days);
        if split_index < MIN_TRAINING_POINTS {
            return Err(ForecastError::InsufficientTrainingData {
                required: MIN_TRAINING_POINTS,
                available: split_index,
            });
        }

        let (training, test) = series.split_at(split_index);
        check_fit_input(training)?;

        let forecast = self.fit_and_project(training, horizon_days, hyperparams)?;
        let aligned = align(&forecast, test);
        if aligned.is_empty() {
            return Err(ForecastError::NoOverlap);
        }

        let accuracy = ForecastAccuracy::score(&aligned)?;
        info!(
            "{}: backtest on {} training bars, {} aligned points, MAE {:.4}, MAPE {:.2}% ({})",
            series.symbol(),
            training.len(),
            aligned.len(),
            accuracy.mae,
            accuracy.mape,
            accuracy.tier
        );

        Ok(BacktestReport {
            mean_absolute_error: accuracy.mae,
            mean_absolute_percentage_error: accuracy.mape,
            tier: accuracy.tier,
            split_index,
            aligned,
            forecast,
        })
    }

    fn fit_and_project(
        &self,
        history: &[Bar],
        horizon_days: usize,
        hyperparams: &Hyperparameters,
    ) -> Result<ForecastResult> {
        let points = to_time_points(history);
        let fitted = self.model.fit(&points, hyperparams)?;

        let mut timestamps: Vec<NaiveDate> = points.iter().map(|p| p.timestamp).collect();
        let last = timestamps[timestamps.len() - 1];
        timestamps.extend(future_dates(last, horizon_days)?);

        let predicted = fitted.predict(&timestamps)?;
        if predicted.len() != timestamps.len() {
            return Err(ForecastError::Model(format!(
                "Model returned {} predictions for {} timestamps",
                predicted.len(),
                timestamps.len()
            )));
        }
        debug!(
            "{}: predicted {} historical and {} future points",
            self.model.name(),
            history.len(),
            horizon_days
        );

        ForecastResult::new(predicted, history.len())
    }
}

/// `horizon_days` contiguous calendar days starting the day after `last`
pub fn future_dates(last: NaiveDate, horizon_days: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon_days as u64)
        .map(|offset| {
            last.checked_add_days(Days::new(offset)).ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "Horizon of {} days overflows the calendar",
                    horizon_days
                ))
            })
        })
        .collect()
}

/// Inner join of the future predictions with the withheld bars on timestamp
fn align(forecast: &ForecastResult, test: &[Bar]) -> Vec<AlignedPoint> {
    let predictions: HashMap<NaiveDate, f64> = forecast
        .future()
        .iter()
        .map(|p| (p.timestamp, p.predicted))
        .collect();

    test.iter()
        .filter_map(|bar| {
            predictions
                .get(&bar.timestamp)
                .map(|&predicted| AlignedPoint::new(bar.timestamp, bar.close, predicted))
        })
        .collect()
}

fn check_fit_input(bars: &[Bar]) -> Result<()> {
    if bars.len() < 2 {
        return Err(ForecastError::InsufficientData(format!(
            "Need at least 2 bars to fit a forecast, have {}",
            bars.len()
        )));
    }

    if let Some(bar) = bars.iter().find(|bar| !bar.close.is_finite()) {
        return Err(ForecastError::InsufficientData(format!(
            "Non-finite close price on {}",
            bar.timestamp
        )));
    }

    Ok(())
}

fn check_horizon(horizon_days: usize) -> Result<()> {
    if horizon_days == 0 {
        return Err(ForecastError::InvalidParameter(
            "Forecast horizon must be at least one day".to_string(),
        ));
    }
    Ok(())
}
