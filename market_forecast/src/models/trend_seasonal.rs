//! Piecewise-linear trend with Fourier seasonality
//!
//! The series is scaled by its largest absolute value and time is mapped onto
//! `[0, 1]` over the training span. The trend is a line plus hinge terms at
//! up to 25 changepoints spread over the first 80% of the history; each hinge
//! coefficient is ridge-penalised by `1 / trend_flexibility²`, so small
//! flexibility values keep the trend close to a straight line. Weekly and
//! yearly seasonality are then fitted on what the trend leaves unexplained.

use crate::data::TimePoint;
use crate::error::{ForecastError, Result};
use crate::models::{FittedModel, ForecastModel, ForecastPoint, Hyperparameters, SeasonalityMode};
use chrono::NaiveDate;
use log::debug;
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;
use trade_math::regression::ridge_solve;

const MAX_CHANGEPOINTS: usize = 25;
/// Share of the history in which changepoints may be placed
const CHANGEPOINT_RANGE: f64 = 0.8;
const SEASONALITY_PRIOR_SCALE: f64 = 10.0;
/// Keeps the unpenalised terms of the normal equations well conditioned
const BASE_PENALTY: f64 = 1e-9;
/// Below this magnitude the trend is too close to zero to divide by
const TREND_FLOOR: f64 = 1e-9;

const WEEKLY: Seasonality = Seasonality {
    period_days: 7.0,
    order: 3,
    min_span_days: 14,
};
const YEARLY: Seasonality = Seasonality {
    period_days: 365.25,
    order: 10,
    min_span_days: 730,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Seasonality {
    period_days: f64,
    order: usize,
    /// Shortest history that can support this seasonality
    min_span_days: i64,
}

impl Seasonality {
    fn push_features(&self, day: f64, row: &mut Vec<f64>) {
        for k in 1..=self.order {
            let angle = 2.0 * PI * k as f64 * day / self.period_days;
            row.push(angle.sin());
            row.push(angle.cos());
        }
    }

    fn width(&self) -> usize {
        2 * self.order
    }
}

/// Deterministic trend + seasonality decomposition model
#[derive(Debug, Clone)]
pub struct TrendSeasonalModel {
    /// Name of the model
    name: String,
    /// Coverage of the uncertainty band
    interval_width: f64,
}

impl TrendSeasonalModel {
    /// Create a model with an 80% uncertainty band
    pub fn new() -> Self {
        Self {
            name: "Trend + Seasonality".to_string(),
            interval_width: 0.8,
        }
    }

    /// Create a model with a custom uncertainty band coverage in `(0, 1)`
    pub fn with_interval_width(interval_width: f64) -> Result<Self> {
        if !(interval_width > 0.0 && interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "Interval width must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            interval_width,
            ..Self::new()
        })
    }

    pub fn interval_width(&self) -> f64 {
        self.interval_width
    }
}

impl Default for TrendSeasonalModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Fitted trend + seasonality model
#[derive(Debug, Clone)]
pub struct FittedTrendSeasonal {
    /// First training date, day zero of the time axis
    origin: NaiveDate,
    /// Last training date, beyond which the band widens
    last_observed: NaiveDate,
    span_days: f64,
    /// Divisor applied to values before fitting
    scale: f64,
    /// Changepoint locations on the scaled time axis
    changepoints: Vec<f64>,
    trend_coefficients: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    seasonal_coefficients: Vec<f64>,
    mode: SeasonalityMode,
    /// Residual standard deviation on the scaled values
    residual_sd: f64,
    /// Normal quantile for the band half-width
    z_score: f64,
}

impl ForecastModel for TrendSeasonalModel {
    type Fitted = FittedTrendSeasonal;

    fn fit(&self, points: &[TimePoint], hyperparams: &Hyperparameters) -> Result<Self::Fitted> {
        if points.len() < 2 {
            return Err(ForecastError::InsufficientData(format!(
                "Need at least 2 observations to fit a trend, have {}",
                points.len()
            )));
        }
        if points.iter().any(|p| !p.value.is_finite()) {
            return Err(ForecastError::InsufficientData(
                "Series contains non-finite values".to_string(),
            ));
        }
        if points.windows(2).any(|w| w[0].timestamp >= w[1].timestamp) {
            return Err(ForecastError::InvalidParameter(
                "Time points must be strictly ascending".to_string(),
            ));
        }

        let origin = points[0].timestamp;
        let last_observed = points[points.len() - 1].timestamp;
        let span = (last_observed - origin).num_days();
        let span_days = span as f64;

        let scale = points
            .iter()
            .map(|p| p.value.abs())
            .fold(0.0, f64::max);
        let scale = if scale > 0.0 { scale } else { 1.0 };

        let days: Vec<f64> = points
            .iter()
            .map(|p| (p.timestamp - origin).num_days() as f64)
            .collect();
        let t: Vec<f64> = days.iter().map(|d| d / span_days).collect();
        let y: Vec<f64> = points.iter().map(|p| p.value / scale).collect();

        // Trend
        let changepoints = place_changepoints(&t);
        let trend_design: Vec<Vec<f64>> = t.iter().map(|&ti| trend_row(ti, &changepoints)).collect();
        let changepoint_penalty = 1.0 / hyperparams.trend_flexibility.powi(2);
        let mut penalties = vec![BASE_PENALTY; 2];
        penalties.extend(std::iter::repeat(changepoint_penalty).take(changepoints.len()));
        let trend_coefficients = ridge_solve(&trend_design, &y, &penalties)?;
        let trend: Vec<f64> = trend_design
            .iter()
            .map(|row| dot(row, &trend_coefficients))
            .collect();

        // Seasonality
        let seasonalities: Vec<Seasonality> = [WEEKLY, YEARLY]
            .into_iter()
            .filter(|s| span >= s.min_span_days)
            .collect();
        let width: usize = seasonalities.iter().map(Seasonality::width).sum();

        let mut rows = Vec::with_capacity(points.len());
        let mut targets = Vec::with_capacity(points.len());
        if width > 0 {
            for i in 0..points.len() {
                let target = match hyperparams.seasonality_mode {
                    SeasonalityMode::Additive => y[i] - trend[i],
                    SeasonalityMode::Multiplicative if trend[i].abs() > TREND_FLOOR => {
                        y[i] / trend[i] - 1.0
                    }
                    SeasonalityMode::Multiplicative => continue,
                };
                rows.push(seasonal_row(days[i], &seasonalities, width));
                targets.push(target);
            }
        }

        let seasonal_coefficients = if rows.is_empty() {
            vec![0.0; width]
        } else {
            let prior = 1.0 / SEASONALITY_PRIOR_SCALE.powi(2) + BASE_PENALTY;
            ridge_solve(&rows, &targets, &vec![prior; width])?
        };

        let z_score = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::Model(e.to_string()))?
            .inverse_cdf(0.5 + self.interval_width / 2.0);

        let mut fitted = FittedTrendSeasonal {
            origin,
            last_observed,
            span_days,
            scale,
            changepoints,
            trend_coefficients,
            seasonalities,
            seasonal_coefficients,
            mode: hyperparams.seasonality_mode,
            residual_sd: 0.0,
            z_score,
        };

        let sse: f64 = days
            .iter()
            .zip(&y)
            .map(|(&day, &actual)| (actual - fitted.scaled_estimate(day)).powi(2))
            .sum();
        fitted.residual_sd = (sse / points.len() as f64).sqrt();

        debug!(
            "{}: fitted {} points, {} changepoints, {} seasonal terms, residual sd {:.6}",
            self.name,
            points.len(),
            fitted.changepoints.len(),
            width,
            fitted.residual_sd * scale
        );

        Ok(fitted)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedTrendSeasonal {
    /// Prediction on the scaled value axis for a day offset from the origin
    fn scaled_estimate(&self, day: f64) -> f64 {
        let trend = dot(
            &trend_row(day / self.span_days, &self.changepoints),
            &self.trend_coefficients,
        );

        if self.seasonalities.is_empty() {
            return trend;
        }

        let width = self.seasonal_coefficients.len();
        let seasonal = dot(
            &seasonal_row(day, &self.seasonalities, width),
            &self.seasonal_coefficients,
        );

        match self.mode {
            SeasonalityMode::Additive => trend + seasonal,
            SeasonalityMode::Multiplicative => trend * (1.0 + seasonal),
        }
    }

    /// Residual standard deviation in price units
    pub fn residual_sd(&self) -> f64 {
        self.residual_sd * self.scale
    }

    /// Number of trend changepoints placed during fitting
    pub fn changepoint_count(&self) -> usize {
        self.changepoints.len()
    }
}

impl FittedModel for FittedTrendSeasonal {
    fn predict(&self, timestamps: &[NaiveDate]) -> Result<Vec<ForecastPoint>> {
        Ok(timestamps
            .iter()
            .map(|&timestamp| {
                let day = (timestamp - self.origin).num_days() as f64;
                let estimate = self.scaled_estimate(day);

                let days_ahead = (timestamp - self.last_observed).num_days().max(0) as f64;
                let half_width = self.z_score * self.residual_sd * (1.0 + days_ahead).sqrt();

                ForecastPoint::new(
                    timestamp,
                    estimate * self.scale,
                    (estimate - half_width) * self.scale,
                    (estimate + half_width) * self.scale,
                )
            })
            .collect())
    }
}

/// Changepoints at evenly spaced observations within the first 80% of history
fn place_changepoints(t: &[f64]) -> Vec<f64> {
    let history = (t.len() as f64 * CHANGEPOINT_RANGE).floor() as usize;
    let count = MAX_CHANGEPOINTS.min(history.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }

    let step = (history - 1) as f64 / count as f64;
    (1..=count)
        .map(|j| t[(j as f64 * step).round() as usize])
        .collect()
}

fn trend_row(t: f64, changepoints: &[f64]) -> Vec<f64> {
    let mut row = Vec::with_capacity(2 + changepoints.len());
    row.push(1.0);
    row.push(t);
    row.extend(changepoints.iter().map(|&c| (t - c).max(0.0)));
    row
}

fn seasonal_row(day: f64, seasonalities: &[Seasonality], width: usize) -> Vec<f64> {
    let mut row = Vec::with_capacity(width);
    for seasonality in seasonalities {
        seasonality.push_features(day, &mut row);
    }
    row
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
