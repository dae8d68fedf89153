#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use market_forecast::cache::Clock;
use market_forecast::provider::PriceSeriesProvider;
use market_forecast::{
    Bar, FittedModel, ForecastError, ForecastModel, ForecastPoint, Hyperparameters, PriceSeries,
    Result, TimePoint,
};
use std::cell::Cell;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One bar per calendar day starting 2023-01-01
pub fn daily_series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let start = date(2023, 1, 1);
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let day = start + Duration::days(i as i64);
            Bar::new(day, close, close + 1.0, close - 1.0, close, 1_000 + i as u64)
        })
        .collect();
    PriceSeries::new(symbol, bars).unwrap()
}

pub fn constant_series(len: usize, price: f64) -> PriceSeries {
    daily_series("FLAT", &vec![price; len])
}

/// Upward drift with a weekly wiggle
pub fn wavy_series(len: usize) -> PriceSeries {
    let closes: Vec<f64> = (0..len)
        .map(|i| 100.0 + 0.1 * i as f64 + 2.0 * (i as f64 * 0.9).sin())
        .collect();
    daily_series("WAVY", &closes)
}

/// Predicts the mean of the training values everywhere, counting fits
#[derive(Debug, Default)]
pub struct MeanModel {
    pub fits: Cell<usize>,
}

#[derive(Debug)]
pub struct FittedMean {
    mean: f64,
    last: NaiveDate,
}

impl ForecastModel for MeanModel {
    type Fitted = FittedMean;

    fn fit(&self, points: &[TimePoint], _hyperparams: &Hyperparameters) -> Result<FittedMean> {
        self.fits.set(self.fits.get() + 1);
        let last = points
            .last()
            .ok_or_else(|| ForecastError::InsufficientData("no points".to_string()))?
            .timestamp;
        let mean = points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64;
        Ok(FittedMean { mean, last })
    }

    fn name(&self) -> &str {
        "mean"
    }
}

impl FittedModel for FittedMean {
    fn predict(&self, timestamps: &[NaiveDate]) -> Result<Vec<ForecastPoint>> {
        Ok(timestamps
            .iter()
            .map(|&ts| {
                let ahead = (ts - self.last).num_days().max(0) as f64;
                ForecastPoint::new(ts, self.mean, self.mean - 1.0 - ahead, self.mean + 1.0 + ahead)
            })
            .collect())
    }
}

/// Predicts the same value everywhere
#[derive(Debug, Clone, Copy)]
pub struct FixedModel(pub f64);

#[derive(Debug)]
pub struct FittedFixed(f64);

impl ForecastModel for FixedModel {
    type Fitted = FittedFixed;

    fn fit(&self, _points: &[TimePoint], _hyperparams: &Hyperparameters) -> Result<FittedFixed> {
        Ok(FittedFixed(self.0))
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

impl FittedModel for FittedFixed {
    fn predict(&self, timestamps: &[NaiveDate]) -> Result<Vec<ForecastPoint>> {
        Ok(timestamps
            .iter()
            .map(|&ts| ForecastPoint::new(ts, self.0, self.0, self.0))
            .collect())
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Serves a fixed series for one symbol and fails for any other, counting calls
#[derive(Debug)]
pub struct StubProvider {
    pub series: PriceSeries,
    pub calls: Cell<usize>,
}

impl StubProvider {
    pub fn new(series: PriceSeries) -> Self {
        Self {
            series,
            calls: Cell::new(0),
        }
    }
}

impl PriceSeriesProvider for StubProvider {
    fn fetch(&self, symbol: &str, _start: NaiveDate, _end: NaiveDate) -> Result<PriceSeries> {
        self.calls.set(self.calls.get() + 1);
        if symbol == self.series.symbol() {
            Ok(self.series.clone())
        } else {
            Err(ForecastError::DataFetch(format!("unknown symbol {}", symbol)))
        }
    }
}
