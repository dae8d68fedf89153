//! Summary figures and chart datasets for one dashboard run
//!
//! A run produces either a no-data warning or a [`Dashboard`]. Inside a
//! dashboard the forecast and backtest views fail independently: an
//! unsatisfiable backtest is kept as an error message for that view while
//! the forecast and candlestick data are still produced.

use crate::config::DashboardConfig;
use crate::data::{to_time_points, Bar, PriceSeries, TimePoint};
use crate::error::{ForecastError, Result};
use crate::indicators::{compute_sma, IndicatorSeries, SMA_FAST_WINDOW, SMA_SLOW_WINDOW};
use crate::models::{ForecastModel, ForecastResult};
use crate::pipeline::{BacktestReport, ForecastPipeline};
use chrono::NaiveDate;
use log::warn;
use serde::Serialize;
use std::fmt;

/// A view's content, or the message explaining why it is unavailable
pub type ViewResult<T> = std::result::Result<T, String>;

/// Outcome of one dashboard run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardOutcome {
    /// Nothing could be loaded for the ticker
    NoData { warning: String },
    /// Data loaded; individual views may still carry errors
    Ready(Box<Dashboard>),
}

/// Latest price and its change from the previous bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Headline {
    pub current_price: f64,
    pub previous_price: Option<f64>,
    pub delta: f64,
    pub percent_change: f64,
}

/// Period statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyFigures {
    pub period_high: f64,
    pub period_low: f64,
    pub latest_volume: u64,
    /// Undefined until the series is at least 50 bars long
    pub latest_sma_fast: Option<f64>,
}

/// Direction of the forecast relative to the current price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendSignal {
    Bullish,
    Bearish,
}

impl TrendSignal {
    /// Bullish only when the target is strictly above the current price
    pub fn from_prices(current_price: f64, target_price: f64) -> Self {
        if target_price > current_price {
            TrendSignal::Bullish
        } else {
            TrendSignal::Bearish
        }
    }
}

impl fmt::Display for TrendSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendSignal::Bullish => write!(f, "Bullish"),
            TrendSignal::Bearish => write!(f, "Bearish"),
        }
    }
}

/// Full-history forecast with the observed closes it was fitted on
#[derive(Debug, Clone, Serialize)]
pub struct ForecastView {
    pub target_date: NaiveDate,
    pub target_price: f64,
    pub trend: TrendSignal,
    pub history: Vec<TimePoint>,
    pub forecast: ForecastResult,
}

/// Training, withheld and predicted lines of the backtest overlay
#[derive(Debug, Clone, Serialize)]
pub struct BacktestChart {
    pub training: Vec<TimePoint>,
    pub actual: Vec<TimePoint>,
    pub predicted: Vec<TimePoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BacktestView {
    pub report: BacktestReport,
    pub chart: BacktestChart,
}

/// Price bars with moving average overlays
#[derive(Debug, Clone, Serialize)]
pub struct CandlestickChart {
    pub bars: Vec<Bar>,
    pub sma_fast: IndicatorSeries,
    pub sma_slow: IndicatorSeries,
}

/// Everything shown for one ticker
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub symbol: String,
    pub training_years: u32,
    pub horizon_days: usize,
    pub headline: Headline,
    pub key_figures: KeyFigures,
    pub forecast: ViewResult<ForecastView>,
    pub backtest: ViewResult<BacktestView>,
    pub candlestick: CandlestickChart,
}

impl Dashboard {
    /// Build all views from a loaded series. An empty series short-circuits
    /// to [`DashboardOutcome::NoData`].
    pub fn build<M: ForecastModel>(
        config: &DashboardConfig,
        series: &PriceSeries,
        pipeline: &ForecastPipeline<M>,
    ) -> Result<DashboardOutcome> {
        let last = match series.last() {
            Some(bar) => *bar,
            None => {
                return Ok(DashboardOutcome::NoData {
                    warning: format!(
                        "Could not validate ticker '{}'. Please try again.",
                        config.ticker_symbol
                    ),
                })
            }
        };

        let hyperparams = config.hyperparameters()?;
        let horizon_days = config.forecast_horizon_days;

        let sma_fast = compute_sma(series, SMA_FAST_WINDOW)?;
        let sma_slow = compute_sma(series, SMA_SLOW_WINDOW)?;

        let previous_price = series
            .bars()
            .len()
            .checked_sub(2)
            .map(|i| series.bars()[i].close);
        let headline = build_headline(last.close, previous_price);

        let key_figures = KeyFigures {
            period_high: series.period_high().unwrap_or(last.high),
            period_low: series.period_low().unwrap_or(last.low),
            latest_volume: last.volume,
            latest_sma_fast: sma_fast.latest(),
        };

        let forecast = pipeline
            .run_forecast(series, horizon_days, &hyperparams)
            .and_then(|forecast| forecast_view(series, last.close, forecast))
            .map_err(|err| {
                warn!("{}: forecast unavailable: {}", series.symbol(), err);
                err.to_string()
            });

        let backtest = pipeline
            .run_backtest(series, horizon_days, &hyperparams)
            .map(|report| backtest_view(series, report))
            .map_err(|err| {
                warn!("{}: backtest unavailable: {}", series.symbol(), err);
                err.to_string()
            });

        Ok(DashboardOutcome::Ready(Box::new(Dashboard {
            symbol: series.symbol().to_string(),
            training_years: config.training_years,
            horizon_days,
            headline,
            key_figures,
            forecast,
            backtest,
            candlestick: CandlestickChart {
                bars: series.bars().to_vec(),
                sma_fast,
                sma_slow,
            },
        })))
    }
}

fn build_headline(current_price: f64, previous_price: Option<f64>) -> Headline {
    let delta = previous_price.map_or(0.0, |prev| current_price - prev);
    let percent_change = match previous_price {
        Some(prev) if prev != 0.0 => delta / prev * 100.0,
        _ => 0.0,
    };

    Headline {
        current_price,
        previous_price,
        delta,
        percent_change,
    }
}

fn forecast_view(
    series: &PriceSeries,
    current_price: f64,
    forecast: ForecastResult,
) -> Result<ForecastView> {
    let target = *forecast
        .last()
        .ok_or_else(|| ForecastError::Model("Forecast returned no points".to_string()))?;

    Ok(ForecastView {
        target_date: target.timestamp,
        target_price: target.predicted,
        trend: TrendSignal::from_prices(current_price, target.predicted),
        history: series.time_points(),
        forecast,
    })
}

fn backtest_view(series: &PriceSeries, report: BacktestReport) -> BacktestView {
    let (training, actual) = series.split_at(report.split_index);
    let predicted = report
        .forecast
        .points()
        .iter()
        .map(|p| TimePoint::new(p.timestamp, p.predicted))
        .collect();

    BacktestView {
        chart: BacktestChart {
            training: to_time_points(training),
            actual: to_time_points(actual),
            predicted,
        },
        report,
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.headline;
        writeln!(f, "{}", self.symbol)?;
        writeln!(
            f,
            "  Analyzing last {} years of market data, forecast for next {} days",
            self.training_years, self.horizon_days
        )?;
        writeln!(
            f,
            "  Price:         ${:.2} ({:+.2}, {:+.2}%)",
            h.current_price, h.delta, h.percent_change
        )?;

        let k = &self.key_figures;
        writeln!(f, "  Period high:   ${:.2}", k.period_high)?;
        writeln!(f, "  Period low:    ${:.2}", k.period_low)?;
        writeln!(f, "  Volume:        {}", k.latest_volume)?;
        match k.latest_sma_fast {
            Some(sma) => writeln!(f, "  {}-day SMA:    ${:.2}", SMA_FAST_WINDOW, sma)?,
            None => writeln!(f, "  {}-day SMA:    n/a", SMA_FAST_WINDOW)?,
        }

        writeln!(f, "Forecast:")?;
        match &self.forecast {
            Ok(view) => writeln!(
                f,
                "  Target price ({} days, {}): ${:.2} | Trend: {}",
                self.horizon_days, view.target_date, view.target_price, view.trend
            )?,
            Err(message) => writeln!(f, "  {}", message)?,
        }

        writeln!(f, "Backtest (last {} days withheld):", self.horizon_days)?;
        match &self.backtest {
            Ok(view) => {
                let r = &view.report;
                writeln!(f, "  MAE:   ${:.2}", r.mean_absolute_error)?;
                writeln!(f, "  MAPE:  {:.2}%", r.mean_absolute_percentage_error)?;
                writeln!(f, "  Accuracy: {}", r.tier)?;
            }
            Err(message) => writeln!(f, "  {}", message)?,
        }

        Ok(())
    }
}

impl fmt::Display for DashboardOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardOutcome::NoData { warning } => writeln!(f, "{}", warning),
            DashboardOutcome::Ready(dashboard) => write!(f, "{}", dashboard),
        }
    }
}
