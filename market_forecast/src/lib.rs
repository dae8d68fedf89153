//! # Market Forecast
//!
//! Forecasting and backtesting for daily market data.
//!
//! ## Features
//!
//! - Daily OHLCV series loaded from CSV, memoized with a time-to-live cache
//! - Simple moving average overlays
//! - A forecast model interface with a built-in trend + seasonality model
//! - Full-history forecasts and fixed-origin holdout backtests scored by MAE and MAPE
//! - Dashboard datasets (headline figures, forecast band, backtest overlay, candlesticks)
//!
//! ## Quick Start
//!
//! ```no_run
//! use market_forecast::cache::SeriesCache;
//! use market_forecast::provider::{load_price_series, CsvPriceProvider};
//! use market_forecast::{ForecastPipeline, Hyperparameters, TrendSeasonalModel};
//!
//! let provider = CsvPriceProvider::new("data");
//! let mut cache = SeriesCache::default();
//! let today = chrono::Utc::now().date_naive();
//! let series = load_price_series(&provider, &mut cache, "AAPL", 2, today);
//!
//! let pipeline = ForecastPipeline::new(TrendSeasonalModel::new());
//! let hyperparams = Hyperparameters::default();
//!
//! let forecast = pipeline.run_forecast(&series, 90, &hyperparams)?;
//! let report = pipeline.run_backtest(&series, 90, &hyperparams)?;
//! println!("MAPE {:.2}% ({})", report.mean_absolute_percentage_error, report.tier);
//! # Ok::<(), market_forecast::ForecastError>(())
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod indicators;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod session;

// Re-export commonly used types
pub use crate::config::DashboardConfig;
pub use crate::data::{Bar, PriceSeries, TimePoint};
pub use crate::error::{ForecastError, Result};
pub use crate::indicators::{compute_sma, IndicatorSeries};
pub use crate::metrics::AccuracyTier;
pub use crate::models::{
    FittedModel, ForecastModel, ForecastPoint, ForecastResult, Hyperparameters, SeasonalityMode,
    TrendSeasonalModel,
};
pub use crate::pipeline::{BacktestReport, ForecastPipeline};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
