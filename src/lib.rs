//! # Market Minds
//!
//! Workspace facade over the forecasting crates:
//!
//! - [`market_forecast`]: price series loading, forecasting, backtesting and dashboard datasets
//! - [`trade_math`]: moving average and ridge regression kernels
//!
//! ## Example
//!
//! ```
//! use market_minds_workspace::market_forecast::DashboardConfig;
//!
//! let config = DashboardConfig::default().validate().unwrap();
//! assert_eq!(config.ticker_symbol, "BTC-USD");
//! assert_eq!(config.forecast_horizon_days, 90);
//! ```

pub use market_forecast;
pub use trade_math;
