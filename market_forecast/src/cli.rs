//! Command line arguments for the `market_minds` binary

use crate::config::{load_config_path, DashboardConfig};
use crate::error::Result;
use crate::models::SeasonalityMode;
use clap::Parser;
use std::path::PathBuf;

/// Forecast a ticker's daily closes and backtest the forecast on withheld history
#[derive(Debug, Clone, Parser)]
#[command(name = "market_minds", version, about)]
pub struct Cli {
    /// Ticker symbol (case-insensitive)
    #[arg(short, long)]
    pub ticker: Option<String>,

    /// Years of history to load (1-5)
    #[arg(short, long)]
    pub years: Option<u32>,

    /// Forecast horizon in days (30-365)
    #[arg(long)]
    pub horizon: Option<usize>,

    /// Trend flexibility (0.01-0.5); higher values follow recent moves more closely
    #[arg(long)]
    pub trend_flexibility: Option<f64>,

    /// Seasonality mode
    #[arg(long, value_enum)]
    pub seasonality: Option<SeasonalityMode>,

    /// TOML file with base settings; flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding `<TICKER>.csv` files
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Write the dashboard datasets as JSON to this file
    #[arg(long)]
    pub json_out: Option<PathBuf>,

    /// Read commands from stdin after the first run. The series cache lives
    /// for the process, so `clear-cache` is a session command.
    #[arg(short, long, default_value_t = false)]
    pub interactive: bool,
}

impl Cli {
    /// Settings from the config file (or defaults) with flag overrides, validated
    pub fn resolve_config(&self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_path(path)?,
            None => DashboardConfig::default(),
        };

        if let Some(ticker) = &self.ticker {
            config.ticker_symbol = ticker.clone();
        }
        if let Some(years) = self.years {
            config.training_years = years;
        }
        if let Some(horizon) = self.horizon {
            config.forecast_horizon_days = horizon;
        }
        if let Some(flexibility) = self.trend_flexibility {
            config.trend_flexibility = flexibility;
        }
        if let Some(mode) = self.seasonality {
            config.seasonality_mode = mode;
        }

        config.validate()
    }
}
