//! Interactive session: current settings plus the shared series cache
//!
//! Each settings change re-runs the whole pipeline from data loading to
//! dashboard. Only the fetched series survive between runs, through the cache.

use crate::cache::{Clock, SeriesCache, SystemClock};
use crate::config::DashboardConfig;
use crate::dashboard::{Dashboard, DashboardOutcome};
use crate::error::{ForecastError, Result};
use crate::models::ForecastModel;
use crate::pipeline::ForecastPipeline;
use crate::provider::{load_price_series, PriceSeriesProvider};
use chrono::NaiveDate;
use log::info;
use std::str::FromStr;

/// A line of session input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `set <field> <value>`
    Set { field: String, value: String },
    /// `clear-cache`
    ClearCache,
    /// `run`
    Run,
    /// `show`
    Show,
    /// `quit`
    Quit,
}

impl FromStr for Command {
    type Err = ForecastError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();

        match command.as_str() {
            "set" => {
                let field = words.next().ok_or_else(|| {
                    ForecastError::Config("usage: set <field> <value>".to_string())
                })?;
                let value = words.collect::<Vec<_>>().join(" ");
                if value.is_empty() {
                    return Err(ForecastError::Config(format!("missing value for {}", field)));
                }
                Ok(Command::Set {
                    field: field.to_lowercase(),
                    value,
                })
            }
            "clear" | "clear-cache" => Ok(Command::ClearCache),
            "run" => Ok(Command::Run),
            "show" => Ok(Command::Show),
            "quit" | "exit" => Ok(Command::Quit),
            "" => Err(ForecastError::Config("empty command".to_string())),
            other => Err(ForecastError::Config(format!("unknown command '{}'", other))),
        }
    }
}

/// Result of applying a [`Command`]
#[derive(Debug, Clone)]
pub enum Reply {
    Outcome(DashboardOutcome),
    Config(DashboardConfig),
    CacheCleared,
    Exit,
}

pub struct Session<P, M, C = SystemClock>
where
    M: ForecastModel,
    C: Clock,
{
    config: DashboardConfig,
    provider: P,
    pipeline: ForecastPipeline<M>,
    cache: SeriesCache<C>,
}

impl<P, M, C> Session<P, M, C>
where
    P: PriceSeriesProvider,
    M: ForecastModel,
    C: Clock,
{
    pub fn new(config: DashboardConfig, provider: P, model: M, cache: SeriesCache<C>) -> Self {
        Self {
            config,
            provider,
            pipeline: ForecastPipeline::new(model),
            cache,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cache(&self) -> &SeriesCache<C> {
        &self.cache
    }

    /// Load the series for the current settings and build the dashboard
    pub fn run(&mut self, today: NaiveDate) -> Result<DashboardOutcome> {
        let series = load_price_series(
            &self.provider,
            &mut self.cache,
            &self.config.ticker_symbol,
            self.config.training_years,
            today,
        );

        Dashboard::build(&self.config, &series, &self.pipeline)
    }

    pub fn clear_cache(&mut self) {
        self.cache.evict_all();
    }

    /// Apply one command. A rejected setting leaves the config unchanged.
    pub fn apply(&mut self, command: Command, today: NaiveDate) -> Result<Reply> {
        match command {
            Command::Set { field, value } => {
                self.config = self.config.with_field(&field, &value)?;
                info!("{} set to {}", field, value);
                self.run(today).map(Reply::Outcome)
            }
            Command::ClearCache => {
                self.clear_cache();
                Ok(Reply::CacheCleared)
            }
            Command::Run => self.run(today).map(Reply::Outcome),
            Command::Show => Ok(Reply::Config(self.config.clone())),
            Command::Quit => Ok(Reply::Exit),
        }
    }
}
