//! Price series sources and the degrade-to-empty loading boundary

use crate::cache::{CacheKey, Clock, SeriesCache};
use crate::data::{Bar, PriceSeries};
use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};
use log::{info, warn};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Calendar days counted per year of lookback
const DAYS_PER_YEAR: u64 = 365;

/// Source of daily bars for a symbol
pub trait PriceSeriesProvider {
    /// Bars for `symbol` dated within `[start, end]`
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries>;
}

impl<P: PriceSeriesProvider + ?Sized> PriceSeriesProvider for &P {
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        (**self).fetch(symbol, start, end)
    }
}

/// Reads `<data_dir>/<SYMBOL>.csv` files with `date,open,high,low,close,volume` columns
#[derive(Debug, Clone)]
pub struct CsvPriceProvider {
    data_dir: PathBuf,
}

impl CsvPriceProvider {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the CSV file holding `symbol`
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol))
    }

    fn read_bars(path: &Path) -> Result<Vec<Bar>> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        let date_column = find_column(&df, &["date", "timestamp", "time"])?;
        let dates = df.column(&date_column)?.cast(&DataType::Utf8)?;
        let opens = float_column(&df, "open")?;
        let highs = float_column(&df, "high")?;
        let lows = float_column(&df, "low")?;
        let closes = float_column(&df, "close")?;
        let volumes = float_column(&df, "volume")?;

        let mut bars = Vec::with_capacity(df.height());
        for (row, date) in dates.utf8()?.into_iter().enumerate() {
            let missing = || ForecastError::DataFetch(format!("Missing value in row {}", row + 1));

            let timestamp = parse_date(date.ok_or_else(missing)?)?;
            let volume = volumes[row].ok_or_else(missing)?;
            if !volume.is_finite() || volume < 0.0 || volume.fract() != 0.0 {
                return Err(ForecastError::DataFetch(format!(
                    "Invalid volume {} in row {}",
                    volume,
                    row + 1
                )));
            }

            bars.push(Bar::new(
                timestamp,
                opens[row].ok_or_else(missing)?,
                highs[row].ok_or_else(missing)?,
                lows[row].ok_or_else(missing)?,
                closes[row].ok_or_else(missing)?,
                volume as u64,
            ));
        }

        Ok(bars)
    }
}

impl PriceSeriesProvider for CsvPriceProvider {
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let path = self.path_for(symbol);
        let bars: Vec<Bar> = Self::read_bars(&path)?
            .into_iter()
            .filter(|bar| bar.timestamp >= start && bar.timestamp <= end)
            .collect();

        if bars.is_empty() {
            return Err(ForecastError::DataFetch(format!(
                "No data for {} between {} and {}",
                symbol, start, end
            )));
        }

        PriceSeries::new(symbol, bars)
    }
}

/// Date range covering `years` years back from `today`, inclusive
pub fn lookback_window(today: NaiveDate, years: u32) -> (NaiveDate, NaiveDate) {
    let start = today
        .checked_sub_days(Days::new(u64::from(years) * DAYS_PER_YEAR))
        .unwrap_or(NaiveDate::MIN);
    (start, today)
}

/// Load a series through the cache.
///
/// Any fetch failure is logged and turned into an empty series, which callers
/// treat as "show a warning and run nothing else". Empty results are not
/// cached, so the next run tries the source again.
pub fn load_price_series<P, C>(
    provider: &P,
    cache: &mut SeriesCache<C>,
    symbol: &str,
    years: u32,
    today: NaiveDate,
) -> PriceSeries
where
    P: PriceSeriesProvider + ?Sized,
    C: Clock,
{
    let key = CacheKey::new(symbol, years);
    let (start, end) = lookback_window(today, years);

    let loaded = cache.get_or_try_insert_with(key, || {
        info!("fetching {} from {} to {}", symbol, start, end);
        provider.fetch(symbol, start, end)
    });

    match loaded {
        Ok(series) => series,
        Err(err) => {
            warn!("could not load {}: {}", symbol, err);
            PriceSeries::empty(symbol)
        }
    }
}

/// Parse `YYYY-MM-DD`, ignoring any time-of-day suffix
fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| ForecastError::DataFetch(format!("Invalid date '{}': {}", raw, e)))
}

/// Find a column by case-insensitive name, preferring an exact match
fn find_column(df: &DataFrame, candidates: &[&str]) -> Result<String> {
    let column_names = df.get_column_names();

    for candidate in candidates {
        if let Some(name) = column_names
            .iter()
            .find(|name| name.to_lowercase() == *candidate)
        {
            return Ok(name.to_string());
        }
    }

    for candidate in candidates {
        if let Some(name) = column_names
            .iter()
            .find(|name| name.to_lowercase().contains(candidate))
        {
            return Ok(name.to_string());
        }
    }

    Err(ForecastError::DataFetch(format!(
        "No '{}' column found in data",
        candidates[0]
    )))
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = find_column(df, &[name])?;
    let values = df.column(&column)?.cast(&DataType::Float64)?;
    let values = values.f64()?.into_iter().collect();
    Ok(values)
}
