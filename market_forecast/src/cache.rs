//! Time-to-live memoization of fetched price series

use crate::data::PriceSeries;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::collections::HashMap;

/// Seconds a fetched series stays fresh
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Identifies one fetch: symbol and lookback window in years
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub years: u32,
}

impl CacheKey {
    pub fn new(symbol: impl Into<String>, years: u32) -> Self {
        Self {
            symbol: symbol.into(),
            years,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    series: PriceSeries,
    inserted_at: DateTime<Utc>,
}

/// Price series keyed by `(symbol, years)`, each entry expiring after a fixed TTL
#[derive(Debug)]
pub struct SeriesCache<C: Clock = SystemClock> {
    entries: HashMap<CacheKey, CacheEntry>,
    ttl: Duration,
    clock: C,
}

impl SeriesCache<SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl Default for SeriesCache<SystemClock> {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_TTL_SECS))
    }
}

impl<C: Clock> SeriesCache<C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            clock,
        }
    }

    /// Fresh entry for `key`. A stale entry is dropped and reported as a miss.
    pub fn get(&mut self, key: &CacheKey) -> Option<PriceSeries> {
        let now = self.clock.now();
        let entry = self.entries.get(key)?;

        if now - entry.inserted_at < self.ttl {
            debug!("cache hit for {} ({}y)", key.symbol, key.years);
            return Some(entry.series.clone());
        }

        debug!("cache entry for {} ({}y) expired", key.symbol, key.years);
        self.entries.remove(key);
        None
    }

    pub fn insert(&mut self, key: CacheKey, series: PriceSeries) {
        let inserted_at = self.clock.now();
        self.entries.insert(
            key,
            CacheEntry {
                series,
                inserted_at,
            },
        );
    }

    /// Return the fresh entry for `key`, or compute, store and return it.
    /// Errors from `fetch` are returned and nothing is stored.
    pub fn get_or_try_insert_with<F, E>(&mut self, key: CacheKey, fetch: F) -> Result<PriceSeries, E>
    where
        F: FnOnce() -> Result<PriceSeries, E>,
    {
        if let Some(series) = self.get(&key) {
            return Ok(series);
        }

        let series = fetch()?;
        self.insert(key, series.clone());
        Ok(series)
    }

    /// Drop every entry
    pub fn evict_all(&mut self) {
        debug!("evicting {} cached series", self.entries.len());
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
