//! Bar loading: provider → normalizer, behind the TTL cache.
//!
//! `load` never fails. Any fetch or normalization error is logged and turned
//! into an empty series, so one bad symbol cannot take down the other panels.
//! Only successful fetches are cached; a transient failure is retried on the
//! next refresh tick.

use super::cache::{CacheKey, TtlCache};
use super::normalize::Normalizer;
use super::provider::{DataError, DataProvider};
use crate::domain::{Lookback, Series, Timeframe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct BarLoader {
    provider: Box<dyn DataProvider>,
    normalizer: Normalizer,
    cache: TtlCache<CacheKey, Arc<Series>>,
    lookback_override: Option<Lookback>,
}

impl BarLoader {
    pub fn new(provider: Box<dyn DataProvider>, normalizer: Normalizer, ttl: Duration) -> Self {
        Self {
            provider,
            normalizer,
            cache: TtlCache::new(ttl),
            lookback_override: None,
        }
    }

    /// Request this range for every timeframe instead of the per-interval default.
    pub fn with_lookback(mut self, lookback: Lookback) -> Self {
        self.lookback_override = Some(lookback);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn lookback_for(&self, timeframe: Timeframe) -> Lookback {
        self.lookback_override
            .unwrap_or_else(|| timeframe.default_lookback())
    }

    /// Cached or freshly fetched series; empty on any failure.
    pub fn load(&self, symbol: &str, timeframe: Timeframe) -> Arc<Series> {
        match self.try_load(symbol, timeframe) {
            Ok(series) => series,
            Err(e) => {
                warn!(symbol, timeframe = %timeframe, error = %e, "fetch failed, serving empty series");
                Arc::new(Series::empty(symbol, timeframe, self.normalizer.timezone()))
            }
        }
    }

    /// Like `load`, but surfaces the error.
    pub fn try_load(&self, symbol: &str, timeframe: Timeframe) -> Result<Arc<Series>, DataError> {
        let key = CacheKey::new(symbol, timeframe);
        if let Some(series) = self.cache.get(&key) {
            debug!(symbol, timeframe = %timeframe, "cache hit");
            return Ok(series);
        }
        let purged = self.cache.purge_expired();
        debug!(symbol, timeframe = %timeframe, purged, "cache miss");

        if !self.provider.is_available() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let started = Instant::now();
        let lookback = self.lookback_for(timeframe);
        let fetched = self.provider.fetch(symbol, timeframe, lookback)?;
        let series = Arc::new(self.normalizer.normalize(symbol, timeframe, &fetched.table)?);

        info!(
            symbol,
            timeframe = %timeframe,
            provider = self.provider.name(),
            source = ?fetched.source,
            bars = series.len(),
            fingerprint = %series.fingerprint(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched series"
        );

        self.cache.insert(key, Arc::clone(&series));
        Ok(series)
    }

    /// Forget everything fetched so far (the dashboard's "refresh data").
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}
