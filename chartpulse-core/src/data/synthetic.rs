//! Synthetic random-walk provider for demos without network access.
//!
//! Deterministic per `(symbol, timeframe)`: the RNG is seeded from a BLAKE3
//! hash of both, and bar times count back from a fixed anchor. Results are
//! tagged `DataSource::Synthetic`.

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use super::raw::{ColumnLabel, RawTable, RawTimestamp};
use crate::domain::{Lookback, Timeframe};
use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const START_PRICE: f64 = 100.0;

pub struct SyntheticProvider {
    anchor: DateTime<Utc>,
}

impl SyntheticProvider {
    /// Bars end at `anchor`, rounded down to the interval.
    pub fn new(anchor: DateTime<Utc>) -> Self {
        Self { anchor }
    }

    fn seed(symbol: &str, timeframe: Timeframe) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(symbol.as_bytes());
        hasher.update(timeframe.provider_code().as_bytes());
        *hasher.finalize().as_bytes()
    }

    fn generate(&self, symbol: &str, timeframe: Timeframe, lookback: Lookback) -> RawTable {
        let step = timeframe.seconds();
        let end = self.anchor.timestamp() - self.anchor.timestamp().rem_euclid(step);
        let start = end - lookback.approx_days() * 24 * 60 * 60;

        let mut rng = StdRng::from_seed(Self::seed(symbol, timeframe));
        let volatility = match timeframe {
            Timeframe::M5 => 0.002,
            Timeframe::M15 => 0.004,
            Timeframe::H1 => 0.008,
            Timeframe::D1 => 0.02,
        };

        let mut index = Vec::new();
        let (mut open, mut high, mut low, mut close, mut volume) =
            (Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new());
        let mut price = START_PRICE;

        let mut ts = start;
        while ts <= end {
            let skip_weekend = timeframe == Timeframe::D1
                && DateTime::from_timestamp(ts, 0)
                    .map(|dt| matches!(dt.weekday(), Weekday::Sat | Weekday::Sun))
                    .unwrap_or(false);

            if !skip_weekend {
                let ret: f64 = rng.gen_range(-volatility..volatility);
                let o = price;
                let c = (price * (1.0 + ret)).max(0.01);
                let h = o.max(c) * (1.0 + rng.gen_range(0.0..volatility / 2.0));
                let l = o.min(c) * (1.0 - rng.gen_range(0.0..volatility / 2.0));

                index.push(RawTimestamp::Epoch(ts));
                open.push(Some(o));
                high.push(Some(h));
                low.push(Some(l));
                close.push(Some(c));
                volume.push(Some(f64::from(rng.gen_range(1_000u32..500_000))));
                price = c;
            }
            ts += step;
        }

        let index_name = if timeframe.is_intraday() { "Datetime" } else { "Date" };
        let mut table = RawTable::new(index_name);
        table.index = index;
        table.push_column(ColumnLabel::new("Open"), open);
        table.push_column(ColumnLabel::new("High"), high);
        table.push_column(ColumnLabel::new("Low"), low);
        table.push_column(ColumnLabel::new("Close"), close);
        table.push_column(ColumnLabel::new("Volume"), volume);
        table
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        let now = Utc::now();
        Self::new(now - Duration::seconds(now.timestamp().rem_euclid(60)))
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback: Lookback,
    ) -> Result<FetchResult, DataError> {
        Ok(FetchResult {
            symbol: symbol.to_string(),
            table: self.generate(symbol, timeframe, lookback),
            source: DataSource::Synthetic,
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}
