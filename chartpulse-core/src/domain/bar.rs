//! Bar: one OHLCV sample for a fixed interval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for one sampling interval of a traded instrument.
///
/// `time` is the bar's open instant in UTC. Display code converts it into
/// the series' time zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Positive, finite prices. Does not check the high/low envelope.
    pub fn has_positive_prices(&self) -> bool {
        !self.is_void()
            && self.open > 0.0
            && self.high > 0.0
            && self.low > 0.0
            && self.close > 0.0
    }

    /// Full OHLC sanity check: `low <= open, close <= high`, positive prices.
    pub fn is_sane(&self) -> bool {
        self.has_positive_prices()
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}
