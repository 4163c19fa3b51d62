//! Series: ordered bars for one symbol and one timeframe.

use super::{Bar, Timeframe};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Time format used for bar labels, in the series' display zone.
pub const TIME_LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Bars of one symbol at one timeframe, ascending by `time`, no duplicates.
///
/// Constructed by the normalizer; `Series::new` does not re-check ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub timezone: Tz,
    pub bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, timezone: Tz, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            timezone,
            bars,
        }
    }

    /// The explicit "no data available" series.
    pub fn empty(symbol: impl Into<String>, timeframe: Timeframe, timezone: Tz) -> Self {
        Self::new(symbol, timeframe, timezone, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Label for a bar's time in the display zone.
    pub fn time_label(&self, bar: &Bar) -> String {
        bar.time
            .with_timezone(&self.timezone)
            .format(TIME_LABEL_FORMAT)
            .to_string()
    }

    /// True when times are strictly ascending.
    pub fn is_strictly_ascending(&self) -> bool {
        self.bars.windows(2).all(|w| w[0].time < w[1].time)
    }

    /// BLAKE3 hash over symbol, timeframe and all bar data.
    ///
    /// Two series with the same fingerprint produce identical analysis output.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.symbol.as_bytes());
        hasher.update(self.timeframe.provider_code().as_bytes());
        for bar in &self.bars {
            hasher.update(&bar.time.timestamp().to_le_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar_at(hour: u32, close: f64) -> Bar {
        Bar {
            time: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10,
        }
    }

    #[test]
    fn time_label_uses_display_zone() {
        let series = Series::new(
            "PTT.BK",
            Timeframe::H1,
            chrono_tz::Asia::Bangkok,
            vec![bar_at(3, 35.0)],
        );
        // 03:00 UTC is 10:00 in Bangkok (UTC+7)
        assert_eq!(series.time_label(&series.bars[0]), "2024-03-01 10:00:00");
    }

    #[test]
    fn fingerprint_is_stable_and_data_sensitive() {
        let a = Series::new("AAPL", Timeframe::H1, Tz::UTC, vec![bar_at(1, 10.0), bar_at(2, 11.0)]);
        let b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut c = a.clone();
        c.bars[1].close = 11.5;
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn ascending_check() {
        let ok = Series::new("X", Timeframe::H1, Tz::UTC, vec![bar_at(1, 1.0), bar_at(2, 1.0)]);
        assert!(ok.is_strictly_ascending());
        let dup = Series::new("X", Timeframe::H1, Tz::UTC, vec![bar_at(1, 1.0), bar_at(1, 1.0)]);
        assert!(!dup.is_strictly_ascending());
    }

    #[test]
    fn empty_series() {
        let s = Series::empty("BTC-USD", Timeframe::M5, Tz::UTC);
        assert!(s.is_empty());
        assert!(s.last().is_none());
        assert!(s.closes().is_empty());
    }
}
