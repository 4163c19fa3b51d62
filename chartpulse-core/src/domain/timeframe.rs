//! Sampling interval and provider lookback range.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bar interval supported by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5m", alias = "5min")]
    M5,
    #[serde(rename = "15m", alias = "15min")]
    M15,
    #[serde(rename = "1h", alias = "1hour")]
    H1,
    #[serde(rename = "1d", alias = "1day")]
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [Timeframe::M5, Timeframe::M15, Timeframe::H1, Timeframe::D1];

    /// Interval code understood by the market-data provider.
    pub fn provider_code(self) -> &'static str {
        match self {
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::D1 => "1d",
        }
    }

    /// Dashboard label (`5min`, `15min`, `1hour`, `1day`).
    pub fn label(self) -> &'static str {
        match self {
            Timeframe::M5 => "5min",
            Timeframe::M15 => "15min",
            Timeframe::H1 => "1hour",
            Timeframe::D1 => "1day",
        }
    }

    /// Nominal length of one bar in seconds.
    pub fn seconds(self) -> i64 {
        match self {
            Timeframe::M5 => 5 * 60,
            Timeframe::M15 => 15 * 60,
            Timeframe::H1 => 60 * 60,
            Timeframe::D1 => 24 * 60 * 60,
        }
    }

    pub fn is_intraday(self) -> bool {
        !matches!(self, Timeframe::D1)
    }

    /// Default lookback bounding the payload per interval: 60 days of
    /// intraday bars, two years of daily bars.
    pub fn default_lookback(self) -> Lookback {
        if self.is_intraday() {
            Lookback::Days(60)
        } else {
            Lookback::Years(2)
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseTimeframeError {
    #[error("unknown timeframe '{0}' (expected 5min, 15min, 1hour or 1day)")]
    UnknownTimeframe(String),

    #[error("invalid lookback '{0}' (expected e.g. 5d, 60d, 6mo, 2y)")]
    InvalidLookback(String),
}

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "5m" | "5min" => Ok(Timeframe::M5),
            "15m" | "15min" => Ok(Timeframe::M15),
            "1h" | "60m" | "1hour" => Ok(Timeframe::H1),
            "1d" | "1day" | "daily" => Ok(Timeframe::D1),
            other => Err(ParseTimeframeError::UnknownTimeframe(other.to_string())),
        }
    }
}

/// How far back to request history, in the provider's range notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookback {
    Days(u32),
    Months(u32),
    Years(u32),
}

impl Lookback {
    /// Approximate calendar days covered.
    pub fn approx_days(self) -> i64 {
        match self {
            Lookback::Days(n) => i64::from(n),
            Lookback::Months(n) => i64::from(n) * 30,
            Lookback::Years(n) => i64::from(n) * 365,
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Days(n) => write!(f, "{n}d"),
            Lookback::Months(n) => write!(f, "{n}mo"),
            Lookback::Years(n) => write!(f, "{n}y"),
        }
    }
}

impl FromStr for Lookback {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_lowercase();
        let invalid = || ParseTimeframeError::InvalidLookback(s.to_string());

        let split = raw
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (digits, unit) = raw.split_at(split);
        let n: u32 = digits.parse().map_err(|_| invalid())?;
        if n == 0 {
            return Err(invalid());
        }

        match unit {
            "d" => Ok(Lookback::Days(n)),
            "mo" => Ok(Lookback::Months(n)),
            "y" => Ok(Lookback::Years(n)),
            _ => Err(invalid()),
        }
    }
}
