//! Indicator trait and the fixed-schema indicator set.
//!
//! Indicators are pure functions: bar history in, numeric series out. Every
//! output series has the same length as the input and is aligned with it
//! index-for-index; warm-up entries are `f64::NAN`.

use crate::domain::Bar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_50", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading bars reported as `NaN`.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Every column an `IndicatorSet` can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Ema50,
    Ema200,
    BbMid,
    BbStd,
    BbUp,
    BbLow,
    Rsi,
    Macd,
    MacdSignal,
    MacdHist,
    Res,
    Sup,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 12] = [
        IndicatorKind::Ema50,
        IndicatorKind::Ema200,
        IndicatorKind::BbMid,
        IndicatorKind::BbStd,
        IndicatorKind::BbUp,
        IndicatorKind::BbLow,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::MacdSignal,
        IndicatorKind::MacdHist,
        IndicatorKind::Res,
        IndicatorKind::Sup,
    ];

    /// Column name used in exports and logs.
    pub fn name(self) -> &'static str {
        match self {
            IndicatorKind::Ema50 => "ema50",
            IndicatorKind::Ema200 => "ema200",
            IndicatorKind::BbMid => "bb_mid",
            IndicatorKind::BbStd => "bb_std",
            IndicatorKind::BbUp => "bb_up",
            IndicatorKind::BbLow => "bb_low",
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Macd => "macd",
            IndicatorKind::MacdSignal => "macd_signal",
            IndicatorKind::MacdHist => "macd_hist",
            IndicatorKind::Res => "res",
            IndicatorKind::Sup => "sup",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A switchable group of indicator columns. The Donchian channel (`res`/`sup`)
/// is not a group: the breakout signal needs it, so it always runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorGroup {
    Ema50,
    Ema200,
    Bollinger,
    Rsi,
    Macd,
}

impl IndicatorGroup {
    pub const ALL: [IndicatorGroup; 5] = [
        IndicatorGroup::Ema50,
        IndicatorGroup::Ema200,
        IndicatorGroup::Bollinger,
        IndicatorGroup::Rsi,
        IndicatorGroup::Macd,
    ];

    pub fn kinds(self) -> &'static [IndicatorKind] {
        match self {
            IndicatorGroup::Ema50 => &[IndicatorKind::Ema50],
            IndicatorGroup::Ema200 => &[IndicatorKind::Ema200],
            IndicatorGroup::Bollinger => &[
                IndicatorKind::BbMid,
                IndicatorKind::BbStd,
                IndicatorKind::BbUp,
                IndicatorKind::BbLow,
            ],
            IndicatorGroup::Rsi => &[IndicatorKind::Rsi],
            IndicatorGroup::Macd => &[
                IndicatorKind::Macd,
                IndicatorKind::MacdSignal,
                IndicatorKind::MacdHist,
            ],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IndicatorGroup::Ema50 => "ema50",
            IndicatorGroup::Ema200 => "ema200",
            IndicatorGroup::Bollinger => "bollinger",
            IndicatorGroup::Rsi => "rsi",
            IndicatorGroup::Macd => "macd",
        }
    }
}

impl fmt::Display for IndicatorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndicatorGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IndicatorGroup::ALL
            .into_iter()
            .find(|g| g.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown indicator group '{s}' (expected ema50, ema200, bollinger, rsi or macd)")
            })
    }
}

/// Computed indicator columns, all the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorSet {
    columns: BTreeMap<IndicatorKind, Vec<f64>>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: IndicatorKind, values: Vec<f64>) {
        debug_assert!(
            self.columns.values().next().map_or(true, |v| v.len() == values.len()),
            "indicator column {kind} has a mismatched length"
        );
        self.columns.insert(kind, values);
    }

    pub fn get(&self, kind: IndicatorKind) -> Option<&[f64]> {
        self.columns.get(&kind).map(|v| v.as_slice())
    }

    /// Value of `kind` at row `index`, if the column exists.
    pub fn value(&self, kind: IndicatorKind, index: usize) -> Option<f64> {
        self.columns.get(&kind).and_then(|v| v.get(index).copied())
    }

    pub fn contains(&self, kind: IndicatorKind) -> bool {
        self.columns.contains_key(&kind)
    }

    /// Present columns in schema order.
    pub fn kinds(&self) -> impl Iterator<Item = IndicatorKind> + '_ {
        self.columns.keys().copied()
    }

    /// Row count (0 for a set with no columns).
    pub fn len(&self) -> usize {
        self.columns.values().next().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every column is finite at `index`.
    pub fn is_row_complete(&self, index: usize) -> bool {
        self.columns
            .values()
            .all(|v| v.get(index).is_some_and(|x| x.is_finite()))
    }

    /// Keep only the given rows, in the given order. Out-of-range rows are skipped.
    pub fn select_rows(&self, rows: &[usize]) -> IndicatorSet {
        IndicatorSet {
            columns: self
                .columns
                .iter()
                .map(|(k, v)| (*k, rows.iter().filter_map(|&i| v.get(i).copied()).collect()))
                .collect(),
        }
    }
}
