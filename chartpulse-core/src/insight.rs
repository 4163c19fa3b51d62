//! Headline metrics and signal insight for the latest bar of a table.

use crate::domain::{Signal, Timeframe};
use crate::indicators::IndicatorKind;
use crate::pipeline::AnalysisTable;
use serde::Serialize;
use std::fmt;

/// How many of the most recent non-hold signals are reported.
pub const RECENT_SIGNALS: usize = 3;

/// Long-term trend: close above or below EMA 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bull,
    Bear,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Bull => "BULL",
            Trend::Bear => "BEAR",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentSignal {
    pub time: String,
    pub close: f64,
    pub signal: Signal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub time: String,
    pub price: f64,
    /// Change vs. the previous row's close; `None` with a single row.
    pub change: Option<f64>,
    pub resistance: f64,
    pub support: f64,
    /// Cumulative strategy return in percent.
    pub strategy_profit_pct: f64,
    /// Worst peak-to-trough of the strategy equity curve, in percent.
    pub max_drawdown_pct: f64,
    /// Rows on which the strategy held a position.
    pub exposed_bars: usize,
    /// `None` when the EMA 200 column was not computed.
    pub trend: Option<Trend>,
    pub last_signal: Signal,
    /// A buy signal against a bear trend.
    pub counter_trend: bool,
    /// Oldest first.
    pub recent_signals: Vec<RecentSignal>,
}

impl Insight {
    /// `None` for an empty table.
    pub fn from_table(table: &AnalysisTable) -> Option<Self> {
        let last = table.last_row()?;
        let price = last.bar.close;

        let change = last
            .index
            .checked_sub(1)
            .map(|prev| price - table.bars()[prev].close);

        let trend = last.indicator(IndicatorKind::Ema200).map(|ema| {
            if price > ema {
                Trend::Bull
            } else {
                Trend::Bear
            }
        });

        let mut recent_signals: Vec<RecentSignal> = table
            .rows()
            .rev()
            .filter(|row| row.signal.is_active())
            .take(RECENT_SIGNALS)
            .map(|row| RecentSignal {
                time: table.time_label(row.index).unwrap_or_default(),
                close: row.bar.close,
                signal: row.signal,
            })
            .collect();
        recent_signals.reverse();

        Some(Self {
            symbol: table.symbol().to_string(),
            timeframe: table.timeframe(),
            time: table.time_label(last.index).unwrap_or_default(),
            price,
            change,
            resistance: last.indicator(IndicatorKind::Res).unwrap_or(f64::NAN),
            support: last.indicator(IndicatorKind::Sup).unwrap_or(f64::NAN),
            strategy_profit_pct: last.cumulative_return * 100.0,
            max_drawdown_pct: table.backtest().max_drawdown() * 100.0,
            exposed_bars: table.backtest().exposed_bars(),
            trend,
            last_signal: last.signal,
            counter_trend: last.signal == Signal::Buy && trend == Some(Trend::Bear),
            recent_signals,
        })
    }
}
