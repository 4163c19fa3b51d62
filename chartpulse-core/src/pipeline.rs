//! Analysis pipeline: bars → indicators → breakout signal → backtest.
//!
//! `Analyzer::analyze` is a pure function of the series and the pipeline
//! configuration. Every series is computed over the full bar history in time
//! order, then only fully-populated rows are kept, so the output starts after
//! the largest warm-up window.
//!
//! `Pipeline::compute` adds the cached loader in front. Symbol and timeframe
//! are request parameters; nothing about the caller's UI state lives here.

use crate::data::BarLoader;
use crate::domain::{Bar, Series, Signal, Timeframe, TIME_LABEL_FORMAT};
use crate::indicators::{
    Bollinger, BollingerBand, Donchian, Ema, Indicator, IndicatorGroup, IndicatorKind,
    IndicatorSet, Macd, MacdLine, Rsi, RsiSmoothing, Sma, StdDev,
};
use crate::strategy::{breakout_signals, strategy_returns, BacktestResult};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Trend EMA periods. Part of the column names, so not configurable.
pub const EMA_FAST_TREND: usize = 50;
pub const EMA_SLOW_TREND: usize = 200;

/// Window lengths and multipliers for the configurable indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub channel_period: usize,
    pub bollinger_period: usize,
    pub bollinger_width: f64,
    pub rsi_period: usize,
    pub rsi_smoothing: RsiSmoothing,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            channel_period: 20,
            bollinger_period: 20,
            bollinger_width: 2.0,
            rsi_period: 14,
            rsi_smoothing: RsiSmoothing::Simple,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

/// Which indicator groups run, and with what parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub enabled: BTreeSet<IndicatorGroup>,
    pub params: IndicatorParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enabled: IndicatorGroup::ALL.into_iter().collect(),
            params: IndicatorParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Only the Donchian channel, which always runs.
    pub fn channel_only() -> Self {
        Self {
            enabled: BTreeSet::new(),
            params: IndicatorParams::default(),
        }
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = IndicatorGroup>) -> Self {
        self.enabled = groups.into_iter().collect();
        self
    }

    pub fn with_params(mut self, params: IndicatorParams) -> Self {
        self.params = params;
        self
    }

    pub fn is_enabled(&self, group: IndicatorGroup) -> bool {
        self.enabled.contains(&group)
    }
}

/// Pure analysis over an in-memory series.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: PipelineConfig,
}

impl Analyzer {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Indicator instances for every enabled column, plus the channel.
    fn indicators(&self) -> Vec<(IndicatorKind, Box<dyn Indicator>)> {
        let p = &self.config.params;
        let mut out: Vec<(IndicatorKind, Box<dyn Indicator>)> = Vec::new();

        for group in &self.config.enabled {
            match group {
                IndicatorGroup::Ema50 => {
                    out.push((IndicatorKind::Ema50, Box::new(Ema::new(EMA_FAST_TREND))));
                }
                IndicatorGroup::Ema200 => {
                    out.push((IndicatorKind::Ema200, Box::new(Ema::new(EMA_SLOW_TREND))));
                }
                IndicatorGroup::Bollinger => {
                    let (n, w) = (p.bollinger_period, p.bollinger_width);
                    out.push((IndicatorKind::BbMid, Box::new(Sma::new(n))));
                    out.push((IndicatorKind::BbStd, Box::new(StdDev::new(n))));
                    out.push((
                        IndicatorKind::BbUp,
                        Box::new(Bollinger::new(n, w, BollingerBand::Upper)),
                    ));
                    out.push((
                        IndicatorKind::BbLow,
                        Box::new(Bollinger::new(n, w, BollingerBand::Lower)),
                    ));
                }
                IndicatorGroup::Rsi => {
                    out.push((
                        IndicatorKind::Rsi,
                        Box::new(Rsi::with_smoothing(p.rsi_period, p.rsi_smoothing)),
                    ));
                }
                IndicatorGroup::Macd => {
                    let (f, s, g) = (p.macd_fast, p.macd_slow, p.macd_signal);
                    out.push((IndicatorKind::Macd, Box::new(Macd::new(f, s, g, MacdLine::Line))));
                    out.push((
                        IndicatorKind::MacdSignal,
                        Box::new(Macd::new(f, s, g, MacdLine::Signal)),
                    ));
                    out.push((
                        IndicatorKind::MacdHist,
                        Box::new(Macd::new(f, s, g, MacdLine::Histogram)),
                    ));
                }
            }
        }

        out.push((IndicatorKind::Res, Box::new(Donchian::upper(p.channel_period))));
        out.push((IndicatorKind::Sup, Box::new(Donchian::lower(p.channel_period))));
        out
    }

    /// Full-length indicator columns, warm-up included.
    pub fn compute_indicators(&self, bars: &[Bar]) -> IndicatorSet {
        let mut set = IndicatorSet::new();
        for (kind, indicator) in self.indicators() {
            set.insert(kind, indicator.compute(bars));
        }
        set
    }

    /// Leading rows dropped from every table: the largest indicator lookback.
    /// Bar 0 never has a strategy return, so at least one row goes.
    pub fn warmup_rows(&self) -> usize {
        self.indicators()
            .iter()
            .map(|(_, ind)| ind.lookback())
            .max()
            .unwrap_or(0)
            .max(1)
    }

    pub fn analyze(&self, series: &Series) -> AnalysisTable {
        let started = Instant::now();
        let bars = &series.bars;
        let closes = series.closes();

        let full = self.compute_indicators(bars);
        let res = full.get(IndicatorKind::Res).unwrap_or_default();
        let sup = full.get(IndicatorKind::Sup).unwrap_or_default();
        let signals = breakout_signals(&closes, res, sup);
        let backtest = BacktestResult::from_returns(strategy_returns(&closes, &signals));
        let returns = &backtest.strategy_return;

        let start = self.warmup_rows();
        let keep: Vec<usize> = (start..bars.len())
            .filter(|&t| full.is_row_complete(t) && signals[t].is_some() && returns[t].is_finite())
            .collect();

        let table = AnalysisTable {
            symbol: series.symbol.clone(),
            timeframe: series.timeframe,
            timezone: series.timezone,
            bars: keep.iter().map(|&t| bars[t].clone()).collect(),
            indicators: full.select_rows(&keep),
            signals: keep.iter().filter_map(|&t| signals[t]).collect(),
            backtest: backtest.select_rows(&keep),
        };

        debug!(
            symbol = %series.symbol,
            timeframe = %series.timeframe,
            input_bars = bars.len(),
            rows = table.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "analyzed series"
        );
        table
    }
}

/// Bars, indicators, signals and backtest, all of equal length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisTable {
    symbol: String,
    timeframe: Timeframe,
    timezone: Tz,
    bars: Vec<Bar>,
    indicators: IndicatorSet,
    signals: Vec<Signal>,
    backtest: BacktestResult,
}

/// One row of an `AnalysisTable`.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub index: usize,
    pub bar: &'a Bar,
    pub signal: Signal,
    pub strategy_return: f64,
    pub cumulative_return: f64,
    indicators: &'a IndicatorSet,
}

impl Row<'_> {
    pub fn indicator(&self, kind: IndicatorKind) -> Option<f64> {
        self.indicators.value(kind, self.index)
    }
}

impl AnalysisTable {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    /// A column, or `None` when its group was not enabled.
    pub fn indicator(&self, kind: IndicatorKind) -> Option<&[f64]> {
        self.indicators.get(kind)
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn backtest(&self) -> &BacktestResult {
        &self.backtest
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        let bar = self.bars.get(index)?;
        Some(Row {
            index,
            bar,
            signal: self.signals[index],
            strategy_return: self.backtest.strategy_return[index],
            cumulative_return: self.backtest.cumulative_return[index],
            indicators: &self.indicators,
        })
    }

    pub fn last_row(&self) -> Option<Row<'_>> {
        self.len().checked_sub(1).and_then(|i| self.row(i))
    }

    pub fn rows(&self) -> impl DoubleEndedIterator<Item = Row<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    /// Bar time at `index` in the display zone.
    pub fn time_label(&self, index: usize) -> Option<String> {
        self.bars.get(index).map(|bar| {
            bar.time
                .with_timezone(&self.timezone)
                .format(TIME_LABEL_FORMAT)
                .to_string()
        })
    }
}

/// Loader + analyzer: `compute(symbol, timeframe)`.
pub struct Pipeline {
    loader: BarLoader,
    analyzer: Analyzer,
}

impl Pipeline {
    pub fn new(loader: BarLoader, analyzer: Analyzer) -> Self {
        Self { loader, analyzer }
    }

    /// Fetch (or reuse) the bars and analyze them. A failed fetch yields an
    /// empty table.
    pub fn compute(&self, symbol: &str, timeframe: Timeframe) -> AnalysisTable {
        let series: Arc<Series> = self.loader.load(symbol, timeframe);
        self.analyzer.analyze(&series)
    }

    pub fn loader(&self) -> &BarLoader {
        &self.loader
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Drop cached bars so the next `compute` refetches.
    pub fn refresh(&self) {
        self.loader.clear_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    fn series(closes: &[f64]) -> Series {
        Series::new("TEST", Timeframe::D1, Tz::Asia__Bangkok, make_bars(closes))
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + 10.0 * (i as f64 / 7.0).sin() + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn default_warmup_is_ema200() {
        assert_eq!(Analyzer::default().warmup_rows(), 199);
    }

    #[test]
    fn channel_only_warmup() {
        let analyzer = Analyzer::new(PipelineConfig::channel_only());
        assert_eq!(analyzer.warmup_rows(), 19);
    }

    #[test]
    fn macd_only_warmup() {
        let config = PipelineConfig::default().with_groups([IndicatorGroup::Macd]);
        assert_eq!(Analyzer::new(config).warmup_rows(), 33);
    }

    #[test]
    fn length_law() {
        let analyzer = Analyzer::default();
        for n in [200, 201, 250, 400] {
            let table = analyzer.analyze(&series(&wave(n)));
            assert_eq!(table.len(), n - 199, "n = {n}");
            assert_eq!(table.signals().len(), table.len());
            assert_eq!(table.backtest().len(), table.len());
            assert_eq!(table.indicators().len(), table.len());
        }
    }

    #[test]
    fn short_series_is_empty_table() {
        let analyzer = Analyzer::default();
        for n in [0, 1, 2, 150, 199] {
            let table = analyzer.analyze(&series(&wave(n)));
            assert!(table.is_empty(), "n = {n}");
            assert!(table.last_row().is_none());
            assert!(table.indicator(IndicatorKind::Ema200).is_some());
        }
    }

    #[test]
    fn disabled_groups_have_no_columns() {
        let config = PipelineConfig::default().with_groups([IndicatorGroup::Rsi]);
        let table = Analyzer::new(config).analyze(&series(&wave(60)));
        assert!(table.indicator(IndicatorKind::Rsi).is_some());
        assert!(table.indicator(IndicatorKind::Res).is_some());
        assert!(table.indicator(IndicatorKind::Ema200).is_none());
        assert!(table.indicator(IndicatorKind::BbUp).is_none());
    }

    #[test]
    fn rows_carry_row_values() {
        let table = Analyzer::default().analyze(&series(&wave(260)));
        let last = table.last_row().unwrap();
        assert_eq!(last.index, table.len() - 1);
        assert_eq!(last.bar, table.bars().last().unwrap());
        assert_eq!(
            last.indicator(IndicatorKind::Res),
            table.indicator(IndicatorKind::Res).and_then(|v| v.last().copied())
        );
        assert_approx(last.cumulative_return, table.backtest().total_return(), DEFAULT_EPSILON);
        assert_eq!(table.rows().count(), table.len());
    }

    #[test]
    fn time_label_uses_display_zone() {
        let table = Analyzer::new(PipelineConfig::channel_only()).analyze(&series(&wave(30)));
        // Bars are at 00:00 UTC; Bangkok is UTC+7.
        assert_eq!(table.time_label(0).unwrap(), "2024-01-21 07:00:00");
        assert!(table.time_label(table.len()).is_none());
    }

    #[test]
    fn channel_only_length_law() {
        let analyzer = Analyzer::new(PipelineConfig::channel_only());
        for n in [19, 20, 21, 45] {
            let table = analyzer.analyze(&series(&wave(n)));
            assert_eq!(table.len(), n.saturating_sub(19), "n = {n}");
        }
    }

    #[test]
    fn cumulative_return_counts_bars_before_the_cut() {
        // Breakout at bar 25, then a steady climb that ends well before the
        // EMA 200 warm-up is over.
        let mut closes = vec![100.0; 25];
        let mut price = 100.0;
        for _ in 25..150 {
            price *= 1.01;
            closes.push(price);
        }
        closes.resize(260, price);

        let table = Analyzer::default().analyze(&series(&closes));
        assert_eq!(table.len(), 260 - 199);

        let full = Analyzer::default().analyze(&series(&closes[..200]));
        let expected = full.backtest().total_return();
        assert!(expected > 1.0, "climb should have paid: {expected}");
        // Flat after bar 150, so the final total equals the total at bar 199.
        assert_approx(table.backtest().total_return(), expected, DEFAULT_EPSILON);
        assert_approx(table.backtest().cumulative_return[0], expected, DEFAULT_EPSILON);
    }

    #[test]
    fn retained_rows_are_complete() {
        let table = Analyzer::default().analyze(&series(&wave(300)));
        for kind in table.indicators().kinds() {
            let col = table.indicator(kind).unwrap();
            assert!(col.iter().all(|v| v.is_finite()), "{kind} has NaN");
        }
        assert!(table.backtest().strategy_return.iter().all(|r| r.is_finite()));
    }
}
