//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Signal causality: mutating bars after t never changes signal[t]
//! 2. Idempotence: analyzing the same series twice gives the same table
//! 3. Cumulative round-trip: each cumulative value is the previous one
//!    compounded by that row's strategy return
//! 4. Length law: every column has the table's length, which is the input
//!    length minus warm-up (or zero)

use chartpulse_core::domain::{Bar, Series, Timeframe};
use chartpulse_core::indicators::{Donchian, Indicator, IndicatorGroup};
use chartpulse_core::pipeline::{Analyzer, PipelineConfig};
use chartpulse_core::strategy::breakout_signals;
use chrono::{Duration, TimeZone, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_bars(min: usize, max: usize) -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((-3.0..3.0_f64, 0.0..2.0_f64, 0.0..2.0_f64), min..max).prop_map(
        |steps| {
            let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
            let mut price = 100.0_f64;
            steps
                .into_iter()
                .enumerate()
                .map(|(i, (step, up, down))| {
                    let open = price;
                    price = (price + step).max(1.0);
                    Bar {
                        time: base + Duration::days(i as i64),
                        open,
                        high: open.max(price) + up,
                        low: (open.min(price) - down).max(0.5),
                        close: price,
                        volume: 1000,
                    }
                })
                .collect()
        },
    )
}

fn arb_config() -> impl Strategy<Value = PipelineConfig> {
    (
        prop::collection::vec(any::<bool>(), IndicatorGroup::ALL.len()),
        2..30_usize,
    )
        .prop_map(|(mask, channel)| {
            let groups = IndicatorGroup::ALL
                .into_iter()
                .zip(mask)
                .filter_map(|(g, on)| on.then_some(g));
            let mut config = PipelineConfig::default().with_groups(groups);
            config.params.channel_period = channel;
            config
        })
}

fn series(bars: Vec<Bar>) -> Series {
    Series::new("PROP", Timeframe::D1, Tz::UTC, bars)
}

fn signals(bars: &[Bar], period: usize) -> Vec<Option<chartpulse_core::domain::Signal>> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let res = Donchian::upper(period).compute(bars);
    let sup = Donchian::lower(period).compute(bars);
    breakout_signals(&closes, &res, &sup)
}

// ── 1. Signal causality ──────────────────────────────────────────────

proptest! {
    /// Rewriting every bar after t leaves signal[0..=t] untouched.
    #[test]
    fn signals_ignore_future_bars(
        bars in arb_bars(30, 120),
        cut in 0.2..0.9_f64,
        bump in 1.0..50.0_f64,
    ) {
        let t = ((bars.len() as f64) * cut) as usize;
        let mut mutated = bars.clone();
        for bar in &mut mutated[t + 1..] {
            bar.high += bump;
            bar.low = (bar.low - bump).max(0.01);
            bar.close += bump / 2.0;
        }

        let before = signals(&bars, 20);
        let after = signals(&mutated, 20);
        prop_assert_eq!(&before[..=t], &after[..=t]);
    }

    /// The signal at t compares against the channel up to t-1, so bar t's
    /// own high and low cannot move it.
    #[test]
    fn signal_ignores_own_high_low(
        bars in arb_bars(25, 80),
        pick in 0.0..1.0_f64,
        bump in 1.0..50.0_f64,
    ) {
        let t = ((bars.len() - 1) as f64 * pick) as usize;
        let mut mutated = bars.clone();
        mutated[t].high += bump;
        mutated[t].low = (mutated[t].low - bump).max(0.01);

        prop_assert_eq!(signals(&bars, 20)[t], signals(&mutated, 20)[t]);
    }
}

// ── 2. Idempotence ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn analysis_is_idempotent(bars in arb_bars(0, 260), config in arb_config()) {
        let analyzer = Analyzer::new(config);
        let s = series(bars);
        prop_assert_eq!(analyzer.analyze(&s), analyzer.analyze(&s));
    }
}

// ── 3. Cumulative round-trip ─────────────────────────────────────────

proptest! {
    #[test]
    fn cumulative_return_compounds_strategy_returns(
        bars in arb_bars(0, 260),
        config in arb_config(),
    ) {
        let table = Analyzer::new(config).analyze(&series(bars));
        let backtest = table.backtest();

        let cum = &backtest.cumulative_return;
        for t in 1..cum.len() {
            let growth = (1.0 + cum[t - 1]) * (1.0 + backtest.strategy_return[t]);
            prop_assert!((growth - 1.0 - cum[t]).abs() < 1e-9 * growth.abs().max(1.0));
        }
    }
}

// ── 4. Length law ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn every_column_has_table_length(bars in arb_bars(0, 300), config in arb_config()) {
        let n = bars.len();
        let analyzer = Analyzer::new(config);
        let table = analyzer.analyze(&series(bars));
        let len = table.len();

        prop_assert!(len <= n.saturating_sub(analyzer.warmup_rows()));
        prop_assert_eq!(table.bars().len(), len);
        prop_assert_eq!(table.signals().len(), len);
        prop_assert_eq!(table.backtest().len(), len);
        for kind in table.indicators().kinds() {
            prop_assert_eq!(table.indicator(kind).map(<[f64]>::len), Some(len));
        }
    }

    /// With clean positive prices nothing but warm-up is dropped.
    #[test]
    fn clean_series_drops_only_warmup(bars in arb_bars(0, 300), config in arb_config()) {
        let n = bars.len();
        let analyzer = Analyzer::new(config);
        let table = analyzer.analyze(&series(bars));
        prop_assert_eq!(table.len(), n.saturating_sub(analyzer.warmup_rows()));
    }
}
