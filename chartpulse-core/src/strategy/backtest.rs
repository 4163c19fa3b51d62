//! Naive signal-following backtest.
//!
//! The position held over bar t is the signal fired at t-1:
//! `strategy_return[t] = signal[t-1] * (close[t] / close[t-1] - 1)`.
//! No sizing, costs or slippage. Cumulative return compounds from the start
//! of the series, with undefined returns counting as 0; rows are selected
//! only afterwards, so a table cut after warm-up still reports growth since
//! the first bar.

use crate::domain::Signal;
use serde::Serialize;

/// Per-bar strategy returns, aligned with `closes`. NaN where the previous
/// signal is undefined or the previous close is zero or NaN.
pub fn strategy_returns(closes: &[f64], signals: &[Option<Signal>]) -> Vec<f64> {
    debug_assert_eq!(closes.len(), signals.len());

    (0..closes.len())
        .map(|t| {
            if t == 0 {
                return f64::NAN;
            }
            let prev = closes[t - 1];
            match signals[t - 1] {
                Some(signal) if prev != 0.0 && prev.is_finite() => {
                    signal.as_f64() * (closes[t] / prev - 1.0)
                }
                _ => f64::NAN,
            }
        })
        .collect()
}

/// Strategy returns and their compounded running total.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BacktestResult {
    pub strategy_return: Vec<f64>,
    pub cumulative_return: Vec<f64>,
}

impl BacktestResult {
    /// Compound `returns` from the first element: Π(1 + r) - 1.
    pub fn from_returns(returns: Vec<f64>) -> Self {
        let mut growth = 1.0;
        let cumulative_return = returns
            .iter()
            .map(|&r| {
                if r.is_finite() {
                    growth *= 1.0 + r;
                }
                growth - 1.0
            })
            .collect();
        Self {
            strategy_return: returns,
            cumulative_return,
        }
    }

    /// The given rows of both columns, in order. Cumulative values keep
    /// their growth from the full series.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            strategy_return: rows.iter().map(|&t| self.strategy_return[t]).collect(),
            cumulative_return: rows.iter().map(|&t| self.cumulative_return[t]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.strategy_return.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategy_return.is_empty()
    }

    /// Final cumulative return (0 for an empty backtest).
    pub fn total_return(&self) -> f64 {
        self.cumulative_return.last().copied().unwrap_or(0.0)
    }

    /// Largest peak-to-trough fall of the growth curve, as a negative fraction.
    pub fn max_drawdown(&self) -> f64 {
        let mut peak = 1.0_f64;
        let mut max_dd = 0.0_f64;
        for c in &self.cumulative_return {
            let equity = 1.0 + c;
            peak = peak.max(equity);
            if peak > 0.0 {
                max_dd = max_dd.min((equity - peak) / peak);
            }
        }
        max_dd
    }

    /// Bars on which a position was held.
    pub fn exposed_bars(&self) -> usize {
        self.strategy_return
            .iter()
            .filter(|r| r.is_finite() && **r != 0.0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn position_enters_the_bar_after_the_signal() {
        let closes = [100.0, 110.0, 121.0, 108.9];
        let signals = [None, Some(Signal::Buy), Some(Signal::Sell), Some(Signal::Hold)];
        let r = strategy_returns(&closes, &signals);
        assert!(r[0].is_nan());
        // signal[0] undefined
        assert!(r[1].is_nan());
        // long from bar 1: +10%
        assert_approx(r[2], 0.10, DEFAULT_EPSILON);
        // short from bar 2: price -10% → +10%
        assert_approx(r[3], 0.10, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_previous_close_is_undefined() {
        let r = strategy_returns(&[0.0, 5.0], &[Some(Signal::Buy), None]);
        assert!(r[1].is_nan());
    }

    #[test]
    fn selected_rows_keep_earlier_growth() {
        let full = BacktestResult::from_returns(vec![f64::NAN, 0.5, 0.0, 0.1]);
        let tail = full.select_rows(&[2, 3]);
        assert_eq!(tail.strategy_return, vec![0.0, 0.1]);
        assert_approx(tail.cumulative_return[0], 0.5, DEFAULT_EPSILON);
        assert_approx(tail.total_return(), 1.5 * 1.1 - 1.0, DEFAULT_EPSILON);
        assert!(full.select_rows(&[]).is_empty());
    }

    #[test]
    fn compounding_skips_undefined() {
        let result = BacktestResult::from_returns(vec![f64::NAN, 0.1, 0.1, -0.5]);
        assert_approx(result.cumulative_return[0], 0.0, DEFAULT_EPSILON);
        assert_approx(result.cumulative_return[1], 0.1, DEFAULT_EPSILON);
        assert_approx(result.cumulative_return[2], 0.21, DEFAULT_EPSILON);
        assert_approx(result.cumulative_return[3], 1.21 * 0.5 - 1.0, DEFAULT_EPSILON);
        assert_approx(result.total_return(), -0.395, 1e-12);
    }

    #[test]
    fn drawdown_and_exposure() {
        let result = BacktestResult::from_returns(vec![0.0, 0.5, -0.5, 0.0]);
        // growth 1.0 → 1.5 → 0.75
        assert_approx(result.max_drawdown(), -0.5, DEFAULT_EPSILON);
        assert_eq!(result.exposed_bars(), 2);
    }

    #[test]
    fn empty_backtest() {
        let result = BacktestResult::from_returns(Vec::new());
        assert!(result.is_empty());
        assert_eq!(result.total_return(), 0.0);
        assert_eq!(result.max_drawdown(), 0.0);
    }
}
