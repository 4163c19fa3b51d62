//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1], alpha = 2/(n+1)
//! Seed: EMA[0] = close[0], no bias adjustment.
//! Lookback: period - 1. The recursion runs from the first bar, but values
//! before the window has filled are reported as NaN.

use super::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let mut result = ewm(&closes, self.period);
        mask_warmup(&mut result, self.lookback());
        result
    }
}

/// Unmasked exponential smoothing of an arbitrary series, seeded with its
/// first value. Used directly by MACD, whose signal line smooths the raw
/// MACD line from bar 0.
pub fn ewm(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n == 0 || period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = values[0];
    if prev.is_nan() {
        return result;
    }
    result[0] = prev;

    for i in 1..n {
        if values[i].is_nan() {
            // NaN propagates: once we see NaN, subsequent values are tainted
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}

/// Overwrite the first `lookback` entries with NaN.
pub(crate) fn mask_warmup(values: &mut [f64], lookback: usize) {
    for v in values.iter_mut().take(lookback) {
        *v = f64::NAN;
    }
}
