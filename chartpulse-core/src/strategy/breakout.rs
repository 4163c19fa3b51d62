//! Channel breakout signal.
//!
//! Buy when close breaks above the *previous* bar's resistance, Sell when it
//! breaks below the previous bar's support, Hold otherwise. The current bar's
//! own channel is never consulted, so `high[t]`/`low[t]` cannot move
//! `signal[t]`. Before the channel exists there is nothing to break, so those
//! bars hold.

use crate::domain::Signal;

/// One signal per bar, aligned with `closes`. Bar 0 and the channel warm-up
/// hold; `None` only where the close itself is NaN.
pub fn breakout_signals(closes: &[f64], res: &[f64], sup: &[f64]) -> Vec<Option<Signal>> {
    debug_assert_eq!(closes.len(), res.len());
    debug_assert_eq!(closes.len(), sup.len());

    (0..closes.len())
        .map(|t| {
            if t == 0 {
                return (!closes[0].is_nan()).then_some(Signal::Hold);
            }
            classify(closes[t], res[t - 1], sup[t - 1])
        })
        .collect()
}

/// Signal for a single close against the prior channel. A missing (NaN)
/// channel bound never triggers.
pub fn classify(close: f64, prev_res: f64, prev_sup: f64) -> Option<Signal> {
    if close.is_nan() {
        return None;
    }
    Some(if close > prev_res {
        Signal::Buy
    } else if close < prev_sup {
        Signal::Sell
    } else {
        Signal::Hold
    })
}
