//! Moving Average Convergence Divergence (MACD).
//!
//! - Line: EMA(fast) - EMA(slow)
//! - Signal: EMA(signal) of the line
//! - Histogram: line - signal
//!
//! The EMAs run unmasked from bar 0 (see `ema::ewm`), so the signal line is
//! defined as soon as the line is. Warm-up is masked afterwards:
//! the line needs `slow - 1` bars, signal and histogram `slow + signal - 2`.

use super::ema::{ewm, mask_warmup};
use super::indicator::Indicator;
use crate::domain::Bar;

/// Which MACD output to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Line,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    output: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, output: MacdLine) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(fast < slow, "MACD fast period must be shorter than slow");
        let label = match output {
            MacdLine::Line => "line",
            MacdLine::Signal => "signal",
            MacdLine::Histogram => "hist",
        };
        Self {
            fast,
            slow,
            signal,
            output,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.output {
            MacdLine::Line => self.slow - 1,
            MacdLine::Signal | MacdLine::Histogram => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ewm(&closes, self.fast);
        let slow = ewm(&closes, self.slow);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();

        let mut result = match self.output {
            MacdLine::Line => line,
            MacdLine::Signal => ewm(&line, self.signal),
            MacdLine::Histogram => {
                let signal = ewm(&line, self.signal);
                line.iter().zip(&signal).map(|(l, s)| l - s).collect()
            }
        };
        mask_warmup(&mut result, self.lookback());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    fn rising(n: usize) -> Vec<Bar> {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        make_bars(&closes)
    }

    #[test]
    fn macd_lookbacks() {
        assert_eq!(Macd::new(12, 26, 9, MacdLine::Line).lookback(), 25);
        assert_eq!(Macd::new(12, 26, 9, MacdLine::Signal).lookback(), 33);
        assert_eq!(Macd::new(12, 26, 9, MacdLine::Histogram).lookback(), 33);
    }

    #[test]
    fn warmup_is_masked() {
        let bars = rising(40);
        let line = Macd::new(12, 26, 9, MacdLine::Line).compute(&bars);
        let signal = Macd::new(12, 26, 9, MacdLine::Signal).compute(&bars);
        assert!(line[24].is_nan());
        assert!(line[25].is_finite());
        assert!(signal[32].is_nan());
        assert!(signal[33].is_finite());
    }

    #[test]
    fn line_matches_ema_difference() {
        let bars = rising(40);
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let line = Macd::new(3, 6, 2, MacdLine::Line).compute(&bars);
        let fast = ewm(&closes, 3);
        let slow = ewm(&closes, 6);
        for i in 5..40 {
            assert_approx(line[i], fast[i] - slow[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn histogram_is_line_minus_signal() {
        let bars = make_bars(&[10.0, 12.0, 11.0, 14.0, 13.0, 15.0, 17.0, 16.0, 18.0, 20.0]);
        let line = Macd::new(2, 4, 3, MacdLine::Line).compute(&bars);
        let signal = Macd::new(2, 4, 3, MacdLine::Signal).compute(&bars);
        let hist = Macd::new(2, 4, 3, MacdLine::Histogram).compute(&bars);
        for i in 5..10 {
            assert_approx(hist[i], line[i] - signal[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn rising_prices_give_positive_line() {
        let bars = rising(60);
        let line = Macd::new(12, 26, 9, MacdLine::Line).compute(&bars);
        assert!(line[59] > 0.0);
    }

    #[test]
    fn flat_prices_give_zero() {
        let bars = make_bars(&[100.0; 40]);
        let hist = Macd::new(12, 26, 9, MacdLine::Histogram).compute(&bars);
        assert_approx(hist[39], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    #[should_panic]
    fn fast_must_be_shorter() {
        Macd::new(26, 12, 9, MacdLine::Line);
    }
}
