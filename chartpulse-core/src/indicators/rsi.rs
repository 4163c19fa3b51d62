//! Relative Strength Index (RSI).
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Averages are either plain rolling means of the last `period` gains and
//! losses (the chart dashboards' formula) or Wilder-smoothed.
//! Lookback: period.
//! Edge cases: avg_loss == 0 → 100; avg_gain == 0 → 0; both zero → 50.

use super::indicator::Indicator;
use crate::domain::Bar;
use serde::{Deserialize, Serialize};

/// How average gain and loss are carried from bar to bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiSmoothing {
    /// Rolling mean over the trailing window.
    #[default]
    Simple,
    /// Seeded with the simple mean, then `avg = (avg * (n-1) + x) / n`.
    Wilder,
}

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    smoothing: RsiSmoothing,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self::with_smoothing(period, RsiSmoothing::Simple)
    }

    pub fn with_smoothing(period: usize, smoothing: RsiSmoothing) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            smoothing,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period + 1 {
            return result;
        }

        // Split price changes into gain and loss magnitudes; index 0 has none.
        let mut gains = vec![f64::NAN; n];
        let mut losses = vec![f64::NAN; n];
        for i in 1..n {
            let change = bars[i].close - bars[i - 1].close;
            if change.is_nan() {
                continue;
            }
            gains[i] = change.max(0.0);
            losses[i] = (-change).max(0.0);
        }

        match self.smoothing {
            RsiSmoothing::Simple => {
                for i in self.period..n {
                    let window = (i + 1 - self.period)..=i;
                    let gain = &gains[window.clone()];
                    let loss = &losses[window];
                    if gain.iter().any(|v| v.is_nan()) {
                        continue;
                    }
                    let avg_gain = gain.iter().sum::<f64>() / self.period as f64;
                    let avg_loss = loss.iter().sum::<f64>() / self.period as f64;
                    result[i] = compute_rsi(avg_gain, avg_loss);
                }
            }
            RsiSmoothing::Wilder => {
                let seed = 1..=self.period;
                if gains[seed.clone()].iter().any(|v| v.is_nan()) {
                    return result;
                }
                let mut avg_gain = gains[seed.clone()].iter().sum::<f64>() / self.period as f64;
                let mut avg_loss = losses[seed].iter().sum::<f64>() / self.period as f64;
                result[self.period] = compute_rsi(avg_gain, avg_loss);

                let alpha = 1.0 / self.period as f64;
                for i in (self.period + 1)..n {
                    if gains[i].is_nan() {
                        return result;
                    }
                    avg_gain = alpha * gains[i] + (1.0 - alpha) * avg_gain;
                    avg_loss = alpha * losses[i] + (1.0 - alpha) * avg_loss;
                    result[i] = compute_rsi(avg_gain, avg_loss);
                }
            }
        }

        result
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
