//! Rolling standard deviation of close.
//!
//! Sample standard deviation (divide by N-1), the convention of the pandas
//! `rolling().std()` output users compare against.
//! Lookback: period - 1. Period must be >= 2.

use super::indicator::Indicator;
use super::sma::rolling_mean;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct StdDev {
    period: usize,
    name: String,
}

impl StdDev {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "sample stddev period must be >= 2");
        Self {
            period,
            name: format!("std_{period}"),
        }
    }
}

impl Indicator for StdDev {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        rolling_std(&closes, self.period)
    }
}

/// Trailing sample standard deviation over `period` values.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period < 2 {
        return result;
    }

    let means = rolling_mean(values, period);
    for i in (period - 1)..n {
        let mean = means[i];
        if mean.is_nan() {
            continue;
        }
        let ss: f64 = values[(i + 1 - period)..=i]
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum();
        result[i] = (ss / (period - 1) as f64).sqrt();
    }

    result
}
