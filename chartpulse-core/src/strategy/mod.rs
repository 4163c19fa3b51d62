//! Breakout signal and the toy backtest that follows it.

pub mod backtest;
pub mod breakout;

pub use backtest::{strategy_returns, BacktestResult};
pub use breakout::{breakout_signals, classify};
