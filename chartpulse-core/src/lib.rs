//! ChartPulse Core: price series, indicators, breakout signals, toy backtest.
//!
//! The crate is organized bottom-up:
//! - Domain types (bars, timeframes, series, signals)
//! - Data providers, normalization, circuit breaker and the TTL-cached loader
//! - Causal indicators (EMA, SMA, sample std, Bollinger, RSI, MACD, Donchian)
//! - Breakout signal classification and next-bar strategy returns
//! - The analysis pipeline that joins them into one aligned table
//! - Insight, symbol catalog, display toggles, CSV export and configuration
//!
//! Rendering is not here. Front ends implement [`display::Presenter`].

pub mod catalog;
pub mod config;
pub mod data;
pub mod display;
pub mod domain;
pub mod export;
pub mod indicators;
pub mod insight;
pub mod pipeline;
pub mod strategy;

pub use config::AppConfig;
pub use pipeline::{AnalysisTable, Analyzer, Pipeline, PipelineConfig};
