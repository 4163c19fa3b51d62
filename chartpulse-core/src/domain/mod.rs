//! Domain types for ChartPulse

pub mod bar;
pub mod series;
pub mod signal;
pub mod timeframe;

pub use bar::Bar;
pub use series::{Series, TIME_LABEL_FORMAT};
pub use signal::Signal;
pub use timeframe::{Lookback, ParseTimeframeError, Timeframe};
