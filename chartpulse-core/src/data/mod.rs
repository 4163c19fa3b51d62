//! Market-data retrieval, normalization and caching

pub mod cache;
pub mod circuit_breaker;
pub mod csv_file;
pub mod loader;
pub mod normalize;
pub mod provider;
pub mod raw;
pub mod synthetic;
pub mod yahoo;

pub use cache::{CacheKey, TtlCache};
pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use csv_file::CsvFileProvider;
pub use loader::BarLoader;
pub use normalize::{NormalizeReport, Normalizer};
pub use provider::{DataError, DataProvider, DataSource, FetchResult};
pub use raw::{ColumnLabel, RawTable, RawTimestamp};
pub use synthetic::SyntheticProvider;
pub use yahoo::{YahooProvider, YahooSettings};
