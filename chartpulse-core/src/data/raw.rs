//! Provider-shaped tables before normalization.
//!
//! Providers disagree on almost everything: header case, whether headers have
//! a second level (`Close / AAPL`), what the index is called, and whether
//! timestamps carry a zone. `RawTable` keeps all of that as delivered so the
//! normalizer is the single place that decides.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// One index entry as delivered by a provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawTimestamp {
    /// Unix seconds (UTC).
    Epoch(i64),
    /// Zone-aware instant.
    Aware(DateTime<FixedOffset>),
    /// Zone-naive wall time.
    Naive(NaiveDateTime),
    /// Calendar date only (daily bars).
    Date(NaiveDate),
}

/// A column header. Multi-level headers keep every level, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLabel {
    pub levels: Vec<String>,
}

impl ColumnLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            levels: vec![name.into()],
        }
    }

    pub fn multi<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            levels: levels.into_iter().map(Into::into).collect(),
        }
    }

    /// First level, as used for field lookup.
    pub fn primary(&self) -> &str {
        self.levels.first().map(String::as_str).unwrap_or("")
    }
}

/// Column-major OHLCV table as returned by a provider.
///
/// `values[c][r]` is column `c`, row `r`. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub index_name: String,
    pub index: Vec<RawTimestamp>,
    pub columns: Vec<ColumnLabel>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl RawTable {
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            ..Self::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Append a column. Shorter columns are padded with `None`.
    pub fn push_column(&mut self, label: ColumnLabel, mut values: Vec<Option<f64>>) {
        values.resize(self.index.len(), None);
        self.columns.push(label);
        self.values.push(values);
    }
}
