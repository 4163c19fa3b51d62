//! Bar normalizer: provider tables in, canonical `Series` out.
//!
//! - Multi-level headers are flattened to their first level, then lower-cased.
//! - Whatever the provider calls its index becomes the single `time` field.
//! - Zone-naive timestamps are localized as UTC; the series carries the
//!   display zone.
//! - Rows are sorted ascending; duplicate timestamps keep the first row.
//! - Rows with missing, non-finite or non-positive prices are dropped. With
//!   validation on, rows breaking `low <= open, close <= high` are dropped too.

use super::provider::DataError;
use super::raw::{ColumnLabel, RawTable, RawTimestamp};
use crate::domain::{Bar, Series, Timeframe};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

/// Names a provider may use for the time index (compared lower-cased).
const TIME_ALIASES: [&str; 5] = ["time", "date", "datetime", "timestamp", "index"];

/// True if a header names the time index.
pub fn is_time_column(name: &str) -> bool {
    let lower = name.trim().to_ascii_lowercase();
    TIME_ALIASES.contains(&lower.as_str())
}

/// Canonical field name for a column label: first level, trimmed,
/// lower-cased, inner spaces as underscores (`Adj Close` → `adj_close`).
pub fn field_name(label: &ColumnLabel) -> String {
    label
        .primary()
        .trim()
        .to_ascii_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert a provider timestamp to a UTC instant.
pub fn to_utc(ts: RawTimestamp) -> Option<DateTime<Utc>> {
    match ts {
        RawTimestamp::Epoch(secs) => DateTime::from_timestamp(secs, 0),
        RawTimestamp::Aware(dt) => Some(dt.with_timezone(&Utc)),
        RawTimestamp::Naive(naive) => Some(naive.and_utc()),
        RawTimestamp::Date(date) => date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
    }
}

/// Counters from one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub input_rows: usize,
    pub dropped_invalid: usize,
    pub dropped_duplicates: usize,
}

/// Turns `RawTable`s into `Series`.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    timezone: Tz,
    validate: bool,
}

impl Normalizer {
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            validate: true,
        }
    }

    /// Toggle the high/low envelope check. Positive finite prices are always required.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn normalize(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        table: &RawTable,
    ) -> Result<Series, DataError> {
        self.normalize_with_report(symbol, timeframe, table)
            .map(|(series, _)| series)
    }

    pub fn normalize_with_report(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        table: &RawTable,
    ) -> Result<(Series, NormalizeReport), DataError> {
        let mut report = NormalizeReport {
            input_rows: table.row_count(),
            ..NormalizeReport::default()
        };

        if table.is_empty() {
            return Ok((Series::empty(symbol, timeframe, self.timezone), report));
        }

        let columns = ColumnMap::resolve(table)?;
        let mut bars = Vec::with_capacity(table.row_count());

        for (row, &ts) in table.index.iter().enumerate() {
            match self.build_bar(table, &columns, row, ts) {
                Some(bar) => bars.push(bar),
                None => report.dropped_invalid += 1,
            }
        }

        // Stable sort keeps provider order among equal timestamps, so dedup keeps the first.
        bars.sort_by_key(|b| b.time);
        let before = bars.len();
        bars.dedup_by_key(|b| b.time);
        report.dropped_duplicates = before - bars.len();

        if report.dropped_invalid > 0 || report.dropped_duplicates > 0 {
            warn!(
                symbol,
                timeframe = %timeframe,
                dropped_invalid = report.dropped_invalid,
                dropped_duplicates = report.dropped_duplicates,
                "normalizer dropped rows"
            );
        }
        debug!(symbol, rows = bars.len(), "normalized series");

        Ok((Series::new(symbol, timeframe, self.timezone, bars), report))
    }

    fn build_bar(
        &self,
        table: &RawTable,
        columns: &ColumnMap,
        row: usize,
        ts: RawTimestamp,
    ) -> Option<Bar> {
        let cell = |col: usize| table.values.get(col).and_then(|c| c.get(row).copied().flatten());

        let bar = Bar {
            time: to_utc(ts)?,
            open: cell(columns.open)?,
            high: cell(columns.high)?,
            low: cell(columns.low)?,
            close: cell(columns.close)?,
            volume: columns
                .volume
                .and_then(cell)
                .filter(|v| v.is_finite() && *v > 0.0)
                .map(|v| v.round() as u64)
                .unwrap_or(0),
        };

        let keep = if self.validate {
            bar.is_sane()
        } else {
            bar.has_positive_prices()
        };
        keep.then_some(bar)
    }
}

/// Column positions of the canonical fields.
struct ColumnMap {
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl ColumnMap {
    fn resolve(table: &RawTable) -> Result<Self, DataError> {
        let names: Vec<String> = table.columns.iter().map(field_name).collect();
        let find = |wanted: &str| names.iter().position(|n| n == wanted);
        let require = |wanted: &str| {
            find(wanted).ok_or_else(|| {
                DataError::ValidationError(format!(
                    "missing column '{wanted}' (have: {})",
                    names.join(", ")
                ))
            })
        };

        Ok(Self {
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }
}
