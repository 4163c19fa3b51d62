//! CSV file provider for offline work.
//!
//! Looks for `{dir}/{SYMBOL}_{interval}.csv`, then `{dir}/{SYMBOL}.csv`.
//! Accepts plain single-header files (`Date,Open,High,Low,Close,Volume`) and
//! the stacked-header layout pandas writes for multi-level columns:
//!
//! ```text
//! Price,Close,High,Low,Open,Volume
//! Ticker,AAPL,AAPL,AAPL,AAPL,AAPL
//! Date,,,,,
//! 2024-01-02,185.64,188.44,183.89,187.15,82488700
//! ```
//!
//! Header rows are every leading row whose first cell is not a timestamp.

use super::normalize::is_time_column;
use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use super::raw::{ColumnLabel, RawTable, RawTimestamp};
use crate::domain::{Lookback, Timeframe};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvFileProvider {
    dir: PathBuf,
}

impl CsvFileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn locate(&self, symbol: &str, timeframe: Timeframe) -> Option<PathBuf> {
        [
            self.dir
                .join(format!("{symbol}_{}.csv", timeframe.provider_code())),
            self.dir.join(format!("{symbol}.csv")),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }
}

impl DataProvider for CsvFileProvider {
    fn name(&self) -> &str {
        "csv_file"
    }

    /// The lookback is ignored: a file holds whatever history was saved.
    fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        _lookback: Lookback,
    ) -> Result<FetchResult, DataError> {
        let path = self
            .locate(symbol, timeframe)
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
        debug!(symbol, path = %path.display(), "reading csv bars");
        let table = read_table(&path)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            table,
            source: DataSource::CsvFile,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}

/// Parse one index cell. Zone-aware forms first, then naive, date, epoch.
pub fn parse_timestamp(cell: &str) -> Option<RawTimestamp> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(RawTimestamp::Aware(dt));
    }
    if let Ok(dt) = DateTime::parse_from_str(cell, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(RawTimestamp::Aware(dt));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(cell, fmt) {
            return Some(RawTimestamp::Naive(naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(cell, "%Y-%m-%d") {
        return Some(RawTimestamp::Date(date));
    }
    cell.parse::<i64>().ok().map(RawTimestamp::Epoch)
}

fn parse_value(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        None
    } else {
        cell.parse().ok()
    }
}

/// Read a CSV file into a `RawTable`.
pub fn read_table(path: &Path) -> Result<RawTable, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DataError::CsvError(format!("{}: {e}", path.display())))?;

    let mut headers: Vec<csv::StringRecord> = Vec::new();
    let mut data: Vec<(RawTimestamp, csv::StringRecord)> = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| DataError::CsvError(format!("{}: {e}", path.display())))?;
        let first = record.get(0).unwrap_or("");
        match parse_timestamp(first) {
            Some(ts) if !headers.is_empty() => data.push((ts, record)),
            _ if data.is_empty() => headers.push(record),
            // Unparseable time in the body: the normalizer never sees the row.
            _ => {}
        }
    }

    let top = headers
        .first()
        .ok_or_else(|| DataError::CsvError(format!("{}: no header row", path.display())))?;

    let time_col = (0..top.len())
        .find(|&c| is_time_column(top.get(c).unwrap_or("")))
        .unwrap_or(0);

    let index_name = headers
        .iter()
        .filter_map(|h| h.get(time_col))
        .find(|name| is_time_column(name))
        .unwrap_or("time")
        .to_string();

    let mut table = RawTable::new(index_name);
    table.index = data.iter().map(|(ts, _)| *ts).collect();

    for col in (0..top.len()).filter(|&c| c != time_col) {
        let levels: Vec<String> = headers
            .iter()
            .map(|h| h.get(col).unwrap_or("").trim().to_string())
            .filter(|level| !level.is_empty())
            .collect();
        if levels.is_empty() {
            continue;
        }
        let values = data
            .iter()
            .map(|(_, rec)| rec.get(col).and_then(parse_value))
            .collect();
        table.push_column(ColumnLabel::multi(levels), values);
    }

    Ok(table)
}
