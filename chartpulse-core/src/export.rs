//! CSV export of an analysis table, one row per retained bar.

use crate::pipeline::AnalysisTable;
use std::io::Write;

/// Fixed leading columns. Indicator columns follow in `IndicatorKind` order,
/// then `signal`, `strategy_return` and `cumulative_return`.
pub const LEADING_COLUMNS: [&str; 6] = ["time", "open", "high", "low", "close", "volume"];

pub fn header(table: &AnalysisTable) -> Vec<String> {
    LEADING_COLUMNS
        .iter()
        .map(|c| (*c).to_string())
        .chain(table.indicators().kinds().map(|k| k.name().to_string()))
        .chain(
            ["signal", "strategy_return", "cumulative_return"]
                .iter()
                .map(|c| (*c).to_string()),
        )
        .collect()
}

/// Write `table` as CSV. Times are labelled in the table's time zone.
pub fn write_csv<W: Write>(table: &AnalysisTable, writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(header(table))?;

    let kinds: Vec<_> = table.indicators().kinds().collect();
    for row in table.rows() {
        let mut record = vec![
            table.time_label(row.index).unwrap_or_default(),
            row.bar.open.to_string(),
            row.bar.high.to_string(),
            row.bar.low.to_string(),
            row.bar.close.to_string(),
            row.bar.volume.to_string(),
        ];
        record.extend(
            kinds
                .iter()
                .map(|k| row.indicator(*k).map(|v| v.to_string()).unwrap_or_default()),
        );
        record.push(row.signal.to_string());
        record.push(row.strategy_return.to_string());
        record.push(row.cumulative_return.to_string());
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}
