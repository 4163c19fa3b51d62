//! Integration tests for the data path: files and synthetic walks through the
//! normalizer, the cached loader, and into the pipeline.

use chartpulse_core::data::csv_file::read_table;
use chartpulse_core::data::{
    BarLoader, CsvFileProvider, DataError, Normalizer, SyntheticProvider,
};
use chartpulse_core::domain::{Lookback, Timeframe};
use chartpulse_core::export::write_csv;
use chartpulse_core::insight::Insight;
use chartpulse_core::pipeline::{Analyzer, Pipeline};
use chartpulse_core::AppConfig;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt::Write as _;
use std::path::Path;

/// Write `n` daily rows with a gentle zig-zag trend.
fn write_daily_csv(path: &Path, n: usize) {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    let mut price: f64 = 50.0;
    for i in 0..n {
        let open = price;
        price += if i % 7 < 4 { 0.8 } else { -0.5 };
        let (hi, lo) = (open.max(price) + 0.25, open.min(price) - 0.25);
        writeln!(
            out,
            "{},{open:.2},{hi:.2},{lo:.2},{price:.2},{}",
            start + Duration::days(i as i64),
            10_000 + i
        )
        .unwrap();
    }
    std::fs::write(path, out).unwrap();
}

fn csv_loader(dir: &Path) -> BarLoader {
    BarLoader::new(
        Box::new(CsvFileProvider::new(dir)),
        Normalizer::new(Tz::Asia__Bangkok),
        std::time::Duration::from_secs(60),
    )
}

#[test]
fn csv_file_flows_through_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    write_daily_csv(&dir.path().join("TEST_1d.csv"), 260);

    let pipeline = Pipeline::new(csv_loader(dir.path()), Analyzer::default());
    let table = pipeline.compute("TEST", Timeframe::D1);

    assert_eq!(table.len(), 260 - 199);
    assert_eq!(table.timezone(), Tz::Asia__Bangkok);
    // Midnight UTC reads as 07:00 in Bangkok.
    assert!(table.time_label(0).unwrap().ends_with("07:00:00"));

    let insight = Insight::from_table(&table).unwrap();
    assert_eq!(insight.symbol, "TEST");
    assert!(insight.price > 50.0);
    assert!(insight.resistance >= insight.support);
}

#[test]
fn loader_caches_csv_series() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("TEST.csv");
    write_daily_csv(&path, 40);

    let loader = csv_loader(dir.path());
    let first = loader.load("TEST", Timeframe::D1);
    assert_eq!(first.len(), 40);

    // A cached series survives the file going away.
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loader.load("TEST", Timeframe::D1).len(), 40);

    loader.clear_cache();
    assert!(loader.load("TEST", Timeframe::D1).is_empty());
    assert!(matches!(
        loader.try_load("TEST", Timeframe::D1),
        Err(DataError::SymbolNotFound { .. })
    ));
}

#[test]
fn stacked_headers_and_bad_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("AAPL.csv");
    std::fs::write(
        &path,
        "Price,Close,High,Low,Open,Volume\n\
         Ticker,AAPL,AAPL,AAPL,AAPL,AAPL\n\
         Date,,,,,\n\
         2024-01-03,184.25,185.88,183.43,184.22,58414500\n\
         2024-01-02,185.64,188.44,183.89,187.15,82488700\n\
         2024-01-03,999.00,999.00,999.00,999.00,1\n\
         2024-01-04,181.91,182.76,180.17,175.00,71983600\n\
         2024-01-05,,182.76,180.17,181.99,62303300\n",
    )
    .unwrap();

    let table = read_table(&path).unwrap();
    let (series, report) = Normalizer::new(Tz::UTC)
        .normalize_with_report("AAPL", Timeframe::D1, &table)
        .unwrap();

    assert_eq!(report.input_rows, 5);
    // 01-04 opens below its low; 01-05 has no close.
    assert_eq!(report.dropped_invalid, 2);
    assert_eq!(report.dropped_duplicates, 1);
    assert_eq!(series.len(), 2);
    assert!(series.is_strictly_ascending());
    assert_eq!(series.bars[1].close, 184.25);
}

#[test]
fn synthetic_provider_is_deterministic() {
    let anchor = Utc.with_ymd_and_hms(2024, 6, 28, 16, 0, 0).unwrap();
    let make = || {
        BarLoader::new(
            Box::new(SyntheticProvider::new(anchor)),
            Normalizer::new(Tz::UTC),
            std::time::Duration::from_secs(60),
        )
        .with_lookback(Lookback::Years(2))
    };

    let a = make().load("BTC-USD", Timeframe::D1);
    let b = make().load("BTC-USD", Timeframe::D1);
    assert!(a.len() > 400);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert!(a.bars.iter().all(|bar| bar.is_sane()));

    let other = make().load("ETH-USD", Timeframe::D1);
    assert_ne!(a.fingerprint(), other.fingerprint());
}

#[test]
fn config_builds_working_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    write_daily_csv(&dir.path().join("TEST.csv"), 120);

    let toml = format!(
        "[data]\nprovider = \"csv\"\ncsv_dir = {:?}\ntimezone = \"UTC\"\n\n\
         [pipeline]\nindicators = [\"ema50\", \"rsi\"]\n",
        dir.path().display().to_string()
    );
    let config = AppConfig::from_toml(&toml).unwrap();
    let pipeline = config.build_pipeline().unwrap();
    let table = pipeline.compute("TEST", Timeframe::D1);

    // EMA 50 sets the warm-up.
    assert_eq!(table.len(), 120 - 49);

    let mut buf = Vec::new();
    write_csv(&table, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text
        .lines()
        .next()
        .unwrap()
        .contains(",ema50,rsi,res,sup,signal,"));
    assert_eq!(text.lines().count(), table.len() + 1);
}
