//! ChartPulse CLI: chart, grid, watch, export and catalog commands.
//!
//! Commands:
//! - `show`: headline metrics, signal insight and trailing rows
//! - `grid`: up to four symbols side by side, computed in parallel
//! - `watch`: re-fetch and re-render one symbol on an interval
//! - `export`: the analysis table as CSV
//! - `catalog`: list the symbol catalog
//! - `config`: print the effective configuration as TOML

mod lang;
mod render;

use anyhow::{bail, Context, Result};
use chartpulse_core::config::ProviderKind;
use chartpulse_core::display::Presenter;
use chartpulse_core::domain::Timeframe;
use chartpulse_core::export::write_csv;
use chartpulse_core::insight::Insight;
use chartpulse_core::{AppConfig, Pipeline};
use clap::{Parser, Subcommand};
use lang::Lang;
use rayon::prelude::*;
use render::{TerminalPresenter, DEFAULT_ROWS};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "chartpulse.toml";

/// Panels in the grid view.
const GRID_PANELS: usize = 4;

#[derive(Parser)]
#[command(
    name = "chartpulse",
    version,
    about = "ChartPulse: breakout signals and indicators for stocks, indices and crypto"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./chartpulse.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data provider: yahoo, csv or synthetic.
    #[arg(long, global = true)]
    provider: Option<ProviderKind>,

    /// Directory of CSV files (implies --provider csv unless set).
    #[arg(long, global = true)]
    csv_dir: Option<PathBuf>,

    /// IANA time zone for bar labels, e.g. Asia/Bangkok.
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// Output language.
    #[arg(long, global = true, value_enum, default_value_t = Lang::Th)]
    lang: Lang,

    /// Debug logging to stderr (RUST_LOG takes precedence).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chart and signal insight for one symbol.
    Show {
        symbol: String,

        /// Bar interval: 5m, 15m, 1h or 1d.
        #[arg(long, short, default_value = "1d")]
        timeframe: Timeframe,

        /// Trailing rows to print.
        #[arg(long, default_value_t = DEFAULT_ROWS)]
        rows: usize,

        /// Print the full table as JSON instead.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Four symbols at once. Missing symbols are filled from the catalog.
    Grid {
        symbols: Vec<String>,

        #[arg(long, short, default_value = "1d")]
        timeframe: Timeframe,

        #[arg(long, default_value_t = 3)]
        rows: usize,
    },
    /// Refresh one symbol on an interval.
    Watch {
        symbol: String,

        #[arg(long, short, default_value = "5m")]
        timeframe: Timeframe,

        /// Seconds between refreshes. Defaults to the config value.
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many refreshes. Runs until interrupted when absent.
        #[arg(long)]
        iterations: Option<u64>,
    },
    /// Write the analysis table as CSV.
    Export {
        symbol: String,

        #[arg(long, short, default_value = "1d")]
        timeframe: Timeframe,

        /// Output file. Writes to stdout when absent.
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// List the symbol catalog.
    Catalog,
    /// Print the effective configuration.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let lang = cli.lang;

    match cli.command {
        Commands::Show {
            symbol,
            timeframe,
            rows,
            json,
        } => run_show(&config, lang, &symbol, timeframe, rows, json),
        Commands::Grid {
            symbols,
            timeframe,
            rows,
        } => run_grid(&config, lang, symbols, timeframe, rows),
        Commands::Watch {
            symbol,
            timeframe,
            interval,
            iterations,
        } => run_watch(&config, lang, &symbol, timeframe, interval, iterations),
        Commands::Export {
            symbol,
            timeframe,
            out,
        } => run_export(&config, &symbol, timeframe, out.as_deref()),
        Commands::Catalog => run_catalog(&config, lang),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}

/// File (explicit, or ./chartpulse.toml if present), then CLI overrides, then validation.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let path = cli.config.clone().or_else(|| {
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.is_file().then_some(local)
    });

    let mut config = match &path {
        Some(p) => AppConfig::from_file(p)
            .with_context(|| format!("loading config from {}", p.display()))?,
        None => AppConfig::default(),
    };

    if let Some(dir) = &cli.csv_dir {
        config.data.csv_dir = Some(dir.clone());
        config.data.provider = ProviderKind::Csv;
    }
    if let Some(provider) = cli.provider {
        config.data.provider = provider;
    }
    if let Some(tz) = &cli.timezone {
        config.data.timezone = tz.clone();
    }

    config.validate().context("invalid configuration")?;
    debug!(config_file = ?path, provider = ?config.data.provider, "configuration loaded");
    Ok(config)
}

fn build_pipeline(config: &AppConfig) -> Result<Pipeline> {
    config.build_pipeline().context("building data pipeline")
}

fn run_show(
    config: &AppConfig,
    lang: Lang,
    symbol: &str,
    timeframe: Timeframe,
    rows: usize,
    json: bool,
) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let table = pipeline.compute(symbol, timeframe);

    let stdout = io::stdout();
    if json {
        serde_json::to_writer_pretty(stdout.lock(), &table)?;
        println!();
        return Ok(());
    }

    let mut out = stdout.lock();
    if let Some(label) = config.catalog().label(symbol) {
        writeln!(out, "{label}")?;
    }
    let mut presenter = TerminalPresenter::new(out, lang).with_rows(rows);
    if let Some(insight) = Insight::from_table(&table) {
        presenter.render_insight(&insight)?;
    }
    presenter.render_chart(&table, &config.display)?;
    Ok(())
}

fn run_grid(
    config: &AppConfig,
    lang: Lang,
    symbols: Vec<String>,
    timeframe: Timeframe,
    rows: usize,
) -> Result<()> {
    if symbols.len() > GRID_PANELS {
        bail!("the grid shows at most {GRID_PANELS} symbols, got {}", symbols.len());
    }
    let catalog = config.catalog();
    let mut panel_symbols = symbols;
    for fill in catalog.first(GRID_PANELS * 2) {
        if panel_symbols.len() == GRID_PANELS {
            break;
        }
        if !panel_symbols.iter().any(|s| s.eq_ignore_ascii_case(fill)) {
            panel_symbols.push(fill.to_string());
        }
    }

    let pipeline = build_pipeline(config)?;
    let tables: Vec<_> = panel_symbols
        .par_iter()
        .map(|symbol| pipeline.compute(symbol, timeframe))
        .collect();
    info!(panels = tables.len(), timeframe = %timeframe, "grid computed");

    let mut presenter = TerminalPresenter::new(io::stdout().lock(), lang).with_rows(rows);
    for table in &tables {
        if let Some(insight) = Insight::from_table(table) {
            let delta = insight.change.map(|c| format!("{c:+.2}"));
            presenter.render_metric(
                &format!("{} {}", insight.symbol, insight.last_signal),
                &format!("{:.2}", insight.price),
                delta.as_deref(),
            )?;
        }
        presenter.render_chart(table, &config.display)?;
    }
    Ok(())
}

fn run_watch(
    config: &AppConfig,
    lang: Lang,
    symbol: &str,
    timeframe: Timeframe,
    interval: Option<u64>,
    iterations: Option<u64>,
) -> Result<()> {
    let interval = Duration::from_secs(interval.unwrap_or(config.refresh.interval_secs).max(1));
    let pipeline = build_pipeline(config)?;

    let mut tick: u64 = 0;
    loop {
        tick += 1;
        pipeline.refresh();
        let table = pipeline.compute(symbol, timeframe);
        debug!(symbol, tick, rows = table.len(), "watch refresh");

        let mut out = io::stdout().lock();
        writeln!(out, "-- {} #{tick} --", lang.t("อัปเดต", "refresh"))?;
        let mut presenter = TerminalPresenter::new(out, lang).with_rows(5);
        if let Some(insight) = Insight::from_table(&table) {
            presenter.render_insight(&insight)?;
        }
        presenter.render_chart(&table, &config.display)?;
        drop(presenter);

        if iterations.is_some_and(|n| tick >= n) {
            return Ok(());
        }
        std::thread::sleep(interval);
    }
}

fn run_export(
    config: &AppConfig,
    symbol: &str,
    timeframe: Timeframe,
    out: Option<&Path>,
) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let table = pipeline.compute(symbol, timeframe);
    if table.is_empty() {
        bail!("no rows for {symbol} at {timeframe}; nothing to export");
    }

    match out {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_csv(&table, io::BufWriter::new(file))?;
            info!(symbol, rows = table.len(), path = %path.display(), "exported csv");
        }
        None => write_csv(&table, io::stdout().lock())?,
    }
    Ok(())
}

fn run_catalog(config: &AppConfig, lang: Lang) -> Result<()> {
    let mut out = io::stdout().lock();
    for group in config.catalog().groups() {
        writeln!(out, "{}:", group.name)?;
        for entry in &group.symbols {
            writeln!(out, "  {:<10} {}", entry.ticker, entry.label)?;
        }
    }
    writeln!(
        out,
        "{}",
        lang.t(
            "ใช้สัญลักษณ์อื่นนอกรายการได้ เช่น SPY หรือ ADA-USD",
            "Symbols outside the catalog work too, e.g. SPY or ADA-USD"
        )
    )?;
    Ok(())
}
