//! Application configuration, loaded from TOML.
//!
//! Every section and field is optional; missing values take the defaults
//! below. `validate()` runs after loading and after CLI overrides, and the
//! `build_*` helpers turn a validated config into runtime objects.
//!
//! ```toml
//! [data]
//! provider = "yahoo"          # yahoo | csv | synthetic
//! cache_ttl_secs = 15
//! timezone = "Asia/Bangkok"
//!
//! [pipeline]
//! indicators = ["ema50", "ema200", "bollinger", "rsi", "macd"]
//! channel_period = 20
//!
//! [display]
//! show_rsi = true
//!
//! [refresh]
//! interval_secs = 30
//! ```

use crate::catalog::{Catalog, CatalogGroup};
use crate::data::{
    BarLoader, CircuitBreaker, CsvFileProvider, DataError, DataProvider, Normalizer,
    SyntheticProvider, YahooProvider, YahooSettings,
};
use crate::display::DisplayOptions;
use crate::domain::Lookback;
use crate::indicators::IndicatorGroup;
use crate::pipeline::{Analyzer, IndicatorParams, Pipeline, PipelineConfig};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to set up data provider: {0}")]
    Provider(#[from] DataError),
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
    Synthetic,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(ProviderKind::Yahoo),
            "csv" => Ok(ProviderKind::Csv),
            "synthetic" => Ok(ProviderKind::Synthetic),
            other => Err(format!(
                "unknown provider '{other}'. Valid: yahoo, csv, synthetic"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub provider: ProviderKind,
    /// Directory searched by the csv provider.
    pub csv_dir: Option<PathBuf>,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    /// IANA zone used for bar time labels.
    pub timezone: String,
    /// Drop bars whose open/close fall outside [low, high].
    pub validate_bars: bool,
    /// Fixed provider range (e.g. "5d"); per-timeframe default when absent.
    pub lookback: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Yahoo,
            csv_dir: None,
            cache_ttl_secs: 15,
            request_timeout_secs: 10,
            max_retries: 2,
            timezone: "Asia/Bangkok".to_string(),
            validate_bars: true,
            lookback: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    pub indicators: Vec<IndicatorGroup>,
    #[serde(flatten)]
    pub params: IndicatorParams,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            indicators: IndicatorGroup::ALL.to_vec(),
            params: IndicatorParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub pipeline: PipelineSection,
    pub display: DisplayOptions,
    pub refresh: RefreshConfig,
    /// Replaces the built-in catalog when non-empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub catalog: Vec<CatalogGroup>,
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pipeline.params;

        for (field, value) in [
            ("pipeline.channel_period", p.channel_period),
            ("pipeline.rsi_period", p.rsi_period),
            ("pipeline.macd_fast", p.macd_fast),
            ("pipeline.macd_slow", p.macd_slow),
            ("pipeline.macd_signal", p.macd_signal),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be at least 1"));
            }
        }
        if p.bollinger_period < 2 {
            return Err(ConfigError::invalid(
                "pipeline.bollinger_period",
                "must be at least 2 for a sample standard deviation",
            ));
        }
        if !p.bollinger_width.is_finite() || p.bollinger_width < 0.0 {
            return Err(ConfigError::invalid(
                "pipeline.bollinger_width",
                format!("must be a non-negative number, got {}", p.bollinger_width),
            ));
        }
        if p.macd_fast >= p.macd_slow {
            return Err(ConfigError::invalid(
                "pipeline.macd_fast",
                format!("must be below macd_slow ({} >= {})", p.macd_fast, p.macd_slow),
            ));
        }

        if self.data.cache_ttl_secs == 0 {
            return Err(ConfigError::invalid("data.cache_ttl_secs", "must be at least 1"));
        }
        if self.data.request_timeout_secs == 0 {
            return Err(ConfigError::invalid("data.request_timeout_secs", "must be at least 1"));
        }
        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::invalid("refresh.interval_secs", "must be at least 1"));
        }
        if self.data.provider == ProviderKind::Csv && self.data.csv_dir.is_none() {
            return Err(ConfigError::invalid("data.csv_dir", "required when provider = \"csv\""));
        }

        self.timezone()?;
        self.lookback()?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.data
            .timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::invalid("data.timezone", e.to_string()))
    }

    pub fn lookback(&self) -> Result<Option<Lookback>, ConfigError> {
        self.data
            .lookback
            .as_deref()
            .map(|s| s.parse::<Lookback>())
            .transpose()
            .map_err(|e| ConfigError::invalid("data.lookback", e.to_string()))
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_groups(self.pipeline.indicators.iter().copied())
            .with_params(self.pipeline.params.clone())
    }

    pub fn catalog(&self) -> Catalog {
        if self.catalog.is_empty() {
            Catalog::builtin()
        } else {
            Catalog::new(self.catalog.clone())
        }
    }

    pub fn build_provider(&self) -> Result<Box<dyn DataProvider>, ConfigError> {
        Ok(match self.data.provider {
            ProviderKind::Yahoo => {
                let settings = YahooSettings {
                    timeout: Duration::from_secs(self.data.request_timeout_secs),
                    max_retries: self.data.max_retries,
                    ..YahooSettings::default()
                };
                let breaker = Arc::new(CircuitBreaker::default_provider());
                Box::new(YahooProvider::new(breaker, settings)?)
            }
            ProviderKind::Csv => {
                let dir = self
                    .data
                    .csv_dir
                    .clone()
                    .ok_or_else(|| ConfigError::invalid("data.csv_dir", "required when provider = \"csv\""))?;
                Box::new(CsvFileProvider::new(dir))
            }
            ProviderKind::Synthetic => Box::new(SyntheticProvider::default()),
        })
    }

    pub fn build_loader(&self) -> Result<BarLoader, ConfigError> {
        let normalizer = Normalizer::new(self.timezone()?).with_validation(self.data.validate_bars);
        let loader = BarLoader::new(
            self.build_provider()?,
            normalizer,
            Duration::from_secs(self.data.cache_ttl_secs),
        );
        Ok(match self.lookback()? {
            Some(lookback) => loader.with_lookback(lookback),
            None => loader,
        })
    }

    /// Validate, then assemble loader and analyzer.
    pub fn build_pipeline(&self) -> Result<Pipeline, ConfigError> {
        self.validate()?;
        Ok(Pipeline::new(self.build_loader()?, Analyzer::new(self.pipeline_config())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::RsiSmoothing;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.data.cache_ttl_secs, 15);
        assert_eq!(config.data.request_timeout_secs, 10);
        assert_eq!(config.refresh.interval_secs, 30);
        assert_eq!(config.pipeline.indicators.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_sections() {
        let config = AppConfig::from_toml(
            r#"
            [data]
            provider = "synthetic"
            timezone = "UTC"
            lookback = "5d"

            [pipeline]
            indicators = ["rsi", "macd"]
            rsi_period = 10
            rsi_smoothing = "wilder"

            [display]
            show_macd = true

            [[catalog]]
            name = "Watchlist"
            symbols = [{ ticker = "SPY", label = "S&P 500 ETF" }]
            "#,
        )
        .unwrap();

        assert_eq!(config.data.provider, ProviderKind::Synthetic);
        assert_eq!(config.timezone().unwrap(), Tz::UTC);
        assert_eq!(config.lookback().unwrap(), Some(Lookback::Days(5)));
        assert_eq!(config.pipeline.params.rsi_period, 10);
        assert_eq!(config.pipeline.params.rsi_smoothing, RsiSmoothing::Wilder);
        assert_eq!(config.pipeline.params.channel_period, 20);
        assert!(config.display.show_macd);
        assert!(config.display.show_ema50);
        assert_eq!(config.catalog().all_symbols(), vec!["SPY"]);

        let pipeline = config.pipeline_config();
        assert!(pipeline.is_enabled(IndicatorGroup::Rsi));
        assert!(!pipeline.is_enabled(IndicatorGroup::Ema200));
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            "[pipeline]\nchannel_period = 0",
            "[pipeline]\nbollinger_period = 1",
            "[pipeline]\nmacd_fast = 26\nmacd_slow = 12",
            "[data]\ncache_ttl_secs = 0",
            "[data]\nrequest_timeout_secs = 0",
            "[data]\ntimezone = \"Mars/Olympus\"",
            "[data]\nlookback = \"forever\"",
            "[data]\nprovider = \"csv\"",
        ];
        for case in cases {
            let config = AppConfig::from_toml(case).unwrap();
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid { .. })),
                "accepted: {case}"
            );
        }
    }

    #[test]
    fn example_file_matches_defaults() {
        let text = include_str!("../../config/chartpulse.example.toml");
        assert_eq!(AppConfig::from_toml(text).unwrap(), AppConfig::default());
    }

    #[test]
    fn provider_kind_from_str() {
        assert_eq!("CSV".parse::<ProviderKind>(), Ok(ProviderKind::Csv));
        assert!("bloomberg".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn unknown_indicator_is_a_parse_error() {
        let err = AppConfig::from_toml("[pipeline]\nindicators = [\"vwap\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn from_file_reports_path() {
        let err = AppConfig::from_file(Path::new("/nonexistent/chartpulse.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/chartpulse.toml"));
    }

    #[test]
    fn toml_round_trip() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(AppConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn synthetic_pipeline_builds() {
        let config = AppConfig::from_toml("[data]\nprovider = \"synthetic\"").unwrap();
        let pipeline = config.build_pipeline().unwrap();
        assert_eq!(pipeline.loader().provider_name(), "synthetic");
    }
}
