//! Display toggles and the presentation boundary.
//!
//! Rendering lives outside this crate. A front end implements `Presenter`
//! and receives finished tables plus the user's toggles; the core never
//! decides how anything looks.

use crate::indicators::{IndicatorGroup, IndicatorKind};
use crate::pipeline::AnalysisTable;
use serde::{Deserialize, Serialize};

/// Which overlays and panes a chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    pub show_volume: bool,
    pub show_ema50: bool,
    pub show_ema200: bool,
    pub show_bollinger: bool,
    pub show_rsi: bool,
    pub show_macd: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_volume: true,
            show_ema50: true,
            show_ema200: true,
            show_bollinger: false,
            show_rsi: false,
            show_macd: false,
        }
    }
}

impl DisplayOptions {
    pub fn shows(&self, group: IndicatorGroup) -> bool {
        match group {
            IndicatorGroup::Ema50 => self.show_ema50,
            IndicatorGroup::Ema200 => self.show_ema200,
            IndicatorGroup::Bollinger => self.show_bollinger,
            IndicatorGroup::Rsi => self.show_rsi,
            IndicatorGroup::Macd => self.show_macd,
        }
    }

    /// Columns to draw: toggled on and present in the table.
    pub fn visible_columns(&self, table: &AnalysisTable) -> Vec<IndicatorKind> {
        IndicatorGroup::ALL
            .into_iter()
            .filter(|g| self.shows(*g))
            .flat_map(|g| g.kinds().iter().copied())
            .filter(|k| table.indicator(*k).is_some())
            .collect()
    }
}

/// Front-end hooks for drawing a table and a headline metric.
pub trait Presenter {
    type Error;

    fn render_chart(
        &mut self,
        table: &AnalysisTable,
        options: &DisplayOptions,
    ) -> Result<(), Self::Error>;

    /// A labelled value with an optional signed change beside it.
    fn render_metric(
        &mut self,
        label: &str,
        value: &str,
        delta: Option<&str>,
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Series, Timeframe};
    use crate::pipeline::{Analyzer, PipelineConfig};
    use chrono_tz::Tz;

    #[test]
    fn defaults_show_price_overlays_only() {
        let opts = DisplayOptions::default();
        assert!(opts.show_volume && opts.show_ema50 && opts.show_ema200);
        assert!(!opts.show_bollinger && !opts.show_rsi && !opts.show_macd);
    }

    #[test]
    fn visible_columns_skip_disabled_groups() {
        let config = PipelineConfig::default().with_groups([IndicatorGroup::Ema50]);
        let series = Series::empty("X", Timeframe::D1, Tz::UTC);
        let table = Analyzer::new(config).analyze(&series);

        let opts = DisplayOptions {
            show_bollinger: true,
            ..DisplayOptions::default()
        };
        assert_eq!(opts.visible_columns(&table), vec![IndicatorKind::Ema50]);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let opts: DisplayOptions = toml::from_str("show_rsi = true").unwrap();
        assert!(opts.show_rsi);
        assert!(opts.show_volume);
    }
}
