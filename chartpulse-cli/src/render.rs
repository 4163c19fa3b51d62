//! Plain-text presenter for terminals and pipes.

use crate::lang::Lang;
use chartpulse_core::display::{DisplayOptions, Presenter};
use chartpulse_core::indicators::IndicatorKind;
use chartpulse_core::insight::{Insight, Trend};
use chartpulse_core::pipeline::AnalysisTable;
use std::io::{self, Write};

/// Default number of trailing rows printed under a chart header.
pub const DEFAULT_ROWS: usize = 10;

pub struct TerminalPresenter<W: Write> {
    out: W,
    lang: Lang,
    rows: usize,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, lang: Lang) -> Self {
        Self {
            out,
            lang,
            rows: DEFAULT_ROWS,
        }
    }

    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Headline metrics, trend and the last few signals.
    pub fn render_insight(&mut self, insight: &Insight) -> io::Result<()> {
        let l = self.lang;

        let delta = insight.change.map(|c| format!("{c:+.2}"));
        self.render_metric(
            l.t("ราคาล่าสุด", "Last price"),
            &format!("{:.2}", insight.price),
            delta.as_deref(),
        )?;
        self.render_metric(
            l.t("แนวต้าน", "Resistance"),
            &format!("{:.2}", insight.resistance),
            None,
        )?;
        self.render_metric(
            l.t("แนวรับ", "Support"),
            &format!("{:.2}", insight.support),
            None,
        )?;
        self.render_metric(
            l.t("กำไรกลยุทธ์", "Strategy profit"),
            &format!("{:.2}%", insight.strategy_profit_pct),
            None,
        )?;
        self.render_metric(
            l.t("ขาดทุนสะสมสูงสุด", "Max drawdown"),
            &format!("{:.2}%", insight.max_drawdown_pct),
            None,
        )?;

        let trend = match insight.trend {
            Some(Trend::Bull) => l.t("ขาขึ้น (BULL)", "Uptrend (BULL)"),
            Some(Trend::Bear) => l.t("ขาลง (BEAR)", "Downtrend (BEAR)"),
            None => l.t("ไม่มีข้อมูล EMA 200", "no EMA 200 data"),
        };
        writeln!(self.out, "{}: {trend}", l.t("แนวโน้มระยะยาว", "Long-term trend"))?;
        writeln!(
            self.out,
            "{}: {} @ {}",
            l.t("สัญญาณล่าสุด", "Latest signal"),
            insight.last_signal,
            insight.time
        )?;
        if insight.counter_trend {
            writeln!(
                self.out,
                "!! {}",
                l.t(
                    "สัญญาณซื้อสวนแนวโน้มขาลง ระวังความเสี่ยง",
                    "Buy signal against a downtrend, higher risk"
                )
            )?;
        }

        if !insight.recent_signals.is_empty() {
            writeln!(self.out, "{}:", l.t("สัญญาณก่อนหน้า", "Recent signals"))?;
            for s in &insight.recent_signals {
                writeln!(self.out, "  {}  {:<4}  {:.2}", s.time, s.signal, s.close)?;
            }
        }
        Ok(())
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    type Error = io::Error;

    fn render_chart(
        &mut self,
        table: &AnalysisTable,
        options: &DisplayOptions,
    ) -> Result<(), Self::Error> {
        writeln!(
            self.out,
            "== {} {} ({}) ==",
            table.symbol(),
            table.timeframe(),
            table.timezone()
        )?;
        if table.is_empty() {
            writeln!(
                self.out,
                "{}",
                self.lang.t(
                    "ไม่พบข้อมูล หรือข้อมูลไม่พอสำหรับคำนวณ",
                    "No data, or not enough history to compute"
                )
            )?;
            return Ok(());
        }

        let columns = options.visible_columns(table);

        let mut header = format!("{:<19}  {:>10}", "time", "close");
        if options.show_volume {
            header.push_str(&format!("  {:>12}", "volume"));
        }
        for kind in &columns {
            header.push_str(&format!("  {:>11}", kind.name()));
        }
        header.push_str(&format!("  {:>10}  {:>10}", "res", "sup"));
        header.push_str("  signal");
        writeln!(self.out, "{header}")?;

        let skip = table.len().saturating_sub(self.rows);
        for row in table.rows().skip(skip) {
            let mut line = format!(
                "{:<19}  {:>10.2}",
                table.time_label(row.index).unwrap_or_default(),
                row.bar.close
            );
            if options.show_volume {
                line.push_str(&format!("  {:>12}", row.bar.volume));
            }
            for kind in &columns {
                let value = row.indicator(*kind).unwrap_or(f64::NAN);
                line.push_str(&format!("  {value:>11.2}"));
            }
            let res = row.indicator(IndicatorKind::Res);
            let sup = row.indicator(IndicatorKind::Sup);
            line.push_str(&format!(
                "  {:>10.2}  {:>10.2}  {}",
                res.unwrap_or(f64::NAN),
                sup.unwrap_or(f64::NAN),
                row.signal
            ));
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn render_metric(
        &mut self,
        label: &str,
        value: &str,
        delta: Option<&str>,
    ) -> Result<(), Self::Error> {
        match delta {
            Some(d) => writeln!(self.out, "{label}: {value} ({d})"),
            None => writeln!(self.out, "{label}: {value}"),
        }
    }
}
