//! Thai/English label selection for terminal output.

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Lang {
    #[default]
    Th,
    En,
}

impl Lang {
    /// Pick the Thai or English variant of a label.
    pub fn t(self, th: &'static str, en: &'static str) -> &'static str {
        match self {
            Lang::Th => th,
            Lang::En => en,
        }
    }
}
