//! Symbol catalog: category → ticker → display label.
//!
//! Pure configuration data. The built-in groups can be replaced wholesale by
//! `[[catalog]]` tables in the config file.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub ticker: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogGroup {
    pub name: String,
    pub symbols: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    groups: Vec<CatalogGroup>,
}

const BUILTIN: &[(&str, &[(&str, &str)])] = &[
    (
        "US Market",
        &[
            ("AAPL", "Apple"),
            ("TSLA", "Tesla"),
            ("NVDA", "Nvidia"),
            ("MSFT", "Microsoft"),
            ("GOOGL", "Google"),
        ],
    ),
    (
        "Thai Market",
        &[
            ("CPALL.BK", "CP All"),
            ("PTT.BK", "PTT"),
            ("AOT.BK", "Airports of Thailand"),
            ("KBANK.BK", "Kasikornbank"),
            ("DELTA.BK", "Delta Electronics"),
        ],
    ),
    (
        "Crypto",
        &[
            ("BTC-USD", "Bitcoin"),
            ("ETH-USD", "Ethereum"),
            ("BNB-USD", "Binance Coin"),
        ],
    ),
    (
        "Indices",
        &[
            ("^SET.BK", "SET Index"),
            ("^GSPC", "S&P 500"),
            ("^IXIC", "Nasdaq"),
        ],
    ),
];

impl Catalog {
    pub fn new(groups: Vec<CatalogGroup>) -> Self {
        Self { groups }
    }

    pub fn builtin() -> Self {
        let groups = BUILTIN
            .iter()
            .map(|(name, symbols)| CatalogGroup {
                name: (*name).to_string(),
                symbols: symbols
                    .iter()
                    .map(|(ticker, label)| CatalogEntry {
                        ticker: (*ticker).to_string(),
                        label: (*label).to_string(),
                    })
                    .collect(),
            })
            .collect();
        Self { groups }
    }

    pub fn groups(&self) -> &[CatalogGroup] {
        &self.groups
    }

    /// Every ticker in group order.
    pub fn all_symbols(&self) -> Vec<&str> {
        self.groups
            .iter()
            .flat_map(|g| g.symbols.iter().map(|e| e.ticker.as_str()))
            .collect()
    }

    pub fn label(&self, ticker: &str) -> Option<&str> {
        self.groups
            .iter()
            .flat_map(|g| &g.symbols)
            .find(|e| e.ticker.eq_ignore_ascii_case(ticker))
            .map(|e| e.label.as_str())
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.label(ticker).is_some()
    }

    /// The first `n` tickers, used to fill the grid when none are given.
    pub fn first(&self, n: usize) -> Vec<&str> {
        self.all_symbols().into_iter().take(n).collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_groups() {
        let catalog = Catalog::builtin();
        let names: Vec<&str> = catalog.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["US Market", "Thai Market", "Crypto", "Indices"]);
        assert_eq!(catalog.all_symbols().len(), 16);
        assert_eq!(catalog.first(4), vec!["AAPL", "TSLA", "NVDA", "MSFT"]);
    }

    #[test]
    fn label_lookup_ignores_case() {
        let catalog = Catalog::default();
        assert_eq!(catalog.label("btc-usd"), Some("Bitcoin"));
        assert_eq!(catalog.label("^GSPC"), Some("S&P 500"));
        assert!(!catalog.contains("DOGE-USD"));
    }

    #[test]
    fn custom_catalog_replaces_builtin() {
        let catalog = Catalog::new(vec![CatalogGroup {
            name: "Watchlist".into(),
            symbols: vec![CatalogEntry {
                ticker: "SPY".into(),
                label: "S&P 500 ETF".into(),
            }],
        }]);
        assert_eq!(catalog.all_symbols(), vec!["SPY"]);
        assert!(!catalog.contains("AAPL"));
    }
}
