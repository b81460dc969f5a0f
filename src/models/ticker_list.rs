//! Ticker Lists
//!
//! Static reference data loaded at startup. Each list file is either a JSON
//! object keyed by ticker or a JSON array of records:
//!
//! ```json
//! { "AAPL": { "name": "Apple", "sector": "Technology" }, "^VIX": "VIX" }
//! [ { "symbol": "SPY", "name": "SPDR S&P 500", "category": "Broad Market" } ]
//! ```
//!
//! Object order is preserved so the index bar and featured cards render in
//! file order.

use crate::constants::{
    DEFAULT_FEATURED, DEFAULT_INDICES, ETF_FILE, FEATURED_FILE, INDICES_FILE,
    OPTIONS_WATCHLIST_FILE, RUSSELL2000_FILE, SP500_FILE,
};
use crate::error::{AppError, Result};
use crate::models::{MarketClass, Symbol};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Per-ticker metadata in the keyed form
#[derive(Debug, Default, Deserialize)]
struct TickerInfo {
    name: Option<String>,
    category: Option<String>,
    sector: Option<String>,
    sector_kr: Option<String>,
}

/// One entry in the array form
#[derive(Debug, Deserialize)]
struct TickerRecord {
    #[serde(alias = "ticker")]
    symbol: String,
    name: Option<String>,
    category: Option<String>,
}

impl TickerInfo {
    fn label(self) -> (Option<String>, Option<String>) {
        let category = self.category.or(self.sector_kr).or(self.sector);
        (self.name, category)
    }
}

/// Parse one list file's content into symbols of the given class
pub fn parse_ticker_list(content: &str, class: MarketClass) -> Result<Vec<Symbol>> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| AppError::Config(format!("Invalid ticker list JSON: {}", e)))?;

    let mut symbols = Vec::new();
    match value {
        Value::Object(map) => {
            for (ticker, info) in map {
                let (name, category) = match info {
                    Value::String(name) => (Some(name), None),
                    Value::Null => (None, None),
                    other => serde_json::from_value::<TickerInfo>(other)
                        .map_err(|e| AppError::Config(format!("Invalid entry for {}: {}", ticker, e)))?
                        .label(),
                };
                symbols.push(build_symbol(ticker, class, name, category));
            }
        }
        Value::Array(items) => {
            for item in items {
                let record: TickerRecord = serde_json::from_value(item)
                    .map_err(|e| AppError::Config(format!("Invalid ticker record: {}", e)))?;
                symbols.push(build_symbol(record.symbol, class, record.name, record.category));
            }
        }
        _ => {
            return Err(AppError::Config(
                "Ticker list must be a JSON object or array".to_string(),
            ))
        }
    }

    Ok(symbols)
}

fn build_symbol(ticker: String, class: MarketClass, name: Option<String>, category: Option<String>) -> Symbol {
    Symbol {
        ticker: ticker.trim().to_uppercase(),
        class,
        name: name.filter(|n| !n.is_empty()),
        category: category.filter(|c| !c.is_empty()),
    }
}

/// Load a list file; a missing file yields `None`
pub fn load_ticker_list(path: &Path, class: MarketClass) -> Result<Option<Vec<Symbol>>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    parse_ticker_list(&content, class)
        .map(Some)
        .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
}

/// Every symbol the dashboard knows about, grouped by list
#[derive(Debug, Clone, Default)]
pub struct TickerUniverse {
    symbols: Vec<Symbol>,
}

impl TickerUniverse {
    /// Build from already-parsed symbols; duplicates within a class are dropped
    pub fn from_symbols(symbols: Vec<Symbol>) -> Self {
        let mut seen: HashSet<(MarketClass, String)> = HashSet::new();
        let symbols = symbols
            .into_iter()
            .filter(|s| !s.ticker.is_empty())
            .filter(|s| seen.insert((s.class, s.ticker.clone())))
            .collect();
        Self { symbols }
    }

    /// Load every list file from the data directory
    pub fn load(data_dir: &Path) -> Result<Self> {
        let mut symbols = Vec::new();

        let ranked_lists = [
            (SP500_FILE, MarketClass::Equity),
            (RUSSELL2000_FILE, MarketClass::Equity),
            (ETF_FILE, MarketClass::Etf),
            (OPTIONS_WATCHLIST_FILE, MarketClass::OptionsWatch),
        ];

        for (file, class) in ranked_lists {
            match load_ticker_list(&data_dir.join(file), class)? {
                Some(list) => {
                    info!(file, count = list.len(), class = class.as_str(), "Loaded ticker list");
                    symbols.extend(list);
                }
                None => warn!(file, "Ticker list not found, skipping"),
            }
        }

        if symbols.is_empty() {
            return Err(AppError::Config(format!(
                "No ticker lists found in {}",
                data_dir.display()
            )));
        }

        let display_lists = [
            (INDICES_FILE, MarketClass::Index, DEFAULT_INDICES),
            (FEATURED_FILE, MarketClass::Featured, DEFAULT_FEATURED),
        ];

        for (file, class, defaults) in display_lists {
            let list = match load_ticker_list(&data_dir.join(file), class)? {
                Some(list) => list,
                None => defaults
                    .iter()
                    .map(|(ticker, name)| Symbol::new(*ticker, class).with_name(*name))
                    .collect(),
            };
            symbols.extend(list);
        }

        Ok(Self::from_symbols(symbols))
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn of_class(&self, class: MarketClass) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(move |s| s.class == class)
    }

    pub fn class_count(&self, class: MarketClass) -> usize {
        self.of_class(class).count()
    }

    /// Distinct tickers across all lists, sorted
    pub fn unique_tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.symbols.iter().map(|s| s.ticker.clone()).collect();
        tickers.sort();
        tickers.dedup();
        tickers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_keyed_list_keeps_file_order() {
        let content = r#"{
            "^GSPC": "S&P 500",
            "^IXIC": {"name": "Nasdaq"},
            "AAPL": {"name": "Apple", "sector": "Tech", "sector_kr": "기술"}
        }"#;
        let symbols = parse_ticker_list(content, MarketClass::Index).unwrap();
        let tickers: Vec<&str> = symbols.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["^GSPC", "^IXIC", "AAPL"]);
        assert_eq!(symbols[0].name.as_deref(), Some("S&P 500"));
        assert_eq!(symbols[2].category.as_deref(), Some("기술"));
    }

    #[test]
    fn test_parse_record_list() {
        let content = r#"[
            {"symbol": "spy", "name": "SPDR S&P 500", "category": "Broad Market"},
            {"ticker": "QQQ"}
        ]"#;
        let symbols = parse_ticker_list(content, MarketClass::Etf).unwrap();
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].ticker, "SPY");
        assert_eq!(symbols[1].ticker, "QQQ");
        assert_eq!(symbols[1].category, None);
    }

    #[test]
    fn test_parse_rejects_scalar() {
        assert!(parse_ticker_list("42", MarketClass::Equity).is_err());
        assert!(parse_ticker_list("not json", MarketClass::Equity).is_err());
    }

    #[test]
    fn test_universe_dedups_within_class_only() {
        let universe = TickerUniverse::from_symbols(vec![
            Symbol::new("AAPL", MarketClass::Equity),
            Symbol::new("AAPL", MarketClass::Equity),
            Symbol::new("AAPL", MarketClass::OptionsWatch),
            Symbol::new("SPY", MarketClass::Etf),
        ]);
        assert_eq!(universe.symbols().len(), 3);
        assert_eq!(universe.class_count(MarketClass::Equity), 1);
        assert_eq!(universe.unique_tickers(), vec!["AAPL", "SPY"]);
    }

    #[test]
    fn test_load_uses_default_display_lists() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SP500_FILE), r#"{"AAPL": {"name": "Apple"}}"#).unwrap();
        fs::write(dir.path().join(ETF_FILE), r#"{"SPY": {"name": "SPDR", "category": "Index"}}"#).unwrap();

        let universe = TickerUniverse::load(dir.path()).unwrap();
        assert_eq!(universe.class_count(MarketClass::Equity), 1);
        assert_eq!(universe.class_count(MarketClass::Etf), 1);
        assert_eq!(universe.class_count(MarketClass::Index), DEFAULT_INDICES.len());
        assert_eq!(universe.class_count(MarketClass::Featured), DEFAULT_FEATURED.len());
    }

    #[test]
    fn test_load_empty_dir_is_config_error() {
        let dir = tempdir().unwrap();
        let err = TickerUniverse::load(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
