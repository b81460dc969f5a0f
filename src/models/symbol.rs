use serde::{Deserialize, Serialize};

/// Which static list a symbol came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketClass {
    /// Index member equity (S&P 500, Russell 2000)
    Equity,
    /// Exchange traded fund
    Etf,
    /// Symbol whose option chain is scanned
    OptionsWatch,
    /// Market index or macro quote shown in the index bar
    Index,
    /// Large caps shown as cards at the top of the dashboard
    Featured,
}

impl MarketClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketClass::Equity => "equity",
            MarketClass::Etf => "etf",
            MarketClass::OptionsWatch => "options_watch",
            MarketClass::Index => "index",
            MarketClass::Featured => "featured",
        }
    }
}

/// A ticker plus its reference data. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub ticker: String,
    pub class: MarketClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-text label (sector, ETF category); display only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Symbol {
    pub fn new(ticker: impl Into<String>, class: MarketClass) -> Self {
        Self {
            ticker: ticker.into(),
            class,
            name: None,
            category: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[cfg(test)]
    fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Name for display, falling back to the ticker
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.ticker)
    }
}
