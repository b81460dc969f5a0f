use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-N list shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    TopGainers,
    UnusualVolume,
    NewHighs,
    EtfGainers,
    EtfLosers,
    EtfVolumeLeaders,
    BullishOptions,
    BearishOptions,
    UnusualOptionTrades,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::TopGainers,
        Category::UnusualVolume,
        Category::NewHighs,
        Category::EtfGainers,
        Category::EtfLosers,
        Category::EtfVolumeLeaders,
        Category::BullishOptions,
        Category::BearishOptions,
        Category::UnusualOptionTrades,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TopGainers => "top_gainers",
            Category::UnusualVolume => "unusual_volume",
            Category::NewHighs => "new_highs",
            Category::EtfGainers => "etf_gainers",
            Category::EtfLosers => "etf_losers",
            Category::EtfVolumeLeaders => "etf_volume_leaders",
            Category::BullishOptions => "bullish_options",
            Category::BearishOptions => "bearish_options",
            Category::UnusualOptionTrades => "unusual_option_trades",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::TopGainers => "Top Gainers",
            Category::UnusualVolume => "Unusual Volume",
            Category::NewHighs => "New 52-Week Highs",
            Category::EtfGainers => "ETF Gainers",
            Category::EtfLosers => "ETF Losers",
            Category::EtfVolumeLeaders => "ETF Volume Leaders",
            Category::BullishOptions => "Bullish Option Flow",
            Category::BearishOptions => "Bearish Option Flow",
            Category::UnusualOptionTrades => "Unusual Option Trades",
        }
    }

    /// Heading of the metric column
    pub fn metric_label(&self) -> &'static str {
        match self {
            Category::TopGainers | Category::EtfGainers | Category::EtfLosers => "Change",
            Category::UnusualVolume => "Vol Ratio",
            Category::NewHighs => "Above High",
            Category::EtfVolumeLeaders => "Volume",
            Category::BullishOptions => "Call Ratio",
            Category::BearishOptions => "Put Ratio",
            Category::UnusualOptionTrades => "Notional",
        }
    }

    /// Lower metric ranks first
    pub fn is_ascending(&self) -> bool {
        matches!(self, Category::EtfLosers)
    }
}

/// One row of a Top-N list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// 1-based position
    pub rank: usize,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Value the list is ordered by
    pub metric: f64,
    pub last_price: Option<f64>,
    pub percent_change: Option<f64>,
    pub volume: Option<u64>,
    /// Baseline the metric was measured against (prior high, trailing average)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<f64>,
    /// Option contract behind an unusual trade
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
}

/// Category -> ordered list handed to the renderer
pub type Rankings = BTreeMap<Category, Vec<RankedEntry>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialize_matches_as_str() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn test_only_losers_ascend() {
        let ascending: Vec<Category> = Category::ALL.into_iter().filter(|c| c.is_ascending()).collect();
        assert_eq!(ascending, vec![Category::EtfLosers]);
    }
}
