use serde::{Deserialize, Serialize};

/// Call or put
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    Call,
    Put,
}

/// One listed option contract as seen in today's chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// OCC contract symbol, e.g. AAPL250117C00150000
    pub contract_symbol: String,
    pub side: OptionSide,
    pub strike: Option<f64>,
    pub last_price: Option<f64>,
    /// Contracts traded today
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
}

impl OptionContract {
    /// Premium traded today: price × contracts × shares per contract
    pub fn notional(&self, multiplier: f64) -> Option<f64> {
        let price = self.last_price.filter(|p| p.is_finite() && *p > 0.0)?;
        let volume = self.volume.filter(|v| *v > 0)?;
        Some(price * volume as f64 * multiplier)
    }
}

/// Option chain activity for a watchlist symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionActivity {
    pub contracts: Vec<OptionContract>,
    /// Mean daily call volume over the trailing window, filled from history
    pub avg_call_volume: Option<f64>,
    /// Mean daily put volume over the trailing window, filled from history
    pub avg_put_volume: Option<f64>,
}

impl OptionActivity {
    fn side_volume(&self, side: OptionSide) -> u64 {
        self.contracts
            .iter()
            .filter(|c| c.side == side)
            .filter_map(|c| c.volume)
            .sum()
    }

    pub fn call_volume(&self) -> u64 {
        self.side_volume(OptionSide::Call)
    }

    pub fn put_volume(&self) -> u64 {
        self.side_volume(OptionSide::Put)
    }

    pub fn call_volume_ratio(&self) -> Option<f64> {
        ratio(self.call_volume() as f64, self.avg_call_volume)
    }

    pub fn put_volume_ratio(&self) -> Option<f64> {
        ratio(self.put_volume() as f64, self.avg_put_volume)
    }

    /// Contract with the largest notional; ties go to the lexically smaller contract symbol
    pub fn largest_trade(&self, multiplier: f64) -> Option<(&OptionContract, f64)> {
        self.contracts
            .iter()
            .filter_map(|c| c.notional(multiplier).map(|n| (c, n)))
            .filter(|(_, n)| n.is_finite())
            .max_by(|(a, an), (b, bn)| {
                an.total_cmp(bn)
                    .then_with(|| b.contract_symbol.cmp(&a.contract_symbol))
            })
    }
}

/// One symbol's observed state at run time. Every numeric field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub symbol: String,
    pub last_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub volume: Option<u64>,
    /// Mean daily volume over the trailing 20 sessions, today excluded
    pub avg_volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OptionActivity>,
}

impl Snapshot {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// (last - previous close) / previous close, in percent
    pub fn percent_change(&self) -> Option<f64> {
        let last = self.last_price?;
        let prev = self.previous_close.filter(|p| *p > 0.0)?;
        let pct = (last - prev) / prev * 100.0;
        pct.is_finite().then_some(pct)
    }

    /// Day volume over trailing average volume
    pub fn volume_ratio(&self) -> Option<f64> {
        ratio(self.volume? as f64, self.avg_volume)
    }
}

/// Division guarded against missing, zero and non-finite denominators
fn ratio(numerator: f64, denominator: Option<f64>) -> Option<f64> {
    let denominator = denominator.filter(|d| d.is_finite() && *d > 0.0)?;
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(symbol: &str, side: OptionSide, price: f64, volume: u64) -> OptionContract {
        OptionContract {
            contract_symbol: symbol.to_string(),
            side,
            strike: Some(100.0),
            last_price: Some(price),
            volume: Some(volume),
            open_interest: None,
        }
    }

    #[test]
    fn test_percent_change() {
        let snap = Snapshot {
            last_price: Some(110.0),
            previous_close: Some(100.0),
            ..Snapshot::new("A")
        };
        assert!((snap.percent_change().unwrap() - 10.0).abs() < 1e-9);

        let no_prev = Snapshot {
            last_price: Some(110.0),
            previous_close: Some(0.0),
            ..Snapshot::new("B")
        };
        assert_eq!(no_prev.percent_change(), None);
    }

    #[test]
    fn test_volume_ratio_guards_zero_average() {
        let snap = Snapshot {
            volume: Some(1_000),
            avg_volume: Some(0.0),
            ..Snapshot::new("A")
        };
        assert_eq!(snap.volume_ratio(), None);

        let missing = Snapshot {
            volume: Some(1_000),
            ..Snapshot::new("B")
        };
        assert_eq!(missing.volume_ratio(), None);

        let ok = Snapshot {
            volume: Some(3_000),
            avg_volume: Some(1_000.0),
            ..Snapshot::new("C")
        };
        assert_eq!(ok.volume_ratio(), Some(3.0));
    }

    #[test]
    fn test_option_volume_totals_and_ratios() {
        let activity = OptionActivity {
            contracts: vec![
                contract("C1", OptionSide::Call, 1.0, 300),
                contract("C2", OptionSide::Call, 2.0, 200),
                contract("P1", OptionSide::Put, 1.5, 100),
            ],
            avg_call_volume: Some(100.0),
            avg_put_volume: None,
        };
        assert_eq!(activity.call_volume(), 500);
        assert_eq!(activity.put_volume(), 100);
        assert_eq!(activity.call_volume_ratio(), Some(5.0));
        assert_eq!(activity.put_volume_ratio(), None);
    }

    #[test]
    fn test_largest_trade_by_notional() {
        let activity = OptionActivity {
            contracts: vec![
                contract("C1", OptionSide::Call, 5.0, 1_000),
                contract("P1", OptionSide::Put, 12.0, 1_000),
                OptionContract {
                    last_price: None,
                    ..contract("C2", OptionSide::Call, 0.0, 50_000)
                },
            ],
            ..Default::default()
        };
        let (best, notional) = activity.largest_trade(100.0).unwrap();
        assert_eq!(best.contract_symbol, "P1");
        assert_eq!(notional, 1_200_000.0);
    }
}
