//! Ranking engine
//!
//! Turns one run's snapshots into the nine Top-N lists. Pure and
//! deterministic: no I/O, never fails. A symbol missing the data a list
//! needs is simply left out of that list.

use crate::models::{
    Category, HighWaterMarks, MarketClass, RankedEntry, RankingConfig, Rankings, Snapshot,
    Snapshots, Symbol,
};
use std::collections::HashSet;
use tracing::debug;

/// What a symbol scored in one category
#[derive(Debug, Clone, PartialEq)]
struct Measure {
    metric: f64,
    reference: Option<f64>,
    contract: Option<String>,
}

impl Measure {
    fn of(metric: f64) -> Self {
        Self {
            metric,
            reference: None,
            contract: None,
        }
    }

    fn against(metric: f64, reference: Option<f64>) -> Self {
        Self {
            metric,
            reference,
            contract: None,
        }
    }
}

struct Candidate<'a> {
    symbol: &'a Symbol,
    snapshot: &'a Snapshot,
    measure: Measure,
}

/// Universe a category draws its symbols from
pub fn universe_class(category: Category) -> MarketClass {
    match category {
        Category::TopGainers | Category::UnusualVolume | Category::NewHighs => MarketClass::Equity,
        Category::EtfGainers | Category::EtfLosers | Category::EtfVolumeLeaders => MarketClass::Etf,
        Category::BullishOptions | Category::BearishOptions | Category::UnusualOptionTrades => {
            MarketClass::OptionsWatch
        }
    }
}

pub struct RankingEngine {
    config: RankingConfig,
}

impl RankingEngine {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    /// Every category, ranked. `prior_highs` is the tracker state before today's update.
    pub fn rank(&self, universe: &[Symbol], snapshots: &Snapshots, prior_highs: &HighWaterMarks) -> Rankings {
        Category::ALL
            .into_iter()
            .map(|category| (category, self.rank_category(category, universe, snapshots, prior_highs)))
            .collect()
    }

    pub fn rank_category(
        &self,
        category: Category,
        universe: &[Symbol],
        snapshots: &Snapshots,
        prior_highs: &HighWaterMarks,
    ) -> Vec<RankedEntry> {
        let class = universe_class(category);
        let mut seen = HashSet::new();

        let mut candidates: Vec<Candidate> = universe
            .iter()
            .filter(|s| s.class == class && seen.insert(s.ticker.as_str()))
            .filter_map(|symbol| {
                let snapshot = snapshots.get(&symbol.ticker)?;
                let measure = self.measure(category, symbol, snapshot, prior_highs)?;
                measure.metric.is_finite().then_some(Candidate {
                    symbol,
                    snapshot,
                    measure,
                })
            })
            .collect();

        let qualifying = candidates.len();
        let ascending = category.is_ascending();
        candidates.sort_by(|a, b| {
            let by_metric = if ascending {
                a.measure.metric.total_cmp(&b.measure.metric)
            } else {
                b.measure.metric.total_cmp(&a.measure.metric)
            };
            by_metric.then_with(|| a.symbol.ticker.cmp(&b.symbol.ticker))
        });
        candidates.truncate(self.config.top_n);

        debug!(category = category.as_str(), qualifying, kept = candidates.len(), "Ranked");

        candidates
            .into_iter()
            .enumerate()
            .map(|(i, c)| RankedEntry {
                rank: i + 1,
                symbol: c.symbol.ticker.clone(),
                name: c.symbol.name.clone(),
                category: c.symbol.category.clone(),
                metric: c.measure.metric,
                last_price: c.snapshot.last_price,
                percent_change: c.snapshot.percent_change(),
                volume: c.snapshot.volume,
                reference: c.measure.reference,
                contract: c.measure.contract,
            })
            .collect()
    }

    fn measure(
        &self,
        category: Category,
        symbol: &Symbol,
        snapshot: &Snapshot,
        prior_highs: &HighWaterMarks,
    ) -> Option<Measure> {
        match category {
            Category::TopGainers | Category::EtfGainers | Category::EtfLosers => {
                snapshot.percent_change().map(Measure::of)
            }
            Category::UnusualVolume => {
                let ratio = snapshot.volume_ratio()?;
                let floor = self.config.unusual_volume_min_ratio.unwrap_or(f64::NEG_INFINITY);
                (ratio >= floor).then(|| Measure::against(ratio, snapshot.avg_volume))
            }
            Category::NewHighs => self.new_high(symbol, snapshot, prior_highs),
            Category::EtfVolumeLeaders => snapshot.volume.map(|v| Measure::of(v as f64)),
            Category::BullishOptions => {
                let activity = snapshot.options.as_ref()?;
                let ratio = activity.call_volume_ratio()?;
                (ratio > self.config.option_surge_threshold)
                    .then(|| Measure::against(ratio, activity.avg_call_volume))
            }
            Category::BearishOptions => {
                let activity = snapshot.options.as_ref()?;
                let ratio = activity.put_volume_ratio()?;
                (ratio > self.config.option_surge_threshold)
                    .then(|| Measure::against(ratio, activity.avg_put_volume))
            }
            Category::UnusualOptionTrades => {
                let activity = snapshot.options.as_ref()?;
                let (contract, notional) = activity.largest_trade(self.config.contract_multiplier)?;
                (notional > self.config.min_option_notional).then(|| Measure {
                    metric: notional,
                    reference: contract.strike,
                    contract: Some(contract.contract_symbol.clone()),
                })
            }
        }
    }

    fn new_high(&self, symbol: &Symbol, snapshot: &Snapshot, prior_highs: &HighWaterMarks) -> Option<Measure> {
        let last = snapshot.last_price.filter(|p| p.is_finite() && *p > 0.0)?;

        match prior_highs.get(&symbol.ticker) {
            Some(mark) if last >= mark.highest => {
                let above = mark.percent_above(last)?;
                Some(Measure::against(above, Some(mark.highest)))
            }
            Some(_) => None,
            None if self.config.first_observation.counts_as_high() => Some(Measure::of(0.0)),
            None => None,
        }
    }
}
