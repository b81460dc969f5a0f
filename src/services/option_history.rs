//! Rolling daily option volume per symbol.
//!
//! The option chain only reports today's volume, so trailing averages come
//! from our own record of previous runs.

use crate::constants::TRAILING_WINDOW_DAYS;
use crate::error::Result;
use crate::models::Snapshots;
use crate::services::json_store;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionVolumeDay {
    pub date: NaiveDate,
    pub calls: u64,
    pub puts: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionVolumeHistory {
    days: BTreeMap<String, Vec<OptionVolumeDay>>,
}

impl OptionVolumeHistory {
    pub fn load(path: &Path) -> Result<Self> {
        json_store::read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        json_store::write_json(path, self)
    }

    /// Symbols with at least one recorded day, sorted
    pub fn symbols(&self) -> Vec<&str> {
        self.days.keys().map(String::as_str).collect()
    }

    pub fn days(&self, symbol: &str) -> &[OptionVolumeDay] {
        self.days.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mean (calls, puts) over the most recent days strictly before `before`
    pub fn trailing_average(&self, symbol: &str, before: NaiveDate) -> Option<(f64, f64)> {
        let prior: Vec<&OptionVolumeDay> = self
            .days(symbol)
            .iter()
            .filter(|d| d.date < before)
            .collect();
        let window = &prior[prior.len().saturating_sub(TRAILING_WINDOW_DAYS)..];
        if window.is_empty() {
            return None;
        }

        let n = window.len() as f64;
        let calls = window.iter().map(|d| d.calls as f64).sum::<f64>() / n;
        let puts = window.iter().map(|d| d.puts as f64).sum::<f64>() / n;
        Some((calls, puts))
    }

    /// Store today's totals; re-recording the same date replaces it
    pub fn record(&mut self, symbol: &str, date: NaiveDate, calls: u64, puts: u64) {
        let days = self.days.entry(symbol.to_string()).or_default();
        days.retain(|d| d.date != date);
        days.push(OptionVolumeDay { date, calls, puts });
        days.sort_by_key(|d| d.date);

        let excess = days.len().saturating_sub(TRAILING_WINDOW_DAYS);
        days.drain(..excess);
    }

    /// Fill trailing call/put averages on every snapshot that carries an option chain
    pub fn enrich(&self, snapshots: &mut Snapshots, today: NaiveDate) {
        for (symbol, snapshot) in snapshots.iter_mut() {
            if let Some(activity) = snapshot.options.as_mut() {
                let average = self.trailing_average(symbol, today);
                activity.avg_call_volume = average.map(|(calls, _)| calls);
                activity.avg_put_volume = average.map(|(_, puts)| puts);
            }
        }
    }

    /// Record today's totals for every snapshot with a non-empty option chain
    pub fn record_snapshots(&mut self, snapshots: &Snapshots, today: NaiveDate) -> usize {
        let mut recorded = 0;
        for (symbol, snapshot) in snapshots {
            if let Some(activity) = snapshot.options.as_ref().filter(|a| !a.contracts.is_empty()) {
                self.record(symbol, today, activity.call_volume(), activity.put_volume());
                recorded += 1;
            }
        }
        recorded
    }
}
