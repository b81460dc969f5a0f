//! 52-week-high tracker
//!
//! Keeps the highest observed price per symbol across runs and reports which
//! symbols set a new high today. The store object is the only thing that
//! touches disk; the tracker itself holds no state between calls.
//!
//! Runs are serialized by the external scheduler, so the store is never
//! locked.

use crate::error::Result;
use crate::models::{FirstObservation, HighWaterMark, HighWaterMarks};
use crate::services::json_store;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Persistence for HighWaterMark records
pub trait HighWaterStore {
    /// Empty set when nothing was persisted yet
    fn load(&self) -> Result<HighWaterMarks>;

    /// All-or-nothing replace of the full record set
    fn save(&self, marks: &HighWaterMarks) -> Result<()>;
}

/// Flat `{symbol: {highest, date}}` JSON file
#[derive(Debug, Clone)]
pub struct JsonHighWaterStore {
    path: PathBuf,
}

impl JsonHighWaterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighWaterStore for JsonHighWaterStore {
    fn load(&self) -> Result<HighWaterMarks> {
        json_store::read_json(&self.path)
    }

    fn save(&self, marks: &HighWaterMarks) -> Result<()> {
        json_store::write_json(&self.path, marks)
    }
}

/// Fold today's prices into `marks`; returns the flagged symbols and whether anything changed
pub fn apply_prices(
    marks: &mut HighWaterMarks,
    today: &BTreeMap<String, f64>,
    date: NaiveDate,
    policy: FirstObservation,
) -> (BTreeSet<String>, bool) {
    let mut new_highs = BTreeSet::new();
    let mut changed = false;

    for (symbol, &price) in today {
        if !price.is_finite() || price <= 0.0 {
            debug!(symbol = %symbol, price, "Skipping unusable price");
            continue;
        }

        match marks.get_mut(symbol) {
            None => {
                marks.insert(symbol.clone(), HighWaterMark::new(price, date));
                changed = true;
                if policy.counts_as_high() {
                    new_highs.insert(symbol.clone());
                }
            }
            Some(mark) if price > mark.highest => {
                *mark = HighWaterMark::new(price, date);
                changed = true;
                new_highs.insert(symbol.clone());
            }
            Some(_) => {}
        }
    }

    (new_highs, changed)
}

pub struct HighTracker<S: HighWaterStore> {
    store: S,
    policy: FirstObservation,
}

impl<S: HighWaterStore> HighTracker<S> {
    pub fn new(store: S, policy: FirstObservation) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current persisted marks (state before today's update)
    pub fn marks(&self) -> Result<HighWaterMarks> {
        self.store.load()
    }

    /// Compare today's prices against stored highs, persist, and return the new highs
    pub fn update(&self, today: &BTreeMap<String, f64>, date: NaiveDate) -> Result<BTreeSet<String>> {
        let mut marks = self.store.load()?;
        let (new_highs, changed) = apply_prices(&mut marks, today, date, self.policy);

        if changed {
            self.store.save(&marks)?;
        }

        info!(
            observed = today.len(),
            tracked = marks.len(),
            new_highs = new_highs.len(),
            persisted = changed,
            "High-water marks updated"
        );

        Ok(new_highs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use tempfile::tempdir;

    /// Store kept in memory, counting saves
    #[derive(Default)]
    struct MemoryStore {
        marks: RefCell<HighWaterMarks>,
        saves: Cell<usize>,
    }

    impl HighWaterStore for MemoryStore {
        fn load(&self) -> Result<HighWaterMarks> {
            Ok(self.marks.borrow().clone())
        }

        fn save(&self, marks: &HighWaterMarks) -> Result<()> {
            *self.marks.borrow_mut() = marks.clone();
            self.saves.set(self.saves.get() + 1);
            Ok(())
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn prices(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    fn set(symbols: &[&str]) -> BTreeSet<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    fn seeded(highest: f64) -> MemoryStore {
        let store = MemoryStore::default();
        store
            .marks
            .borrow_mut()
            .insert("AAPL".to_string(), HighWaterMark::new(highest, day(1)));
        store
    }

    #[test]
    fn test_empty_store_first_observation_is_high() {
        let tracker = HighTracker::new(MemoryStore::default(), FirstObservation::CountsAsHigh);

        let flagged = tracker.update(&prices(&[("AAPL", 150.0)]), day(3)).unwrap();

        assert_eq!(flagged, set(&["AAPL"]));
        let marks = tracker.marks().unwrap();
        assert_eq!(marks["AAPL"], HighWaterMark::new(150.0, day(3)));
    }

    #[test]
    fn test_empty_store_baseline_policy_seeds_without_flag() {
        let tracker = HighTracker::new(MemoryStore::default(), FirstObservation::Baseline);

        let flagged = tracker.update(&prices(&[("AAPL", 150.0)]), day(3)).unwrap();

        assert!(flagged.is_empty());
        assert_eq!(tracker.marks().unwrap()["AAPL"].highest, 150.0);
        assert_eq!(tracker.store().saves.get(), 1);
    }

    #[test]
    fn test_lower_price_leaves_store_unchanged() {
        let tracker = HighTracker::new(seeded(150.0), FirstObservation::CountsAsHigh);

        let flagged = tracker.update(&prices(&[("AAPL", 145.0)]), day(3)).unwrap();

        assert!(flagged.is_empty());
        assert_eq!(tracker.marks().unwrap()["AAPL"], HighWaterMark::new(150.0, day(1)));
        assert_eq!(tracker.store().saves.get(), 0);
    }

    #[test]
    fn test_higher_price_updates_record() {
        let tracker = HighTracker::new(seeded(150.0), FirstObservation::CountsAsHigh);

        let flagged = tracker.update(&prices(&[("AAPL", 151.0)]), day(3)).unwrap();

        assert_eq!(flagged, set(&["AAPL"]));
        assert_eq!(tracker.marks().unwrap()["AAPL"], HighWaterMark::new(151.0, day(3)));
    }

    #[test]
    fn test_equal_price_is_not_a_new_high() {
        let tracker = HighTracker::new(seeded(150.0), FirstObservation::CountsAsHigh);
        let flagged = tracker.update(&prices(&[("AAPL", 150.0)]), day(3)).unwrap();
        assert!(flagged.is_empty());
    }

    #[test]
    fn test_second_identical_update_flags_nothing() {
        for policy in [FirstObservation::CountsAsHigh, FirstObservation::Baseline] {
            let tracker = HighTracker::new(seeded(100.0), policy);
            let today = prices(&[("AAPL", 120.0), ("MSFT", 400.0)]);

            let first = tracker.update(&today, day(3)).unwrap();
            let second = tracker.update(&today, day(3)).unwrap();

            assert!(first.contains("AAPL"));
            assert!(second.is_empty(), "policy {:?} re-flagged", policy);
        }
    }

    #[test]
    fn test_highest_never_decreases() {
        let tracker = HighTracker::new(MemoryStore::default(), FirstObservation::CountsAsHigh);
        let sequence = [100.0, 105.0, 98.0, 105.0, 110.0, 50.0];
        let mut previous = f64::MIN;

        for (i, price) in sequence.iter().enumerate() {
            tracker
                .update(&prices(&[("AAPL", *price)]), day(i as u32 + 1))
                .unwrap();
            let highest = tracker.marks().unwrap()["AAPL"].highest;
            assert!(highest >= previous);
            previous = highest;
        }
        assert_eq!(previous, 110.0);
    }

    #[test]
    fn test_unusable_prices_are_skipped() {
        let tracker = HighTracker::new(MemoryStore::default(), FirstObservation::CountsAsHigh);
        let flagged = tracker
            .update(&prices(&[("NAN", f64::NAN), ("ZERO", 0.0), ("OK", 10.0)]), day(3))
            .unwrap();
        assert_eq!(flagged, set(&["OK"]));
        assert_eq!(tracker.marks().unwrap().len(), 1);
    }

    #[test]
    fn test_json_store_round_trip_is_byte_identical() {
        let dir = tempdir().unwrap();
        let store = JsonHighWaterStore::new(dir.path().join("52week_highs.json"));
        let tracker = HighTracker::new(store.clone(), FirstObservation::CountsAsHigh);
        tracker
            .update(
                &prices(&[
                    ("AAPL", 189.97999572753906),
                    ("MSFT", 410.0),
                    ("NVDA", 0.1),
                    ("TSLA", 905.2515650813416),
                ]),
                day(3),
            )
            .unwrap();

        let original = fs::read(store.path()).unwrap();
        let loaded = store.load().unwrap();
        store.save(&loaded).unwrap();

        assert_eq!(fs::read(store.path()).unwrap(), original);
        assert_eq!(loaded["AAPL"].highest, 189.97999572753906);
        assert_eq!(loaded["TSLA"].highest, 905.2515650813416);
    }

    #[test]
    fn test_full_precision_prices_survive_reload() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let dir = tempdir().unwrap();
        let store = JsonHighWaterStore::new(dir.path().join("52week_highs.json"));
        let mut rng = StdRng::seed_from_u64(7);
        let today: BTreeMap<String, f64> = (0..20_000)
            .map(|i| (format!("S{:05}", i), rng.gen_range(0.0001..1000.0)))
            .collect();

        let tracker = HighTracker::new(store.clone(), FirstObservation::CountsAsHigh);
        tracker.update(&today, day(3)).unwrap();

        let loaded = store.load().unwrap();
        for (symbol, price) in &today {
            assert_eq!(loaded[symbol].highest.to_bits(), price.to_bits(), "{} drifted", symbol);
        }

        let original = fs::read(store.path()).unwrap();
        store.save(&loaded).unwrap();
        assert_eq!(fs::read(store.path()).unwrap(), original);

        // Same prices on the next run are not new highs
        assert!(tracker.update(&today, day(4)).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_store_fails_without_reset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("52week_highs.json");
        fs::write(&path, "not json").unwrap();
        let tracker = HighTracker::new(JsonHighWaterStore::new(&path), FirstObservation::CountsAsHigh);

        let err = tracker.update(&prices(&[("AAPL", 150.0)]), day(3)).unwrap_err();

        assert!(matches!(err, AppError::StoreCorrupt { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
    }
}
