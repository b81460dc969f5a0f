//! One dashboard run, end to end.
//!
//! Order matters: state is loaded and the upstream fetched before anything
//! is written, and the dashboard is rendered in memory before any file is
//! replaced. Any failure up to that point leaves every file as it was.
//!
//! Writes go option history, then `index.html` and `rankings.json`, then the
//! high-water store last. Rankings are computed from the marks as they were
//! before today, so a failed tracker write after a published dashboard only
//! means the same highs are reported again on the next run.

use crate::error::{AppError, Result};
use crate::models::{
    Category, DashboardReport, MarketClass, QuoteCard, RunConfig, Snapshots, TickerUniverse,
};
use crate::services::high_tracker::{apply_prices, HighTracker, JsonHighWaterStore};
use crate::services::json_store::write_atomic;
use crate::services::market_clock;
use crate::services::market_source::MarketSource;
use crate::services::option_history::OptionVolumeHistory;
use crate::services::ranking_engine::RankingEngine;
use crate::services::renderer::Renderer;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// What a run did, for the command's summary output
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub trade_date: NaiveDate,
    pub requested: usize,
    pub resolved: usize,
    pub new_highs: BTreeSet<String>,
    pub option_days_recorded: usize,
    pub list_sizes: Vec<(Category, usize)>,
    /// Files replaced by this run (empty on a dry run)
    pub written: Vec<PathBuf>,
    pub elapsed_ms: u128,
}

/// Rendered artifacts of a run
#[derive(Debug, Clone)]
pub struct DashboardOutput {
    pub report: DashboardReport,
    pub html: String,
    pub json: Vec<u8>,
}

fn quote_cards(universe: &TickerUniverse, class: MarketClass, snapshots: &Snapshots) -> Vec<QuoteCard> {
    universe
        .of_class(class)
        .map(|symbol| {
            let snapshot = snapshots.get(&symbol.ticker);
            QuoteCard {
                symbol: symbol.ticker.clone(),
                name: symbol.display_name().to_string(),
                last_price: snapshot.and_then(|s| s.last_price),
                percent_change: snapshot.and_then(|s| s.percent_change()),
            }
        })
        .collect()
}

/// Last prices of the tracked equities
fn equity_prices(universe: &TickerUniverse, snapshots: &Snapshots) -> BTreeMap<String, f64> {
    universe
        .of_class(MarketClass::Equity)
        .filter_map(|symbol| {
            let price = snapshots.get(&symbol.ticker)?.last_price?;
            Some((symbol.ticker.clone(), price))
        })
        .collect()
}

pub async fn run_dashboard<S: MarketSource + ?Sized>(
    source: &S,
    universe: &TickerUniverse,
    config: &RunConfig,
    now: DateTime<Utc>,
) -> Result<(RunSummary, DashboardOutput)> {
    let started = Instant::now();
    config.validate().map_err(AppError::Config)?;
    let trade_date = market_clock::trade_date(now);

    // Load state first so a corrupt store fails before any network traffic
    let tracker = HighTracker::new(
        JsonHighWaterStore::new(config.high_water_path()),
        config.ranking.first_observation,
    );
    let prior_highs = tracker.marks()?;
    let history_path = config.option_history_path();
    let mut history = OptionVolumeHistory::load(&history_path)?;

    info!(
        symbols = universe.symbols().len(),
        tracked_highs = prior_highs.len(),
        trade_date = %trade_date,
        "Starting dashboard run"
    );

    let mut snapshots = source.fetch(universe.symbols()).await?;
    if snapshots.is_empty() {
        return Err(AppError::SourceUnavailable(
            "Upstream returned no data for any symbol".to_string(),
        ));
    }
    history.enrich(&mut snapshots, trade_date);

    let engine = RankingEngine::new(config.ranking.clone());
    let rankings = engine.rank(universe.symbols(), &snapshots, &prior_highs);

    let report = DashboardReport {
        generated_at: now,
        trade_date,
        overview: quote_cards(universe, MarketClass::Index, &snapshots),
        featured: quote_cards(universe, MarketClass::Featured, &snapshots),
        rankings,
    };
    let renderer = Renderer::new()?;
    let html = renderer.render_html(&report)?;
    let json = renderer.render_json(&report)?;

    let today = equity_prices(universe, &snapshots);
    let mut written = Vec::new();
    let (new_highs, option_days_recorded) = if config.dry_run {
        let mut marks = prior_highs.clone();
        let (new_highs, _) = apply_prices(&mut marks, &today, trade_date, config.ranking.first_observation);
        (new_highs, 0)
    } else {
        let recorded = history.record_snapshots(&snapshots, trade_date);
        if recorded > 0 {
            history.save(&history_path)?;
            written.push(history_path);
        }

        let dashboard_path = config.dashboard_path();
        let rankings_path = config.rankings_path();
        write_atomic(&dashboard_path, html.as_bytes())?;
        write_atomic(&rankings_path, &json)?;
        written.push(dashboard_path);
        written.push(rankings_path);

        let new_highs = tracker.update(&today, trade_date)?;

        (new_highs, recorded)
    };

    let summary = RunSummary {
        trade_date,
        requested: universe.unique_tickers().len(),
        resolved: snapshots.len(),
        new_highs,
        option_days_recorded,
        list_sizes: report
            .rankings
            .iter()
            .map(|(category, entries)| (*category, entries.len()))
            .collect(),
        written,
        elapsed_ms: started.elapsed().as_millis(),
    };

    info!(
        resolved = summary.resolved,
        new_highs = summary.new_highs.len(),
        dry_run = config.dry_run,
        elapsed_ms = summary.elapsed_ms as u64,
        "Dashboard run completed"
    );

    Ok((summary, DashboardOutput { report, html, json }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HighWaterMark, Snapshot, Symbol};
    use crate::services::json_store::write_json;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::{tempdir, TempDir};

    /// Source returning canned snapshots, or failing outright when there are none
    struct MockSource {
        snapshots: Option<Snapshots>,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn returning(snapshots: Vec<Snapshot>) -> Self {
            Self {
                snapshots: Some(snapshots.into_iter().map(|s| (s.symbol.clone(), s)).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                snapshots: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MarketSource for MockSource {
        async fn fetch(&self, _symbols: &[Symbol]) -> Result<Snapshots> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.snapshots
                .clone()
                .ok_or_else(|| AppError::SourceUnavailable("all requests failed".to_string()))
        }
    }

    fn quote(ticker: &str, last: f64, prev: f64) -> Snapshot {
        Snapshot {
            last_price: Some(last),
            previous_close: Some(prev),
            volume: Some(1_000),
            ..Snapshot::new(ticker)
        }
    }

    fn universe() -> TickerUniverse {
        TickerUniverse::from_symbols(vec![
            Symbol::new("A", MarketClass::Equity),
            Symbol::new("B", MarketClass::Equity),
            Symbol::new("C", MarketClass::Equity),
            Symbol::new("SPY", MarketClass::Etf),
            Symbol::new("^GSPC", MarketClass::Index).with_name("S&P 500"),
        ])
    }

    fn setup() -> (TempDir, RunConfig) {
        let dir = tempdir().unwrap();
        let config = RunConfig::new(dir.path().join("data"), dir.path().join("site"));
        (dir, config)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 21, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_run_writes_dashboard_and_state() {
        let (_dir, config) = setup();
        let source = MockSource::returning(vec![
            quote("A", 105.0, 100.0),
            quote("B", 110.0, 100.0),
            quote("C", 103.0, 100.0),
            quote("SPY", 500.0, 505.0),
            quote("^GSPC", 5_000.0, 4_950.0),
        ]);

        let (summary, output) = run_dashboard(&source, &universe(), &config, now()).await.unwrap();

        let gainers: Vec<&str> = output.report.rankings[&Category::TopGainers]
            .iter()
            .map(|e| e.symbol.as_str())
            .collect();
        assert_eq!(gainers, vec!["B", "A", "C"]);
        assert_eq!(summary.new_highs.len(), 3);
        assert_eq!(summary.trade_date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(output.report.overview[0].name, "S&P 500");

        assert!(config.dashboard_path().exists());
        assert!(config.rankings_path().exists());
        let marks = JsonHighWaterStore::new(config.high_water_path());
        let tracker = HighTracker::new(marks, config.ranking.first_observation);
        assert_eq!(tracker.marks().unwrap()["B"].highest, 110.0);
        assert!(!tracker.marks().unwrap().contains_key("SPY"));
    }

    #[tokio::test]
    async fn test_source_failure_leaves_everything_untouched() {
        let (_dir, config) = setup();
        let date = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let mut marks = BTreeMap::new();
        marks.insert("A".to_string(), HighWaterMark::new(150.0, date));
        write_json(&config.high_water_path(), &marks).unwrap();
        let before = fs::read(config.high_water_path()).unwrap();

        let source = MockSource::failing();
        let err = run_dashboard(&source, &universe(), &config, now()).await.unwrap_err();

        assert!(matches!(err, AppError::SourceUnavailable(_)));
        assert_eq!(fs::read(config.high_water_path()).unwrap(), before);
        assert!(!config.dashboard_path().exists());
        assert!(!config.rankings_path().exists());
        assert!(!config.option_history_path().exists());
    }

    #[tokio::test]
    async fn test_empty_fetch_keeps_previous_dashboard() {
        let (_dir, config) = setup();
        write_atomic(&config.dashboard_path(), b"YESTERDAY").unwrap();
        write_atomic(&config.rankings_path(), b"{}").unwrap();

        let source = MockSource::returning(vec![]);
        let err = run_dashboard(&source, &universe(), &config, now()).await.unwrap_err();

        assert!(matches!(err, AppError::SourceUnavailable(_)));
        assert_eq!(fs::read_to_string(config.dashboard_path()).unwrap(), "YESTERDAY");
        assert_eq!(fs::read_to_string(config.rankings_path()).unwrap(), "{}");
        assert!(!config.high_water_path().exists());
    }

    #[tokio::test]
    async fn test_dashboard_write_failure_leaves_highs_unchanged() {
        let (dir, mut config) = setup();
        let blocked = dir.path().join("site-is-a-file");
        fs::write(&blocked, "x").unwrap();
        config.output_dir = blocked;

        let source = MockSource::returning(vec![quote("A", 105.0, 100.0)]);
        let err = run_dashboard(&source, &universe(), &config, now()).await.unwrap_err();

        assert!(matches!(err, AppError::Io(_)));
        assert!(!config.high_water_path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_store_fails_before_fetch() {
        let (_dir, config) = setup();
        fs::create_dir_all(&config.data_dir).unwrap();
        fs::write(config.high_water_path(), "{ broken").unwrap();

        let source = MockSource::returning(vec![quote("A", 1.0, 1.0)]);
        let err = run_dashboard(&source, &universe(), &config, now()).await.unwrap_err();

        assert!(matches!(err, AppError::StoreCorrupt { .. }));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fs::read_to_string(config.high_water_path()).unwrap(), "{ broken");
        assert!(!config.dashboard_path().exists());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let (_dir, mut config) = setup();
        config.dry_run = true;
        let source = MockSource::returning(vec![quote("A", 105.0, 100.0)]);

        let (summary, output) = run_dashboard(&source, &universe(), &config, now()).await.unwrap();

        assert!(summary.written.is_empty());
        assert!(summary.new_highs.contains("A"));
        assert!(output.html.contains("Top Gainers"));
        assert!(!config.high_water_path().exists());
        assert!(!config.dashboard_path().exists());
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let (_dir, mut config) = setup();
        config.ranking.top_n = 0;
        let source = MockSource::returning(vec![]);

        let err = run_dashboard(&source, &universe(), &config, now()).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
