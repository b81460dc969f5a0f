use crate::constants::{
    DEFAULT_FETCH_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_MIN_OPTION_NOTIONAL,
    DEFAULT_OPTION_SURGE_THRESHOLD, DEFAULT_RATE_LIMIT_PER_MINUTE, DEFAULT_REQUEST_TIMEOUT_SECS,
    OPTION_CONTRACT_MULTIPLIER, TOP_N, YAHOO_CHART_BASE_URL, YAHOO_OPTIONS_BASE_URL,
};
use crate::models::FirstObservation;
use std::path::PathBuf;
use std::time::Duration;

/// Knobs of the ranking engine
#[derive(Debug, Clone, PartialEq)]
pub struct RankingConfig {
    /// Maximum entries per list
    pub top_n: usize,

    /// Call/put volume ratio must be strictly above this
    pub option_surge_threshold: f64,

    /// Largest contract notional must be strictly above this (USD)
    pub min_option_notional: f64,

    /// Shares per option contract
    pub contract_multiplier: f64,

    /// Optional floor on volume ratio for the unusual volume list
    pub unusual_volume_min_ratio: Option<f64>,

    /// Whether symbols without a prior high appear in the new highs list
    pub first_observation: FirstObservation,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: TOP_N,
            option_surge_threshold: DEFAULT_OPTION_SURGE_THRESHOLD,
            min_option_notional: DEFAULT_MIN_OPTION_NOTIONAL,
            contract_multiplier: OPTION_CONTRACT_MULTIPLIER,
            unusual_volume_min_ratio: None,
            first_observation: FirstObservation::default(),
        }
    }
}

/// Upstream fetch settings
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    pub chart_base_url: String,
    pub options_base_url: String,

    /// Requests issued together in one group
    pub concurrency: usize,

    /// Bound on each call; a timeout leaves the symbol unresolved
    pub request_timeout: Duration,

    /// Retries after the first attempt (429, 5xx, transport errors)
    pub max_retries: u32,

    pub rate_limit_per_minute: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            chart_base_url: YAHOO_CHART_BASE_URL.to_string(),
            options_base_url: YAHOO_OPTIONS_BASE_URL.to_string(),
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
        }
    }
}

/// Configuration for one dashboard run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Ticker lists and state files
    pub data_dir: PathBuf,

    /// Where index.html and rankings.json are written
    pub output_dir: PathBuf,

    pub ranking: RankingConfig,

    pub fetch: FetchConfig,

    /// Rank and render to stdout only; no state or dashboard files are written
    pub dry_run: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: crate::utils::get_data_dir(),
            output_dir: crate::utils::get_output_dir(),
            ranking: RankingConfig::default(),
            fetch: FetchConfig::default(),
            dry_run: false,
        }
    }
}

impl RunConfig {
    /// Create new config with custom directories and default knobs
    pub fn new(data_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            data_dir,
            output_dir,
            ranking: RankingConfig::default(),
            fetch: FetchConfig::default(),
            dry_run: false,
        }
    }

    pub fn high_water_path(&self) -> PathBuf {
        self.data_dir.join(crate::constants::HIGH_WATER_FILE)
    }

    pub fn option_history_path(&self) -> PathBuf {
        self.data_dir.join(crate::constants::OPTION_HISTORY_FILE)
    }

    pub fn dashboard_path(&self) -> PathBuf {
        self.output_dir.join(crate::constants::DASHBOARD_FILE)
    }

    pub fn rankings_path(&self) -> PathBuf {
        self.output_dir.join(crate::constants::RANKINGS_FILE)
    }

    /// Reject settings that cannot produce a meaningful run
    pub fn validate(&self) -> Result<(), String> {
        if self.ranking.top_n == 0 {
            return Err("top_n must be at least 1".to_string());
        }
        if !self.ranking.option_surge_threshold.is_finite() || self.ranking.option_surge_threshold < 0.0 {
            return Err("option surge threshold must be a non-negative number".to_string());
        }
        if !self.ranking.min_option_notional.is_finite() || self.ranking.min_option_notional < 0.0 {
            return Err("minimum option notional must be a non-negative number".to_string());
        }
        if self.fetch.concurrency == 0 {
            return Err("concurrency must be at least 1".to_string());
        }
        if self.fetch.request_timeout.is_zero() {
            return Err("request timeout must be positive".to_string());
        }
        Ok(())
    }
}
