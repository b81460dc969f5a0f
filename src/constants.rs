//! Dashboard constants
//!
//! Defaults for ranking, fetching and the file layout of the data directory.
//!
//! ## Data directory layout
//!
//! | File                          | Contents                              |
//! |-------------------------------|---------------------------------------|
//! | `tickers_sp500.json`          | S&P 500 equities                      |
//! | `tickers_russell2000.json`    | Russell 2000 equities                 |
//! | `etf_list.json`               | ETFs with category labels             |
//! | `options_watchlist.json`      | Symbols whose option chain is scanned |
//! | `indices.json`                | Index bar (optional, built-in default)|
//! | `featured.json`               | Featured cards (optional, built-in)   |
//! | `52week_highs.json`           | HighWaterMark store                   |
//! | `option_volume_history.json`  | Daily call/put volume totals          |

/// Length of every ranked list
pub const TOP_N: usize = 10;

/// Trailing window (trading days) for volume baselines
pub const TRAILING_WINDOW_DAYS: usize = 20;

/// Call/put volume must exceed this multiple of its trailing average
pub const DEFAULT_OPTION_SURGE_THRESHOLD: f64 = 2.0;

/// Smallest single-contract notional (USD) reported as an unusual trade
pub const DEFAULT_MIN_OPTION_NOTIONAL: f64 = 1_000_000.0;

/// Shares per US equity option contract
pub const OPTION_CONTRACT_MULTIPLIER: f64 = 100.0;

/// Concurrent upstream requests per group
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;

/// Per-call timeout (seconds); a timeout counts as "symbol not resolved"
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Retries after the first attempt for retryable upstream failures
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Sliding-window request budget shared by one fetch
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 240;

pub const YAHOO_CHART_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const YAHOO_OPTIONS_BASE_URL: &str = "https://query2.finance.yahoo.com";

pub const SP500_FILE: &str = "tickers_sp500.json";
pub const RUSSELL2000_FILE: &str = "tickers_russell2000.json";
pub const ETF_FILE: &str = "etf_list.json";
pub const OPTIONS_WATCHLIST_FILE: &str = "options_watchlist.json";
pub const INDICES_FILE: &str = "indices.json";
pub const FEATURED_FILE: &str = "featured.json";

pub const HIGH_WATER_FILE: &str = "52week_highs.json";
pub const OPTION_HISTORY_FILE: &str = "option_volume_history.json";

pub const DASHBOARD_FILE: &str = "index.html";
pub const RANKINGS_FILE: &str = "rankings.json";

/// Index bar shown when `indices.json` is absent: (symbol, label)
pub const DEFAULT_INDICES: &[(&str, &str)] = &[
    ("^GSPC", "S&P 500"),
    ("^IXIC", "Nasdaq"),
    ("^DJI", "Dow Jones"),
    ("^VIX", "VIX"),
    ("^TNX", "US 10Y"),
    ("KRW=X", "USD/KRW"),
];

/// Featured cards shown when `featured.json` is absent: (symbol, name)
pub const DEFAULT_FEATURED: &[(&str, &str)] = &[
    ("AAPL", "Apple"),
    ("MSFT", "Microsoft"),
    ("GOOGL", "Alphabet"),
    ("AMZN", "Amazon"),
    ("NVDA", "NVIDIA"),
    ("META", "Meta"),
    ("TSLA", "Tesla"),
    ("PLTR", "Palantir"),
];

/// Exchange clock used to stamp the trade date
pub const MARKET_TIMEZONE: &str = "America/New_York";

/// Readers of the dashboard are in Korea
pub const DISPLAY_TIMEZONE: &str = "Asia/Seoul";
