pub mod dashboard;
pub mod high_tracker;
pub mod json_store;
pub mod market_clock;
pub mod market_source;
pub mod option_history;
pub mod ranking_engine;
pub mod rate_limiter;
pub mod renderer;
pub mod yahoo;

pub use dashboard::{run_dashboard, DashboardOutput, RunSummary};
pub use high_tracker::{HighTracker, HighWaterStore, JsonHighWaterStore};
pub use market_source::MarketSource;
pub use option_history::OptionVolumeHistory;
pub use ranking_engine::RankingEngine;
pub use rate_limiter::RateLimiter;
pub use renderer::Renderer;
pub use yahoo::YahooClient;
