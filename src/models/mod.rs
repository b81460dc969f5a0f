mod high_water_mark;
mod ranking;
mod report;
mod run_config;
mod snapshot;
mod symbol;
pub mod ticker_list;

pub use high_water_mark::{FirstObservation, HighWaterMark, HighWaterMarks};
pub use ranking::{Category, RankedEntry, Rankings};
pub use report::{DashboardReport, QuoteCard};
pub use run_config::{FetchConfig, RankingConfig, RunConfig};
pub use snapshot::{OptionActivity, OptionContract, OptionSide, Snapshot};
pub use symbol::{MarketClass, Symbol};
pub use ticker_list::TickerUniverse;

use std::collections::HashMap;

/// Snapshots of one run (ticker -> snapshot)
pub type Snapshots = HashMap<String, Snapshot>;
