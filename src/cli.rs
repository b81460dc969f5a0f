use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::constants::{
    DEFAULT_FETCH_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_MIN_OPTION_NOTIONAL,
    DEFAULT_OPTION_SURGE_THRESHOLD, DEFAULT_REQUEST_TIMEOUT_SECS, TOP_N, YAHOO_CHART_BASE_URL,
    YAHOO_OPTIONS_BASE_URL,
};
use crate::models::FirstObservation;

#[derive(Parser)]
#[command(name = "usmarket-tracker")]
#[command(about = "Daily US market dashboard", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Options for the default `run` command
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch quotes, update 52-week highs and render the dashboard
    Run(RunArgs),
    /// Show tracked highs and option history
    Status {
        /// Directory with ticker lists and state files [env: DATA_DIR, default: data]
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory with ticker lists and state files [env: DATA_DIR, default: data]
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Where index.html and rankings.json are written [env: OUTPUT_DIR, default: .]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Entries per ranked list
    #[arg(long, default_value_t = TOP_N)]
    pub top_n: usize,

    /// Call/put volume must exceed this multiple of its trailing average
    #[arg(long, default_value_t = DEFAULT_OPTION_SURGE_THRESHOLD)]
    pub option_threshold: f64,

    /// Smallest contract notional (USD) listed as an unusual trade
    #[arg(long, default_value_t = DEFAULT_MIN_OPTION_NOTIONAL)]
    pub min_notional: f64,

    /// Only list unusual volume at or above this day/average ratio
    #[arg(long)]
    pub min_volume_ratio: Option<f64>,

    /// Whether a symbol's first observed price counts as a new high
    #[arg(long, default_value = "counts-as-high", value_parser = FirstObservation::from_str)]
    pub first_observation: FirstObservation,

    /// Concurrent upstream requests
    #[arg(long, default_value_t = DEFAULT_FETCH_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Retries for rate-limited or failed requests
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    #[arg(long, env = "YAHOO_BASE_URL", default_value = YAHOO_CHART_BASE_URL)]
    pub yahoo_base_url: String,

    #[arg(long, env = "YAHOO_OPTIONS_BASE_URL", default_value = YAHOO_OPTIONS_BASE_URL)]
    pub yahoo_options_base_url: String,

    /// Print rankings to stdout without touching state or dashboard files
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run(args)) => {
            commands::run::run(args);
        }
        Some(Commands::Status { data_dir }) => {
            commands::status::run(data_dir);
        }
        None => {
            commands::run::run(cli.run);
        }
    }
}
