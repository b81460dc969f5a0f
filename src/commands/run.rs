use crate::cli::RunArgs;
use crate::error::{AppError, Result};
use crate::models::{FetchConfig, MarketClass, RankingConfig, RunConfig, TickerUniverse};
use crate::services::{run_dashboard, DashboardOutput, RunSummary, YahooClient};
use crate::utils::{get_data_dir, get_output_dir};
use chrono::Utc;
use std::time::Duration;

impl RunArgs {
    pub fn into_config(self) -> RunConfig {
        RunConfig {
            data_dir: self.data_dir.unwrap_or_else(get_data_dir),
            output_dir: self.output_dir.unwrap_or_else(get_output_dir),
            ranking: RankingConfig {
                top_n: self.top_n,
                option_surge_threshold: self.option_threshold,
                min_option_notional: self.min_notional,
                unusual_volume_min_ratio: self.min_volume_ratio,
                first_observation: self.first_observation,
                ..RankingConfig::default()
            },
            fetch: FetchConfig {
                chart_base_url: self.yahoo_base_url,
                options_base_url: self.yahoo_options_base_url,
                concurrency: self.concurrency,
                request_timeout: Duration::from_secs(self.timeout_secs),
                max_retries: self.max_retries,
                ..FetchConfig::default()
            },
            dry_run: self.dry_run,
        }
    }
}

pub fn run(args: RunArgs) {
    let config = args.into_config();

    if let Err(e) = config.validate() {
        eprintln!("❌ Invalid options: {}", e);
        std::process::exit(1);
    }

    println!("📂 Data dir: {}", config.data_dir.display());
    if config.dry_run {
        println!("🧪 DRY RUN: state and dashboard files will not be written");
    } else {
        println!("📝 Output dir: {}", config.output_dir.display());
    }

    match execute(&config) {
        Ok((summary, output)) => {
            print_summary(&summary);
            if config.dry_run {
                println!("{}", String::from_utf8_lossy(&output.json));
            }
            println!("\n✅ Dashboard run completed in {:.1}s", summary.elapsed_ms as f64 / 1000.0);
        }
        Err(e) => {
            eprintln!("\n❌ Dashboard run failed: {}", e);
            if e.is_fatal() {
                eprintln!("   No state or dashboard files were changed");
            }
            std::process::exit(1);
        }
    }
}

fn execute(config: &RunConfig) -> Result<(RunSummary, DashboardOutput)> {
    let universe = TickerUniverse::load(&config.data_dir)?;
    println!(
        "📋 Universe: {} equities, {} ETFs, {} option watch, {} unique tickers",
        universe.class_count(MarketClass::Equity),
        universe.class_count(MarketClass::Etf),
        universe.class_count(MarketClass::OptionsWatch),
        universe.unique_tickers().len()
    );

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| AppError::Io(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let client = YahooClient::new(config.fetch.clone())?;
        run_dashboard(&client, &universe, config, Utc::now()).await
    })
}

fn print_summary(summary: &RunSummary) {
    println!("\n📅 Session: {}", summary.trade_date);
    println!("📥 Resolved {}/{} tickers", summary.resolved, summary.requested);

    if summary.new_highs.is_empty() {
        println!("📈 No new 52-week highs");
    } else {
        let shown: Vec<&str> = summary.new_highs.iter().take(20).map(String::as_str).collect();
        let more = summary.new_highs.len().saturating_sub(shown.len());
        println!(
            "📈 {} new 52-week highs: {}{}",
            summary.new_highs.len(),
            shown.join(", "),
            if more > 0 { format!(" (+{} more)", more) } else { String::new() }
        );
    }

    if summary.option_days_recorded > 0 {
        println!("🧾 Recorded option volume for {} symbols", summary.option_days_recorded);
    }

    for (category, size) in &summary.list_sizes {
        let marker = if *size == 0 { "⚪" } else { "🔹" };
        println!("   {} {:<24} {:>2}", marker, category.title(), size);
    }

    for path in &summary.written {
        println!("💾 Saved {}", path.display());
    }
}
