use crate::error::Result;
use crate::models::{HighWaterMark, MarketClass, TickerUniverse};
use crate::services::{HighWaterStore, JsonHighWaterStore, OptionVolumeHistory};
use crate::utils::{format_price, get_data_dir};
use std::path::{Path, PathBuf};

pub fn run(data_dir: Option<PathBuf>) {
    let data_dir = data_dir.unwrap_or_else(get_data_dir);
    println!("📊 Dashboard State ({})\n", data_dir.display());

    if let Err(e) = show_status(&data_dir) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Most recently set highs first, ties by symbol
pub fn latest_highs<'a>(
    marks: impl IntoIterator<Item = (&'a String, &'a HighWaterMark)>,
    limit: usize,
) -> Vec<(&'a str, HighWaterMark)> {
    let mut recent: Vec<(&str, HighWaterMark)> = marks.into_iter().map(|(s, m)| (s.as_str(), *m)).collect();
    recent.sort_by(|a, b| b.1.date.cmp(&a.1.date).then_with(|| a.0.cmp(b.0)));
    recent.truncate(limit);
    recent
}

fn show_status(data_dir: &Path) -> Result<()> {
    match TickerUniverse::load(data_dir) {
        Ok(universe) => {
            println!("📋 Ticker lists");
            for class in [
                MarketClass::Equity,
                MarketClass::Etf,
                MarketClass::OptionsWatch,
                MarketClass::Index,
                MarketClass::Featured,
            ] {
                println!("   {:<14} {:>5}", class.as_str(), universe.class_count(class));
            }
        }
        Err(e) => eprintln!("⚠️  Could not load ticker lists: {}", e),
    }

    println!("\n═══════════════════════════════════════════════════════════\n");

    let store = JsonHighWaterStore::new(data_dir.join(crate::constants::HIGH_WATER_FILE));
    let marks = store.load()?;
    if marks.is_empty() {
        println!("⚠️  No 52-week highs tracked yet. Run the dashboard first.");
    } else {
        println!("📈 Tracked highs: {}", marks.len());
        println!("   Latest:");
        for (symbol, mark) in latest_highs(&marks, 10) {
            println!("   {:<8} {:>12}  ({})", symbol, format_price(Some(mark.highest)), mark.date);
        }
    }

    println!("\n═══════════════════════════════════════════════════════════\n");

    let history = OptionVolumeHistory::load(&data_dir.join(crate::constants::OPTION_HISTORY_FILE))?;
    let symbols = history.symbols();
    if symbols.is_empty() {
        println!("⚠️  No option volume history yet");
    } else {
        let days: usize = symbols.iter().map(|s| history.days(s).len()).sum();
        println!("🧾 Option history: {} symbols, {} daily records", symbols.len(), days);
    }

    Ok(())
}
