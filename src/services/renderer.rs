//! Dashboard renderer
//!
//! Produces the static `index.html` (handlebars template compiled into the
//! binary) and `rankings.json`. Rendering happens in memory; writing the
//! files is the caller's job so nothing is touched until every step before
//! it succeeded.

use crate::error::Result;
use crate::models::{Category, DashboardReport, QuoteCard, RankedEntry};
use crate::services::market_clock;
use crate::utils::{format_grouped, format_number, format_pct, format_price};
use handlebars::Handlebars;
use serde::Serialize;

const DASHBOARD_TEMPLATE: &str = include_str!("../../templates/dashboard.hbs");
const EMPTY_MESSAGE: &str = "No qualifying symbols today";

const VIX_SYMBOL: &str = "^VIX";
const TEN_YEAR_YIELD_SYMBOL: &str = "^TNX";
/// A falling won/dollar rate is good news, so its colours are flipped
const USD_KRW_SYMBOL: &str = "KRW=X";

#[derive(Debug, Serialize)]
struct CardView {
    symbol: String,
    name: String,
    price: String,
    change: String,
    direction: &'static str,
}

#[derive(Debug, Serialize)]
struct RowView {
    rank: usize,
    symbol: String,
    name: Option<String>,
    /// Sector or ETF category label
    tag: Option<String>,
    contract: Option<String>,
    metric: String,
    reference: Option<String>,
    price: String,
    change: String,
    direction: &'static str,
    volume: String,
}

#[derive(Debug, Serialize)]
struct SectionView {
    key: &'static str,
    title: &'static str,
    metric_label: &'static str,
    rows: Vec<RowView>,
    empty_message: &'static str,
}

#[derive(Debug, Serialize)]
struct DashboardView {
    generated_at: String,
    trade_date: String,
    overview: Vec<CardView>,
    featured: Vec<CardView>,
    sections: Vec<SectionView>,
}

fn direction(change: Option<f64>) -> &'static str {
    match change {
        Some(c) if c > 0.0 => "up",
        Some(c) if c < 0.0 => "down",
        _ => "flat",
    }
}

/// Metric column text for a category
pub fn format_metric(category: Category, metric: f64) -> String {
    match category {
        Category::TopGainers | Category::EtfGainers | Category::EtfLosers | Category::NewHighs => {
            format_pct(Some(metric))
        }
        Category::UnusualVolume | Category::BullishOptions | Category::BearishOptions => {
            format!("{:.2}x", metric)
        }
        Category::EtfVolumeLeaders => format_number(Some(metric)),
        Category::UnusualOptionTrades => format!("${}", format_number(Some(metric))),
    }
}

fn format_reference(category: Category, reference: Option<f64>) -> Option<String> {
    let reference = reference?;
    Some(match category {
        Category::NewHighs => format!("prior {}", format_price(Some(reference))),
        Category::UnusualOptionTrades => format!("strike {}", format_price(Some(reference))),
        _ => format!("avg {}", format_number(Some(reference))),
    })
}

/// Index bar value: volatility to two decimals, the 10Y yield as a percent,
/// everything else as a grouped number without a currency sign
pub fn format_index_value(symbol: &str, value: Option<f64>) -> String {
    match (symbol, value) {
        (_, Some(v)) if !v.is_finite() => "N/A".to_string(),
        (VIX_SYMBOL, Some(v)) => format!("{:.2}", v),
        (TEN_YEAR_YIELD_SYMBOL, Some(v)) => format!("{:.3}%", v),
        (_, v) => format_grouped(v),
    }
}

fn quote_direction(symbol: &str, change: Option<f64>) -> &'static str {
    match (symbol, direction(change)) {
        (USD_KRW_SYMBOL, "up") => "down",
        (USD_KRW_SYMBOL, "down") => "up",
        (_, d) => d,
    }
}

fn index_view(card: &QuoteCard) -> CardView {
    CardView {
        symbol: card.symbol.clone(),
        name: card.name.clone(),
        price: format_index_value(&card.symbol, card.last_price),
        change: format_pct(card.percent_change),
        direction: quote_direction(&card.symbol, card.percent_change),
    }
}

fn card_view(card: &QuoteCard) -> CardView {
    CardView {
        symbol: card.symbol.clone(),
        name: card.name.clone(),
        price: format_price(card.last_price),
        change: format_pct(card.percent_change),
        direction: direction(card.percent_change),
    }
}

fn row_view(category: Category, entry: &RankedEntry) -> RowView {
    RowView {
        rank: entry.rank,
        symbol: entry.symbol.clone(),
        name: entry.name.clone(),
        tag: entry.category.clone(),
        contract: entry.contract.clone(),
        metric: format_metric(category, entry.metric),
        reference: format_reference(category, entry.reference),
        price: format_price(entry.last_price),
        change: format_pct(entry.percent_change),
        direction: direction(entry.percent_change),
        volume: format_number(entry.volume.map(|v| v as f64)),
    }
}

fn dashboard_view(report: &DashboardReport) -> DashboardView {
    let sections = Category::ALL
        .into_iter()
        .map(|category| SectionView {
            key: category.as_str(),
            title: category.title(),
            metric_label: category.metric_label(),
            rows: report
                .rankings
                .get(&category)
                .map(|entries| entries.iter().map(|e| row_view(category, e)).collect())
                .unwrap_or_default(),
            empty_message: EMPTY_MESSAGE,
        })
        .collect();

    DashboardView {
        generated_at: market_clock::display_timestamp(report.generated_at),
        trade_date: report.trade_date.format("%Y-%m-%d").to_string(),
        overview: report.overview.iter().map(index_view).collect(),
        featured: report.featured.iter().map(card_view).collect(),
        sections,
    }
}

pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_template_string("dashboard", DASHBOARD_TEMPLATE)?;
        Ok(Self { registry })
    }

    pub fn render_html(&self, report: &DashboardReport) -> Result<String> {
        Ok(self.registry.render("dashboard", &dashboard_view(report))?)
    }

    pub fn render_json(&self, report: &DashboardReport) -> Result<Vec<u8>> {
        crate::services::json_store::to_store_bytes(report)
    }
}
