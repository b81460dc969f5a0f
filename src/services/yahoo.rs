//! Yahoo Finance data source.
//!
//! Quotes come from the v8 chart endpoint (one month of daily bars, used for
//! the last price, previous close and the trailing volume baseline). Option
//! chains come from the v7 options endpoint, nearest expiry only.

use crate::constants::TRAILING_WINDOW_DAYS;
use crate::error::{AppError, Result};
use crate::models::{
    FetchConfig, MarketClass, OptionActivity, OptionContract, OptionSide, Snapshot, Snapshots, Symbol,
};
use crate::services::market_source::MarketSource;
use crate::services::rate_limiter::RateLimiter;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct YahooClient {
    client: reqwest::Client,
    chart_base: Url,
    options_base: Url,
    config: FetchConfig,
    limiter: RateLimiter,
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::Config(format!("Invalid base URL '{}': {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(AppError::Config(format!(
            "Invalid base URL: must start with http:// or https://, got: '{}'",
            raw
        )));
    }
    Ok(url)
}

/// Append path segments (percent-encoded) and query pairs to a base URL
fn endpoint(base: &Url, segments: &[&str], query: &[(&str, &str)]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    url
}

impl YahooClient {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let chart_base = parse_base_url(&config.chart_base_url)?;
        let options_base = parse_base_url(&config.options_base_url)?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::SourceUnavailable(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            chart_base = %chart_base,
            concurrency = config.concurrency,
            timeout_s = config.request_timeout.as_secs(),
            "Created Yahoo Finance client"
        );

        Ok(Self {
            client,
            chart_base,
            options_base,
            limiter: RateLimiter::new(config.rate_limit_per_minute),
            config,
        })
    }

    /// GET a JSON document. `Ok(None)` means the upstream has no such symbol.
    async fn get_json(&self, url: &Url) -> Result<Option<Value>> {
        let mut last_error = String::from("no attempt made");

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs_f64(0.5 * 2.0_f64.powi(attempt as i32 - 1) + rand::random::<f64>() * 0.5)
                    .min(Duration::from_secs(30));
                debug!(
                    path = url.path(),
                    attempt = attempt + 1,
                    reason = %last_error,
                    delay_s = delay.as_secs_f64(),
                    "Retrying upstream request"
                );
                sleep(delay).await;
            }

            self.limiter.acquire().await;

            let request = async {
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();
                let body = response.text().await?;
                Ok::<_, reqwest::Error>((status, body))
            };

            let (status, body) = match timeout(self.config.request_timeout, request).await {
                Err(_) => {
                    last_error = format!("timed out after {}s", self.config.request_timeout.as_secs());
                    continue;
                }
                Ok(Err(e)) => {
                    last_error = format!("network error: {}", e);
                    continue;
                }
                Ok(Ok(pair)) => pair,
            };

            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                last_error = format!("HTTP {}", status);
                continue;
            }
            if !status.is_success() {
                // Auth and request errors will not improve on retry
                return Err(AppError::Network(format!(
                    "HTTP {} from {} - not retryable",
                    status,
                    url.path()
                )));
            }

            return serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| AppError::Parse(format!("Invalid JSON from {}: {}", url.path(), e)));
        }

        Err(AppError::Network(format!("{} failed: {}", url.path(), last_error)))
    }

    /// Quote snapshot for one ticker, option chain included when asked
    pub async fn fetch_symbol(&self, ticker: &str, with_options: bool) -> Result<Option<Snapshot>> {
        let url = endpoint(
            &self.chart_base,
            &["v8", "finance", "chart", ticker],
            &[("range", "1mo"), ("interval", "1d")],
        );

        let Some(body) = self.get_json(&url).await? else {
            debug!(symbol = ticker, "Chart not found");
            return Ok(None);
        };
        let Some(mut snapshot) = parse_chart(ticker, &body) else {
            debug!(symbol = ticker, "Chart has no price data");
            return Ok(None);
        };

        if with_options {
            match self.fetch_option_chain(ticker).await {
                Ok(activity) => snapshot.options = activity,
                Err(e) => warn!(symbol = ticker, error = %e, "Option chain unavailable"),
            }
        }

        Ok(Some(snapshot))
    }

    pub async fn fetch_option_chain(&self, ticker: &str) -> Result<Option<OptionActivity>> {
        let url = endpoint(&self.options_base, &["v7", "finance", "options", ticker], &[]);
        Ok(self.get_json(&url).await?.as_ref().and_then(parse_option_chain))
    }
}

#[async_trait]
impl MarketSource for YahooClient {
    async fn fetch(&self, symbols: &[Symbol]) -> Result<Snapshots> {
        let plan: Vec<(String, bool)> = plan_requests(symbols).into_iter().collect();
        if plan.is_empty() {
            return Err(AppError::SourceUnavailable("No symbols requested".to_string()));
        }

        let total = plan.len();
        let mut snapshots = Snapshots::new();
        let mut missing = 0usize;
        let mut failed = 0usize;
        let mut last_error: Option<String> = None;

        for (group_idx, group) in plan.chunks(self.config.concurrency.max(1)).enumerate() {
            let results = futures::future::join_all(
                group
                    .iter()
                    .map(|(ticker, with_options)| self.fetch_symbol(ticker, *with_options)),
            )
            .await;

            for ((ticker, _), result) in group.iter().zip(results) {
                match result {
                    Ok(Some(snapshot)) => {
                        snapshots.insert(ticker.clone(), snapshot);
                    }
                    Ok(None) => missing += 1,
                    Err(e) => {
                        failed += 1;
                        debug!(symbol = %ticker, error = %e, "Fetch failed, treating as unresolved");
                        last_error = Some(e.to_string());
                    }
                }
            }

            debug!(group = group_idx + 1, resolved = snapshots.len(), "Fetch group completed");
        }

        if snapshots.is_empty() {
            return Err(AppError::SourceUnavailable(format!(
                "No symbol resolved out of {} ({} missing, {} failed); last error: {}",
                total,
                missing,
                failed,
                last_error.unwrap_or_else(|| "none".to_string())
            )));
        }

        info!(
            requested = total,
            resolved = snapshots.len(),
            missing,
            failed,
            "Market data fetched"
        );

        Ok(snapshots)
    }
}

/// Distinct tickers to request, flagged when any list wants the option chain
pub fn plan_requests(symbols: &[Symbol]) -> BTreeMap<String, bool> {
    let mut plan = BTreeMap::new();
    for symbol in symbols {
        let wants_options = plan.entry(symbol.ticker.clone()).or_insert(false);
        *wants_options |= symbol.class == MarketClass::OptionsWatch;
    }
    plan
}

fn number(value: &Value, key: &str) -> Option<f64> {
    value
        .get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

fn count(value: &Value, key: &str) -> Option<u64> {
    let field = value.get(key)?;
    field
        .as_u64()
        .or_else(|| field.as_f64().filter(|v| v.is_finite() && *v >= 0.0).map(|v| v as u64))
}

fn series(quote: &Value, key: &str) -> Vec<Option<f64>> {
    quote
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(|v| v.as_f64().filter(|f| f.is_finite())).collect())
        .unwrap_or_default()
}

/// Build a snapshot from a v8 chart document; `None` when it carries no price
pub fn parse_chart(symbol: &str, body: &Value) -> Option<Snapshot> {
    let result = body.pointer("/chart/result/0")?;
    let meta = result.get("meta").unwrap_or(&Value::Null);
    let quote = result.pointer("/indicators/quote/0").unwrap_or(&Value::Null);

    let opens = series(quote, "open");
    let highs = series(quote, "high");
    let lows = series(quote, "low");
    let closes = series(quote, "close");
    let volumes = series(quote, "volume");

    let last_bar = |s: &[Option<f64>]| s.last().copied().flatten();

    let last_price = number(meta, "regularMarketPrice")
        .or_else(|| closes.iter().rev().find_map(|c| *c))
        .filter(|p| *p > 0.0)?;

    let previous_close = closes
        .len()
        .checked_sub(2)
        .and_then(|i| closes[i])
        .or_else(|| number(meta, "previousClose"))
        .or_else(|| number(meta, "chartPreviousClose"));

    let prior_volumes: Vec<f64> = match volumes.split_last() {
        Some((_, prior)) => prior.iter().filter_map(|v| *v).collect(),
        None => Vec::new(),
    };
    let window = &prior_volumes[prior_volumes.len().saturating_sub(TRAILING_WINDOW_DAYS)..];
    let avg_volume = (!window.is_empty()).then(|| window.iter().sum::<f64>() / window.len() as f64);

    Some(Snapshot {
        symbol: symbol.to_string(),
        last_price: Some(last_price),
        previous_close,
        open: last_bar(&opens).or_else(|| number(meta, "regularMarketOpen")),
        day_high: last_bar(&highs).or_else(|| number(meta, "regularMarketDayHigh")),
        day_low: last_bar(&lows).or_else(|| number(meta, "regularMarketDayLow")),
        volume: last_bar(&volumes)
            .or_else(|| number(meta, "regularMarketVolume"))
            .filter(|v| *v >= 0.0)
            .map(|v| v as u64),
        avg_volume,
        options: None,
    })
}

fn parse_contract(item: &Value, side: OptionSide) -> Option<OptionContract> {
    let contract_symbol = item.get("contractSymbol")?.as_str()?.to_string();
    Some(OptionContract {
        contract_symbol,
        side,
        strike: number(item, "strike"),
        last_price: number(item, "lastPrice"),
        volume: count(item, "volume"),
        open_interest: count(item, "openInterest"),
    })
}

/// Nearest-expiry calls and puts from a v7 options document
pub fn parse_option_chain(body: &Value) -> Option<OptionActivity> {
    let chain = body.pointer("/optionChain/result/0/options/0")?;

    let mut contracts = Vec::new();
    for (key, side) in [("calls", OptionSide::Call), ("puts", OptionSide::Put)] {
        if let Some(items) = chain.get(key).and_then(Value::as_array) {
            contracts.extend(items.iter().filter_map(|item| parse_contract(item, side)));
        }
    }

    Some(OptionActivity {
        contracts,
        ..Default::default()
    })
}
