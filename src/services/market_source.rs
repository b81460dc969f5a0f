use crate::error::Result;
use crate::models::{Snapshots, Symbol};
use async_trait::async_trait;

/// Point-in-time market data for a set of symbols.
///
/// Symbols the upstream cannot resolve are left out of the returned map.
/// `AppError::SourceUnavailable` is reserved for fetches that produced
/// nothing usable at all; partial data is a success.
#[async_trait]
pub trait MarketSource: Send + Sync {
    async fn fetch(&self, symbols: &[Symbol]) -> Result<Snapshots>;
}
