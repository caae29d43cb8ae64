//! Reference-Price Cache (§4.3): a TTL-bounded symbol -> price mapping
//! with blocking-from-the-caller's-view fill-on-miss.
//!
//! Prices are stored at 2 decimal places (`Decimal::round_dp(2)`) to avoid
//! binary-floating-point drift in later comparisons, per §9.

use crate::external::ReferencePriceSource;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Clone, Copy, Debug)]
struct CachedPrice {
    price: Decimal,
    fetched_at: Instant,
}

pub struct ReferencePriceCache {
    source: Arc<dyn ReferencePriceSource>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedPrice>>,
}

impl ReferencePriceCache {
    pub fn new(source: Arc<dyn ReferencePriceSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached price if its age is within TTL; otherwise
    /// performs a remote fetch. A failed fetch returns `None` and leaves
    /// the cache untouched (a stale-but-absent entry is never stored).
    pub async fn get(&self, symbol: &str) -> Option<Decimal> {
        if let Some(cached) = self.entries.read().await.get(symbol) {
            if cached.fetched_at.elapsed() <= self.ttl {
                return Some(cached.price);
            }
        }

        let price = self.source.fetch_quote(symbol).await?;
        if price <= Decimal::ZERO {
            return None;
        }
        let price = price.round_dp(2);
        debug!(%symbol, %price, "reference price fetched");
        self.entries.write().await.insert(
            symbol.to_string(),
            CachedPrice {
                price,
                fetched_at: Instant::now(),
            },
        );
        Some(price)
    }

    /// Evicts any cached entry then re-fetches.
    pub async fn refresh(&self, symbol: &str) -> Option<Decimal> {
        self.entries.write().await.remove(symbol);
        self.get(symbol).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::StaticMarketDataSource;

    #[tokio::test]
    async fn miss_then_hit_without_refetch() {
        let source = Arc::new(StaticMarketDataSource {
            quote: Some(Decimal::new(15000, 2)),
            market_cap: None,
        });
        let cache = ReferencePriceCache::new(source, Duration::from_secs(30));

        assert_eq!(cache.get("AAPL").await, Some(Decimal::new(15000, 2)));
        assert_eq!(cache.get("AAPL").await, Some(Decimal::new(15000, 2)));
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let source = Arc::new(StaticMarketDataSource {
            quote: None,
            market_cap: None,
        });
        let cache = ReferencePriceCache::new(source, Duration::from_secs(30));
        assert_eq!(cache.get("AAPL").await, None);
        assert_eq!(cache.get("AAPL").await, None);
    }

    #[tokio::test]
    async fn refresh_evicts_and_refetches() {
        let source = Arc::new(StaticMarketDataSource {
            quote: Some(Decimal::new(20000, 2)),
            market_cap: None,
        });
        let cache = ReferencePriceCache::new(source, Duration::from_secs(30));
        cache.get("TSLA").await;
        assert_eq!(cache.refresh("TSLA").await, Some(Decimal::new(20000, 2)));
    }
}
