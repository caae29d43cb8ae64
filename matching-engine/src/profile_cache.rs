//! Liquidity Profile Cache (§4.4): per-symbol market-cap tier and the
//! spread/quantity parameters the liquidity provider derives from it.
//! Cached indefinitely — symbol fundamentals are assumed stable for a
//! trading session.

use crate::external::CompanyProfileSource;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    MegaCap,
    LargeCap,
    MidCap,
    SmallCap,
    Unknown,
}

/// Per-symbol classification plus the maker-quote parameters it implies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiquidityProfile {
    pub tier: Tier,
    pub market_cap: Option<Decimal>,
    pub base_spread_bps: u32,
    pub level_increment_bps: u32,
    pub base_qty: Decimal,
    pub qty_multiplier: Decimal,
    pub levels: u32,
}

impl LiquidityProfile {
    fn for_tier(tier: Tier, market_cap: Option<Decimal>) -> Self {
        let (base_spread_bps, level_increment_bps, base_qty, qty_multiplier, levels) = match tier
        {
            Tier::MegaCap => (1, 1, 1000, 2, 5),
            Tier::LargeCap => (2, 2, 500, 2, 5),
            Tier::MidCap => (5, 3, 200, 2, 5),
            Tier::SmallCap | Tier::Unknown => (10, 5, 100, 2, 5),
        };
        Self {
            tier,
            market_cap,
            base_spread_bps,
            level_increment_bps,
            base_qty: Decimal::from(base_qty),
            qty_multiplier: Decimal::from(qty_multiplier),
            levels,
        }
    }

    fn from_market_cap(market_cap: Decimal) -> Self {
        let tier = if market_cap >= Decimal::from(500_000_000_000i64) {
            Tier::MegaCap
        } else if market_cap >= Decimal::from(50_000_000_000i64) {
            Tier::LargeCap
        } else if market_cap >= Decimal::from(10_000_000_000i64) {
            Tier::MidCap
        } else {
            Tier::SmallCap
        };
        Self::for_tier(tier, Some(market_cap))
    }

    fn unknown() -> Self {
        Self::for_tier(Tier::Unknown, None)
    }
}

pub struct LiquidityProfileCache {
    source: Arc<dyn CompanyProfileSource>,
    entries: RwLock<HashMap<String, LiquidityProfile>>,
}

impl LiquidityProfileCache {
    pub fn new(source: Arc<dyn CompanyProfileSource>) -> Self {
        Self {
            source,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached profile; on miss, fetches market-cap, derives a
    /// tier, and caches the result (even on fetch failure, as
    /// `Tier::Unknown` — fundamentals don't change mid-session, so an
    /// unknown-tier symbol stays unknown rather than re-fetching forever).
    pub async fn get(&self, symbol: &str) -> LiquidityProfile {
        if let Some(profile) = self.entries.read().await.get(symbol) {
            return *profile;
        }

        let profile = match self.source.fetch_market_cap(symbol).await {
            Some(cap) => LiquidityProfile::from_market_cap(cap),
            None => {
                debug!(%symbol, "company profile fetch failed, using unknown tier");
                LiquidityProfile::unknown()
            }
        };

        self.entries
            .write()
            .await
            .insert(symbol.to_string(), profile);
        profile
    }
}
