//! Simulated-exchange matching engine: price-time priority matching,
//! per-symbol order books, an external reference-price/company-profile
//! collaborator, and a liquidity provider that seeds maker quotes for a
//! symbol on first touch.
//!
//! - Price-time priority matching, exact-decimal pricing
//! - Eager cancel/amend — a cancelled order is never visible in the book
//! - Liquidity provisioning gated on market-cap tier, refreshed on a timer

pub mod book;
pub mod config;
pub mod engine;
pub mod error;
pub mod external;
pub mod liquidity;
pub mod price_cache;
pub mod price_levels;
pub mod profile_cache;
pub mod types;

pub use book::OrderBook;
pub use config::EngineConfig;
pub use engine::{MatchingEngine, NewOrderRequest};
pub use error::EngineError;
pub use external::{CompanyProfileSource, HttpMarketDataClient, ReferencePriceSource};
pub use liquidity::LiquidityProvider;
pub use price_cache::ReferencePriceCache;
pub use price_levels::PriceLevels;
pub use profile_cache::{LiquidityProfile, LiquidityProfileCache, Tier};
pub use types::{
    now_ns, ExchangeOrderId, ExecType, Execution, ExecutionId, IdSequence, Order, OrderStatus,
    OrderType, Side,
};

use std::sync::Arc;
use std::time::Duration;

/// Wires the five long-lived collaborators together per §9's construction
/// order: price cache and profile cache first (they have no dependency on
/// the engine), then the engine, then a liquidity provider holding
/// references to all three. The engine's own reference back to the
/// provider is attached last since it can only be constructed afterward.
pub fn build_engine(
    config: EngineConfig,
    price_source: Arc<dyn ReferencePriceSource>,
    profile_source: Arc<dyn CompanyProfileSource>,
) -> (Arc<MatchingEngine>, Arc<LiquidityProvider>) {
    let price_cache = Arc::new(ReferencePriceCache::new(
        price_source,
        Duration::from_secs(config.price_cache_ttl_seconds),
    ));
    let profile_cache = Arc::new(LiquidityProfileCache::new(profile_source));
    let engine = Arc::new(MatchingEngine::new());
    let liquidity = Arc::new(LiquidityProvider::new(
        engine.clone(),
        price_cache,
        profile_cache,
        config,
    ));
    engine.attach_liquidity_provider(liquidity.clone());
    (engine, liquidity)
}
