//! Liquidity Provider (§4.5): seeds a resting maker ladder for a symbol
//! the first time it is ever referenced, and refreshes that ladder on a
//! timer as the reference price moves.
//!
//! The refresh loop uses the same `tokio::time::interval`-driven periodic
//! pattern as the WebSocket heartbeat in `exchange-service`, and posts
//! maker orders through the same `MatchingEngine::submit` entry point
//! external callers use rather than mutating the book directly.

use crate::config::EngineConfig;
use crate::engine::{MatchingEngine, NewOrderRequest};
use crate::price_cache::ReferencePriceCache;
use crate::profile_cache::{LiquidityProfile, LiquidityProfileCache};
use crate::types::{IdSequence, Order, OrderType, Side};
use dashmap::{DashMap, DashSet};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const MAKER_OWNER: &str = "liquidity-provider";

fn round_down_2dp(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

fn round_up_2dp(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::AwayFromZero)
}

pub struct LiquidityProvider {
    engine: Arc<MatchingEngine>,
    price_cache: Arc<ReferencePriceCache>,
    profile_cache: Arc<LiquidityProfileCache>,
    config: EngineConfig,
    /// Symbols that have been provisioned at least once. Insertion is the
    /// idempotence guard (§4.5): `DashSet::insert` is atomic test-and-set,
    /// so two concurrent first-touches of the same symbol can't both post
    /// a ladder, and a recursive `submit` from inside `post_quotes` itself
    /// sees the symbol already marked active and returns immediately
    /// instead of provisioning forever.
    active: DashSet<String>,
    last_reference_price: DashMap<String, Decimal>,
    /// Client ids of the maker orders currently resting per symbol, so a
    /// refresh can cancel them before reposting at a new reference price
    /// (Open Question resolution: cancel-then-repost, see DESIGN.md).
    resting_maker_ids: DashMap<String, Vec<String>>,
    maker_id_seq: IdSequence,
}

impl LiquidityProvider {
    pub fn new(
        engine: Arc<MatchingEngine>,
        price_cache: Arc<ReferencePriceCache>,
        profile_cache: Arc<LiquidityProfileCache>,
        config: EngineConfig,
    ) -> Self {
        Self {
            engine,
            price_cache,
            profile_cache,
            config,
            active: DashSet::new(),
            last_reference_price: DashMap::new(),
            resting_maker_ids: DashMap::new(),
            maker_id_seq: IdSequence::new(),
        }
    }

    pub fn is_active(&self, symbol: &str) -> bool {
        self.active.contains(symbol)
    }

    /// Explicit entry point equivalent to touching a symbol with no
    /// incoming order, for callers that want to pre-seed a book before
    /// any client order arrives.
    pub async fn setup(&self, symbol: &str) {
        self.on_submit_untyped(symbol, None).await;
    }

    /// Called by the engine before matching every incoming order
    /// (§4.2.1 step 2). A no-op once the symbol has already been seeded.
    pub async fn on_submit(&self, symbol: &str, incoming: &Order) {
        self.on_submit_untyped(symbol, Some(incoming)).await;
    }

    async fn on_submit_untyped(&self, symbol: &str, incoming: Option<&Order>) {
        if !self.config.enable_liquidity {
            return;
        }
        if !self.active.insert(symbol.to_string()) {
            return;
        }

        let profile = self.profile_cache.get(symbol).await;
        let reference_price = self.choose_reference_price(symbol, incoming).await;
        info!(%symbol, %reference_price, tier = ?profile.tier, "seeding liquidity");

        let ids = self.post_quotes(symbol, reference_price, &profile).await;
        self.resting_maker_ids.insert(symbol.to_string(), ids);
        self.last_reference_price
            .insert(symbol.to_string(), reference_price);
    }

    /// Priority order per §4.5: cached reference price, else the
    /// incoming order's own limit price, else the configured fallback.
    async fn choose_reference_price(&self, symbol: &str, incoming: Option<&Order>) -> Decimal {
        if let Some(price) = self.price_cache.get(symbol).await {
            return price;
        }
        if let Some(order) = incoming {
            if order.order_type == OrderType::Limit {
                if let Some(price) = order.limit_price {
                    if price > Decimal::ZERO {
                        return price;
                    }
                }
            }
        }
        self.config.fallback_price
    }

    /// Submits `profile.levels` bid/ask pairs through the same `submit`
    /// entry point external callers use, at widening spreads and growing
    /// size. Returns the client order ids posted, for later cancellation.
    async fn post_quotes(
        &self,
        symbol: &str,
        reference_price: Decimal,
        profile: &LiquidityProfile,
    ) -> Vec<String> {
        let mut ids = Vec::with_capacity(profile.levels as usize * 2);
        let mut qty = profile.base_qty;

        for level in 0..profile.levels {
            let offset_bps =
                Decimal::from(profile.base_spread_bps) + Decimal::from(level) * Decimal::from(
                    profile.level_increment_bps,
                );
            let offset = offset_bps / Decimal::from(10_000);

            let bid_price = round_down_2dp(reference_price * (Decimal::ONE - offset));
            let ask_price = round_up_2dp(reference_price * (Decimal::ONE + offset));

            let bid_cid = self.next_maker_client_id(symbol);
            self.engine
                .submit(NewOrderRequest {
                    client_order_id: bid_cid.clone(),
                    symbol: symbol.to_string(),
                    side: Side::Buy,
                    order_type: OrderType::Limit,
                    quantity: qty,
                    limit_price: Some(bid_price),
                    owner: MAKER_OWNER.to_string(),
                })
                .await;
            ids.push(bid_cid);

            let ask_cid = self.next_maker_client_id(symbol);
            self.engine
                .submit(NewOrderRequest {
                    client_order_id: ask_cid.clone(),
                    symbol: symbol.to_string(),
                    side: Side::Sell,
                    order_type: OrderType::Limit,
                    quantity: qty,
                    limit_price: Some(ask_price),
                    owner: MAKER_OWNER.to_string(),
                })
                .await;
            ids.push(ask_cid);

            qty *= profile.qty_multiplier;
        }

        ids
    }

    fn next_maker_client_id(&self, symbol: &str) -> String {
        format!("LP-{symbol}-{}", self.maker_id_seq.next())
    }

    /// Re-evaluates every active symbol's reference price. Unchanged
    /// prices are skipped; a genuine move cancels the prior ladder and
    /// posts a fresh one at new time priority (the chosen resolution to
    /// the refresh-drift question — see DESIGN.md).
    pub async fn refresh_all(&self) {
        if !self.config.enable_liquidity {
            return;
        }

        let symbols: Vec<String> = self.active.iter().map(|s| s.clone()).collect();
        for symbol in symbols {
            let Some(fresh_price) = self.price_cache.refresh(&symbol).await else {
                continue;
            };
            let unchanged = self
                .last_reference_price
                .get(&symbol)
                .map(|p| *p == fresh_price)
                .unwrap_or(false);
            if unchanged {
                continue;
            }

            if let Some((_, prior_ids)) = self.resting_maker_ids.remove(&symbol) {
                for cid in prior_ids {
                    let cancel_id = format!("LP-cancel-{}", self.maker_id_seq.next());
                    self.engine.cancel(&symbol, &cid, &cancel_id).await;
                }
            }

            let profile = self.profile_cache.get(&symbol).await;
            debug!(%symbol, old = ?self.last_reference_price.get(&symbol).map(|p| *p), new = %fresh_price, "liquidity reference price moved, reposting");
            let ids = self.post_quotes(&symbol, fresh_price, &profile).await;
            self.resting_maker_ids.insert(symbol.clone(), ids);
            self.last_reference_price.insert(symbol, fresh_price);
        }
    }

    /// Spawns the periodic refresh task at the configured interval.
    /// Intended to be called once at process start (`exchange-service`
    /// main) via `tokio::spawn`.
    pub fn spawn_refresh_loop(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let interval = Duration::from_millis(self.config.refresh_interval_ms);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.refresh_all().await;
            }
        })
    }
}
