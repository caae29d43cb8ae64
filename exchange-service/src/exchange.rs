//! Thin wrapper composing the core [`matching_engine::MatchingEngine`] and
//! its [`matching_engine::LiquidityProvider`] into the single service
//! instance the wire layer and inspection API share, per §9 "no
//! process-wide singletons" — this struct IS the composed instance.

use crate::types::{LiquidityState, MarketDepth, OrderBookState, PriceLevelView};
use matching_engine::{
    build_engine, now_ns, CompanyProfileSource, EngineConfig, Execution, LiquidityProvider,
    MatchingEngine, NewOrderRequest, ReferencePriceSource,
};
use rust_decimal::Decimal;
use std::sync::Arc;

pub struct Exchange {
    engine: Arc<MatchingEngine>,
    liquidity: Arc<LiquidityProvider>,
}

impl Exchange {
    pub fn new(
        config: EngineConfig,
        price_source: Arc<dyn ReferencePriceSource>,
        profile_source: Arc<dyn CompanyProfileSource>,
    ) -> Self {
        let (engine, liquidity) = build_engine(config, price_source, profile_source);
        Self { engine, liquidity }
    }

    /// Touches each symbol so the liquidity provider seeds it up front,
    /// for demo purposes — an empty book has nothing to show a connecting
    /// frontend, so the demo symbols get a maker ladder at process start
    /// instead of waiting for the first client order.
    pub async fn pre_seed(&self, symbols: &[&str]) {
        for symbol in symbols {
            self.liquidity.setup(symbol).await;
        }
    }

    pub fn list_symbols(&self) -> Vec<String> {
        self.engine.known_symbols()
    }

    pub async fn get_orderbook_state(&self, symbol: &str) -> Option<OrderBookState> {
        let book_lock = self.engine.book_handle(symbol)?;
        let book = book_lock.read().await;
        Some(OrderBookState {
            symbol: symbol.to_string(),
            best_bid: book.best_bid_price(),
            best_ask: book.best_ask_price(),
            bid_levels: book.bid_level_count(),
            ask_levels: book.ask_level_count(),
            last_update: now_ns(),
        })
    }

    pub async fn get_market_depth(&self, symbol: &str, levels: usize) -> Option<MarketDepth> {
        let book_lock = self.engine.book_handle(symbol)?;
        let book = book_lock.read().await;

        let mut bids = Vec::new();
        for (price, qty) in book.bids.iter_levels_best_first().take(levels) {
            if qty > Decimal::ZERO {
                let orders = book
                    .bids
                    .get_price_levels()
                    .get(&price)
                    .map(|q| q.len())
                    .unwrap_or(0);
                bids.push(PriceLevelView {
                    price,
                    quantity: qty,
                    orders,
                });
            }
        }

        let mut asks = Vec::new();
        for (price, qty) in book.asks.iter_levels_best_first().take(levels) {
            if qty > Decimal::ZERO {
                let orders = book
                    .asks
                    .get_price_levels()
                    .get(&price)
                    .map(|q| q.len())
                    .unwrap_or(0);
                asks.push(PriceLevelView {
                    price,
                    quantity: qty,
                    orders,
                });
            }
        }

        Some(MarketDepth {
            symbol: symbol.to_string(),
            bids,
            asks,
            timestamp: now_ns(),
        })
    }

    pub async fn get_best_prices(&self, symbol: &str) -> Option<(Option<Decimal>, Option<Decimal>)> {
        let book_lock = self.engine.book_handle(symbol)?;
        let book = book_lock.read().await;
        Some((book.best_bid_price(), book.best_ask_price()))
    }

    pub async fn get_total_volume(&self, symbol: &str) -> Option<(Decimal, Decimal)> {
        let book_lock = self.engine.book_handle(symbol)?;
        let book = book_lock.read().await;
        let bid_qty: Decimal = book
            .bids
            .iter_levels_best_first()
            .map(|(_, qty)| qty)
            .sum();
        let ask_qty: Decimal = book
            .asks
            .iter_levels_best_first()
            .map(|(_, qty)| qty)
            .sum();
        Some((bid_qty, ask_qty))
    }

    pub async fn submit_order(&self, req: NewOrderRequest) -> Vec<Execution> {
        self.engine.submit(req).await
    }

    pub async fn cancel_order(
        &self,
        symbol: &str,
        orig_client_order_id: &str,
        new_client_order_id: &str,
    ) -> Vec<Execution> {
        self.engine
            .cancel(symbol, orig_client_order_id, new_client_order_id)
            .await
    }

    pub async fn amend_order(
        &self,
        symbol: &str,
        orig_client_order_id: &str,
        new_client_order_id: &str,
        new_quantity: Option<Decimal>,
        new_price: Option<Decimal>,
    ) -> Vec<Execution> {
        self.engine
            .amend(
                symbol,
                orig_client_order_id,
                new_client_order_id,
                new_quantity,
                new_price,
            )
            .await
    }

    pub fn liquidity_state(&self, symbol: &str) -> LiquidityState {
        LiquidityState {
            symbol: symbol.to_string(),
            active: self.liquidity.is_active(symbol),
        }
    }

    pub fn spawn_liquidity_refresh(&self) -> tokio::task::JoinHandle<()> {
        self.liquidity.clone().spawn_refresh_loop()
    }
}
