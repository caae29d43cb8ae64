//! Matching Engine (§4.2): owns the symbol -> book map and the two
//! monotonic identifier counters, executes submit/cancel/amend, and
//! emits the execution stream.
//!
//! Concurrency model: one `tokio::sync::RwLock<OrderBook>` per symbol
//! behind a `DashMap`, option (b) of §5. The write lock is held for the
//! entire submit/cancel/amend call so no execution from another call can
//! interleave with one already in flight on the same book.

use crate::book::OrderBook;
use crate::error::EngineError;
use crate::liquidity::LiquidityProvider;
use crate::types::{
    now_ns, ExchangeOrderId, ExecType, Execution, ExecutionId, IdSequence, Order, OrderStatus,
    OrderType, Side,
};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Wire-layer-agnostic new-order request; `exchange_order_id` is assigned
/// by the engine, not supplied by the caller.
#[derive(Clone, Debug)]
pub struct NewOrderRequest {
    pub client_order_id: String,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub limit_price: Option<Decimal>,
    pub owner: String,
}

pub struct MatchingEngine {
    books: DashMap<String, Arc<RwLock<OrderBook>>>,
    order_id_seq: IdSequence,
    exec_id_seq: IdSequence,
    /// Set post-construction via [`MatchingEngine::attach_liquidity_provider`]
    /// since the provider itself holds an `Arc<MatchingEngine>` (§9
    /// construction order: price cache, profile cache, engine, then
    /// liquidity provider referencing the other three).
    liquidity: OnceLock<Arc<LiquidityProvider>>,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self {
            books: DashMap::new(),
            order_id_seq: IdSequence::new(),
            exec_id_seq: IdSequence::new(),
            liquidity: OnceLock::new(),
        }
    }

    pub fn attach_liquidity_provider(&self, provider: Arc<LiquidityProvider>) {
        let _ = self.liquidity.set(provider);
    }

    fn book_for(&self, symbol: &str) -> Arc<RwLock<OrderBook>> {
        self.books
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(OrderBook::new())))
            .clone()
    }

    /// Read-only access for the inspection API — a fresh clone of a
    /// symbol's book handle, or `None` if the symbol has never been
    /// touched.
    pub fn book_handle(&self, symbol: &str) -> Option<Arc<RwLock<OrderBook>>> {
        self.books.get(symbol).map(|b| b.clone())
    }

    pub fn known_symbols(&self) -> Vec<String> {
        self.books.iter().map(|e| e.key().clone()).collect()
    }

    fn next_exec_id(&self) -> ExecutionId {
        ExecutionId(self.exec_id_seq.next())
    }

    fn make_execution(
        order: &Order,
        exec_id: ExecutionId,
        orig_client_order_id: Option<String>,
        exec_price: Decimal,
        exec_qty: Decimal,
        exec_type: ExecType,
        timestamp_ns: u128,
    ) -> Execution {
        Execution {
            execution_id: exec_id,
            exchange_order_id: order.exchange_order_id,
            client_order_id: order.client_order_id.clone(),
            orig_client_order_id,
            symbol: order.symbol.clone(),
            side: Some(order.side),
            exec_price,
            exec_qty,
            leaves_qty: order.remaining_qty,
            cum_qty: order.filled_qty,
            exec_type,
            status: order.status,
            timestamp_ns,
        }
    }

    /// A validation/business-rule failure that never reached a resting
    /// order: there is no exchange id to report, so `0` is used as a
    /// sentinel (the counter starts at 1 and never produces it for a
    /// real order).
    fn reject_unassigned(
        &self,
        client_order_id: &str,
        orig_client_order_id: Option<String>,
        symbol: &str,
        side: Option<Side>,
        timestamp_ns: u128,
    ) -> Execution {
        Execution {
            execution_id: self.next_exec_id(),
            exchange_order_id: ExchangeOrderId(0),
            client_order_id: client_order_id.to_string(),
            orig_client_order_id,
            symbol: symbol.to_string(),
            side,
            exec_price: Decimal::ZERO,
            exec_qty: Decimal::ZERO,
            leaves_qty: Decimal::ZERO,
            cum_qty: Decimal::ZERO,
            exec_type: ExecType::Rejected,
            status: OrderStatus::Rejected,
            timestamp_ns,
        }
    }

    fn validate_new_order(req: &NewOrderRequest) -> Result<(), EngineError> {
        if req.client_order_id.is_empty() {
            return Err(EngineError::InvalidOrder("client_order_id empty".into()));
        }
        if req.symbol.is_empty() {
            return Err(EngineError::InvalidOrder("symbol empty".into()));
        }
        if req.quantity <= Decimal::ZERO {
            return Err(EngineError::InvalidOrder("quantity must be positive".into()));
        }
        if req.order_type == OrderType::Limit {
            match req.limit_price {
                Some(p) if p > Decimal::ZERO => {}
                _ => {
                    return Err(EngineError::InvalidOrder(
                        "limit order requires a positive price".into(),
                    ))
                }
            }
        }
        Ok(())
    }

    /// §4.2.1 submit(order).
    pub async fn submit(&self, req: NewOrderRequest) -> Vec<Execution> {
        let now = now_ns();

        if let Err(e) = Self::validate_new_order(&req) {
            warn!(error = %e, client_order_id = %req.client_order_id, "order rejected at validation");
            return vec![self.reject_unassigned(
                &req.client_order_id,
                None,
                &req.symbol,
                Some(req.side),
                now,
            )];
        }

        let exchange_id = ExchangeOrderId(self.order_id_seq.next());
        let mut order = Order {
            client_order_id: req.client_order_id.clone(),
            exchange_order_id: exchange_id,
            symbol: req.symbol.clone(),
            side: req.side,
            order_type: req.order_type,
            original_qty: req.quantity,
            filled_qty: Decimal::ZERO,
            remaining_qty: req.quantity,
            limit_price: req.limit_price,
            status: OrderStatus::New,
            owner: req.owner.clone(),
            created_at_ns: now,
        };

        // Step 2: liquidity provisioning, synchronous and possibly
        // recursive (the provider may itself call `submit`). This must
        // complete before the matching loop runs so seeded quotes are
        // visible to it (§5 suspension/ordering guarantee).
        if let Some(lp) = self.liquidity.get() {
            lp.on_submit(&req.symbol, &order).await;
        }

        let mut execs = Vec::with_capacity(4);
        execs.push(Self::make_execution(
            &order,
            self.next_exec_id(),
            None,
            Decimal::ZERO,
            Decimal::ZERO,
            ExecType::New,
            now,
        ));

        let book_lock = self.book_for(&req.symbol);
        {
            let mut book = book_lock.write().await;
            self.run_matching_loop(&mut book, &mut order, &mut execs, now);

            if order.remaining_qty > Decimal::ZERO {
                match order.order_type {
                    OrderType::Limit => {
                        order.status = if order.filled_qty > Decimal::ZERO {
                            OrderStatus::PartiallyFilled
                        } else {
                            OrderStatus::New
                        };
                        book.add(order.clone());
                    }
                    OrderType::Market => {
                        order.status = OrderStatus::Rejected;
                        execs.push(Self::make_execution(
                            &order,
                            self.next_exec_id(),
                            None,
                            Decimal::ZERO,
                            Decimal::ZERO,
                            ExecType::Rejected,
                            now,
                        ));
                    }
                }
            }
            debug_assert!(!book.is_crossed());
        }

        execs
    }

    /// §4.2.4 matching loop, shared by submit and amend-with-residual.
    fn run_matching_loop(
        &self,
        book: &mut OrderBook,
        order: &mut Order,
        execs: &mut Vec<Execution>,
        now: u128,
    ) {
        let counter_side = order.side.opposite();

        loop {
            if order.remaining_qty <= Decimal::ZERO {
                break;
            }

            let counter_price = match counter_side {
                Side::Buy => book.best_bid_price(),
                Side::Sell => book.best_ask_price(),
            };
            let Some(counter_price) = counter_price else {
                break;
            };

            if order.order_type == OrderType::Limit {
                let limit_price = order
                    .limit_price
                    .expect("validated limit order always has a price");
                let crosses = match order.side {
                    Side::Buy => limit_price >= counter_price,
                    Side::Sell => limit_price <= counter_price,
                };
                if !crosses {
                    break;
                }
            }

            let mut maker = book
                .pop_matched(counter_side)
                .expect("counter_price came from this book's best, must be poppable");

            let match_qty = order.remaining_qty.min(maker.remaining_qty);
            let match_price = maker
                .limit_price
                .expect("resting orders are always limit orders");

            order.filled_qty += match_qty;
            order.remaining_qty -= match_qty;
            maker.filled_qty += match_qty;
            maker.remaining_qty -= match_qty;

            order.status = if order.remaining_qty.is_zero() {
                OrderStatus::Filled
            } else {
                OrderStatus::PartiallyFilled
            };
            maker.status = if maker.remaining_qty.is_zero() {
                OrderStatus::Filled
            } else {
                OrderStatus::PartiallyFilled
            };

            let aggressor_type = if order.remaining_qty.is_zero() {
                ExecType::Fill
            } else {
                ExecType::PartialFill
            };
            let passive_type = if maker.remaining_qty.is_zero() {
                ExecType::Fill
            } else {
                ExecType::PartialFill
            };

            execs.push(Self::make_execution(
                order,
                self.next_exec_id(),
                None,
                match_price,
                match_qty,
                aggressor_type,
                now,
            ));
            execs.push(Self::make_execution(
                &maker,
                self.next_exec_id(),
                None,
                match_price,
                match_qty,
                passive_type,
                now,
            ));

            if maker.remaining_qty > Decimal::ZERO {
                book.restore_front(maker);
            }
        }
    }

    /// §4.2.2 cancel(symbol, orig_client_id, new_client_id).
    pub async fn cancel(
        &self,
        symbol: &str,
        orig_client_id: &str,
        new_client_id: &str,
    ) -> Vec<Execution> {
        let now = now_ns();

        let Some(book_lock) = self.books.get(symbol).map(|b| b.clone()) else {
            return vec![self.reject_unassigned(
                new_client_id,
                Some(orig_client_id.to_string()),
                symbol,
                None,
                now,
            )];
        };

        let mut book = book_lock.write().await;
        match book.remove_by_client_id(orig_client_id) {
            Some(mut order) => {
                order.status = OrderStatus::Cancelled;
                vec![Execution {
                    execution_id: self.next_exec_id(),
                    exchange_order_id: order.exchange_order_id,
                    client_order_id: new_client_id.to_string(),
                    orig_client_order_id: Some(orig_client_id.to_string()),
                    symbol: symbol.to_string(),
                    side: Some(order.side),
                    exec_price: Decimal::ZERO,
                    exec_qty: Decimal::ZERO,
                    leaves_qty: Decimal::ZERO,
                    cum_qty: order.filled_qty,
                    exec_type: ExecType::Cancelled,
                    status: OrderStatus::Cancelled,
                    timestamp_ns: now,
                }]
            }
            None => vec![self.reject_unassigned(
                new_client_id,
                Some(orig_client_id.to_string()),
                symbol,
                None,
                now,
            )],
        }
    }

    /// §4.2.3 amend(symbol, orig_client_id, new_client_id, new_qty?, new_price?).
    ///
    /// Atomic cancel-and-replace: on any validation failure the book is
    /// left untouched and exactly one *rejected* execution is emitted.
    pub async fn amend(
        &self,
        symbol: &str,
        orig_client_id: &str,
        new_client_id: &str,
        new_qty: Option<Decimal>,
        new_price: Option<Decimal>,
    ) -> Vec<Execution> {
        let now = now_ns();

        let Some(book_lock) = self.books.get(symbol).map(|b| b.clone()) else {
            return vec![self.reject_unassigned(
                new_client_id,
                Some(orig_client_id.to_string()),
                symbol,
                None,
                now,
            )];
        };

        let mut book = book_lock.write().await;

        let (old_filled, old_original, old_price, old_side, old_type, old_owner) =
            match book.peek_by_client_id(orig_client_id) {
                Some(existing) => (
                    existing.filled_qty,
                    existing.original_qty,
                    existing.limit_price,
                    existing.side,
                    existing.order_type,
                    existing.owner.clone(),
                ),
                None => {
                    return vec![self.reject_unassigned(
                        new_client_id,
                        Some(orig_client_id.to_string()),
                        symbol,
                        None,
                        now,
                    )]
                }
            };

        let effective_new_qty = new_qty.unwrap_or(old_original);
        if effective_new_qty < old_filled {
            return vec![self.reject_unassigned(
                new_client_id,
                Some(orig_client_id.to_string()),
                symbol,
                Some(old_side),
                now,
            )];
        }

        let old = book
            .remove_by_client_id(orig_client_id)
            .expect("just validated this order exists");
        debug_assert_eq!(old.filled_qty, old_filled);

        let effective_price = new_price.or(old_price);
        let new_exchange_id = ExchangeOrderId(self.order_id_seq.next());
        let mut amended = Order {
            client_order_id: new_client_id.to_string(),
            exchange_order_id: new_exchange_id,
            symbol: symbol.to_string(),
            side: old_side,
            order_type: old_type,
            original_qty: effective_new_qty,
            filled_qty: old_filled,
            remaining_qty: effective_new_qty - old_filled,
            limit_price: effective_price,
            status: OrderStatus::New,
            owner: old_owner,
            created_at_ns: now,
        };

        let mut execs = vec![Self::make_execution(
            &amended,
            self.next_exec_id(),
            Some(orig_client_id.to_string()),
            effective_price.unwrap_or(Decimal::ZERO),
            Decimal::ZERO,
            ExecType::Replaced,
            now,
        )];

        if amended.remaining_qty > Decimal::ZERO {
            self.run_matching_loop(&mut book, &mut amended, &mut execs, now);

            if amended.remaining_qty > Decimal::ZERO {
                match amended.order_type {
                    OrderType::Limit => {
                        amended.status = if amended.filled_qty > Decimal::ZERO {
                            OrderStatus::PartiallyFilled
                        } else {
                            OrderStatus::New
                        };
                        book.add(amended.clone());
                    }
                    OrderType::Market => {
                        amended.status = OrderStatus::Rejected;
                        execs.push(Self::make_execution(
                            &amended,
                            self.next_exec_id(),
                            None,
                            Decimal::ZERO,
                            Decimal::ZERO,
                            ExecType::Rejected,
                            now,
                        ));
                    }
                }
            }
        }

        debug_assert!(!book.is_crossed());
        debug!(symbol, orig_client_id, new_client_id, "amend applied");
        execs
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderType;
    use proptest::prelude::*;

    fn req(cid: &str, symbol: &str, side: Side, qty: i64, price: Option<i64>) -> NewOrderRequest {
        NewOrderRequest {
            client_order_id: cid.into(),
            symbol: symbol.into(),
            side,
            order_type: if price.is_some() {
                OrderType::Limit
            } else {
                OrderType::Market
            },
            quantity: Decimal::new(qty, 0),
            limit_price: price.map(|p| Decimal::new(p, 2)),
            owner: "sess-1".into(),
        }
    }

    // S1: partial fill then rest.
    #[tokio::test]
    async fn s1_partial_fill_then_rest() {
        let engine = MatchingEngine::new();
        engine
            .submit(req("sell-1", "AAPL", Side::Sell, 100, Some(1000)))
            .await;
        let execs = engine
            .submit(req("buy-1", "AAPL", Side::Buy, 60, Some(1000)))
            .await;

        let types: Vec<ExecType> = execs.iter().map(|e| e.exec_type).collect();
        assert_eq!(
            types,
            vec![ExecType::New, ExecType::Fill, ExecType::PartialFill]
        );

        let book_lock = engine.book_handle("AAPL").unwrap();
        let book = book_lock.read().await;
        assert_eq!(book.best_ask_price(), Some(Decimal::new(1000, 2)));
        assert!(book.best_bid_price().is_none());
    }

    // S2: aggressor price improvement across two ask levels.
    #[tokio::test]
    async fn s2_aggressor_price_improvement() {
        let engine = MatchingEngine::new();
        engine
            .submit(req("sell-1", "AAPL", Side::Sell, 50, Some(1005)))
            .await;
        engine
            .submit(req("sell-2", "AAPL", Side::Sell, 50, Some(1000)))
            .await;

        let execs = engine
            .submit(req("buy-1", "AAPL", Side::Buy, 80, Some(1010)))
            .await;

        let fills: Vec<&Execution> = execs
            .iter()
            .filter(|e| e.exec_qty > Decimal::ZERO && e.client_order_id == "buy-1")
            .collect();
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].exec_price, Decimal::new(1000, 2));
        assert_eq!(fills[0].exec_qty, Decimal::new(50, 0));
        assert_eq!(fills[1].exec_price, Decimal::new(1005, 2));
        assert_eq!(fills[1].exec_qty, Decimal::new(30, 0));
    }

    // S3: time priority within a level.
    #[tokio::test]
    async fn s3_time_priority() {
        let engine = MatchingEngine::new();
        engine
            .submit(req("sell-a", "AAPL", Side::Sell, 30, Some(1000)))
            .await;
        engine
            .submit(req("sell-b", "AAPL", Side::Sell, 30, Some(1000)))
            .await;

        let execs = engine
            .submit(req("buy-1", "AAPL", Side::Buy, 40, Some(1000)))
            .await;

        let passive: Vec<&Execution> = execs
            .iter()
            .filter(|e| e.client_order_id == "sell-a" || e.client_order_id == "sell-b")
            .collect();
        assert_eq!(passive[0].client_order_id, "sell-a");
        assert_eq!(passive[0].status, OrderStatus::Filled);
        assert_eq!(passive[1].client_order_id, "sell-b");
        assert_eq!(passive[1].status, OrderStatus::PartiallyFilled);
        assert_eq!(passive[1].leaves_qty, Decimal::new(20, 0));
    }

    // S4: amend rejected below filled quantity leaves order untouched.
    #[tokio::test]
    async fn s4_amend_rejected_below_filled() {
        let engine = MatchingEngine::new();
        engine
            .submit(req("buy-1", "AAPL", Side::Buy, 100, Some(1000)))
            .await;
        engine
            .submit(req("sell-1", "AAPL", Side::Sell, 40, Some(1000)))
            .await;

        let execs = engine
            .amend("AAPL", "buy-1", "buy-1-amend", Some(Decimal::new(30, 0)), None)
            .await;
        assert_eq!(execs.len(), 1);
        assert_eq!(execs[0].exec_type, ExecType::Rejected);

        let book_lock = engine.book_handle("AAPL").unwrap();
        {
            let book = book_lock.read().await;
            assert_eq!(book.lookup_by_client_id("buy-1").unwrap().0, 1);
        }

        let fill_execs = engine
            .submit(req("sell-2", "AAPL", Side::Sell, 60, Some(1000)))
            .await;
        let buy_fill = fill_execs
            .iter()
            .find(|e| e.client_order_id == "buy-1")
            .unwrap();
        assert_eq!(buy_fill.status, OrderStatus::Filled);
    }

    // S5: market order with insufficient liquidity.
    #[tokio::test]
    async fn s5_market_order_insufficient_liquidity() {
        let engine = MatchingEngine::new();
        engine
            .submit(req("sell-1", "AAPL", Side::Sell, 20, Some(1000)))
            .await;

        let execs = engine
            .submit(req("buy-1", "AAPL", Side::Buy, 50, None))
            .await;

        let types: Vec<ExecType> = execs.iter().map(|e| e.exec_type).collect();
        assert_eq!(
            types,
            vec![
                ExecType::New,
                ExecType::PartialFill,
                ExecType::Fill,
                ExecType::Rejected
            ]
        );
        let rejected = execs.last().unwrap();
        assert_eq!(rejected.leaves_qty, Decimal::new(30, 0));
        assert_eq!(rejected.cum_qty, Decimal::new(20, 0));
        assert_eq!(rejected.status, OrderStatus::Rejected);

        let book_lock = engine.book_handle("AAPL").unwrap();
        let book = book_lock.read().await;
        assert!(book.lookup_by_client_id("buy-1").is_none());
    }

    #[tokio::test]
    async fn cancel_unknown_symbol_rejects() {
        let engine = MatchingEngine::new();
        let execs = engine.cancel("NOPE", "c1", "c1-cancel").await;
        assert_eq!(execs.len(), 1);
        assert_eq!(execs[0].exec_type, ExecType::Rejected);
    }

    #[tokio::test]
    async fn identifiers_are_unique_across_calls() {
        let engine = MatchingEngine::new();
        let mut exec_ids = std::collections::HashSet::new();
        let mut order_ids = std::collections::HashSet::new();
        for i in 0..20 {
            let execs = engine
                .submit(req(&format!("c{i}"), "AAPL", Side::Buy, 10, Some(1000)))
                .await;
            for e in execs {
                assert!(exec_ids.insert(e.execution_id));
                order_ids.insert(e.exchange_order_id);
            }
        }
        assert_eq!(order_ids.len(), 20);
    }

    /// Invariant 3 (book integrity) and invariant 4 (no crossed book) hold
    /// after every call in an arbitrary sequence of submits.
    fn book_is_well_formed(book: &OrderBook) {
        let bid_prices: Vec<Decimal> = book.bids.iter_levels_best_first().map(|(p, _)| p).collect();
        let mut sorted_desc = bid_prices.clone();
        sorted_desc.sort_by(|a, b| b.cmp(a));
        assert_eq!(bid_prices, sorted_desc, "bid prices must descend");

        let ask_prices: Vec<Decimal> = book.asks.iter_levels_best_first().map(|(p, _)| p).collect();
        let mut sorted_asc = ask_prices.clone();
        sorted_asc.sort();
        assert_eq!(ask_prices, sorted_asc, "ask prices must ascend");

        for (_, qty) in book.bids.iter_levels_best_first() {
            assert!(qty > Decimal::ZERO);
        }
        for (_, qty) in book.asks.iter_levels_best_first() {
            assert!(qty > Decimal::ZERO);
        }

        assert!(!book.is_crossed());
    }

    proptest::proptest! {
        #[test]
        fn book_stays_well_formed_under_random_submits(
            ops in prop::collection::vec(
                (any::<bool>(), 1i64..50, 95i64..105),
                1..60,
            )
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let engine = MatchingEngine::new();
                let mut exec_ids = std::collections::HashSet::new();
                let mut order_ids = std::collections::HashSet::new();

                for (i, (is_buy, qty, price)) in ops.into_iter().enumerate() {
                    let side = if is_buy { Side::Buy } else { Side::Sell };
                    let execs = engine
                        .submit(req(&format!("c{i}"), "AAPL", side, qty, Some(price * 100)))
                        .await;

                    for e in &execs {
                        assert!(exec_ids.insert(e.execution_id), "execution id reused");
                        if e.exchange_order_id.0 != 0 {
                            order_ids.insert(e.exchange_order_id);
                        }
                    }

                    let book_lock = engine.book_handle("AAPL").unwrap();
                    let book = book_lock.read().await;
                    book_is_well_formed(&book);
                }
            });
        }
    }

    // Invariant 7: a rejected amend leaves the book untouched.
    #[tokio::test]
    async fn amend_atomicity_book_untouched_on_rejection() {
        let engine = MatchingEngine::new();
        engine
            .submit(req("buy-1", "AAPL", Side::Buy, 100, Some(1000)))
            .await;
        engine
            .submit(req("sell-1", "AAPL", Side::Sell, 40, Some(1000)))
            .await;

        let book_lock = engine.book_handle("AAPL").unwrap();
        let before = {
            let book = book_lock.read().await;
            (
                book.best_bid_price(),
                book.bid_level_count(),
                book.lookup_by_client_id("buy-1"),
            )
        };

        let execs = engine
            .amend("AAPL", "buy-1", "buy-1-amend", Some(Decimal::new(10, 0)), None)
            .await;
        assert_eq!(execs.len(), 1);
        assert_eq!(execs[0].exec_type, ExecType::Rejected);

        let after = {
            let book = book_lock.read().await;
            (
                book.best_bid_price(),
                book.bid_level_count(),
                book.lookup_by_client_id("buy-1"),
            )
        };
        assert_eq!(before, after);
    }

    // Invariant 2: sum of exec_qty across all executions for an order
    // equals its final filled quantity.
    #[tokio::test]
    async fn execution_quantities_sum_to_final_filled_quantity() {
        let engine = MatchingEngine::new();
        engine
            .submit(req("sell-a", "AAPL", Side::Sell, 30, Some(1000)))
            .await;
        engine
            .submit(req("sell-b", "AAPL", Side::Sell, 50, Some(1000)))
            .await;

        let execs = engine
            .submit(req("buy-1", "AAPL", Side::Buy, 70, Some(1000)))
            .await;

        let total: Decimal = execs
            .iter()
            .filter(|e| e.client_order_id == "buy-1")
            .map(|e| e.exec_qty)
            .sum();
        assert_eq!(total, Decimal::new(70, 0));

        let final_status = execs
            .iter()
            .filter(|e| e.client_order_id == "buy-1")
            .last()
            .unwrap();
        assert_eq!(final_status.cum_qty, Decimal::new(70, 0));
    }
}
