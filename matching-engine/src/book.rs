//! Per-symbol order book: two [`PriceLevels`] sides plus dual indexing by
//! exchange id and client id, per §4.1.
//!
//! All operations here are synchronous and assume the caller already holds
//! exclusive access to this book (the engine serializes via a per-symbol
//! lock, see [`crate::engine`]). The book itself never blocks.

use crate::price_levels::PriceLevels;
use crate::types::{ExchangeOrderId, Order, Side};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// A single symbol's resting orders, indexed for price-time navigation
/// and O(1) lookup by either identifier.
pub struct OrderBook {
    pub bids: PriceLevels,
    pub asks: PriceLevels,
    /// exchange id -> (side, price) so a remove can find the right queue
    /// without scanning both sides.
    by_exchange_id: HashMap<ExchangeOrderId, (Side, Decimal)>,
    /// client id -> exchange id, for client-keyed cancel/amend requests.
    by_client_id: HashMap<String, ExchangeOrderId>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bids: PriceLevels::new(Side::Buy),
            asks: PriceLevels::new(Side::Sell),
            by_exchange_id: HashMap::new(),
            by_client_id: HashMap::new(),
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut PriceLevels {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn side(&self, side: Side) -> &PriceLevels {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Inserts at the tail of the queue at `order.limit_price` on
    /// `order.side`. Requires `order.is_resting_eligible()`. Updates both
    /// indices.
    pub fn add(&mut self, order: Order) {
        debug_assert!(order.is_resting_eligible());
        let px = order.limit_price.expect("resting order must be limit");
        let side = order.side;
        self.by_exchange_id
            .insert(order.exchange_order_id, (side, px));
        self.by_client_id
            .insert(order.client_order_id.clone(), order.exchange_order_id);
        self.side_mut(side).push_back(order);
    }

    /// Removes the referenced order from its queue and both indices.
    /// Drops the price level if it becomes empty.
    pub fn remove_by_exchange_id(&mut self, id: ExchangeOrderId) -> Option<Order> {
        let (side, px) = self.by_exchange_id.remove(&id)?;
        let order = self.side_mut(side).remove_at(px, id)?;
        self.by_client_id.remove(&order.client_order_id);
        Some(order)
    }

    pub fn remove_by_client_id(&mut self, client_id: &str) -> Option<Order> {
        let exchange_id = *self.by_client_id.get(client_id)?;
        self.remove_by_exchange_id(exchange_id)
    }

    pub fn lookup_by_client_id(&self, client_id: &str) -> Option<ExchangeOrderId> {
        self.by_client_id.get(client_id).copied()
    }

    /// Reads an order in place without removing it, for amend validation
    /// that must not mutate the book until the request is known-valid.
    pub fn peek_by_exchange_id(&self, id: ExchangeOrderId) -> Option<&Order> {
        let (side, px) = self.by_exchange_id.get(&id)?;
        self.side(*side)
            .get_price_levels()
            .get(px)?
            .iter()
            .find(|o| o.exchange_order_id == id)
    }

    pub fn peek_by_client_id(&self, client_id: &str) -> Option<&Order> {
        let id = self.lookup_by_client_id(client_id)?;
        self.peek_by_exchange_id(id)
    }

    /// Removes a resting order once it is fully consumed by a match,
    /// keeping indices consistent with the price-level queue.
    pub(crate) fn pop_matched(&mut self, side: Side) -> Option<Order> {
        let order = self.side_mut(side).pop_best()?;
        self.by_exchange_id.remove(&order.exchange_order_id);
        self.by_client_id.remove(&order.client_order_id);
        Some(order)
    }

    /// Reinserts a partially-filled maker at the front of its level,
    /// restoring both indices (used when a match only partially consumes
    /// the resting order).
    pub(crate) fn restore_front(&mut self, order: Order) {
        let px = order.limit_price.expect("resting order must be limit");
        let side = order.side;
        self.by_exchange_id
            .insert(order.exchange_order_id, (side, px));
        self.by_client_id
            .insert(order.client_order_id.clone(), order.exchange_order_id);
        self.side_mut(side).push_front(order);
    }

    pub fn best_bid(&self) -> Option<&Order> {
        self.bids.peek_best()
    }

    pub fn best_ask(&self) -> Option<&Order> {
        self.asks.peek_best()
    }

    pub fn best_bid_price(&self) -> Option<Decimal> {
        self.bids.best_price()
    }

    pub fn best_ask_price(&self) -> Option<Decimal> {
        self.asks.best_price()
    }

    /// Up to `depth` orders from `side` in priority order (price then time).
    pub fn top_n(&self, side: Side, depth: usize) -> Vec<Order> {
        self.side(side).top_n(depth)
    }

    /// `true` if both sides are non-empty and crossed (should never be
    /// observable after a call completes — invariant 4, §8).
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid_price(), self.best_ask_price()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    pub fn bid_level_count(&self) -> usize {
        self.bids.get_price_levels().len()
    }

    pub fn ask_level_count(&self) -> usize {
        self.asks.get_price_levels().len()
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExchangeOrderId, OrderStatus, OrderType};

    fn order(id: u64, cid: &str, side: Side, px: i64, qty: i64) -> Order {
        Order {
            client_order_id: cid.into(),
            exchange_order_id: ExchangeOrderId(id),
            symbol: "AAPL".into(),
            side,
            order_type: OrderType::Limit,
            original_qty: Decimal::new(qty, 0),
            filled_qty: Decimal::ZERO,
            remaining_qty: Decimal::new(qty, 0),
            limit_price: Some(Decimal::new(px, 2)),
            status: OrderStatus::New,
            owner: "sess".into(),
            created_at_ns: id as u128,
        }
    }

    #[test]
    fn add_then_lookup_by_both_indices() {
        let mut book = OrderBook::new();
        book.add(order(1, "c1", Side::Buy, 10000, 10));

        assert_eq!(book.lookup_by_client_id("c1"), Some(ExchangeOrderId(1)));
        assert_eq!(book.best_bid().unwrap().exchange_order_id, ExchangeOrderId(1));
    }

    #[test]
    fn remove_by_client_id_drops_both_indices_and_empty_level() {
        let mut book = OrderBook::new();
        book.add(order(1, "c1", Side::Buy, 10000, 10));

        let removed = book.remove_by_client_id("c1").unwrap();
        assert_eq!(removed.exchange_order_id, ExchangeOrderId(1));
        assert!(book.lookup_by_client_id("c1").is_none());
        assert!(book.best_bid().is_none());
        assert_eq!(book.bid_level_count(), 0);
    }

    #[test]
    fn remove_by_exchange_id_missing_returns_none() {
        let mut book = OrderBook::new();
        assert!(book.remove_by_exchange_id(ExchangeOrderId(99)).is_none());
    }

    #[test]
    fn book_never_reports_crossed_when_disjoint() {
        let mut book = OrderBook::new();
        book.add(order(1, "c1", Side::Buy, 9900, 10));
        book.add(order(2, "c2", Side::Sell, 10000, 10));
        assert!(!book.is_crossed());
    }
}
