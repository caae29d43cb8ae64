//! One side (bids or asks) of a single symbol's order book: a sorted map
//! from price to a FIFO queue of resting orders.
//!
//! Bids iterate best-first from the high end of the map; asks iterate
//! best-first from the low end. Within a price level, queue order equals
//! arrival order (strict time priority).

use crate::types::{Order, Side};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};

pub struct PriceLevels {
    side: Side,
    levels: BTreeMap<Decimal, VecDeque<Order>>,
}

impl PriceLevels {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// Inserts at the tail of the queue for `order.limit_price`'s level.
    /// Creates the level if it doesn't exist yet.
    pub fn push_back(&mut self, order: Order) {
        let px = order
            .limit_price
            .expect("only limit orders rest in a price level");
        self.levels.entry(px).or_default().push_back(order);
    }

    /// Reinserts a partially-filled maker at the *front* of its level's
    /// queue, preserving its original time priority within that level.
    pub fn push_front(&mut self, order: Order) {
        let px = order
            .limit_price
            .expect("only limit orders rest in a price level");
        self.levels.entry(px).or_default().push_front(order);
    }

    pub fn get_price_levels(&self) -> &BTreeMap<Decimal, VecDeque<Order>> {
        &self.levels
    }

    /// Best price for this side, or `None` if empty.
    /// Asks: lowest price. Bids: highest price.
    pub fn best_price(&self) -> Option<Decimal> {
        match self.side {
            Side::Sell => self.levels.first_key_value().map(|(px, _)| *px),
            Side::Buy => self.levels.last_key_value().map(|(px, _)| *px),
        }
    }

    /// Head of the best-priced queue without removing it.
    pub fn peek_best(&self) -> Option<&Order> {
        let px = self.best_price()?;
        self.levels.get(&px).and_then(|q| q.front())
    }

    /// Removes and returns the head of the best-priced queue, dropping
    /// the level if it becomes empty.
    pub fn pop_best(&mut self) -> Option<Order> {
        let px = self.best_price()?;
        let q = self.levels.get_mut(&px)?;
        let order = q.pop_front();
        if q.is_empty() {
            self.levels.remove(&px);
        }
        order
    }

    /// Eagerly removes the order with the given exchange id at `px`,
    /// wherever it sits in the FIFO queue. O(k) in the level's depth.
    pub fn remove_at(
        &mut self,
        px: Decimal,
        exchange_id: crate::types::ExchangeOrderId,
    ) -> Option<Order> {
        let q = self.levels.get_mut(&px)?;
        let pos = q.iter().position(|o| o.exchange_order_id == exchange_id)?;
        let order = q.remove(pos);
        if q.is_empty() {
            self.levels.remove(&px);
        }
        order
    }

    /// Iterates price levels in best-first order, yielding `(price, total_qty)`.
    pub fn iter_levels_best_first(&self) -> Box<dyn Iterator<Item = (Decimal, Decimal)> + '_> {
        let totals = self
            .levels
            .iter()
            .map(|(px, q)| (*px, q.iter().map(|o| o.remaining_qty).sum()));
        match self.side {
            Side::Sell => Box::new(totals),
            Side::Buy => Box::new(totals.collect::<Vec<_>>().into_iter().rev()),
        }
    }

    /// Up to `depth` individual orders in strict price-then-time priority.
    pub fn top_n(&self, depth: usize) -> Vec<Order> {
        let mut out = Vec::with_capacity(depth);
        let prices: Vec<Decimal> = match self.side {
            Side::Sell => self.levels.keys().copied().collect(),
            Side::Buy => self.levels.keys().rev().copied().collect(),
        };
        for px in prices {
            if out.len() >= depth {
                break;
            }
            if let Some(q) = self.levels.get(&px) {
                for o in q.iter() {
                    if out.len() >= depth {
                        break;
                    }
                    out.push(o.clone());
                }
            }
        }
        out
    }

    pub fn total_len(&self) -> usize {
        self.levels.values().map(|q| q.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExchangeOrderId, Order, OrderStatus, OrderType, Side};

    fn order(id: u64, side: Side, px: i64, qty: i64, ts: u128) -> Order {
        Order {
            client_order_id: format!("c{id}"),
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
            created_at_ns: ts,
        }
    }

    #[test]
    fn fifo_preserved_within_a_level() {
        let mut levels = PriceLevels::new(Side::Buy);
        levels.push_back(order(1, Side::Buy, 10100, 10, 1));
        levels.push_back(order(2, Side::Buy, 10100, 20, 2));
        levels.push_back(order(3, Side::Buy, 10100, 30, 3));

        let ids: Vec<u64> = levels
            .get_price_levels()
            .get(&Decimal::new(10100, 2))
            .unwrap()
            .iter()
            .map(|o| o.exchange_order_id.0)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn best_price_picks_correct_end_per_side() {
        let mut asks = PriceLevels::new(Side::Sell);
        asks.push_back(order(1, Side::Sell, 10200, 10, 1));
        asks.push_back(order(2, Side::Sell, 10100, 10, 2));
        assert_eq!(asks.best_price(), Some(Decimal::new(10100, 2)));

        let mut bids = PriceLevels::new(Side::Buy);
        bids.push_back(order(3, Side::Buy, 10000, 10, 1));
        bids.push_back(order(4, Side::Buy, 10050, 10, 2));
        assert_eq!(bids.best_price(), Some(Decimal::new(10050, 2)));
    }

    #[test]
    fn pop_best_drops_empty_level() {
        let mut asks = PriceLevels::new(Side::Sell);
        asks.push_back(order(1, Side::Sell, 10000, 10, 1));
        assert!(asks.pop_best().is_some());
        assert!(asks.best_price().is_none());
        assert!(asks.is_empty());
    }

    #[test]
    fn remove_at_eagerly_removes_mid_queue_order() {
        let mut bids = PriceLevels::new(Side::Buy);
        bids.push_back(order(1, Side::Buy, 10000, 10, 1));
        bids.push_back(order(2, Side::Buy, 10000, 20, 2));
        bids.push_back(order(3, Side::Buy, 10000, 30, 3));

        let removed = bids.remove_at(Decimal::new(10000, 2), ExchangeOrderId(2));
        assert_eq!(removed.unwrap().exchange_order_id, ExchangeOrderId(2));

        let ids: Vec<u64> = bids
            .get_price_levels()
            .get(&Decimal::new(10000, 2))
            .unwrap()
            .iter()
            .map(|o| o.exchange_order_id.0)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn top_n_respects_price_then_time_priority() {
        let mut bids = PriceLevels::new(Side::Buy);
        bids.push_back(order(1, Side::Buy, 10000, 10, 1));
        bids.push_back(order(2, Side::Buy, 10100, 10, 2));
        bids.push_back(order(3, Side::Buy, 10100, 10, 3));

        let top = bids.top_n(2);
        let ids: Vec<u64> = top.iter().map(|o| o.exchange_order_id.0).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
