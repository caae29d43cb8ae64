//! Core data model: orders, executions, and the small closed-set enums
//! (side, order type, status) that the matching engine dispatches on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Buy or sell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Market orders take whatever liquidity is available; limit orders
/// never trade through their price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
}

/// Lifecycle status of an order. Filled/Cancelled/Rejected are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

/// Execution-report type, FIX-flavored per the wire-layer vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecType {
    New,
    PartialFill,
    Fill,
    Cancelled,
    Replaced,
    Rejected,
}

/// Engine-assigned exchange order identifier. Monotonically increasing,
/// never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExchangeOrderId(pub u64);

/// Engine-assigned execution identifier. Independent counter from
/// [`ExchangeOrderId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExecutionId(pub u64);

/// Atomic monotonic counter shared by the engine for order and execution
/// identifiers. Two concurrent calls to `next()` always observe distinct
/// values.
#[derive(Debug, Default)]
pub struct IdSequence(AtomicU64);

impl IdSequence {
    pub fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// A trading instruction, live or resting.
///
/// Invariants: `filled_qty + remaining_qty == original_qty`; `filled_qty`
/// is monotonically non-decreasing over the order's life; a resting order
/// always has `remaining_qty > 0` and `status` in `{New, PartiallyFilled}`;
/// once `status` reaches a terminal value it never changes again.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub client_order_id: String,
    pub exchange_order_id: ExchangeOrderId,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub original_qty: Decimal,
    pub filled_qty: Decimal,
    pub remaining_qty: Decimal,
    pub limit_price: Option<Decimal>,
    pub status: OrderStatus,
    /// Session/sender identifier copied from the submitting caller.
    pub owner: String,
    pub created_at_ns: u128,
}

impl Order {
    pub fn is_resting_eligible(&self) -> bool {
        self.remaining_qty > Decimal::ZERO && !self.status.is_terminal()
    }
}

/// An immutable event describing a state transition of a particular order.
/// Executions are the only visible output of the engine; any observable
/// behavior must be expressible as a sequence of these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub execution_id: ExecutionId,
    pub exchange_order_id: ExchangeOrderId,
    pub client_order_id: String,
    /// Set only for cancel and amend (replace) responses.
    pub orig_client_order_id: Option<String>,
    pub symbol: String,
    /// `None` only for a rejected cancel/amend on an order the book
    /// never found — there is no resting order to read a side from.
    pub side: Option<Side>,
    /// 0 when this execution is not a fill.
    pub exec_price: Decimal,
    /// 0 when this execution is not a fill.
    pub exec_qty: Decimal,
    /// `order.remaining_qty` after this event.
    pub leaves_qty: Decimal,
    /// `order.filled_qty` after this event.
    pub cum_qty: Decimal,
    pub exec_type: ExecType,
    pub status: OrderStatus,
    pub timestamp_ns: u128,
}

pub fn now_ns() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_nanos()
}
