//! Wire-layer vocabulary (§6): inbound request bodies and the outbound
//! execution-report shape the engine's [`matching_engine::Execution`]
//! stream is translated into.

use matching_engine::{ExecType, Execution, OrderStatus, OrderType, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `new-order` wire message.
#[derive(Debug, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub client_order_id: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    /// Required when `order_type` is `Limit`; ignored otherwise.
    pub price: Option<Decimal>,
}

/// `cancel-request` wire message.
#[derive(Debug, Serialize, Deserialize)]
pub struct CancelRequest {
    pub orig_client_order_id: String,
    pub new_client_order_id: String,
}

/// `amend-request` wire message.
#[derive(Debug, Serialize, Deserialize)]
pub struct AmendRequest {
    pub orig_client_order_id: String,
    pub new_client_order_id: String,
    pub new_quantity: Option<Decimal>,
    pub new_price: Option<Decimal>,
}

/// Query parameters for market depth requests.
#[derive(Debug, Serialize, Deserialize)]
pub struct DepthQuery {
    pub levels: Option<usize>,
}

/// List of available trading symbols.
#[derive(Debug, Serialize, Deserialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<String>,
}

/// Current order book state snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderBookState {
    pub symbol: String,
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
    pub bid_levels: usize,
    pub ask_levels: usize,
    pub last_update: u128,
}

/// Aggregated orders at a specific price level.
#[derive(Debug, Serialize, Deserialize)]
pub struct PriceLevelView {
    pub price: Decimal,
    pub quantity: Decimal,
    pub orders: usize,
}

/// Market depth showing multiple price levels.
#[derive(Debug, Serialize, Deserialize)]
pub struct MarketDepth {
    pub symbol: String,
    pub bids: Vec<PriceLevelView>,
    pub asks: Vec<PriceLevelView>,
    pub timestamp: u128,
}

/// Whether the liquidity provider has seeded a symbol, and its most
/// recently used reference price.
#[derive(Debug, Serialize, Deserialize)]
pub struct LiquidityState {
    pub symbol: String,
    pub active: bool,
}

/// Outbound execution-report message (§6 "Outbound events"), one per
/// [`Execution`] the engine emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub exchange_order_id: u64,
    pub execution_id: u64,
    pub execution_type: ExecType,
    pub order_status: OrderStatus,
    pub side: Option<Side>,
    pub symbol: String,
    pub client_order_id: String,
    pub orig_client_order_id: Option<String>,
    pub leaves_quantity: Decimal,
    pub cumulative_quantity: Decimal,
    /// For this simulator, = last fill price when this execution is a
    /// fill, else 0 (not a true running volume-weighted average).
    pub avg_price: Decimal,
    pub last_quantity: Option<Decimal>,
    pub last_price: Option<Decimal>,
    pub timestamp_ns: u128,
}

impl From<Execution> for ExecutionReport {
    fn from(e: Execution) -> Self {
        let is_fill = e.exec_qty > Decimal::ZERO;
        Self {
            exchange_order_id: e.exchange_order_id.0,
            execution_id: e.execution_id.0,
            execution_type: e.exec_type,
            order_status: e.status,
            side: e.side,
            symbol: e.symbol,
            client_order_id: e.client_order_id,
            orig_client_order_id: e.orig_client_order_id,
            leaves_quantity: e.leaves_qty,
            cumulative_quantity: e.cum_qty,
            avg_price: if is_fill { e.exec_price } else { Decimal::ZERO },
            last_quantity: is_fill.then_some(e.exec_qty),
            last_price: is_fill.then_some(e.exec_price),
            timestamp_ns: e.timestamp_ns,
        }
    }
}

/// Response after submitting, cancelling, or amending an order.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub executions: Vec<ExecutionReport>,
}

/// WebSocket message types for the demo market-data streams.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WebSocketMessage {
    #[serde(rename = "execution")]
    Execution(ExecutionReport),
    #[serde(rename = "depth")]
    Depth(DepthUpdate),
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(rename = "ping")]
    Ping { timestamp_ms: u128 },
    #[serde(rename = "pong")]
    Pong { timestamp_ms: u128 },
}

/// Market depth update for WebSocket streaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthUpdate {
    pub symbol: String,
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
    pub bid_size: Decimal,
    pub ask_size: Decimal,
    pub timestamp_ms: u128,
}
