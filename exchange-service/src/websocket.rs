//! WebSocket handlers for the demo execution and market-depth streams.
//!
//! Not a market-data product (§1 non-goals) — a thin convenience so a
//! browser client can watch the book move. Uses `tokio::select!` for
//! concurrent handling of inbound messages, broadcasts, and heartbeats.

use axum::extract::ws::{Message, WebSocket};
use futures::{sink::SinkExt, stream::StreamExt};
use rust_decimal::Decimal;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::{types::*, AppState};

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis()
}

/// Streams execution reports for a symbol as they occur. Ping/pong
/// heartbeat every 30s for connection health monitoring.
pub async fn handle_execution_stream(socket: WebSocket, symbol: String, state: AppState) {
    info!(%symbol, "new execution stream connection");

    let (mut sender, mut receiver) = socket.split();
    let mut execution_rx = state.execution_broadcaster.subscribe();
    let mut ping_interval = interval(Duration::from_secs(30));

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(WebSocketMessage::Ping { timestamp_ms }) = serde_json::from_str(&text) {
                            let pong = WebSocketMessage::Pong { timestamp_ms };
                            if let Ok(json) = serde_json::to_string(&pong) {
                                let _ = sender.send(Message::Text(json)).await;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!(%symbol, "execution stream connection closed");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!(%symbol, error = %e, "websocket error in execution stream");
                        break;
                    }
                    None => break,
                }
            }

            report = execution_rx.recv() => {
                match report {
                    Ok(report) => {
                        if report.symbol == symbol {
                            let ws_msg = WebSocketMessage::Execution(report);
                            if let Ok(json) = serde_json::to_string(&ws_msg) {
                                if sender.send(Message::Text(json)).await.is_err() {
                                    warn!(%symbol, "failed to send execution update");
                                    break;
                                }
                            }
                        }
                    }
                    Err(_) => break,
                }
            }

            _ = ping_interval.tick() => {
                let ping = WebSocketMessage::Ping { timestamp_ms: now_ms() };
                if let Ok(json) = serde_json::to_string(&ping) {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    info!(%symbol, "execution stream handler ended");
}

/// Streams best-price/size depth updates at 10 Hz, but only when prices
/// actually move. Sends an initial snapshot on connect.
pub async fn handle_depth_stream(socket: WebSocket, symbol: String, state: AppState) {
    info!(%symbol, "new depth stream connection");

    let (mut sender, mut receiver) = socket.split();
    let mut update_interval = interval(Duration::from_millis(100));
    let mut ping_interval = interval(Duration::from_secs(30));

    if let Some((best_bid, best_ask)) = state.exchange.get_best_prices(&symbol).await {
        let (bid_size, ask_size) = state
            .exchange
            .get_total_volume(&symbol)
            .await
            .unwrap_or((Decimal::ZERO, Decimal::ZERO));
        let update = DepthUpdate {
            symbol: symbol.clone(),
            best_bid,
            best_ask,
            bid_size,
            ask_size,
            timestamp_ms: now_ms(),
        };
        if let Ok(json) = serde_json::to_string(&WebSocketMessage::Depth(update)) {
            let _ = sender.send(Message::Text(json)).await;
        }
    }

    let mut last_best_bid: Option<Decimal> = None;
    let mut last_best_ask: Option<Decimal> = None;

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(WebSocketMessage::Ping { timestamp_ms }) = serde_json::from_str(&text) {
                            let pong = WebSocketMessage::Pong { timestamp_ms };
                            if let Ok(json) = serde_json::to_string(&pong) {
                                let _ = sender.send(Message::Text(json)).await;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!(%symbol, "depth stream connection closed");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!(%symbol, error = %e, "websocket error in depth stream");
                        break;
                    }
                    None => break,
                }
            }

            _ = update_interval.tick() => {
                if let Some((best_bid, best_ask)) = state.exchange.get_best_prices(&symbol).await {
                    if best_bid != last_best_bid || best_ask != last_best_ask {
                        let (bid_size, ask_size) = state
                            .exchange
                            .get_total_volume(&symbol)
                            .await
                            .unwrap_or((Decimal::ZERO, Decimal::ZERO));

                        let update = DepthUpdate {
                            symbol: symbol.clone(),
                            best_bid,
                            best_ask,
                            bid_size,
                            ask_size,
                            timestamp_ms: now_ms(),
                        };
                        if let Ok(json) = serde_json::to_string(&WebSocketMessage::Depth(update)) {
                            if sender.send(Message::Text(json)).await.is_err() {
                                warn!(%symbol, "failed to send depth update");
                                break;
                            }
                        }

                        last_best_bid = best_bid;
                        last_best_ask = best_ask;
                    }
                }
            }

            _ = ping_interval.tick() => {
                let ping = WebSocketMessage::Ping { timestamp_ms: now_ms() };
                if let Ok(json) = serde_json::to_string(&ping) {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    info!(%symbol, "depth stream handler ended");
}
