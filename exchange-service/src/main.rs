//! Exchange Service - REST API and WebSocket server fronting the matching
//! engine. Provides HTTP endpoints for order submission/cancel/amend and
//! read-only inspection, plus WebSocket streams for demo market data.

use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use matching_engine::{EngineConfig, HttpMarketDataClient, OrderType};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::info;

mod exchange;
mod types;
mod websocket;

use exchange::Exchange;
use types::*;

const DEMO_SYMBOLS: &[&str] = &["AAPL", "TSLA", "MSFT", "NVDA", "GOOGL"];

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = EngineConfig::from_env();
    let market_data = Arc::new(HttpMarketDataClient::new(
        std::env::var("MARKET_DATA_URL")
            .unwrap_or_else(|_| "https://example-market-data.invalid".to_string()),
        config.api_key.clone(),
    ));

    let exchange = Arc::new(Exchange::new(config, market_data.clone(), market_data));
    exchange.pre_seed(DEMO_SYMBOLS).await;
    exchange.spawn_liquidity_refresh();

    let (execution_tx, _) = broadcast::channel(4096);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/symbols", get(list_symbols))
        .route("/symbols/:symbol/orderbook", get(get_orderbook))
        .route("/symbols/:symbol/depth", get(get_depth))
        .route("/symbols/:symbol/liquidity", get(get_liquidity))
        .route("/symbols/:symbol/orders", post(submit_order))
        .route(
            "/symbols/:symbol/orders/:client_order_id",
            delete(cancel_order).patch(amend_order),
        )
        .route("/symbols/:symbol/executions/stream", get(execution_stream))
        .route("/symbols/:symbol/depth/stream", get(depth_stream))
        .layer(CorsLayer::permissive())
        .with_state(AppState {
            exchange,
            execution_broadcaster: execution_tx,
        });

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .unwrap();

    info!("exchange-service starting on http://0.0.0.0:8080");
    axum::serve(listener, app).await.unwrap();
}

/// Application state shared across all handlers.
#[derive(Clone)]
struct AppState {
    exchange: Arc<Exchange>,
    execution_broadcaster: broadcast::Sender<ExecutionReport>,
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({"status": "healthy", "service": "exchange-service"}))
}

async fn list_symbols(State(state): State<AppState>) -> impl IntoResponse {
    Json(SymbolsResponse {
        symbols: state.exchange.list_symbols(),
    })
}

async fn get_orderbook(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state
        .exchange
        .get_orderbook_state(&symbol)
        .await
        .ok_or(AppError::SymbolNotFound)?;
    Ok(Json(snapshot))
}

async fn get_depth(
    Path(symbol): Path<String>,
    Query(params): Query<DepthQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let depth = state
        .exchange
        .get_market_depth(&symbol, params.levels.unwrap_or(10))
        .await
        .ok_or(AppError::SymbolNotFound)?;
    Ok(Json(depth))
}

async fn get_liquidity(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    Json(state.exchange.liquidity_state(&symbol))
}

async fn submit_order(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<NewOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.order_type == OrderType::Limit && request.price.is_none() {
        return Err(AppError::InvalidRequest("limit order requires a price"));
    }

    let executions = state
        .exchange
        .submit_order(matching_engine::NewOrderRequest {
            client_order_id: request.client_order_id,
            symbol: symbol.clone(),
            side: request.side,
            order_type: request.order_type,
            quantity: request.quantity,
            limit_price: request.price,
            owner: "rest-client".to_string(),
        })
        .await;

    broadcast_executions(&state, &executions);

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            executions: executions.into_iter().map(ExecutionReport::from).collect(),
        }),
    ))
}

async fn cancel_order(
    Path((symbol, client_order_id)): Path<(String, String)>,
    State(state): State<AppState>,
    body: Option<Json<CancelRequest>>,
) -> impl IntoResponse {
    let new_client_order_id = body
        .map(|Json(b)| b.new_client_order_id)
        .unwrap_or_else(|| format!("{client_order_id}-cancel"));

    let executions = state
        .exchange
        .cancel_order(&symbol, &client_order_id, &new_client_order_id)
        .await;
    broadcast_executions(&state, &executions);

    Json(OrderResponse {
        executions: executions.into_iter().map(ExecutionReport::from).collect(),
    })
}

async fn amend_order(
    Path((symbol, client_order_id)): Path<(String, String)>,
    State(state): State<AppState>,
    Json(request): Json<AmendRequest>,
) -> impl IntoResponse {
    let executions = state
        .exchange
        .amend_order(
            &symbol,
            &client_order_id,
            &request.new_client_order_id,
            request.new_quantity,
            request.new_price,
        )
        .await;
    broadcast_executions(&state, &executions);

    Json(OrderResponse {
        executions: executions.into_iter().map(ExecutionReport::from).collect(),
    })
}

fn broadcast_executions(state: &AppState, executions: &[matching_engine::Execution]) {
    for execution in executions {
        let report = ExecutionReport::from(execution.clone());
        let _ = state.execution_broadcaster.send(report);
    }
}

async fn execution_stream(
    Path(symbol): Path<String>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| websocket::handle_execution_stream(socket, symbol, state))
}

async fn depth_stream(
    Path(symbol): Path<String>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| websocket::handle_depth_stream(socket, symbol, state))
}

#[derive(Debug)]
enum AppError {
    SymbolNotFound,
    InvalidRequest(&'static str),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::SymbolNotFound => (StatusCode::NOT_FOUND, "symbol not found".to_string()),
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                code: status.as_u16(),
            }),
        )
            .into_response()
    }
}
