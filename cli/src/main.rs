use clap::{Parser, Subcommand};
use matching_engine::{ExecType, OrderStatus, OrderType, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "hftx-cli")]
#[command(about = "Exchange CLI - command line client for the matching engine's REST API")]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    server: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Submit {
        #[arg(short = 's', long)]
        symbol: String,
        #[arg(long, value_parser = parse_side)]
        side: Side,
        #[arg(long, value_parser = parse_order_type, default_value = "limit")]
        order_type: OrderType,
        #[arg(short = 'p', long)]
        price: Option<Decimal>,
        #[arg(short = 'q', long)]
        quantity: Decimal,
        #[arg(long, default_value = "cli-order")]
        client_order_id: String,
    },
    Cancel {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        client_order_id: String,
        #[arg(long)]
        new_client_order_id: Option<String>,
    },
    Amend {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        client_order_id: String,
        #[arg(long)]
        new_client_order_id: String,
        #[arg(long)]
        quantity: Option<Decimal>,
        #[arg(long)]
        price: Option<Decimal>,
    },
    Status {
        #[arg(short, long)]
        symbol: Option<String>,
    },
    Depth {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, default_value = "10")]
        levels: usize,
    },
    Liquidity {
        #[arg(short, long)]
        symbol: String,
    },
    Health,
    Symbols,
}

#[derive(Serialize)]
struct NewOrderRequest {
    client_order_id: String,
    side: Side,
    order_type: OrderType,
    quantity: Decimal,
    price: Option<Decimal>,
}

#[derive(Serialize)]
struct CancelRequest {
    new_client_order_id: String,
}

#[derive(Serialize)]
struct AmendRequest {
    orig_client_order_id: String,
    new_client_order_id: String,
    new_quantity: Option<Decimal>,
    new_price: Option<Decimal>,
}

#[derive(Deserialize)]
struct OrderResponse {
    executions: Vec<ExecutionReport>,
}

#[derive(Deserialize)]
struct ExecutionReport {
    execution_type: ExecType,
    order_status: OrderStatus,
    client_order_id: String,
    leaves_quantity: Decimal,
    cumulative_quantity: Decimal,
    last_quantity: Option<Decimal>,
    last_price: Option<Decimal>,
}

#[derive(Deserialize)]
struct SymbolsResponse {
    symbols: Vec<String>,
}

#[derive(Deserialize)]
struct OrderBookState {
    symbol: String,
    best_bid: Option<Decimal>,
    best_ask: Option<Decimal>,
    bid_levels: usize,
    ask_levels: usize,
}

#[derive(Deserialize)]
struct MarketDepth {
    symbol: String,
    bids: Vec<PriceLevelView>,
    asks: Vec<PriceLevelView>,
}

#[derive(Deserialize)]
struct PriceLevelView {
    price: Decimal,
    quantity: Decimal,
    orders: usize,
}

#[derive(Deserialize)]
struct LiquidityState {
    symbol: String,
    active: bool,
}

fn parse_side(s: &str) -> Result<Side, String> {
    match s.to_lowercase().as_str() {
        "buy" | "bid" => Ok(Side::Buy),
        "sell" | "ask" => Ok(Side::Sell),
        _ => Err(format!("invalid side: {s}. use 'buy' or 'sell'")),
    }
}

fn parse_order_type(s: &str) -> Result<OrderType, String> {
    match s.to_lowercase().as_str() {
        "limit" => Ok(OrderType::Limit),
        "market" => Ok(OrderType::Market),
        _ => Err(format!("invalid order type: {s}. use 'limit' or 'market'")),
    }
}

fn print_executions(executions: &[ExecutionReport]) {
    for exec in executions {
        print!(
            "{:?} {:?} client_order_id={} leaves={} cum={}",
            exec.execution_type,
            exec.order_status,
            exec.client_order_id,
            exec.leaves_quantity,
            exec.cumulative_quantity,
        );
        if let (Some(qty), Some(px)) = (exec.last_quantity, exec.last_price) {
            print!(" last={qty}@{px}");
        }
        println!();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Submit {
            symbol,
            side,
            order_type,
            price,
            quantity,
            client_order_id,
        } => {
            let request = NewOrderRequest {
                client_order_id,
                side,
                order_type,
                quantity,
                price,
            };

            let response = client
                .post(format!("{}/symbols/{}/orders", cli.server, symbol))
                .json(&request)
                .send()
                .await?;

            if response.status().is_success() {
                let result: OrderResponse = response.json().await?;
                print_executions(&result.executions);
            } else {
                println!("Error: {}", response.status());
                println!("{}", response.text().await?);
            }
        }

        Commands::Cancel {
            symbol,
            client_order_id,
            new_client_order_id,
        } => {
            let new_client_order_id =
                new_client_order_id.unwrap_or_else(|| format!("{client_order_id}-cancel"));
            let response = client
                .delete(format!(
                    "{}/symbols/{}/orders/{}",
                    cli.server, symbol, client_order_id
                ))
                .json(&CancelRequest { new_client_order_id })
                .send()
                .await?;

            if response.status().is_success() {
                let result: OrderResponse = response.json().await?;
                print_executions(&result.executions);
            } else {
                println!("Error: {}", response.status());
                println!("{}", response.text().await?);
            }
        }

        Commands::Amend {
            symbol,
            client_order_id,
            new_client_order_id,
            quantity,
            price,
        } => {
            let request = AmendRequest {
                orig_client_order_id: client_order_id.clone(),
                new_client_order_id,
                new_quantity: quantity,
                new_price: price,
            };

            let response = client
                .patch(format!(
                    "{}/symbols/{}/orders/{}",
                    cli.server, symbol, client_order_id
                ))
                .json(&request)
                .send()
                .await?;

            if response.status().is_success() {
                let result: OrderResponse = response.json().await?;
                print_executions(&result.executions);
            } else {
                println!("Error: {}", response.status());
                println!("{}", response.text().await?);
            }
        }

        Commands::Status { symbol } => match symbol {
            Some(sym) => {
                let response = client
                    .get(format!("{}/symbols/{}/orderbook", cli.server, sym))
                    .send()
                    .await?;

                if response.status().is_success() {
                    let state: OrderBookState = response.json().await?;
                    println!("Symbol: {}", state.symbol);
                    println!("Best Bid: {:?}", state.best_bid);
                    println!("Best Ask: {:?}", state.best_ask);
                    println!("Bid Levels: {}", state.bid_levels);
                    println!("Ask Levels: {}", state.ask_levels);
                } else {
                    println!("Error: {}", response.status());
                }
            }
            None => {
                let response = client.get(format!("{}/symbols", cli.server)).send().await?;

                if response.status().is_success() {
                    let symbols: SymbolsResponse = response.json().await?;
                    println!("Active symbols:");
                    for symbol in symbols.symbols {
                        let state_response = client
                            .get(format!("{}/symbols/{}/orderbook", cli.server, symbol))
                            .send()
                            .await?;

                        if state_response.status().is_success() {
                            let state: OrderBookState = state_response.json().await?;
                            println!(
                                "  {}: bid={:?}, ask={:?}",
                                symbol, state.best_bid, state.best_ask
                            );
                        }
                    }
                } else {
                    println!("Error: {}", response.status());
                }
            }
        },

        Commands::Depth { symbol, levels } => {
            let response = client
                .get(format!(
                    "{}/symbols/{}/depth?levels={}",
                    cli.server, symbol, levels
                ))
                .send()
                .await?;

            if response.status().is_success() {
                let depth: MarketDepth = response.json().await?;

                println!("Market Depth for {}", depth.symbol);
                println!("\nAsks:");
                for (i, level) in depth.asks.iter().enumerate() {
                    println!(
                        "  {}: {} @ {} ({} orders)",
                        i + 1,
                        level.quantity,
                        level.price,
                        level.orders
                    );
                }

                println!("\nBids:");
                for (i, level) in depth.bids.iter().enumerate() {
                    println!(
                        "  {}: {} @ {} ({} orders)",
                        i + 1,
                        level.quantity,
                        level.price,
                        level.orders
                    );
                }
            } else {
                println!("Error: {}", response.status());
            }
        }

        Commands::Liquidity { symbol } => {
            let response = client
                .get(format!("{}/symbols/{}/liquidity", cli.server, symbol))
                .send()
                .await?;

            if response.status().is_success() {
                let state: LiquidityState = response.json().await?;
                println!("Symbol: {}", state.symbol);
                println!("Liquidity active: {}", state.active);
            } else {
                println!("Error: {}", response.status());
            }
        }

        Commands::Health => {
            let response = client.get(format!("{}/health", cli.server)).send().await?;

            if response.status().is_success() {
                let health: serde_json::Value = response.json().await?;
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                println!("Error: {}", response.status());
            }
        }

        Commands::Symbols => {
            let response = client.get(format!("{}/symbols", cli.server)).send().await?;

            if response.status().is_success() {
                let symbols: SymbolsResponse = response.json().await?;
                for symbol in symbols.symbols {
                    println!("{}", symbol);
                }
            } else {
                println!("Error: {}", response.status());
            }
        }
    }

    Ok(())
}
