use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use matching_engine::{MatchingEngine, NewOrderRequest, Order, OrderType, Side};
use rust_decimal::Decimal;
use tokio::runtime::Runtime;

fn limit_request(cid: String, side: Side, price: i64, qty: i64) -> NewOrderRequest {
    NewOrderRequest {
        client_order_id: cid,
        symbol: "AAPL".to_string(),
        side,
        order_type: OrderType::Limit,
        quantity: Decimal::new(qty, 0),
        limit_price: Some(Decimal::new(price, 2)),
        owner: "bench".to_string(),
    }
}

fn bench_order_submission(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("order_submission");

    for &num_orders in [100, 1000, 10000].iter() {
        group.bench_with_input(
            BenchmarkId::new("non_crossing_orders", num_orders),
            &num_orders,
            |b, &num_orders| {
                b.iter(|| {
                    rt.block_on(async {
                        let engine = MatchingEngine::new();
                        for i in 0..num_orders {
                            let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
                            let price = if i % 2 == 0 {
                                10000 - i as i64
                            } else {
                                10100 + i as i64
                            };
                            let req = limit_request(format!("c{i}"), side, price, 100);
                            black_box(engine.submit(req).await);
                        }
                    })
                })
            },
        );
    }

    group.finish();
}

fn bench_order_matching(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("order_matching");

    for &depth in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("crossing_orders", depth),
            &depth,
            |b, &depth| {
                b.iter_batched(
                    || {
                        rt.block_on(async {
                            let engine = MatchingEngine::new();
                            for i in 0..depth {
                                let ask = limit_request(
                                    format!("ask{i}"),
                                    Side::Sell,
                                    10000 + i as i64,
                                    100,
                                );
                                engine.submit(ask).await;
                                let bid = limit_request(
                                    format!("bid{i}"),
                                    Side::Buy,
                                    9999 - i as i64,
                                    100,
                                );
                                engine.submit(bid).await;
                            }
                            engine
                        })
                    },
                    |engine| {
                        rt.block_on(async {
                            let crossing = limit_request(
                                "crossing".to_string(),
                                Side::Buy,
                                10000 + depth as i64,
                                depth as i64 * 50,
                            );
                            black_box(engine.submit(crossing).await)
                        })
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

fn bench_market_data_access(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("market_data");

    let engine = rt.block_on(async {
        let engine = MatchingEngine::new();
        for i in 0..1000 {
            let ask = limit_request(format!("ask{i}"), Side::Sell, 10000 + i as i64, 100);
            engine.submit(ask).await;
            let bid = limit_request(format!("bid{i}"), Side::Buy, 9999 - i as i64, 100);
            engine.submit(bid).await;
        }
        engine
    });

    let book = engine.book_handle("AAPL").unwrap();

    group.bench_function("best_bid", |b| {
        b.iter(|| rt.block_on(async { black_box(book.read().await.best_bid_price()) }))
    });

    group.bench_function("best_ask", |b| {
        b.iter(|| rt.block_on(async { black_box(book.read().await.best_ask_price()) }))
    });

    group.finish();
}

fn bench_price_levels_operations(c: &mut Criterion) {
    use matching_engine::PriceLevels;

    let mut group = c.benchmark_group("price_levels");

    let order = |id: u64, side: Side, price: i64| Order {
        client_order_id: format!("c{id}"),
        exchange_order_id: matching_engine::ExchangeOrderId(id),
        symbol: "AAPL".to_string(),
        side,
        order_type: OrderType::Limit,
        original_qty: Decimal::new(100, 0),
        filled_qty: Decimal::ZERO,
        remaining_qty: Decimal::new(100, 0),
        limit_price: Some(Decimal::new(price, 2)),
        status: matching_engine::OrderStatus::New,
        owner: "bench".to_string(),
        created_at_ns: id as u128,
    };

    let mut bids = PriceLevels::new(Side::Buy);
    let mut asks = PriceLevels::new(Side::Sell);

    for i in 0..1000u64 {
        bids.push_back(order(i, Side::Buy, 9999 - i as i64));
        asks.push_back(order(i + 1000, Side::Sell, 10000 + i as i64));
    }

    group.bench_function("best_price_bid", |b| b.iter(|| black_box(bids.best_price())));
    group.bench_function("best_price_ask", |b| b.iter(|| black_box(asks.best_price())));
    group.bench_function("total_len_bid", |b| b.iter(|| black_box(bids.total_len())));
    group.bench_function("peek_best", |b| b.iter(|| black_box(bids.peek_best())));

    group.finish();
}

fn bench_order_cancellation(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("cancellation");

    for &num_orders in [100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("eager_remove", num_orders),
            &num_orders,
            |b, &num_orders| {
                b.iter_batched(
                    || {
                        rt.block_on(async {
                            let engine = MatchingEngine::new();
                            let mut client_ids = Vec::new();
                            for i in 0..num_orders {
                                let cid = format!("c{i}");
                                engine
                                    .submit(limit_request(cid.clone(), Side::Buy, 10000, 100))
                                    .await;
                                client_ids.push(cid);
                            }
                            (engine, client_ids)
                        })
                    },
                    |(engine, client_ids)| {
                        rt.block_on(async {
                            for (i, cid) in client_ids.iter().enumerate() {
                                if i % 2 == 0 {
                                    black_box(
                                        engine
                                            .cancel("AAPL", cid, &format!("cancel-{cid}"))
                                            .await,
                                    );
                                }
                            }
                        })
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

fn bench_high_frequency_scenario(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("hft_scenario");

    group.bench_function("rapid_order_flow", |b| {
        b.iter(|| {
            rt.block_on(async {
                let engine = MatchingEngine::new();
                let mut order_id = 0u64;

                for _ in 0..100 {
                    for i in 0..5 {
                        let ask =
                            limit_request(format!("c{order_id}"), Side::Sell, 10000 + i, 100);
                        order_id += 1;
                        engine.submit(ask).await;

                        let bid =
                            limit_request(format!("c{order_id}"), Side::Buy, 9999 - i, 100);
                        order_id += 1;
                        engine.submit(bid).await;
                    }

                    let crossing =
                        limit_request(format!("c{order_id}"), Side::Buy, 10002, 300);
                    order_id += 1;
                    black_box(engine.submit(crossing).await);

                    let book = engine.book_handle("AAPL").unwrap();
                    let book = book.read().await;
                    black_box(book.best_bid_price());
                    black_box(book.best_ask_price());
                }
            })
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_order_submission,
    bench_order_matching,
    bench_market_data_access,
    bench_price_levels_operations,
    bench_order_cancellation,
    bench_high_frequency_scenario
);

criterion_main!(benches);
