//! Dispatch Performance Benchmarks
//!
//! These benchmarks track the cost of the synchronous dispatch path:
//! - Reducer execution in isolation
//! - Store dispatch (validation, reducer, state swap, notification)
//! - Notification fan-out as listener counts grow
//! - Subscribe/unsubscribe churn against the copy-on-write registry
//!
//! Run with: `cargo bench`

#![allow(missing_docs)] // Benchmarks don't need extensive docs
#![allow(clippy::expect_used)] // Benchmarks can use expect for setup

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};
use unistate_core::{Reducer, ReservedAction, from_fn};
use unistate_macros::Action;
use unistate_runtime::{Store, StoreInit, create_store};

// Test state
#[derive(Clone, Debug)]
struct BenchState {
    counter: i64,
    data: Vec<u8>, // For testing state size impact
}

impl Default for BenchState {
    fn default() -> Self {
        Self {
            counter: 0,
            data: vec![0; 1024], // 1KB of data
        }
    }
}

// Test actions
#[derive(Action, Clone, Debug)]
enum BenchAction {
    Increment,
    SetValue(i64),
    NoOp,
    #[action(reserved)]
    Store(ReservedAction),
}

fn bench_reduce(state: Option<&BenchState>, action: &BenchAction) -> BenchState {
    let mut next = state.cloned().unwrap_or_default();
    match action {
        BenchAction::Increment => next.counter += 1,
        BenchAction::SetValue(value) => next.counter = *value,
        BenchAction::NoOp | BenchAction::Store(_) => {},
    }
    next
}

fn typed_store() -> Store<BenchState, BenchAction> {
    create_store(from_fn(bench_reduce), StoreInit::Empty, None).expect("Failed to create store")
}

fn json_store() -> Store<i64, Value> {
    let reducer = from_fn(|state: Option<&i64>, action: &Value| {
        let count = state.copied().unwrap_or_default();
        if action["type"] == "increment" { count + 1 } else { count }
    });
    create_store(reducer, StoreInit::Empty, None).expect("Failed to create store")
}

/// Benchmark reducer execution in isolation (no Store overhead)
fn benchmark_reducer_execution(c: &mut Criterion) {
    let mut group = c.benchmark_group("reducer");
    group.throughput(Throughput::Elements(1));

    let reducer = from_fn(bench_reduce);
    let state = BenchState::default();

    group.bench_function("increment", |b| {
        b.iter(|| reducer.reduce(Some(&state), black_box(&BenchAction::Increment)));
    });

    group.bench_function("set_value", |b| {
        b.iter(|| reducer.reduce(Some(&state), black_box(&BenchAction::SetValue(42))));
    });

    group.finish();
}

/// Benchmark Store throughput (actions/sec)
fn benchmark_store_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_throughput");
    group.throughput(Throughput::Elements(1));

    group.bench_function("dispatch_typed", |b| {
        let store = typed_store();
        b.iter(|| {
            let _ = store.dispatch(black_box(BenchAction::Increment));
        });
    });

    group.bench_function("dispatch_and_read_state", |b| {
        let store = typed_store();
        b.iter(|| {
            let _ = store.dispatch(black_box(BenchAction::NoOp));
            black_box(store.get_state().data.len())
        });
    });

    group.bench_function("dispatch_json", |b| {
        let store = json_store();
        b.iter(|| {
            let _ = store.dispatch(black_box(json!({ "type": "increment" })));
        });
    });

    group.finish();
}

/// Benchmark notification fan-out
fn benchmark_listener_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("listener_fanout");

    for listeners in [0_usize, 1, 10, 100] {
        group.throughput(Throughput::Elements(listeners.max(1) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(listeners), &listeners, |b, &listeners| {
            let store = typed_store();
            let _subscriptions: Vec<_> = (0..listeners)
                .map(|_| {
                    let reader = store.downgrade();
                    store
                        .subscribe(move || {
                            if let Some(store) = reader.upgrade() {
                                black_box(store.get_state().counter);
                            }
                        })
                        .expect("Failed to subscribe")
                })
                .collect();

            b.iter(|| {
                let _ = store.dispatch(black_box(BenchAction::Increment));
            });
        });
    }

    group.finish();
}

/// Benchmark subscribe/unsubscribe churn between dispatches
fn benchmark_subscription_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("subscription_churn");
    group.throughput(Throughput::Elements(1));

    group.bench_function("subscribe_dispatch_unsubscribe", |b| {
        let store = typed_store();
        let _base: Vec<_> = (0..10)
            .map(|_| store.subscribe(|| {}).expect("Failed to subscribe"))
            .collect();

        b.iter(|| {
            let subscription = store.subscribe(|| {}).expect("Failed to subscribe");
            let _ = store.dispatch(black_box(BenchAction::NoOp));
            subscription.unsubscribe().expect("Failed to unsubscribe");
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_reducer_execution,
    benchmark_store_throughput,
    benchmark_listener_fanout,
    benchmark_subscription_churn,
);
criterion_main!(benches);
