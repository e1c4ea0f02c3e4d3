//! Counter example binary
//!
//! Demonstrates the Unistate store with a simple counter.

use std::sync::Arc;

use anyhow::Context;
use counter::{CounterAction, CounterReducer, CounterState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unistate_core::{bind::bind_action_creators, compose_all};
use unistate_runtime::{Observable, StoreConfig, StoreInit, create_store_with_config};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "counter=debug,unistate_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Descriptions apply to whichever recorder gets installed
    unistate_runtime::metrics::register_metrics();

    println!("=== Counter Example: Unistate ===\n");

    let preloaded = counter::parse_snapshot(r#"{ "count": 5 }"#)?;
    let enhancer = compose_all(vec![counter::logging_enhancer()]);
    let store = create_store_with_config(
        CounterReducer::new(1),
        StoreInit::State(preloaded),
        Some(enhancer),
        StoreConfig::default().with_name("counter"),
    )?;

    println!("Initial count: {}", store.get_state().count);

    let reader = store.downgrade();
    let listener = store.subscribe(move || {
        if let Some(store) = reader.upgrade() {
            println!("  listener sees count = {}", store.get_state().count);
        }
    })?;

    let observer = store.observable().subscribe(|state: &Arc<CounterState>| {
        tracing::info!(count = state.count, "Observed state");
    })?;

    let creators = bind_action_creators(counter::action_creators(), store.dispatcher())?
        .into_map()
        .context("creators were bound from a map")?;

    let calls = [
        ("increment", 0),
        ("increment", 0),
        ("increment_by", 10),
        ("decrement", 0),
    ];
    for (name, arg) in calls {
        println!("\n>>> Calling: {name}({arg})");
        creators.call(name, arg).context("unknown action creator")??;
    }

    println!("\n>>> Dispatching: IncrementBy(i64::MAX)");
    if let Err(err) = store.dispatch(CounterAction::IncrementBy(i64::MAX)) {
        println!("Rejected: {err}");
    }

    println!("\n>>> Replacing reducer with step 5");
    store.replace_reducer(CounterReducer::new(5))?;

    println!("\n>>> Dispatching: Increment");
    store.dispatch(CounterAction::Increment)?;

    println!("\nSnapshot: {}", serde_json::to_string(&*store.get_state())?);

    listener.unsubscribe()?;
    observer.unsubscribe()?;

    println!("\n>>> Dispatching: Reset (no listeners)");
    store.dispatch(CounterAction::Reset)?;
    println!("Count after Reset: {}", store.get_state().count);

    println!("\n=== Demonstration Complete ===");
    println!("\nKey concepts demonstrated:");
    println!("  • State: CounterState (preloaded from JSON)");
    println!("  • Action: CounterAction (#[derive(Action)])");
    println!("  • Reducer: (state, action) → new state");
    println!("  • Enhancer: logging wrapper around store creation");
    println!("  • Bound action creators and observable subscriptions");

    Ok(())
}
