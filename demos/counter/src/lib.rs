//! # Counter Example
//!
//! A simple counter demonstrating the Unistate state container.
//!
//! This example showcases:
//! - A typed action enum with `#[derive(Action)]`
//! - A reducer with a configurable step that can be hot-swapped
//! - A store enhancer that wraps the reducer with logging
//! - Action creators bound to the store's dispatch
//!
//! ## Example
//!
//! ```
//! use counter::{CounterAction, CounterReducer};
//! use unistate_runtime::{create_store, StoreInit};
//!
//! # fn main() -> Result<(), unistate_core::StoreError> {
//! let store = create_store(CounterReducer::new(1), StoreInit::Empty, None)?;
//!
//! store.dispatch(CounterAction::Increment)?;
//! assert_eq!(store.get_state().count, 1);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use unistate_core::bind::{ActionCreator, CreatorMap};
use unistate_core::{BoxedReducer, Reducer, ReservedAction};
use unistate_macros::Action;
use unistate_runtime::{Enhancer, StoreCreator};

/// Counter state
///
/// Serializable so it can be preloaded from, and written back to, JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    /// Current count value
    pub count: i64,
}

/// Counter actions
#[derive(Action, Debug, Clone, PartialEq, Eq)]
pub enum CounterAction {
    /// Add one step
    Increment,
    /// Subtract one step
    Decrement,
    /// Add an explicit amount, ignoring the step
    #[action(rename = "counter/increment_by")]
    IncrementBy(i64),
    /// Reset the counter to 0
    Reset,
    /// Store bootstrap actions
    #[action(reserved)]
    Store(ReservedAction),
}

/// Counter reducer
///
/// Overflowing the counter is an error; the store keeps its previous state.
#[derive(Debug, Clone, Copy)]
pub struct CounterReducer {
    step: i64,
}

impl CounterReducer {
    /// Create a counter reducer that moves by `step`
    #[must_use]
    pub const fn new(step: i64) -> Self {
        Self { step }
    }
}

impl Default for CounterReducer {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Reducer for CounterReducer {
    type State = CounterState;
    type Action = CounterAction;

    fn reduce(
        &self,
        state: Option<&CounterState>,
        action: &CounterAction,
    ) -> anyhow::Result<CounterState> {
        let count = state.map_or(0, |state| state.count);

        let next = match action {
            CounterAction::Increment => count.checked_add(self.step),
            CounterAction::Decrement => count.checked_sub(self.step),
            CounterAction::IncrementBy(amount) => count.checked_add(*amount),
            CounterAction::Reset => Some(0),
            CounterAction::Store(_) => Some(count),
        };

        let count = next.ok_or_else(|| anyhow::anyhow!("counter overflow on {action:?}"))?;
        Ok(CounterState { count })
    }
}

type CounterCreator = StoreCreator<CounterState, CounterAction>;
type CounterBoxedReducer = BoxedReducer<CounterState, CounterAction>;

/// Wraps a reducer and logs every transition
struct LoggingReducer {
    inner: CounterBoxedReducer,
}

impl Reducer for LoggingReducer {
    type State = CounterState;
    type Action = CounterAction;

    fn reduce(
        &self,
        state: Option<&CounterState>,
        action: &CounterAction,
    ) -> anyhow::Result<CounterState> {
        let next = self.inner.reduce(state, action)?;
        tracing::debug!(
            action = ?action,
            before = ?state.map(|state| state.count),
            after = next.count,
            "Counter reduced"
        );
        Ok(next)
    }
}

/// Store enhancer that installs [`LoggingReducer`] around the given reducer
///
/// Only the reducer passed at creation is wrapped; a reducer installed later
/// with `replace_reducer` is not.
#[must_use]
pub fn logging_enhancer() -> Enhancer<CounterState, CounterAction> {
    Arc::new(|next: CounterCreator| -> CounterCreator {
        Arc::new(move |reducer: CounterBoxedReducer, preloaded: Option<CounterState>| {
            tracing::debug!(preloaded = preloaded.is_some(), "Installing logging reducer");
            let logged: CounterBoxedReducer = Box::new(LoggingReducer { inner: reducer });
            next(logged, preloaded)
        })
    })
}

/// Action creators keyed by name; the argument is the amount for
/// `increment_by` and ignored otherwise
#[must_use]
pub fn action_creators() -> CreatorMap<i64, CounterAction> {
    let increment: ActionCreator<i64, CounterAction> = Arc::new(|_| CounterAction::Increment);
    let decrement: ActionCreator<i64, CounterAction> = Arc::new(|_| CounterAction::Decrement);
    let increment_by: ActionCreator<i64, CounterAction> = Arc::new(CounterAction::IncrementBy);
    let reset: ActionCreator<i64, CounterAction> = Arc::new(|_| CounterAction::Reset);

    CreatorMap::new()
        .creator("increment", increment)
        .creator("decrement", decrement)
        .creator("increment_by", increment_by)
        .creator("reset", reset)
}

/// Parse a JSON snapshot of the counter
///
/// # Errors
///
/// Returns the `serde_json` error if `json` is not a valid snapshot.
pub fn parse_snapshot(json: &str) -> serde_json::Result<CounterState> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use unistate_core::Action;
    use unistate_testing::ReducerTest;

    #[test]
    fn test_increment() {
        ReducerTest::new(CounterReducer::default())
            .given_state(CounterState { count: 0 })
            .when_action(CounterAction::Increment)
            .then_state(|state| assert_eq!(state.count, 1))
            .run();
    }

    #[test]
    fn test_decrement_uses_step() {
        ReducerTest::new(CounterReducer::new(5))
            .given_state(CounterState { count: 5 })
            .when_action(CounterAction::Decrement)
            .then_state(|state| assert_eq!(state.count, 0))
            .run();
    }

    #[test]
    fn test_reset() {
        ReducerTest::new(CounterReducer::default())
            .given_state(CounterState { count: 42 })
            .when_action(CounterAction::Reset)
            .then_state(|state| assert_eq!(state.count, 0))
            .run();
    }

    #[test]
    fn test_bootstrap_without_state() {
        ReducerTest::new(CounterReducer::default())
            .when_action(CounterAction::from_reserved(ReservedAction::Init))
            .then_state(|state| assert_eq!(*state, CounterState::default()))
            .run();
    }

    #[test]
    fn test_overflow_is_an_error() {
        ReducerTest::new(CounterReducer::default())
            .given_state(CounterState { count: i64::MAX })
            .when_action(CounterAction::Increment)
            .then_error(|error| assert!(error.to_string().contains("overflow")))
            .run();
    }

    #[test]
    fn test_action_types() {
        assert_eq!(
            CounterAction::IncrementBy(2).action_type().as_deref(),
            Some("counter/increment_by")
        );
        assert_eq!(CounterAction::ACTION_TYPES.len(), 4);
    }

    #[test]
    fn test_creator_names() {
        let creators = action_creators();
        let names: Vec<&str> = creators.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["increment", "decrement", "increment_by", "reset"]);
    }

    #[test]
    fn test_parse_snapshot() -> serde_json::Result<()> {
        assert_eq!(parse_snapshot(r#"{ "count": 7 }"#)?, CounterState { count: 7 });
        assert!(parse_snapshot("[]").is_err());
        Ok(())
    }
}
