//! # Unistate Testing
//!
//! Testing utilities and helpers for the Unistate state container.
//!
//! This crate provides:
//! - A Given-When-Then builder for reducers ([`ReducerTest`])
//! - Recording listeners and observers
//! - Replay helpers that predict store state
//! - Property-based testing strategies for actions
//!
//! ## Example
//!
//! ```
//! use serde_json::{json, Value};
//! use unistate_core::from_fn;
//! use unistate_runtime::{create_store, StoreInit};
//! use unistate_testing::{CallRecorder, helpers::fold_actions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let reducer = from_fn(|state: Option<&i64>, action: &Value| {
//!     state.copied().unwrap_or_default() + action["by"].as_i64().unwrap_or_default()
//! });
//! let actions = vec![json!({ "type": "add", "by": 2 }), json!({ "type": "add", "by": 3 })];
//! let expected = fold_actions(&reducer, None, &actions)?;
//!
//! let store = create_store(reducer, StoreInit::Empty, None)?;
//! let recorder = CallRecorder::new();
//! let _subscription = store.subscribe_listener(recorder.listener())?;
//! for action in actions {
//!     store.dispatch(action)?;
//! }
//!
//! assert_eq!(*store.get_state(), expected);
//! assert_eq!(recorder.calls(), 2);
//! # Ok(())
//! # }
//! ```


pub use reducer_test::ReducerTest;

/// Recording listeners and observers
pub mod mocks {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};

    use unistate_runtime::{Listener, Observer};

    /// Counts listener invocations
    ///
    /// Every call to [`CallRecorder::listener`] returns a new listener
    /// identity that feeds the same counter.
    ///
    /// # Example
    ///
    /// ```
    /// use unistate_testing::mocks::CallRecorder;
    ///
    /// let recorder = CallRecorder::new();
    /// let listener = recorder.listener();
    /// listener();
    /// listener();
    /// assert_eq!(recorder.calls(), 2);
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct CallRecorder {
        calls: Arc<AtomicUsize>,
    }

    impl CallRecorder {
        /// Create a recorder with zero calls
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// A listener that increments this recorder
        #[must_use]
        pub fn listener(&self) -> Listener {
            let calls = Arc::clone(&self.calls);
            Arc::new(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        }

        /// Number of recorded calls
        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Forget recorded calls
        pub fn reset(&self) {
            self.calls.store(0, Ordering::SeqCst);
        }
    }

    /// Observer that keeps every state it receives
    #[derive(Debug)]
    pub struct StateRecorder<S> {
        seen: Arc<Mutex<Vec<Arc<S>>>>,
    }

    impl<S> Clone for StateRecorder<S> {
        fn clone(&self) -> Self {
            Self {
                seen: Arc::clone(&self.seen),
            }
        }
    }

    impl<S> Default for StateRecorder<S> {
        fn default() -> Self {
            Self {
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl<S> StateRecorder<S> {
        /// Create an empty recorder
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// States received so far, oldest first
        #[must_use]
        pub fn states(&self) -> Vec<Arc<S>> {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl<S> Observer<S> for StateRecorder<S>
    where
        S: Send + Sync + 'static,
    {
        fn next(&self, value: &Arc<S>) {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(Arc::clone(value));
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    use unistate_core::{Action, Reducer, ReservedAction};

    /// The state a fresh store reaches after dispatching `actions`
    ///
    /// Runs the bootstrap [`ReservedAction::Init`] on `preloaded`, then
    /// left-folds the reducer over `actions`.
    ///
    /// # Errors
    ///
    /// Returns the first reducer error.
    pub fn fold_actions<'a, R>(
        reducer: &R,
        preloaded: Option<R::State>,
        actions: impl IntoIterator<Item = &'a R::Action>,
    ) -> anyhow::Result<R::State>
    where
        R: Reducer,
        R::Action: Action + 'a,
    {
        let bootstrap = R::Action::from_reserved(ReservedAction::Init);
        let mut state = reducer.reduce(preloaded.as_ref(), &bootstrap)?;
        for action in actions {
            state = reducer.reduce(Some(&state), action)?;
        }
        Ok(state)
    }

    /// A JSON action record with only a `type`
    #[must_use]
    pub fn json_action(action_type: &str) -> serde_json::Value {
        serde_json::json!({ "type": action_type })
    }

    /// Install a test-friendly `tracing` subscriber
    ///
    /// Honors `RUST_LOG`. Safe to call from every test; only the first call
    /// installs anything.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest
pub mod properties {
    use proptest::prelude::*;
    use serde_json::{Value, json};

    /// Application action types, never in the reserved namespace
    pub fn action_type() -> impl Strategy<Value = String> {
        "[a-z]{1,8}(/[a-z]{1,8})?"
    }

    /// JSON action records with a `type` and an integer `by` payload
    pub fn json_action() -> impl Strategy<Value = Value> {
        (action_type(), -100_i64..100)
            .prop_map(|(action_type, by)| json!({ "type": action_type, "by": by }))
    }

    /// Sequences of [`json_action`] up to `max_len` long
    pub fn json_actions(max_len: usize) -> impl Strategy<Value = Vec<Value>> {
        prop::collection::vec(json_action(), 0..=max_len)
    }

    /// JSON values that are not action records
    pub fn non_record() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,8}".prop_map(Value::String),
            prop::collection::vec(any::<i32>(), 0..4).prop_map(|items| json!(items)),
        ]
    }
}

// Re-export commonly used items
pub use mocks::{CallRecorder, StateRecorder};
