//! Observable adapter
//!
//! Reactive libraries interoperate with a store through the [`Observable`]
//! trait instead of depending on the store type. The adapter delivers the
//! current state to an [`Observer`] once on subscription and again after
//! every notification pass.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use serde_json::{json, Value};
//! use unistate_core::from_fn;
//! use unistate_runtime::{create_store, Observable, StoreInit};
//!
//! # fn main() -> Result<(), unistate_core::StoreError> {
//! let reducer = from_fn(|state: Option<&u32>, action: &Value| {
//!     state.copied().unwrap_or_default() + u32::from(action["type"] == "tick")
//! });
//! let store = create_store(reducer, StoreInit::Empty, None)?;
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let subscription = store.observable().subscribe(move |state: &Arc<u32>| {
//!     sink.lock().map(|mut seen| seen.push(**state)).ok();
//! })?;
//!
//! store.dispatch(json!({ "type": "tick" }))?;
//! subscription.unsubscribe()?;
//! store.dispatch(json!({ "type": "tick" }))?;
//!
//! let seen = seen.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
//! assert_eq!(*seen, vec![0, 1]);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use unistate_core::{Action, StoreError};

use crate::store::{Store, Subscription};

/// Receives state values from an [`Observable`]
///
/// `next` is optional: the default implementation ignores every value.
pub trait Observer<T>: Send + Sync + 'static {
    /// Called with the current state
    fn next(&self, _value: &Arc<T>) {}
}

impl<T, F> Observer<T> for F
where
    F: Fn(&Arc<T>) + Send + Sync + 'static,
{
    fn next(&self, value: &Arc<T>) {
        self(value);
    }
}

/// The interop interface for reactive consumers
pub trait Observable {
    /// Type of the values delivered to observers
    type Item;

    /// Start observing
    ///
    /// # Errors
    ///
    /// Implementations may refuse a subscription; the store adapter returns
    /// [`StoreError::InvalidOperation`] while its reducer is executing.
    fn subscribe<O>(&self, observer: O) -> Result<ObservableSubscription, StoreError>
    where
        O: Observer<Self::Item>;

    /// The observable itself
    fn observable(&self) -> &Self {
        self
    }
}

/// Observable view over a [`Store`]'s state
pub struct StateObservable<S, A> {
    store: Store<S, A>,
}

impl<S, A> StateObservable<S, A> {
    pub(crate) const fn new(store: Store<S, A>) -> Self {
        Self { store }
    }
}

impl<S, A> Clone for StateObservable<S, A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S, A> Observable for StateObservable<S, A>
where
    S: Send + Sync + 'static,
    A: Action + 'static,
{
    type Item = S;

    fn subscribe<O>(&self, observer: O) -> Result<ObservableSubscription, StoreError>
    where
        O: Observer<S>,
    {
        let observer = Arc::new(observer);
        observer.next(&self.store.get_state());

        let weak = self.store.downgrade();
        let forward = Arc::clone(&observer);
        let subscription = self.store.subscribe(move || {
            if let Some(store) = weak.upgrade() {
                forward.next(&store.get_state());
            }
        })?;

        Ok(ObservableSubscription { subscription })
    }
}

/// Handle returned by [`Observable::subscribe`]
#[derive(Debug)]
pub struct ObservableSubscription {
    subscription: Subscription,
}

impl ObservableSubscription {
    /// Stop delivering values
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidOperation`] if called while the reducer
    /// is executing.
    pub fn unsubscribe(&self) -> Result<(), StoreError> {
        self.subscription.unsubscribe()
    }

    /// True until unsubscribed
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{StoreInit, create_store};
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use unistate_core::from_fn;

    fn counter_store() -> Result<Store<i64, Value>, StoreError> {
        let reducer = from_fn(|state: Option<&i64>, action: &Value| {
            let count = state.copied().unwrap_or_default();
            if action["type"] == "increment" { count + 1 } else { count }
        });
        create_store(reducer, StoreInit::State(5), None)
    }

    struct Silent;

    impl Observer<i64> for Silent {}

    #[test]
    fn test_observer_gets_current_state_immediately() -> Result<(), StoreError> {
        let store = counter_store()?;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let _subscription = store.observable().subscribe(move |state: &Arc<i64>| {
            sink.lock().unwrap_or_else(std::sync::PoisonError::into_inner).push(**state);
        })?;

        let seen = seen.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        assert_eq!(*seen, vec![5]);
        Ok(())
    }

    #[test]
    fn test_observer_follows_dispatches_until_unsubscribed() -> Result<(), StoreError> {
        let store = counter_store()?;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let subscription = store.observable().subscribe(move |_: &Arc<i64>| {
            counter.fetch_add(1, Ordering::SeqCst);
        })?;

        store.dispatch(json!({ "type": "increment" }))?;
        store.dispatch(json!({ "type": "increment" }))?;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        subscription.unsubscribe()?;
        assert!(!subscription.is_active());
        store.dispatch(json!({ "type": "increment" }))?;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        Ok(())
    }

    #[test]
    fn test_observer_without_next_is_accepted() -> Result<(), StoreError> {
        let store = counter_store()?;
        let subscription = store.observable().subscribe(Silent)?;
        assert_eq!(store.listener_count(), 1);
        store.dispatch(json!({ "type": "increment" }))?;
        subscription.unsubscribe()?;
        assert_eq!(store.listener_count(), 0);
        Ok(())
    }

    #[test]
    fn test_observable_returns_itself() -> Result<(), StoreError> {
        let store = counter_store()?;
        let observable = store.observable();
        assert!(std::ptr::eq(observable.observable(), &observable));
        Ok(())
    }
}
