//! Store module - the state container
//!
//! A [`Store`] owns the current state, the active reducer and the listener
//! registry. State changes only through [`Store::dispatch`], which runs the
//! reducer synchronously and then notifies every listener from a snapshot of
//! the registry.
//!
//! # Dispatch protocol
//!
//! 1. The action must be a record with a `type` discriminant
//! 2. A dispatch-in-progress flag forbids reentrant dispatch from the reducer
//! 3. The reducer result replaces the state; a failing or panicking reducer
//!    leaves state untouched and always releases the flag
//! 4. Listeners run in registration order from the snapshot taken after the
//!    reducer finished; a panicking listener aborts the rest of the pass, but
//!    the new state is already committed
//!
//! # Construction
//!
//! [`create_store`] runs one [`ReservedAction::Init`] dispatch before it
//! returns, so state is always populated. An [`Enhancer`] may take over
//! construction: it receives the base [`StoreCreator`] and returns the
//! creator that actually builds the store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::time::Instant;

use unistate_core::compose::Unary;
use unistate_core::{Action, BoxedReducer, Reducer, ReservedAction, StoreError};

use crate::StoreConfig;
use crate::metrics::{
    DISPATCH_REJECTED, DISPATCH_TOTAL, LISTENERS, REDUCER_DURATION_SECONDS,
};
use crate::observable::StateObservable;
use crate::registry::{Listener, ListenerRegistry};

type SharedReducer<S, A> = Arc<dyn Reducer<State = S, Action = A> + Send + Sync>;

/// A store constructor: `(reducer, preloaded state) → store`
pub type StoreCreator<S, A> =
    Arc<dyn Fn(BoxedReducer<S, A>, Option<S>) -> Result<Store<S, A>, StoreError> + Send + Sync>;

/// A store enhancer: wraps one store constructor into another
///
/// Several enhancers are chained with
/// [`compose_all`](unistate_core::compose_all); the leftmost enhancer is the
/// outermost wrapper.
pub type Enhancer<S, A> = Unary<StoreCreator<S, A>>;

/// Second positional argument of [`create_store`]
///
/// Either the preloaded state or, when no third argument is given, the
/// enhancer.
pub enum StoreInit<S, A> {
    /// No preloaded state; the reducer supplies its default
    Empty,
    /// Preloaded state handed to the bootstrap dispatch
    State(S),
    /// An enhancer passed in the preloaded-state position
    Enhancer(Enhancer<S, A>),
}

impl<S, A> From<Option<S>> for StoreInit<S, A> {
    fn from(state: Option<S>) -> Self {
        state.map_or(Self::Empty, Self::State)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T: Clone>(lock: &RwLock<T>) -> T {
    lock.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn write<T>(lock: &RwLock<T>, value: T) {
    *lock.write().unwrap_or_else(PoisonError::into_inner) = value;
}

/// Holds the dispatch-in-progress flag; clears it on drop, including unwinds
struct DispatchGuard<'a>(&'a AtomicBool);

impl<'a> DispatchGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Inner<S, A> {
    config: StoreConfig,
    reducer: RwLock<SharedReducer<S, A>>,
    state: RwLock<Arc<S>>,
    listeners: Arc<Mutex<ListenerRegistry>>,
    dispatching: Arc<AtomicBool>,
}

/// The Store - a single state cell advanced by a reducer
///
/// Cloning a `Store` is cheap and yields another handle to the same store.
///
/// # Example
///
/// ```
/// use serde_json::{json, Value};
/// use unistate_core::from_fn;
/// use unistate_runtime::{create_store, StoreInit};
///
/// # fn main() -> Result<(), unistate_core::StoreError> {
/// let reducer = from_fn(|state: Option<&Vec<String>>, action: &Value| {
///     let mut todos = state.cloned().unwrap_or_default();
///     if action["type"] == "add" {
///         todos.push(action["text"].as_str().unwrap_or_default().to_string());
///     }
///     todos
/// });
///
/// let store = create_store(reducer, StoreInit::State(vec!["write docs".to_string()]), None)?;
/// let subscription = store.subscribe(|| println!("todos changed"))?;
///
/// store.dispatch(json!({ "type": "add", "text": "ship it" }))?;
/// assert_eq!(store.get_state().len(), 2);
///
/// subscription.unsubscribe()?;
/// # Ok(())
/// # }
/// ```
pub struct Store<S, A> {
    inner: Arc<Inner<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A> std::fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.config.name)
            .field("dispatching", &self.inner.dispatching.load(Ordering::Acquire))
            .field("listeners", &lock(&self.inner.listeners).len())
            .finish_non_exhaustive()
    }
}

/// A non-owning store handle
///
/// Listeners and reducers that need to reach their own store hold one of
/// these so the store does not keep itself alive.
pub struct WeakStore<S, A> {
    inner: Weak<Inner<S, A>>,
}

impl<S, A> Clone for WeakStore<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S, A> std::fmt::Debug for WeakStore<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakStore")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish_non_exhaustive()
    }
}

impl<S, A> WeakStore<S, A> {
    /// Get a strong handle if the store is still alive
    #[must_use]
    pub fn upgrade(&self) -> Option<Store<S, A>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl<S, A> Store<S, A>
where
    S: Send + Sync + 'static,
    A: Action + 'static,
{
    /// Build a store and run the bootstrap dispatch
    fn build(
        reducer: BoxedReducer<S, A>,
        preloaded: Option<S>,
        config: StoreConfig,
    ) -> Result<Self, StoreError> {
        let reducer: SharedReducer<S, A> = Arc::from(reducer);
        let init = A::from_reserved(ReservedAction::Init);

        // No handle exists yet, so nothing can subscribe or dispatch re-entrantly
        let state = run_reducer(&config, reducer.as_ref(), preloaded.as_ref(), &init)?;
        metrics::counter!(DISPATCH_TOTAL, "store" => config.name.clone()).increment(1);
        tracing::debug!(store = %config.name, bootstrap = %ReservedAction::Init, "Store created");

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                reducer: RwLock::new(reducer),
                state: RwLock::new(Arc::new(state)),
                listeners: Arc::new(Mutex::new(ListenerRegistry::new())),
                dispatching: Arc::new(AtomicBool::new(false)),
            }),
        })
    }

    /// Current state
    ///
    /// Two reads with no dispatch in between return the same `Arc`.
    #[must_use]
    pub fn get_state(&self) -> Arc<S> {
        read(&self.inner.state)
    }

    /// True while the reducer is executing
    ///
    /// Enhancers use this to forbid operations from inside a reducer.
    #[must_use]
    pub fn is_dispatching(&self) -> bool {
        self.inner.dispatching.load(Ordering::Acquire)
    }

    /// Number of registered listener occurrences
    #[must_use]
    pub fn listener_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }

    /// Store configuration
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Dispatch an action
    ///
    /// Runs the reducer, commits the new state and notifies listeners before
    /// returning. Returns the action that was dispatched.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidAction`] if the action is not a record or has
    ///   no `type`
    /// - [`StoreError::Reentrancy`] if called while the reducer is executing
    /// - [`StoreError::Reducer`] if the reducer failed; state is unchanged
    ///
    /// # Panics
    ///
    /// Panics from the reducer or from a listener propagate to the caller.
    /// The dispatch flag is released either way.
    #[tracing::instrument(
        skip_all,
        name = "store_dispatch",
        fields(store = %self.inner.config.name)
    )]
    pub fn dispatch(&self, action: A) -> Result<A, StoreError> {
        if let Err(err) = action.check_record() {
            return Err(self.reject(err.into()));
        }
        let Some(action_type) = action.action_type().map(std::borrow::Cow::into_owned) else {
            return Err(self.reject(unistate_core::ActionError::MissingType.into()));
        };

        tracing::debug!(action_type = %action_type, "Dispatching action");

        self.reduce(&action)?;
        metrics::counter!(DISPATCH_TOTAL, "store" => self.inner.config.name.clone()).increment(1);
        self.notify();

        tracing::debug!(action_type = %action_type, "Dispatch completed");
        Ok(action)
    }

    fn reduce(&self, action: &A) -> Result<(), StoreError> {
        let Some(_guard) = DispatchGuard::acquire(&self.inner.dispatching) else {
            return Err(self.reject(StoreError::Reentrancy));
        };

        let reducer = read(&self.inner.reducer);
        let current = self.get_state();
        let next = run_reducer(&self.inner.config, reducer.as_ref(), Some(&*current), action)
            .map_err(|err| self.reject(err))?;

        write(&self.inner.state, Arc::new(next));
        Ok(())
    }

    fn notify(&self) {
        let snapshot = lock(&self.inner.listeners).snapshot();
        tracing::trace!(listeners = snapshot.len(), "Notifying listeners");

        for listener in snapshot.iter() {
            listener();
        }
    }

    fn reject(&self, err: StoreError) -> StoreError {
        tracing::warn!(store = %self.inner.config.name, error = %err, "Dispatch rejected");
        metrics::counter!(
            DISPATCH_REJECTED,
            "store" => self.inner.config.name.clone(),
            "reason" => err.kind()
        )
        .increment(1);
        err
    }

    /// Register a change listener
    ///
    /// The listener runs after every dispatch, starting with the next one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidOperation`] if called while the reducer
    /// is executing.
    pub fn subscribe<F>(&self, listener: F) -> Result<Subscription, StoreError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe_listener(Arc::new(listener))
    }

    /// Register a shared listener
    ///
    /// Registering the same `Arc` several times makes it run that many times
    /// per notification pass; each [`Subscription`] removes one occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidOperation`] if called while the reducer
    /// is executing.
    pub fn subscribe_listener(&self, listener: Listener) -> Result<Subscription, StoreError> {
        if self.is_dispatching() {
            return Err(StoreError::InvalidOperation(
                "cannot subscribe while the reducer is executing".to_string(),
            ));
        }

        let count = lock(&self.inner.listeners).add(Arc::clone(&listener));
        tracing::trace!(store = %self.inner.config.name, listeners = count, "Listener subscribed");
        record_listener_count(&self.inner.config.name, count);

        Ok(Subscription {
            listener,
            registry: Arc::downgrade(&self.inner.listeners),
            dispatching: Arc::clone(&self.inner.dispatching),
            store_name: self.inner.config.name.clone(),
            active: AtomicBool::new(true),
        })
    }

    /// Swap the active reducer
    ///
    /// Dispatches [`ReservedAction::Replace`] afterwards so the new reducer
    /// computes state and every listener sees the change.
    ///
    /// # Errors
    ///
    /// Any error from the replace dispatch. The new reducer stays installed.
    pub fn replace_reducer<R>(&self, next: R) -> Result<(), StoreError>
    where
        R: Reducer<State = S, Action = A> + Send + Sync + 'static,
    {
        self.replace_boxed_reducer(Box::new(next))
    }

    /// Swap the active reducer for an already boxed one
    ///
    /// # Errors
    ///
    /// Any error from the replace dispatch. The new reducer stays installed.
    pub fn replace_boxed_reducer(&self, next: BoxedReducer<S, A>) -> Result<(), StoreError> {
        write(&self.inner.reducer, Arc::from(next));
        tracing::info!(
            store = %self.inner.config.name,
            action = %ReservedAction::Replace,
            "Reducer replaced"
        );

        self.dispatch(A::from_reserved(ReservedAction::Replace))
            .map(drop)
    }

    /// Observable view of this store's state
    #[must_use]
    pub fn observable(&self) -> StateObservable<S, A> {
        StateObservable::new(self.clone())
    }

    /// A dispatch function, for binding action creators
    pub fn dispatcher(
        &self,
    ) -> impl Fn(A) -> Result<A, StoreError> + Send + Sync + use<S, A> {
        let store = self.clone();
        move |action| store.dispatch(action)
    }

    /// A non-owning handle to this store
    #[must_use]
    pub fn downgrade(&self) -> WeakStore<S, A> {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

fn run_reducer<S, A>(
    config: &StoreConfig,
    reducer: &(dyn Reducer<State = S, Action = A> + Send + Sync),
    state: Option<&S>,
    action: &A,
) -> Result<S, StoreError> {
    let span = tracing::debug_span!("reducer_execution");
    let _enter = span.enter();

    let start = Instant::now();
    let result = reducer.reduce(state, action);
    let duration = start.elapsed();

    metrics::histogram!(REDUCER_DURATION_SECONDS, "store" => config.name.clone())
        .record(duration.as_secs_f64());

    if config
        .slow_reducer_threshold
        .is_some_and(|threshold| duration > threshold)
    {
        tracing::warn!(
            store = %config.name,
            elapsed_ms = duration.as_millis(),
            "Slow reducer"
        );
    }

    result.map_err(StoreError::Reducer)
}

fn record_listener_count(store: &str, count: usize) {
    // Listener counts stay far below 2^52
    #[allow(clippy::cast_precision_loss)]
    metrics::gauge!(LISTENERS, "store" => store.to_string()).set(count as f64);
}

/// Handle returned by [`Store::subscribe`]
///
/// Dropping it does not unsubscribe; call [`Subscription::unsubscribe`].
pub struct Subscription {
    listener: Listener,
    registry: Weak<Mutex<ListenerRegistry>>,
    dispatching: Arc<AtomicBool>,
    store_name: String,
    active: AtomicBool,
}

impl Subscription {
    /// Remove this subscription's listener occurrence
    ///
    /// Only the first successful call has an effect. A listener removed in
    /// the middle of a notification pass still runs in that pass, but not in
    /// later ones.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidOperation`] if called while the reducer
    /// is executing.
    pub fn unsubscribe(&self) -> Result<(), StoreError> {
        if !self.active.load(Ordering::Acquire) {
            return Ok(());
        }

        if self.dispatching.load(Ordering::Acquire) {
            return Err(StoreError::InvalidOperation(
                "cannot unsubscribe while the reducer is executing".to_string(),
            ));
        }

        if self.active.swap(false, Ordering::AcqRel) {
            if let Some(registry) = self.registry.upgrade() {
                let mut registry = lock(&registry);
                registry.remove(&self.listener);
                tracing::trace!(
                    store = %self.store_name,
                    listeners = registry.len(),
                    "Listener unsubscribed"
                );
                record_listener_count(&self.store_name, registry.len());
            }
        }

        Ok(())
    }

    /// True until the first successful [`unsubscribe`](Self::unsubscribe)
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("store", &self.store_name)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

/// The base store constructor, bound to `config`
///
/// This is what an [`Enhancer`] receives and wraps.
#[must_use]
pub fn base_creator<S, A>(config: StoreConfig) -> StoreCreator<S, A>
where
    S: Send + Sync + 'static,
    A: Action + 'static,
{
    Arc::new(move |reducer, preloaded| Store::build(reducer, preloaded, config.clone()))
}

/// Create a store with the default configuration
///
/// `init` is the preloaded-state position. Passing
/// [`StoreInit::Enhancer`] there with `enhancer = None` uses it as the
/// enhancer, matching the two-argument form of the constructor.
///
/// # Errors
///
/// - [`StoreError::Configuration`] if an enhancer is passed in both
///   positions; compose them with [`compose_all`](unistate_core::compose_all)
/// - any error from the bootstrap dispatch
pub fn create_store<S, A, R>(
    reducer: R,
    init: StoreInit<S, A>,
    enhancer: Option<Enhancer<S, A>>,
) -> Result<Store<S, A>, StoreError>
where
    R: Reducer<State = S, Action = A> + Send + Sync + 'static,
    S: Send + Sync + 'static,
    A: Action + 'static,
{
    create_store_with_config(reducer, init, enhancer, StoreConfig::default())
}

/// Create a store with an explicit configuration
///
/// # Errors
///
/// Same as [`create_store`].
pub fn create_store_with_config<S, A, R>(
    reducer: R,
    init: StoreInit<S, A>,
    enhancer: Option<Enhancer<S, A>>,
    config: StoreConfig,
) -> Result<Store<S, A>, StoreError>
where
    R: Reducer<State = S, Action = A> + Send + Sync + 'static,
    S: Send + Sync + 'static,
    A: Action + 'static,
{
    let (preloaded, enhancer) = match (init, enhancer) {
        (StoreInit::Enhancer(_), Some(_)) => {
            return Err(StoreError::Configuration(
                "several store enhancers were passed to create_store; \
                 compose them into a single enhancer with compose_all"
                    .to_string(),
            ));
        },
        (StoreInit::Enhancer(enhancer), None) => (None, Some(enhancer)),
        (StoreInit::State(state), enhancer) => (Some(state), enhancer),
        (StoreInit::Empty, enhancer) => (None, enhancer),
    };

    let reducer: BoxedReducer<S, A> = Box::new(reducer);
    let base = base_creator(config);

    match enhancer {
        Some(enhancer) => {
            tracing::debug!("Delegating store construction to enhancer");
            enhancer(base)(reducer, preloaded)
        },
        None => base(reducer, preloaded),
    }
}
