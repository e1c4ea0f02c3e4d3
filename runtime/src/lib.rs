//! # Unistate Runtime
//!
//! The store runtime: a single state cell advanced by a reducer, with
//! synchronous change notification.
//!
//! ## Core Components
//!
//! - **Store**: Owns state, reducer and listeners; `dispatch` is the only way
//!   to change state
//! - **Listener registry**: Copy-on-write snapshots that make subscribe and
//!   unsubscribe during a notification pass deterministic
//! - **Enhancers**: Wrappers around store construction, chained with
//!   [`compose_all`](unistate_core::compose_all)
//! - **Observable adapter**: Forwards state changes to external reactive code
//!
//! ## Example
//!
//! ```
//! use serde_json::{json, Value};
//! use unistate_core::from_fn;
//! use unistate_runtime::{create_store, StoreInit};
//!
//! # fn main() -> Result<(), unistate_core::StoreError> {
//! let reducer = from_fn(|state: Option<&i64>, action: &Value| {
//!     let count = state.copied().unwrap_or_default();
//!     match action["type"].as_str() {
//!         Some("increment") => count + 1,
//!         _ => count,
//!     }
//! });
//!
//! let store = create_store(reducer, StoreInit::Empty, None)?;
//! store.dispatch(json!({ "type": "increment" }))?;
//! assert_eq!(*store.get_state(), 1);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

/// Metric names and descriptions
pub mod metrics;

/// The observable adapter
pub mod observable;

mod registry;

pub mod store;

pub use observable::{Observable, ObservableSubscription, Observer, StateObservable};
pub use registry::Listener;
pub use store::{Enhancer, Store, StoreCreator, StoreInit, Subscription, WeakStore};
pub use store::{create_store, create_store_with_config};
pub use unistate_core::error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use unistate_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_name("checkout")
///     .with_slow_reducer_threshold(Some(Duration::from_millis(2)));
///
/// assert_eq!(config.name, "checkout");
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Label attached to log events and metrics
    pub name: String,
    /// Reducer calls taking longer than this are logged as warnings
    ///
    /// `None` disables the check.
    pub slow_reducer_threshold: Option<Duration>,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub fn new(name: impl Into<String>, slow_reducer_threshold: Option<Duration>) -> Self {
        Self {
            name: name.into(),
            slow_reducer_threshold,
        }
    }

    /// Set the store name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the slow reducer threshold
    #[must_use]
    pub const fn with_slow_reducer_threshold(mut self, threshold: Option<Duration>) -> Self {
        self.slow_reducer_threshold = threshold;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "store".to_string(),
            slow_reducer_threshold: Some(Duration::from_millis(10)),
        }
    }
}
