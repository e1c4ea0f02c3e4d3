//! Metrics emitted by stores
//!
//! Stores record through the [`metrics`] facade. Nothing is exported unless
//! the application installs a recorder; call [`register_metrics`] once after
//! installing it to attach descriptions.
//!
//! Every metric carries a `store` label with [`StoreConfig::name`](crate::StoreConfig).

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};

/// Dispatches whose reducer completed, including bootstrap dispatches
pub const DISPATCH_TOTAL: &str = "unistate.dispatch.total";

/// Dispatches that failed; labelled with `reason`
pub const DISPATCH_REJECTED: &str = "unistate.dispatch.rejected";

/// Time spent inside the reducer
pub const REDUCER_DURATION_SECONDS: &str = "unistate.reducer.duration_seconds";

/// Registered listener occurrences
pub const LISTENERS: &str = "unistate.listeners";

/// Describe all store metrics to the installed recorder
pub fn register_metrics() {
    describe_counter!(DISPATCH_TOTAL, "Total number of actions dispatched");
    describe_counter!(
        DISPATCH_REJECTED,
        "Dispatches rejected by validation, reentrancy or reducer failure"
    );
    describe_histogram!(
        REDUCER_DURATION_SECONDS,
        Unit::Seconds,
        "Reducer execution time in seconds"
    );
    describe_gauge!(LISTENERS, "Number of registered listeners");
}
