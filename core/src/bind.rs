//! Binding action creators to a dispatch function
//!
//! An action creator builds an action from its argument. Binding it produces
//! a function taking the same argument that builds the action and hands it
//! straight to `dispatch`, returning whatever `dispatch` returns.
//!
//! Creators take a single argument `P`; use a tuple for several arguments and
//! `()` for none.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::{json, Value};
//! use unistate_core::bind::{bind_action_creators, ActionCreator, CreatorMap, CreatorSource};
//!
//! let add: ActionCreator<i64, Value> = Arc::new(|n| json!({ "type": "add", "amount": n }));
//! let creators = CreatorMap::new()
//!     .creator("add", add)
//!     .value("version", json!(2));
//!
//! let dispatch = |action: Value| action["amount"].clone();
//! let bound = bind_action_creators(CreatorSource::Map(creators), dispatch)
//!     .ok()
//!     .and_then(|bound| bound.into_map());
//!
//! let bound = bound.unwrap_or_default();
//! assert_eq!(bound.call("add", 5), Some(json!(5)));
//! assert!(bound.get("version").is_none());
//! ```

use serde_json::Value;
use std::sync::Arc;

use crate::action::value_kind;
use crate::error::StoreError;

/// A shared action creator
pub type ActionCreator<P, A> = Arc<dyn Fn(P) -> A + Send + Sync>;

/// An action creator wired to a dispatch function
pub type BoundActionCreator<P, R> = Arc<dyn Fn(P) -> R + Send + Sync>;

/// One value in a [`CreatorMap`]
pub enum CreatorEntry<P, A> {
    /// A callable action creator
    Creator(ActionCreator<P, A>),
    /// Any non-callable value; dropped when binding
    Value(Value),
}

impl<P, A> Clone for CreatorEntry<P, A> {
    fn clone(&self) -> Self {
        match self {
            Self::Creator(creator) => Self::Creator(Arc::clone(creator)),
            Self::Value(value) => Self::Value(value.clone()),
        }
    }
}

impl<P, A> std::fmt::Debug for CreatorEntry<P, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Creator(_) => write!(f, "CreatorEntry::Creator(<fn>)"),
            Self::Value(value) => f.debug_tuple("CreatorEntry::Value").field(value).finish(),
        }
    }
}

/// Insertion-ordered mapping of keys to action creators or plain values
///
/// Keys are unique: inserting an existing key replaces its entry in place.
pub struct CreatorMap<P, A> {
    entries: Vec<(String, CreatorEntry<P, A>)>,
}

impl<P, A> Default for CreatorMap<P, A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<P, A> Clone for CreatorMap<P, A> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<P, A> std::fmt::Debug for CreatorMap<P, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<P, A> CreatorMap<P, A> {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any existing entry under the same key
    pub fn insert(&mut self, key: impl Into<String>, entry: CreatorEntry<P, A>) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = entry;
        } else {
            self.entries.push((key, entry));
        }
    }

    /// Add an action creator
    #[must_use]
    pub fn creator(mut self, key: impl Into<String>, creator: ActionCreator<P, A>) -> Self {
        self.insert(key, CreatorEntry::Creator(creator));
        self
    }

    /// Add a non-callable value
    #[must_use]
    pub fn value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, CreatorEntry::Value(value));
        self
    }

    /// Number of entries, callable or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the map has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CreatorEntry<P, A>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// What to bind: a single creator, a mapping, or an untyped value
pub enum CreatorSource<P, A> {
    /// A single action creator
    Function(ActionCreator<P, A>),
    /// A mapping of keys to creators and plain values
    Map(CreatorMap<P, A>),
    /// An arbitrary value
    ///
    /// Objects are treated as mappings whose values are all non-callable;
    /// anything else is rejected.
    Other(Value),
}

impl<P, A> From<ActionCreator<P, A>> for CreatorSource<P, A> {
    fn from(creator: ActionCreator<P, A>) -> Self {
        Self::Function(creator)
    }
}

impl<P, A> From<CreatorMap<P, A>> for CreatorSource<P, A> {
    fn from(map: CreatorMap<P, A>) -> Self {
        Self::Map(map)
    }
}

impl<P, A> From<Value> for CreatorSource<P, A> {
    fn from(value: Value) -> Self {
        Self::Other(value)
    }
}

/// Bound creators keyed like their source; non-callable entries are absent
pub struct BoundCreatorMap<P, R> {
    entries: Vec<(String, BoundActionCreator<P, R>)>,
}

impl<P, R> Default for BoundCreatorMap<P, R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<P, R> std::fmt::Debug for BoundCreatorMap<P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundCreatorMap")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<P, R> BoundCreatorMap<P, R> {
    /// Look up a bound creator
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&BoundActionCreator<P, R>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, f)| f)
    }

    /// Invoke the bound creator under `key`, if there is one
    pub fn call(&self, key: &str, args: P) -> Option<R> {
        self.get(key).map(|bound| bound(args))
    }

    /// Keys in source insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of bound creators
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of [`bind_action_creators`], shaped like its input
pub enum BoundCreators<P, R> {
    /// Bound from [`CreatorSource::Function`]
    Function(BoundActionCreator<P, R>),
    /// Bound from a mapping
    Map(BoundCreatorMap<P, R>),
}

impl<P, R> BoundCreators<P, R> {
    /// The single bound creator, if the source was a function
    #[must_use]
    pub fn into_function(self) -> Option<BoundActionCreator<P, R>> {
        match self {
            Self::Function(f) => Some(f),
            Self::Map(_) => None,
        }
    }

    /// The bound map, if the source was a mapping
    #[must_use]
    pub fn into_map(self) -> Option<BoundCreatorMap<P, R>> {
        match self {
            Self::Function(_) => None,
            Self::Map(map) => Some(map),
        }
    }
}

/// Bind one action creator to `dispatch`
pub fn bind_action_creator<P, A, R, D>(
    creator: ActionCreator<P, A>,
    dispatch: D,
) -> BoundActionCreator<P, R>
where
    P: 'static,
    A: 'static,
    R: 'static,
    D: Fn(A) -> R + Send + Sync + 'static,
{
    bind_shared(creator, Arc::new(dispatch))
}

fn bind_shared<P, A, R, D>(
    creator: ActionCreator<P, A>,
    dispatch: Arc<D>,
) -> BoundActionCreator<P, R>
where
    P: 'static,
    A: 'static,
    R: 'static,
    D: Fn(A) -> R + Send + Sync + 'static,
{
    Arc::new(move |args: P| dispatch(creator(args)))
}

/// Bind a creator or a mapping of creators to `dispatch`
///
/// Mapping entries whose value is not callable are dropped from the result.
///
/// # Errors
///
/// Returns [`StoreError::Configuration`] when `source` is
/// [`CreatorSource::Other`] holding anything but an object.
pub fn bind_action_creators<P, A, R, D>(
    source: impl Into<CreatorSource<P, A>>,
    dispatch: D,
) -> Result<BoundCreators<P, R>, StoreError>
where
    P: 'static,
    A: 'static,
    R: 'static,
    D: Fn(A) -> R + Send + Sync + 'static,
{
    let map = match source.into() {
        CreatorSource::Function(creator) => {
            return Ok(BoundCreators::Function(bind_action_creator(creator, dispatch)));
        },
        CreatorSource::Map(map) => map,
        CreatorSource::Other(Value::Object(_)) => CreatorMap::new(),
        CreatorSource::Other(other) => {
            return Err(StoreError::Configuration(format!(
                "bind_action_creators expected an object or a function, but received {}",
                value_kind(&other)
            )));
        },
    };

    let dispatch = Arc::new(dispatch);
    let entries = map
        .entries
        .into_iter()
        .filter_map(|(key, entry)| match entry {
            CreatorEntry::Creator(creator) => {
                Some((key, bind_shared(creator, Arc::clone(&dispatch))))
            },
            CreatorEntry::Value(_) => None,
        })
        .collect();

    Ok(BoundCreators::Map(BoundCreatorMap { entries }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn recording_dispatch()
    -> (Arc<Mutex<Vec<Value>>>, impl Fn(Value) -> usize + Send + Sync + 'static) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let dispatch = move |action: Value| {
            let mut log = sink.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            log.push(action);
            log.len()
        };
        (log, dispatch)
    }

    fn add_creator() -> ActionCreator<(i64, i64), Value> {
        Arc::new(|(a, b)| json!({ "type": "add", "sum": a + b }))
    }

    #[test]
    fn test_bind_single_function() {
        let (log, dispatch) = recording_dispatch();
        let bound = bind_action_creators(add_creator(), dispatch)
            .ok()
            .and_then(BoundCreators::into_function);

        let Some(bound) = bound else {
            unreachable!("a function source binds to a function");
        };
        assert_eq!(bound((1, 2)), 1);

        let log = log.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        assert_eq!(*log, vec![json!({ "type": "add", "sum": 3 })]);
    }

    #[test]
    fn test_bind_map_dispatches_once_and_returns_dispatch_result() {
        let (log, dispatch) = recording_dispatch();
        let creators = CreatorMap::new()
            .creator("add", add_creator())
            .value("label", json!("calculator"));

        let bound = bind_action_creators(creators, dispatch)
            .ok()
            .and_then(BoundCreators::into_map)
            .unwrap_or_default();

        assert_eq!(bound.len(), 1);
        assert!(bound.get("label").is_none());
        assert_eq!(bound.call("add", (1, 2)), Some(1));
        assert_eq!(bound.call("missing", (1, 2)), None);

        let log = log.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0]["sum"], json!(3));
    }

    #[test]
    fn test_bind_map_keeps_insertion_order() {
        let creators = CreatorMap::new()
            .creator("b", add_creator())
            .value("skip", json!(1))
            .creator("a", add_creator());

        let bound = bind_action_creators(creators, |action: Value| action)
            .ok()
            .and_then(BoundCreators::into_map)
            .unwrap_or_default();
        assert_eq!(bound.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut creators: CreatorMap<(i64, i64), Value> =
            CreatorMap::new().value("add", json!(null));
        creators.insert("add", CreatorEntry::Creator(add_creator()));
        assert_eq!(creators.len(), 1);
        assert!(matches!(creators.iter().next(), Some(("add", CreatorEntry::Creator(_)))));
    }

    #[test]
    fn test_bind_plain_object_yields_empty_map() {
        let bound =
            bind_action_creators::<(), Value, Value, _>(json!({ "a": 1 }), |action: Value| action)
                .ok()
                .and_then(BoundCreators::into_map);
        assert!(bound.is_some_and(|map| map.is_empty()));
    }

    #[test]
    fn test_bind_rejects_null_and_scalars() {
        for value in [Value::Null, json!(3), json!("creators"), json!([1])] {
            let result = bind_action_creators::<(), Value, Value, _>(value, |action: Value| action);
            assert!(matches!(result, Err(StoreError::Configuration(_))));
        }
    }

    #[test]
    fn test_configuration_message_names_the_kind() {
        let result =
            bind_action_creators::<(), Value, Value, _>(Value::Null, |action: Value| action);
        let Err(err) = result else {
            unreachable!("null must be rejected");
        };
        assert!(err.to_string().contains("received null"));
    }
}
