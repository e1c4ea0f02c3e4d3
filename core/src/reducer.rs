//! Reducer module - the pure transition function
//!
//! A reducer computes the next state from the current state and an action:
//! `(Option<&State>, &Action) → State`. `None` means the store has no state
//! yet; the reducer must then return its own default state. Reducers never
//! mutate state in place and never dispatch.

use std::marker::PhantomData;

/// The Reducer trait - core abstraction for state transitions
///
/// # Example
///
/// ```
/// use unistate_core::reducer::Reducer;
///
/// struct CounterReducer;
///
/// impl Reducer for CounterReducer {
///     type State = i64;
///     type Action = serde_json::Value;
///
///     fn reduce(&self, state: Option<&i64>, action: &serde_json::Value) -> anyhow::Result<i64> {
///         let count = state.copied().unwrap_or_default();
///         Ok(match action["type"].as_str() {
///             Some("increment") => count + 1,
///             _ => count,
///         })
///     }
/// }
///
/// let reducer = CounterReducer;
/// let next = reducer.reduce(Some(&1), &serde_json::json!({ "type": "increment" })).ok();
/// assert_eq!(next, Some(2));
/// ```
pub trait Reducer {
    /// The state type this reducer produces
    type State;

    /// The action type this reducer processes
    type Action;

    /// Compute the next state
    ///
    /// Unknown actions (including reserved ones) must return the current
    /// state unchanged, or the default state when `state` is `None`.
    ///
    /// # Errors
    ///
    /// Any error aborts the dispatch that invoked the reducer. The store keeps
    /// its previous state.
    fn reduce(
        &self,
        state: Option<&Self::State>,
        action: &Self::Action,
    ) -> anyhow::Result<Self::State>;
}

/// A boxed reducer, the form stores hold and replace
pub type BoxedReducer<S, A> = Box<dyn Reducer<State = S, Action = A> + Send + Sync>;

/// Reducer built from an infallible closure
///
/// Created by [`from_fn`].
pub struct FnReducer<S, A, F> {
    f: F,
    _marker: PhantomData<fn(Option<&S>, &A) -> S>,
}

impl<S, A, F> Reducer for FnReducer<S, A, F>
where
    F: Fn(Option<&S>, &A) -> S,
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: Option<&S>, action: &A) -> anyhow::Result<S> {
        Ok((self.f)(state, action))
    }
}

/// Reducer built from a fallible closure
///
/// Created by [`try_from_fn`].
pub struct TryFnReducer<S, A, F> {
    f: F,
    _marker: PhantomData<fn(Option<&S>, &A) -> S>,
}

impl<S, A, F> Reducer for TryFnReducer<S, A, F>
where
    F: Fn(Option<&S>, &A) -> anyhow::Result<S>,
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: Option<&S>, action: &A) -> anyhow::Result<S> {
        (self.f)(state, action)
    }
}

/// Wraps a closure that cannot fail
///
/// # Example
///
/// ```
/// use unistate_core::reducer::{from_fn, Reducer};
///
/// let reducer = from_fn(|state: Option<&u32>, _action: &()| state.map_or(0, |s| s + 1));
/// assert_eq!(reducer.reduce(None, &()).ok(), Some(0));
/// assert_eq!(reducer.reduce(Some(&4), &()).ok(), Some(5));
/// ```
#[must_use]
pub const fn from_fn<S, A, F>(f: F) -> FnReducer<S, A, F>
where
    F: Fn(Option<&S>, &A) -> S,
{
    FnReducer {
        f,
        _marker: PhantomData,
    }
}

/// Wraps a closure that may fail
#[must_use]
pub const fn try_from_fn<S, A, F>(f: F) -> TryFnReducer<S, A, F>
where
    F: Fn(Option<&S>, &A) -> anyhow::Result<S>,
{
    TryFnReducer {
        f,
        _marker: PhantomData,
    }
}

impl<R> Reducer for Box<R>
where
    R: Reducer + ?Sized,
{
    type State = R::State;
    type Action = R::Action;

    fn reduce(
        &self,
        state: Option<&Self::State>,
        action: &Self::Action,
    ) -> anyhow::Result<Self::State> {
        (**self).reduce(state, action)
    }
}

impl<R> Reducer for std::sync::Arc<R>
where
    R: Reducer + ?Sized,
{
    type State = R::State;
    type Action = R::Action;

    fn reduce(
        &self,
        state: Option<&Self::State>,
        action: &Self::Action,
    ) -> anyhow::Result<Self::State> {
        (**self).reduce(state, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_defaults_on_absent_state() {
        let reducer = from_fn(|state: Option<&Vec<u8>>, action: &u8| {
            let mut next = state.cloned().unwrap_or_default();
            next.push(*action);
            next
        });

        assert_eq!(reducer.reduce(None, &1).ok(), Some(vec![1]));
        assert_eq!(reducer.reduce(Some(&vec![1]), &2).ok(), Some(vec![1, 2]));
    }

    #[test]
    fn test_try_from_fn_propagates_errors() {
        let reducer = try_from_fn(|state: Option<&i32>, action: &i32| {
            if *action < 0 {
                anyhow::bail!("negative step");
            }
            Ok(state.copied().unwrap_or_default() + action)
        });

        assert_eq!(reducer.reduce(Some(&1), &2).ok(), Some(3));
        assert!(reducer.reduce(Some(&1), &-1).is_err());
    }

    #[test]
    fn test_boxed_reducer_delegates() {
        let boxed: BoxedReducer<i32, i32> = Box::new(from_fn(|state: Option<&i32>, action: &i32| {
            state.copied().unwrap_or(0) * action
        }));
        assert_eq!(boxed.reduce(Some(&3), &4).ok(), Some(12));
    }
}
