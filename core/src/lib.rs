//! # Unistate Core
//!
//! Core traits and types for the Unistate state container.
//!
//! A store holds one state tree that only changes when an action is
//! dispatched through a pure reducer. This crate defines the pieces that do
//! not depend on the store runtime itself.
//!
//! ## Core Concepts
//!
//! - **State**: Opaque application data, replaced (never mutated) on dispatch
//! - **Action**: A record with a required `type` discriminant
//! - **Reducer**: Pure function `(Option<&State>, &Action) → State`
//! - **Composer**: Right-to-left function composition, used to chain enhancers
//! - **Action binder**: Wires action creators to a dispatch function
//!
//! ## Example
//!
//! ```
//! use std::borrow::Cow;
//! use unistate_core::{from_fn, Action, Reducer, ReservedAction};
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//!     Reserved(ReservedAction),
//! }
//!
//! impl Action for CounterAction {
//!     fn action_type(&self) -> Option<Cow<'_, str>> {
//!         match self {
//!             Self::Increment => Some(Cow::Borrowed("Increment")),
//!             Self::Reserved(r) => Some(Cow::Borrowed(r.action_type())),
//!         }
//!     }
//!
//!     fn from_reserved(reserved: ReservedAction) -> Self {
//!         Self::Reserved(reserved)
//!     }
//! }
//!
//! let reducer = from_fn(|state: Option<&u64>, action: &CounterAction| {
//!     let count = state.copied().unwrap_or_default();
//!     match action {
//!         CounterAction::Increment => count + 1,
//!         CounterAction::Reserved(_) => count,
//!     }
//! });
//!
//! assert_eq!(reducer.reduce(Some(&1), &CounterAction::Increment).ok(), Some(2));
//! ```

pub mod action;
pub mod bind;
pub mod compose;
pub mod error;
pub mod reducer;

pub use action::{Action, RESERVED_PREFIX, ReservedAction};
pub use bind::{
    ActionCreator, BoundActionCreator, BoundCreatorMap, BoundCreators, CreatorEntry, CreatorMap,
    CreatorSource, bind_action_creator, bind_action_creators,
};
pub use compose::{Unary, compose, compose_all, identity};
pub use error::{ActionError, StoreError};
pub use reducer::{BoxedReducer, FnReducer, Reducer, TryFnReducer, from_fn, try_from_fn};
