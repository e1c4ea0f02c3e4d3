//! Error types shared by the store, the composer and the action binder
//!
//! Every failure is reported synchronously to the immediate caller. Nothing in
//! this workspace retries, swallows or recovers from these errors on its own.

use thiserror::Error;

/// Reasons an action is rejected at the dispatch boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The action is not a plain key-value record
    ///
    /// Arrays, strings, numbers, booleans and null are all rejected.
    #[error("actions must be plain records, found {found}")]
    NotARecord {
        /// Short name of the value kind that was dispatched
        found: &'static str,
    },

    /// The action has no `type` discriminant
    #[error("actions may not have an undefined \"type\" property")]
    MissingType,
}

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Invalid construction or binding arguments
    ///
    /// Raised when several enhancers are passed positionally, or when
    /// `bind_action_creators` is given neither a function nor a mapping.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The dispatched action failed validation
    #[error("invalid action: {0}")]
    InvalidAction(#[from] ActionError),

    /// `dispatch` was called while the reducer was executing
    #[error("reducers may not dispatch actions")]
    Reentrancy,

    /// An operation that is not allowed in the current store state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The reducer returned an error; state was left unchanged
    #[error("reducer failed: {0}")]
    Reducer(#[source] anyhow::Error),
}

impl StoreError {
    /// Short, stable label for the error kind
    ///
    /// Used as the `reason` label on rejection metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::InvalidAction(_) => "invalid_action",
            Self::Reentrancy => "reentrancy",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::Reducer(_) => "reducer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_converts_into_store_error() {
        let err: StoreError = ActionError::MissingType.into();
        assert!(matches!(
            err,
            StoreError::InvalidAction(ActionError::MissingType)
        ));
        assert_eq!(err.kind(), "invalid_action");
    }

    #[test]
    fn test_error_messages() {
        let err = StoreError::from(ActionError::NotARecord { found: "array" });
        assert_eq!(
            err.to_string(),
            "invalid action: actions must be plain records, found array"
        );
        assert_eq!(
            StoreError::Reentrancy.to_string(),
            "reducers may not dispatch actions"
        );
    }

    #[test]
    fn test_reducer_error_keeps_source() {
        use std::error::Error as _;

        let err = StoreError::Reducer(anyhow::anyhow!("boom"));
        assert_eq!(err.to_string(), "reducer failed: boom");
        assert!(err.source().is_some());
    }
}
