//! Actions - the only inputs a store accepts
//!
//! An action is a record carrying a `type` discriminant. Typed actions are
//! usually enums deriving [`Action`](crate::action::Action) through
//! `unistate-macros`; dynamic actions use [`serde_json::Value`] objects as
//! open records and are validated when they are dispatched.
//!
//! # Reserved actions
//!
//! The store dispatches [`ReservedAction::Init`] once at construction and
//! [`ReservedAction::Replace`] whenever the reducer is replaced. Their type
//! strings carry a per-process random suffix: reducers must treat them as
//! unknown actions and return their current state (or their default state
//! when there is none). They are not meant to be dispatched by user code.

use rand::Rng;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::error::ActionError;

/// Prefix shared by every reserved action type
pub const RESERVED_PREFIX: &str = "@@unistate/";

/// An action that can be dispatched to a store
///
/// # Example
///
/// ```
/// use std::borrow::Cow;
/// use unistate_core::action::{Action, ReservedAction};
///
/// enum CounterAction {
///     Increment,
///     Reserved(ReservedAction),
/// }
///
/// impl Action for CounterAction {
///     fn action_type(&self) -> Option<Cow<'_, str>> {
///         match self {
///             Self::Increment => Some(Cow::Borrowed("Increment")),
///             Self::Reserved(reserved) => Some(Cow::Borrowed(reserved.action_type())),
///         }
///     }
///
///     fn from_reserved(reserved: ReservedAction) -> Self {
///         Self::Reserved(reserved)
///     }
/// }
/// ```
pub trait Action {
    /// The `type` discriminant, or `None` when it is absent
    fn action_type(&self) -> Option<Cow<'_, str>>;

    /// Checks that this value is a plain key-value record
    ///
    /// Statically typed actions are always records and keep the default.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::NotARecord`] for array-likes and primitives.
    fn check_record(&self) -> Result<(), ActionError> {
        Ok(())
    }

    /// Builds the representation of a reserved store action
    fn from_reserved(reserved: ReservedAction) -> Self;
}

/// Store-internal bootstrap actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedAction {
    /// Dispatched once when a store is created
    Init,
    /// Dispatched after the reducer has been replaced
    Replace,
}

struct ReservedTypes {
    init: String,
    replace: String,
}

fn reserved_types() -> &'static ReservedTypes {
    static TYPES: OnceLock<ReservedTypes> = OnceLock::new();
    TYPES.get_or_init(|| {
        let suffix = random_suffix();
        ReservedTypes {
            init: format!("{RESERVED_PREFIX}INIT{suffix}"),
            replace: format!("{RESERVED_PREFIX}REPLACE{suffix}"),
        }
    })
}

/// Six random base-36 characters, each preceded by a dot
fn random_suffix() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..6)
        .map(|_| {
            let c = char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]);
            format!(".{c}")
        })
        .collect()
}

impl ReservedAction {
    /// The reserved type string for this action
    ///
    /// Stable for the lifetime of the process.
    #[must_use]
    pub fn action_type(self) -> &'static str {
        let types = reserved_types();
        match self {
            Self::Init => &types.init,
            Self::Replace => &types.replace,
        }
    }

    /// Recognises a reserved type string
    #[must_use]
    pub fn parse(action_type: &str) -> Option<Self> {
        [Self::Init, Self::Replace]
            .into_iter()
            .find(|reserved| reserved.action_type() == action_type)
    }

    /// True if `action_type` uses the reserved namespace
    #[must_use]
    pub fn is_reserved(action_type: &str) -> bool {
        action_type.starts_with(RESERVED_PREFIX)
    }
}

impl std::fmt::Display for ReservedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.action_type())
    }
}

/// Short name of a JSON value kind, for error messages
#[must_use]
pub const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// JSON objects are open records.
///
/// Any present `"type"` value counts as a discriminant, including `null`;
/// only a missing key is treated as absent.
impl Action for Value {
    fn action_type(&self) -> Option<Cow<'_, str>> {
        match self.as_object()?.get("type")? {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    fn check_record(&self) -> Result<(), ActionError> {
        if self.is_object() {
            Ok(())
        } else {
            Err(ActionError::NotARecord {
                found: value_kind(self),
            })
        }
    }

    fn from_reserved(reserved: ReservedAction) -> Self {
        serde_json::json!({ "type": reserved.action_type() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reserved_types_are_stable_and_distinct() {
        let init = ReservedAction::Init.action_type();
        assert_eq!(init, ReservedAction::Init.action_type());
        assert_ne!(init, ReservedAction::Replace.action_type());
        assert!(init.starts_with("@@unistate/INIT."));
        assert!(ReservedAction::is_reserved(init));
    }

    #[test]
    fn test_reserved_display_is_action_type() {
        for reserved in [ReservedAction::Init, ReservedAction::Replace] {
            assert_eq!(reserved.to_string(), reserved.action_type());
            assert_eq!(ReservedAction::parse(&reserved.to_string()), Some(reserved));
        }
    }

    #[test]
    fn test_reserved_suffix_shape() {
        let replace = ReservedAction::Replace.action_type();
        let suffix = replace.trim_start_matches("@@unistate/REPLACE");
        assert_eq!(suffix.len(), 12);
        assert!(suffix.split('.').skip(1).all(|c| c.len() == 1));
    }

    #[test]
    fn test_parse_reserved() {
        let init = ReservedAction::Init.action_type();
        assert_eq!(ReservedAction::parse(init), Some(ReservedAction::Init));
        assert_eq!(ReservedAction::parse("@@unistate/INIT"), None);
        assert_eq!(ReservedAction::parse("Increment"), None);
    }

    #[test]
    fn test_json_object_is_record() {
        let action = json!({ "type": "add", "amount": 2 });
        assert!(action.check_record().is_ok());
        assert_eq!(action.action_type().as_deref(), Some("add"));
    }

    #[test]
    fn test_json_non_objects_are_rejected() {
        for (value, kind) in [
            (json!([1, 2]), "array"),
            (json!("add"), "string"),
            (json!(3), "number"),
            (json!(true), "boolean"),
            (Value::Null, "null"),
        ] {
            assert_eq!(
                value.check_record(),
                Err(ActionError::NotARecord { found: kind })
            );
            assert_eq!(value.action_type(), None);
        }
    }

    #[test]
    fn test_json_missing_type() {
        assert_eq!(json!({}).action_type(), None);
        assert_eq!(json!({ "kind": "add" }).action_type(), None);
    }

    #[test]
    fn test_json_non_string_type_counts() {
        assert_eq!(json!({ "type": 7 }).action_type().as_deref(), Some("7"));
        assert_eq!(
            json!({ "type": null }).action_type().as_deref(),
            Some("null")
        );
    }

    #[test]
    fn test_json_from_reserved() {
        let action = Value::from_reserved(ReservedAction::Replace);
        assert_eq!(
            action.action_type().as_deref(),
            Some(ReservedAction::Replace.action_type())
        );
    }
}
