//! Right-to-left function composition
//!
//! `compose(f, g)` behaves as `f(g(x))`. Only the rightmost function sees the
//! caller's argument; every other function receives the single return value
//! of the function to its right. Functions that need several arguments take a
//! tuple.
//!
//! Three entry points cover the common cases:
//!
//! - [`compose`] joins two functions of possibly different types
//! - [`compose!`](crate::compose!) joins any statically known list
//! - [`compose_all`] joins a runtime list of same-typed transforms, which is
//!   how store enhancers are chained
//!
//! # Example
//!
//! ```
//! use unistate_core::compose;
//!
//! let shout = compose!(|s: String| s + "!", |s: &str| s.to_uppercase());
//! assert_eq!(shout("hi"), "HI!");
//! ```

use std::sync::Arc;

/// A shared unary transform
pub type Unary<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// Returns its argument unchanged
#[must_use]
pub const fn identity<T>(value: T) -> T {
    value
}

/// Composes two functions: `compose(f, g)(x) == f(g(x))`
pub fn compose<X, Y, Z, F, G>(f: F, g: G) -> impl Fn(X) -> Z
where
    F: Fn(Y) -> Z,
    G: Fn(X) -> Y,
{
    move |x| f(g(x))
}

/// Composes any number of functions, right to left
///
/// - `compose!()` is [`identity`]
/// - `compose!(f)` is `f` itself
/// - `compose!(f, g, h)` behaves as `|x| f(g(h(x)))`
#[macro_export]
macro_rules! compose {
    () => {
        $crate::compose::identity
    };
    ($f:expr $(,)?) => {
        $f
    };
    ($f:expr, $($rest:expr),+ $(,)?) => {
        $crate::compose::compose($f, $crate::compose!($($rest),+))
    };
}

/// Composes a runtime list of transforms of the same type
///
/// An empty list yields the identity transform, a single transform is
/// returned as-is (the same `Arc`), and longer lists are folded from the
/// right so the last transform runs first.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use unistate_core::compose::{compose_all, Unary};
///
/// let double: Unary<i32> = Arc::new(|x: i32| x * 2);
/// let inc: Unary<i32> = Arc::new(|x: i32| x + 1);
///
/// let f = compose_all(vec![double, inc]);
/// assert_eq!(f(3), 8);
/// ```
#[must_use]
pub fn compose_all<T>(mut fns: Vec<Unary<T>>) -> Unary<T>
where
    T: 'static,
{
    if fns.len() <= 1 {
        return fns.pop().unwrap_or_else(identity_unary);
    }

    fns.into_iter()
        .reduce(|outer, inner| -> Unary<T> { Arc::new(move |value: T| outer(inner(value))) })
        .unwrap_or_else(identity_unary)
}

fn identity_unary<T: 'static>() -> Unary<T> {
    Arc::new(identity::<T>)
}
