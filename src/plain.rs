//! Plain sentinel errors: a message and nothing else.

use core::fmt;
use std::borrow::Cow;

/// An error that is only a message: no chain, no stack.
///
/// Use it for sentinels that callers compare against. Equality is by message,
/// so a sentinel can be a `static`:
///
/// ```rust
/// use errstack::{Plain, errorf};
///
/// static NOT_FOUND: Plain = Plain::from_static("not found");
///
/// let err = errorf(NOT_FOUND.clone(), "loading user 7");
/// assert!(err.inner_most_is(&NOT_FOUND));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Plain {
    message: Cow<'static, str>,
}

impl Plain {
    /// Create a plain error. Same as [`errstack::new`](crate::new).
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Create a plain error from a static string, usable in `static` items.
    pub const fn from_static(message: &'static str) -> Self {
        Self {
            message: Cow::Borrowed(message),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Plain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for Plain {}
