//! Extension traits for annotating `Result` and `Option` in place.
//!
//! - [`ResultErrExt`]: `.errorf(msg)` on any `Result<T, E>` whose error can be
//!   boxed. Chains are extended, anything else starts a new chain.
//! - [`OptionErrExt`]: `.errorf(msg)` on `Option<T>`. `None` starts a chain
//!   that wraps nothing.
//!
//! These are equivalent to `map_err(|e| errorf(e, msg))` but keep the stack
//! capture pointed at the caller.

use std::borrow::Cow;

use crate::cause::Cause;
use crate::error::{BoxError, Error};

// ============================================================================
// ResultErrExt
// ============================================================================

/// Annotate the error of a `Result`.
///
/// ```rust
/// use errstack::{Error, ResultErrExt};
///
/// fn parse_port(raw: &str) -> Result<u16, Error> {
///     raw.parse::<u16>().errorf("parsing port")
/// }
///
/// fn load(raw: &str) -> Result<u16, Error> {
///     parse_port(raw).errorf_with(|| format!("loading port from {raw:?}"))
/// }
///
/// let err = load("http").unwrap_err();
/// assert_eq!(err.depth(), 2);
/// assert!(err.inner_most_downcast_ref::<std::num::ParseIntError>().is_some());
/// ```
pub trait ResultErrExt<T> {
    /// On `Err`, wrap or extend the error with `message`.
    fn errorf(self, message: impl Into<Cow<'static, str>>) -> Result<T, Error>;

    /// Like [`errorf`](Self::errorf), but the message is only built on `Err`.
    fn errorf_with<F: FnOnce() -> String>(self, f: F) -> Result<T, Error>;
}

impl<T, E: Into<BoxError>> ResultErrExt<T> for Result<T, E> {
    #[inline(never)]
    fn errorf(self, message: impl Into<Cow<'static, str>>) -> Result<T, Error> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(Error::build(Cause::from(err.into()), message.into(), 1)),
        }
    }

    #[inline(never)]
    fn errorf_with<F: FnOnce() -> String>(self, f: F) -> Result<T, Error> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(Error::build(Cause::from(err.into()), Cow::Owned(f()), 1)),
        }
    }
}

// ============================================================================
// OptionErrExt
// ============================================================================

/// Turn a missing value into a new chain.
///
/// ```rust
/// use errstack::OptionErrExt;
///
/// let users = ["ann", "bob"];
/// let err = users.get(5).errorf("user 5 missing").unwrap_err();
/// assert!(err.is_origin());
/// assert!(err.inner().is_none());
/// ```
pub trait OptionErrExt<T> {
    /// On `None`, start a chain with `message`.
    fn errorf(self, message: impl Into<Cow<'static, str>>) -> Result<T, Error>;
}

impl<T> OptionErrExt<T> for Option<T> {
    #[inline(never)]
    fn errorf(self, message: impl Into<Cow<'static, str>>) -> Result<T, Error> {
        match self {
            Some(value) => Ok(value),
            None => Err(Error::build(Cause::Nil, message.into(), 1)),
        }
    }
}
