//! # errstack - context chains with a lazily rendered call stack
//!
//! Wrap an error where it first happens, add a message at each layer it passes
//! through, and print one compact trace at the top:
//!
//! ```text
//! 	[service/user.rs:31:user::query:unexpected param err:not found]
//! 	[service/user.rs:18:user::load:id=3]
//! 	[handler.rs:12:handler::get:[req-1] loading profile]
//! 	[main.rs:7:app::main:]
//! ```
//!
//! ## Building a chain
//!
//! ```rust
//! use errstack::{errorf, Error, Plain};
//!
//! static NOT_FOUND: Plain = Plain::from_static("not found");
//!
//! fn query(_id: u32) -> Result<(), Error> {
//!     // First failure: wrap the sentinel, capture the stack here.
//!     Err(errorf!(NOT_FOUND.clone(), "unexpected param"))
//! }
//!
//! fn load(id: u32) -> Result<(), Error> {
//!     // Further up: add context, no new stack.
//!     query(id).map_err(|e| errorf!(e, "id={}", id))
//! }
//!
//! let err = load(3).unwrap_err();
//! assert!(err.inner_most_is(&NOT_FOUND));
//! println!("{err}");
//! ```
//!
//! | Value handed to `errorf` | Result |
//! |--------------------------|--------|
//! | an [`Error`] (any node of a chain) | new node with only a message, linked to it |
//! | any other error | new origin: wraps it, captures the stack |
//! | nothing ([`Cause::Nil`], or `errorf!("msg")`) | new origin wrapping nothing |
//!
//! ## Rendering
//!
//! `Display` for [`Error`] resolves the origin's stack into
//! `\n\t[<file>:<line>:<function>:<message>]` records. This runs once per node
//! and is cached, even when several threads print the same error at once.
//! Frames from the Rust runtime are dropped; frames from dependencies are
//! dropped by the default [filter](set_filter_func). See [`Renderer`] for the
//! pairing of messages to frames.
//!
//! ## Recovering the original error
//!
//! [`get_inner_most`] (or [`Error::inner_most`]) returns the value the origin
//! wrapped, however many layers were added since. Non-chain errors pass
//! through unchanged, so the same call works on any error.

#![deny(unsafe_code)]

mod cause;
mod error;
mod ext;
mod filter;
mod frame;
mod plain;
pub mod prelude;
mod render;
mod stack;

use core::error::Error as StdError;
use std::borrow::Cow;
use std::fmt;

pub use cause::Cause;
pub use error::{BoxError, Chain, Error};
pub use ext::{OptionErrExt, ResultErrExt};
pub use filter::{
    DEFAULT_NOISE_PREFIXES, FilterFn, clear_filter_func, default_filter, reset_filter_func,
    set_filter_func,
};
pub use frame::{
    BacktraceResolver, Frame, RUNTIME_ROOTS, Resolve, SYSROOT_LIBRARY, Symbol, UNRESOLVED,
    short_function_name, trim_src,
};
pub use plain::Plain;
pub use render::Renderer;
pub use stack::{FrameAddr, MAX_FRAMES, Stack};

// ============================================================================
// Constructors
// ============================================================================

/// Create a plain error for use as a sentinel. It has no stack and no chain.
///
/// ```rust
/// let err = errstack::new("connection reset");
/// assert_eq!(err.to_string(), "connection reset");
/// ```
pub fn new(message: impl Into<Cow<'static, str>>) -> Plain {
    Plain::new(message)
}

/// Wrap `err` with `message`.
///
/// If `err` is already a chain, the result is a new node on top of it and no
/// stack is captured. Otherwise the result is a new origin: it wraps `err`
/// (which may be [`Cause::Nil`]) and captures the caller's stack.
///
/// Never fails. See [`errorf!`] for a formatting version.
///
/// ```rust
/// use errstack::{errorf, Cause};
///
/// let origin = errorf(Cause::Nil, "unexpected param");
/// assert!(origin.is_origin());
///
/// let link = errorf(origin, "i=3");
/// assert!(!link.is_origin());
/// assert_eq!(link.depth(), 2);
/// ```
#[inline(never)]
pub fn errorf(err: impl Into<Cause>, message: impl Into<Cow<'static, str>>) -> Error {
    Error::build(err.into(), message.into(), 1)
}

/// Wrap an error with a formatted message.
///
/// - `errorf!("fmt", args..)` starts a new chain that wraps nothing.
/// - `errorf!(err, "fmt", args..)` is [`errorf(err, format!(..))`](errorf()).
///
/// A message without arguments is stored without allocating.
///
/// ```rust
/// use errstack::errorf;
///
/// let err = errorf!("unexpected param");
/// let err = errorf!(err, "i={}", 3);
/// let request_id = "req-1";
/// let err = errorf!(err, "[{request_id}] handling request");
///
/// let messages: Vec<_> = err.chain().map(|node| node.message()).collect();
/// assert_eq!(messages, ["[req-1] handling request", "i=3", "unexpected param"]);
/// ```
#[macro_export]
macro_rules! errorf {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::errorf(
            $crate::Cause::Nil,
            $crate::__message(::core::format_args!($fmt $(, $arg)*)),
        )
    };
    ($err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::errorf(
            $err,
            $crate::__message(::core::format_args!($fmt $(, $arg)*)),
        )
    };
}

#[doc(hidden)]
pub fn __message(args: fmt::Arguments<'_>) -> Cow<'static, str> {
    match args.as_str() {
        Some(literal) => Cow::Borrowed(literal),
        None => Cow::Owned(fmt::format(args)),
    }
}

// ============================================================================
// Accessors on any error
// ============================================================================

/// The value wrapped directly by `err`.
///
/// For a chain node this is [`Error::inner`]: the wrapped error of an origin,
/// `None` for any other node. Any other error, and `None`, is returned as is.
///
/// ```rust
/// use errstack::{errorf, get_inner, new};
///
/// let sentinel = new("eof");
/// let err = errorf(sentinel.clone(), "reading header");
/// let inner = get_inner(Some(&err)).unwrap();
/// assert_eq!(inner.downcast_ref::<errstack::Plain>(), Some(&sentinel));
///
/// // Not a chain: unchanged.
/// let inner = get_inner(Some(&sentinel)).unwrap();
/// assert_eq!(inner.to_string(), "eof");
/// assert!(get_inner(None).is_none());
/// ```
pub fn get_inner<'a>(err: Option<&'a (dyn StdError + 'static)>) -> Option<&'a (dyn StdError + 'static)> {
    let err = err?;
    match err.downcast_ref::<Error>() {
        Some(node) => node.inner().map(|inner| inner as &(dyn StdError + 'static)),
        None => Some(err),
    }
}

/// The value wrapped by the origin of `err`'s chain.
///
/// For a chain node, walks to the origin and returns what it wrapped (`None`
/// if it was built over [`Cause::Nil`]). Any other error, and `None`, is
/// returned as is. This is the way to compare a wrapped error with a sentinel.
///
/// ```rust
/// use errstack::{errorf, get_inner_most, Plain};
///
/// static UNEXPECTED: Plain = Plain::from_static("some unexpected");
///
/// let err = errorf(UNEXPECTED.clone(), "unexpected param");
/// let err = errorf(err, "i=3");
/// let err = errorf(err, "[11] 123");
///
/// let inner = get_inner_most(Some(&err)).and_then(|e| e.downcast_ref::<Plain>());
/// assert_eq!(inner, Some(&UNEXPECTED));
/// ```
pub fn get_inner_most<'a>(
    err: Option<&'a (dyn StdError + 'static)>,
) -> Option<&'a (dyn StdError + 'static)> {
    let err = err?;
    match err.downcast_ref::<Error>() {
        Some(node) => node
            .inner_most()
            .map(|inner| inner as &(dyn StdError + 'static)),
        None => Some(err),
    }
}
