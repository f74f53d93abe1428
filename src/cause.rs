//! What a new chain node is built on top of.

use crate::error::{BoxError, Error};
use crate::plain::Plain;

/// The value handed to [`errorf`](crate::errorf()).
///
/// - [`Cause::Chain`]: an existing chain. The new node only adds a message.
/// - [`Cause::Foreign`]: any other error. The new node becomes an origin: it
///   wraps the value and captures the stack.
/// - [`Cause::Nil`]: nothing failed below us. The new node becomes an origin
///   wrapping nothing.
///
/// Conversions pick the variant for you. A boxed error that is really an
/// [`Error`] is unboxed into `Chain`, so chains survive a round trip through
/// `Box<dyn Error>`.
#[derive(Debug)]
pub enum Cause {
    Nil,
    Chain(Error),
    Foreign(BoxError),
}

impl Cause {
    /// Classify any error value.
    ///
    /// ```rust
    /// use errstack::Cause;
    ///
    /// let io = std::io::Error::other("disk on fire");
    /// assert!(matches!(Cause::new(io), Cause::Foreign(_)));
    /// ```
    pub fn new<E: Into<BoxError>>(err: E) -> Self {
        Self::from(err.into())
    }

    /// True if the new node will extend an existing chain.
    pub fn is_chain(&self) -> bool {
        matches!(self, Cause::Chain(_))
    }
}

impl From<Error> for Cause {
    fn from(err: Error) -> Self {
        Cause::Chain(err)
    }
}

impl From<BoxError> for Cause {
    fn from(err: BoxError) -> Self {
        match err.downcast::<Error>() {
            Ok(node) => Cause::Chain(*node),
            Err(other) => Cause::Foreign(other),
        }
    }
}

impl From<Option<BoxError>> for Cause {
    fn from(err: Option<BoxError>) -> Self {
        err.map_or(Cause::Nil, Cause::from)
    }
}

impl From<Plain> for Cause {
    fn from(err: Plain) -> Self {
        Cause::Foreign(Box::new(err))
    }
}
