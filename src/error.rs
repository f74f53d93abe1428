//! The chain node type.
//!
//! An [`Error`] is one link of a singly linked list. The newest node is the one
//! callers hold; each node owns the node it was built from. The oldest node, the
//! origin, is the only one that carries the captured stack and the wrapped
//! foreign error.
//!
//! ```text
//!   errorf(e2, "C")        errorf(e1, "B")        errorf(io_err, "A")
//!  ┌──────────────┐      ┌──────────────┐      ┌───────────────────────┐
//!  │ "C"   prev ──┼────▶ │ "B"   prev ──┼────▶ │ "A"  wrapped: io_err  │
//!  └──────────────┘      └──────────────┘      │      stack: [..200]   │
//!                                              └───────────────────────┘
//! ```

use core::error::Error as StdError;
use core::fmt;
use core::mem;
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::cause::Cause;
use crate::render::Renderer;
use crate::stack::Stack;

/// A boxed, thread-safe error value. This is what an origin wraps.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

// ============================================================================
// Link - what a node sits on
// ============================================================================

enum Link {
    /// First node of the chain.
    Origin {
        wrapped: Option<BoxError>,
        stack: Stack,
    },
    /// Context added over an earlier node.
    Prev(Box<Error>),
}

// ============================================================================
// Error - the chain node
// ============================================================================

/// An error annotated with a chain of context messages and the call stack where
/// it was first observed.
///
/// Build one with [`errorf`](crate::errorf()) or the [`errorf!`](crate::errorf!)
/// macro. `Display` renders the trace: one record per stack frame, each
/// `\n\t[<file>:<line>:<function>:<message>]`. Rendering resolves symbols,
/// which is slow, so it happens at most once per node and is cached.
///
/// ## Example
///
/// ```rust
/// use errstack::{errorf, Cause, Error};
///
/// fn read_config() -> Result<(), Error> {
///     Err(errorf(Cause::Nil, "config missing"))
/// }
///
/// fn start() -> Result<(), Error> {
///     read_config().map_err(|e| errorf(e, "starting service"))
/// }
///
/// let err = start().unwrap_err();
/// assert_eq!(err.message(), "starting service");
/// assert_eq!(err.prev().unwrap().message(), "config missing");
/// assert!(err.inner_most().is_none());
/// println!("{err}");
/// ```
pub struct Error {
    message: Cow<'static, str>,
    link: Link,
    rendered: OnceLock<String>,
}

impl Error {
    /// Build a node over `cause`. Origins capture the stack, skipping this
    /// frame and `skip` frames above it.
    #[inline(never)]
    pub(crate) fn build(cause: Cause, message: Cow<'static, str>, skip: usize) -> Self {
        match cause {
            Cause::Chain(prev) => Self::link(prev, message),
            Cause::Nil => Self::origin(None, message, Stack::capture(skip + 1)),
            Cause::Foreign(err) => Self::origin(Some(err), message, Stack::capture(skip + 1)),
        }
    }

    pub(crate) fn origin(wrapped: Option<BoxError>, message: Cow<'static, str>, stack: Stack) -> Self {
        Self {
            message,
            link: Link::Origin { wrapped, stack },
            rendered: OnceLock::new(),
        }
    }

    pub(crate) fn link(prev: Error, message: Cow<'static, str>) -> Self {
        Self {
            message,
            link: Link::Prev(Box::new(prev)),
            rendered: OnceLock::new(),
        }
    }

    /// The message given when this node was created.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The node this one was built from; `None` at the origin.
    #[inline]
    pub fn prev(&self) -> Option<&Error> {
        match &self.link {
            Link::Prev(prev) => Some(&**prev),
            Link::Origin { .. } => None,
        }
    }

    /// The foreign error wrapped by this node.
    ///
    /// Only an origin wraps anything, and even an origin may wrap nothing (it
    /// was built over [`Cause::Nil`]). Use [`inner_most`](Self::inner_most) to
    /// reach the origin's value from anywhere in the chain.
    #[inline]
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match &self.link {
            Link::Origin { wrapped, .. } => wrapped.as_deref(),
            Link::Prev(_) => None,
        }
    }

    /// True for the first node of a chain.
    #[inline]
    pub fn is_origin(&self) -> bool {
        matches!(self.link, Link::Origin { .. })
    }

    /// Iterate over the chain, starting with `self` and ending at the origin.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Number of nodes in the chain, counting `self`.
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// The first node of the chain.
    pub fn origin_node(&self) -> &Error {
        self.origin_parts().0
    }

    /// The stack captured at the origin.
    pub fn stack(&self) -> &Stack {
        self.origin_parts().2
    }

    /// The foreign error wrapped by the origin, from any depth.
    ///
    /// This is how a deeply annotated chain is compared against a sentinel.
    pub fn inner_most(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.origin_parts().1
    }

    /// Downcast the origin's wrapped error.
    pub fn inner_most_downcast_ref<T: StdError + 'static>(&self) -> Option<&T> {
        self.inner_most()?.downcast_ref::<T>()
    }

    /// True if the origin wraps a value equal to `sentinel`.
    ///
    /// ```rust
    /// use errstack::{errorf, new};
    ///
    /// let timeout = new("timeout");
    /// let err = errorf(timeout.clone(), "dialing");
    /// let err = errorf(err, "fetching profile");
    /// assert!(err.inner_most_is(&timeout));
    /// assert!(!err.inner_most_is(&new("refused")));
    /// ```
    pub fn inner_most_is<T: StdError + PartialEq + 'static>(&self, sentinel: &T) -> bool {
        self.inner_most_downcast_ref::<T>() == Some(sentinel)
    }

    /// The rendered trace, computed on first call with a fresh [`Renderer`].
    ///
    /// The result is cached in this node; later calls return it unchanged, even
    /// if the global frame filter has been replaced since.
    pub fn render(&self) -> &str {
        if let Some(rendered) = self.rendered.get() {
            return rendered;
        }
        self.render_with(&Renderer::new())
    }

    /// The rendered trace, computed on first call with `renderer`.
    ///
    /// Concurrent first calls block until one of them has finished; the
    /// renderer runs exactly once per node.
    pub fn render_with(&self, renderer: &Renderer) -> &str {
        self.rendered.get_or_init(|| renderer.render(self))
    }

    /// The rendered trace if some earlier call produced it.
    pub fn rendered(&self) -> Option<&str> {
        self.rendered.get().map(String::as_str)
    }

    /// This node's line in a trace: the message, plus the wrapped error if any.
    pub(crate) fn display_message(&self) -> Cow<'_, str> {
        match self.inner() {
            Some(wrapped) => Cow::Owned(format!("{} err:{}", self.message, wrapped)),
            None => Cow::Borrowed(&self.message),
        }
    }

    fn origin_parts(&self) -> (&Error, Option<&(dyn StdError + Send + Sync + 'static)>, &Stack) {
        let mut node = self;
        loop {
            match &node.link {
                Link::Origin { wrapped, stack } => return (node, wrapped.as_deref(), stack),
                Link::Prev(prev) => node = &**prev,
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.render())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_message())?;
        f.write_str(self.render())
    }
}

// Chains can be arbitrarily long; unlink them iteratively.
impl Drop for Error {
    fn drop(&mut self) {
        let mut next = take_prev(&mut self.link);
        while let Some(mut node) = next {
            next = take_prev(&mut node.link);
        }
    }
}

fn take_prev(link: &mut Link) -> Option<Box<Error>> {
    if !matches!(link, Link::Prev(_)) {
        return None;
    }
    let detached = Link::Origin {
        wrapped: None,
        stack: Stack::default(),
    };
    match mem::replace(link, detached) {
        Link::Prev(prev) => Some(prev),
        Link::Origin { .. } => None,
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.link {
            Link::Prev(prev) => Some(&**prev),
            Link::Origin { wrapped, .. } => wrapped
                .as_deref()
                .map(|err| err as &(dyn StdError + 'static)),
        }
    }
}

// ============================================================================
// Chain - iterator over nodes
// ============================================================================

/// Iterator over a chain, newest node first. Created by [`Error::chain`].
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a Error>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Error;

    fn next(&mut self) -> Option<&'a Error> {
        let node = self.next?;
        self.next = node.prev();
        Some(node)
    }
}

impl core::iter::FusedIterator for Chain<'_> {}
