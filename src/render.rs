//! Rendering a chain into its diagnostic string.
//!
//! The output is one record per surviving stack frame, innermost first:
//!
//! ```text
//! \n\t[<file>:<line>:<function>:<message>]
//! ```
//!
//! Messages are paired with frames by position. The chain's messages are
//! listed newest first; surviving frame `i` gets message `len - 1 - i`. So the
//! innermost frame carries the origin's message, the next frame the message
//! added one level up, and so on. Frames beyond the last message get an empty
//! message. Dropped frames (runtime, filtered) do not use up a message.
//!
//! The pairing assumes each `errorf` call happens one frame further out than
//! the last. Chains annotated several times within one function, or wrapped
//! more times than there are frames, will show messages against neighbouring
//! frames. That is the documented behavior and is kept as is.

use core::fmt::{self, Write as _};
use std::borrow::Cow;
use std::sync::Arc;

use crate::error::Error;
use crate::filter::{self, FilterFn};
use crate::frame::{self, BacktraceResolver, Frame, Resolve, RUNTIME_ROOTS};

/// Initial capacity of a rendered string.
const RENDER_CAPACITY: usize = 1024;

/// Resolves, trims, filters and formats the frames of a chain.
///
/// `Renderer::new()` uses the `backtrace` symbolizer and a snapshot of the
/// process-wide filter. Builder methods swap either out, which is how tests and
/// libraries avoid depending on global state.
///
/// ## Example
///
/// ```rust
/// use errstack::{errorf, Cause, Renderer};
///
/// let err = errorf(Cause::Nil, "boom");
/// let renderer = Renderer::new().with_filter(|_file, func| func.starts_with("test::"));
/// let trace = err.render_with(&renderer);
/// assert!(trace.is_empty() || trace.starts_with("\n\t["));
/// ```
#[derive(Clone)]
pub struct Renderer {
    resolver: Arc<dyn Resolve>,
    filter: Option<Arc<FilterFn>>,
    runtime_roots: Vec<Cow<'static, str>>,
}

impl Renderer {
    /// A renderer using the `backtrace` symbolizer and the current global filter.
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(BacktraceResolver),
            filter: filter::current(),
            runtime_roots: RUNTIME_ROOTS.iter().map(|root| Cow::Borrowed(*root)).collect(),
        }
    }

    /// Resolve addresses with `resolver` instead of the symbolizer.
    pub fn with_resolver(mut self, resolver: impl Resolve + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Use `filter` instead of the global filter.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Show every frame the runtime-root rule lets through.
    pub fn without_filter(mut self) -> Self {
        self.filter = None;
        self
    }

    /// Replace the runtime source roots. A frame whose file path starts with
    /// any of them is dropped before the filter runs. Sources under
    /// [`SYSROOT_LIBRARY`](crate::SYSROOT_LIBRARY) are always dropped.
    pub fn with_runtime_roots<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        self.runtime_roots = roots.into_iter().map(Into::into).collect();
        self
    }

    /// The frames `render` would print, paired with their messages.
    ///
    /// Unlike [`Error::render`] this is not cached.
    pub fn frames(&self, err: &Error) -> Vec<Frame> {
        let messages: Vec<Cow<'_, str>> = err.chain().map(Error::display_message).collect();
        let stack = err.stack();

        let mut frames = Vec::with_capacity(stack.len());
        for addr in stack.iter() {
            let symbol = self.resolver.resolve(addr);
            if symbol.is_none() {
                log::trace!("unresolved frame address {:#x}", addr.ip());
            }
            let Some(located) = frame::locate(symbol, &self.runtime_roots) else {
                continue;
            };
            if self.is_filtered(&located.file, &located.function) {
                continue;
            }
            let message = messages
                .len()
                .checked_sub(frames.len() + 1)
                .map(|idx| messages[idx].clone().into_owned())
                .unwrap_or_default();
            frames.push(Frame {
                file: located.file,
                line: located.line,
                function: located.function,
                message,
            });
        }
        frames
    }

    /// Render `err` without touching its cache.
    pub fn render(&self, err: &Error) -> String {
        let frames = self.frames(err);
        log::trace!(
            "rendering chain of depth {} ({} of {} frames shown)",
            err.depth(),
            frames.len(),
            err.stack().len()
        );
        let mut out = String::with_capacity(RENDER_CAPACITY);
        for frame in &frames {
            // Writing into a String cannot fail.
            let _ = write!(out, "{frame}");
        }
        out
    }

    fn is_filtered(&self, file: &str, function: &str) -> bool {
        self.filter
            .as_ref()
            .is_some_and(|filter| (**filter)(file, function))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("filtered", &self.filter.is_some())
            .field("runtime_roots", &self.runtime_roots)
            .finish_non_exhaustive()
    }
}
