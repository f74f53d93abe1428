//! Raw call-stack capture.
//!
//! Capture is cheap: only instruction pointers are recorded. Nothing is
//! resolved to files or symbols until an [`Error`](crate::Error) is rendered.

use core::ffi::c_void;

/// Maximum number of frames kept for one origin.
pub const MAX_FRAMES: usize = 200;

/// Frames walked past the limit while looking for the capturer's own frame.
const MARKER_SEARCH_DEPTH: usize = 32;

// ============================================================================
// FrameAddr - one raw instruction pointer
// ============================================================================

/// The raw instruction pointer of one captured frame.
///
/// For every frame but the innermost this is a return address, which points
/// just past the call instruction. [`lookup`](Self::lookup) gives the address
/// that should be handed to a symbol resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameAddr(usize);

impl FrameAddr {
    /// Wrap a raw instruction pointer.
    #[inline]
    pub const fn new(ip: usize) -> Self {
        Self(ip)
    }

    /// The instruction pointer as captured.
    #[inline]
    pub const fn ip(self) -> usize {
        self.0
    }

    /// The address to resolve: one byte before the return address, so the
    /// lookup lands inside the call instruction rather than after it.
    #[inline]
    pub const fn lookup(self) -> usize {
        self.0.saturating_sub(1)
    }

    #[inline]
    pub(crate) fn lookup_ptr(self) -> *mut c_void {
        self.lookup() as *mut c_void
    }
}

// ============================================================================
// Stack - captured frames of a chain origin
// ============================================================================

/// The frames captured where a chain originated, innermost first.
///
/// Only the origin node of a chain owns a `Stack`; every later node reaches
/// it through its `prev` links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    frames: Vec<FrameAddr>,
}

impl Stack {
    /// Capture the current thread's stack.
    ///
    /// The capturer's own frame is always dropped. `skip` further frames above
    /// it are dropped too, so callers can hide their own entry points. At most
    /// [`MAX_FRAMES`] frames are kept.
    #[inline(never)]
    pub(crate) fn capture(skip: usize) -> Self {
        let marker = Self::capture as *const () as usize;
        let limit = MAX_FRAMES + skip + MARKER_SEARCH_DEPTH;

        let mut seen = Vec::with_capacity(64);
        let mut start = None;
        backtrace::trace(|frame| {
            if start.is_none() && frame.symbol_address() as usize == marker {
                start = Some(seen.len() + 1);
            }
            seen.push(FrameAddr(frame.ip() as usize));
            seen.len() < limit
        });

        // Without a marker (no symbol info) the unwinder's own frames stay in;
        // they live in the dependency namespace and the default filter drops them.
        let start = start.unwrap_or(0) + skip;
        Self {
            frames: seen.into_iter().skip(start).take(MAX_FRAMES).collect(),
        }
    }

    /// Build a stack from known addresses, innermost first.
    ///
    /// Useful for tests and for replaying stacks captured elsewhere. The list
    /// is truncated to [`MAX_FRAMES`].
    pub fn from_addrs(addrs: impl IntoIterator<Item = usize>) -> Self {
        Self {
            frames: addrs
                .into_iter()
                .take(MAX_FRAMES)
                .map(FrameAddr::new)
                .collect(),
        }
    }

    /// Iterate over the frames, innermost first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = FrameAddr> + '_ {
        self.frames.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
