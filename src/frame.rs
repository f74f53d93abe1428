//! Frame resolution and the normalization rules applied before display.
//!
//! A captured [`FrameAddr`] goes through these steps when an error is rendered:
//!
//! 1. Resolve it (address minus one) to a [`Symbol`]. Unknown addresses become
//!    the `???:0:???` placeholder.
//! 2. Drop it if its file lives under the Rust runtime's own source root.
//! 3. Trim the file path up to and including the first `/src/`.
//! 4. Shorten the function name to `Owner::func` (closures keep their
//!    `{{closure}}` or `{closure#N}` suffix).
//! 5. Drop it if the frame filter says so.
//!
//! Steps 2 and 5 are applied by [`Renderer`](crate::Renderer); the helpers for
//! every step live here.

use core::fmt;
use std::borrow::Cow;

use crate::stack::FrameAddr;

/// File, line and function shown for a frame that could not be resolved.
pub const UNRESOLVED: &str = "???";

/// Source roots of the Rust runtime. A frame whose file starts with one of
/// these (after an optional drive prefix) belongs to `std`, `core` or `alloc`
/// and is never shown.
pub const RUNTIME_ROOTS: &[&str] = &["/rustc/"];

/// Runtime sources installed in a toolchain sysroot (`rust-src`). Matched
/// anywhere in the path, whatever the configured roots are.
pub const SYSROOT_LIBRARY: &str = "/lib/rustlib/src/rust/library/";

/// Path marker trimmed from file names.
const SRC_MARKER: &str = "/src/";

// ============================================================================
// Symbol - raw resolver output
// ============================================================================

/// What a [`Resolve`] implementation knows about one address.
///
/// Fields are raw: the path is absolute (with `/` separators) and the function
/// name is fully qualified. Normalization happens later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbol {
    pub file: Option<String>,
    pub line: u32,
    pub function: Option<String>,
}

impl Symbol {
    /// Shorthand for a fully known symbol.
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            line,
            function: Some(function.into()),
        }
    }
}

// ============================================================================
// Resolve trait - address to symbol lookup
// ============================================================================

/// Maps a captured address to source information.
///
/// The default implementation is [`BacktraceResolver`]. Tests and tools can
/// supply their own through [`Renderer::with_resolver`](crate::Renderer::with_resolver).
///
/// ## Example
///
/// ```rust
/// use errstack::{FrameAddr, Resolve, Symbol};
///
/// struct Fixed;
///
/// impl Resolve for Fixed {
///     fn resolve(&self, addr: FrameAddr) -> Option<Symbol> {
///         Some(Symbol::new("/work/app/src/main.rs", addr.ip() as u32, "app::main"))
///     }
/// }
/// ```
pub trait Resolve: Send + Sync {
    /// Resolve one address. `None` means the address is unknown.
    fn resolve(&self, addr: FrameAddr) -> Option<Symbol>;
}

/// Resolves addresses through the `backtrace` crate's symbolizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceResolver;

impl Resolve for BacktraceResolver {
    fn resolve(&self, addr: FrameAddr) -> Option<Symbol> {
        if addr.ip() == 0 {
            return None;
        }
        let mut found: Option<Symbol> = None;
        // Inlined calls report several symbols; the first is the innermost.
        backtrace::resolve(addr.lookup_ptr(), |symbol| {
            if found.is_none() {
                found = Some(Symbol {
                    file: symbol
                        .filename()
                        .map(|path| path.to_string_lossy().replace('\\', "/")),
                    line: symbol.lineno().unwrap_or(0),
                    function: symbol.name().map(|name| format!("{name:#}")),
                });
            }
        });
        found.filter(|sym| sym.file.is_some() || sym.function.is_some())
    }
}

// ============================================================================
// Frame - one displayed record
// ============================================================================

/// One frame of a rendered trace, after trimming and filtering.
///
/// `Display` writes the record exactly as it appears in a rendered error:
/// `\n\t[<file>:<line>:<function>:<message>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub(crate) file: String,
    pub(crate) line: u32,
    pub(crate) function: String,
    pub(crate) message: String,
}

impl Frame {
    /// Trimmed file path, or `???`.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line number, `0` when unknown.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Shortened function name, or `???`.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// The chain message paired with this frame (empty past the last message).
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True when the address could not be mapped to any source information.
    pub fn is_unresolved(&self) -> bool {
        self.file == UNRESOLVED && self.function == UNRESOLVED
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\n\t[{}:{}:{}:{}]",
            self.file, self.line, self.function, self.message
        )
    }
}

// ============================================================================
// Normalization helpers
// ============================================================================

/// A resolved location that has not been filtered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Located {
    pub(crate) file: String,
    pub(crate) line: u32,
    pub(crate) function: String,
}

impl Located {
    pub(crate) fn unresolved() -> Self {
        Self {
            file: UNRESOLVED.into(),
            line: 0,
            function: UNRESOLVED.into(),
        }
    }
}

/// Turn resolver output into a displayable location, or `None` when the frame
/// belongs to the runtime.
pub(crate) fn locate(symbol: Option<Symbol>, runtime_roots: &[Cow<'static, str>]) -> Option<Located> {
    let Some(symbol) = symbol else {
        return Some(Located::unresolved());
    };
    let function = symbol.function.as_deref();

    let file = match symbol.file {
        Some(file) if is_runtime_file(&file, runtime_roots) => return None,
        Some(file) => trim_src(&file).to_owned(),
        // Symbols without line tables: runtime glue is dropped, the rest shown by name.
        None if function.is_some_and(is_runtime_function) => return None,
        None => UNRESOLVED.to_owned(),
    };

    Some(Located {
        line: if file == UNRESOLVED { 0 } else { symbol.line },
        file,
        function: function.map_or_else(|| UNRESOLVED.to_owned(), short_function_name),
    })
}

/// True when `file` lies under one of the runtime source roots.
pub(crate) fn is_runtime_file(file: &str, roots: &[Cow<'static, str>]) -> bool {
    let path = strip_drive(file);
    path.contains(SYSROOT_LIBRARY) || roots.iter().any(|root| path.starts_with(root.as_ref()))
}

/// `C:/rustc/..` -> `/rustc/..`
fn strip_drive(file: &str) -> &str {
    match file.as_bytes() {
        [drive, b':', b'/', ..] if drive.is_ascii_alphabetic() => &file[2..],
        _ => file,
    }
}

/// Runtime or C start-up symbols seen without debug info.
fn is_runtime_function(name: &str) -> bool {
    const CRATES: &[&str] = &["std::", "core::", "alloc::", "<std::", "<core::", "<alloc::"];
    const START: &[&str] = &[
        "_start",
        "__libc_start_main",
        "__libc_start_call_main",
        "start_thread",
        "thread_start",
        "clone",
        "clone3",
        "__clone",
    ];
    // Generic markers the runtime plants in other crates, e.g.
    // `test::__rust_begin_short_backtrace::<fn()>`.
    const MARKERS: &[&str] = &["__rust_begin_short_backtrace", "__rust_end_short_backtrace"];

    if CRATES.iter().any(|p| name.starts_with(p)) || START.contains(&name) {
        return true;
    }
    split_path(strip_hash(name))
        .into_iter()
        .rev()
        .find(|segment| !segment.starts_with('<'))
        .is_some_and(|last| MARKERS.contains(&last))
}

/// Trim everything up to and including the first `/src/`.
///
/// Paths that start with the marker, or lack it, are returned unchanged.
///
/// ```text
/// /home/me/proj/src/db/query.rs  ->  db/query.rs
/// src/main.rs                    ->  src/main.rs
/// ```
pub fn trim_src(file: &str) -> &str {
    match file.find(SRC_MARKER) {
        Some(idx) if idx > 0 => &file[idx + SRC_MARKER.len()..],
        _ => file,
    }
}

/// Shorten a fully qualified function name to its owner and function.
///
/// The symbol hash is dropped, and the module path before the owner (the
/// enclosing module, type, or impl) is removed. Closure markers stay attached
/// to the function they belong to.
///
/// ```text
/// app::db::Pool::query::h0123456789abcdef  ->  Pool::query
/// app::service::load::{{closure}}          ->  service::load::{{closure}}
/// app::service::load::{closure#0}          ->  service::load::{closure#0}
/// <app::Config as core::fmt::Display>::fmt ->  <app::Config as core::fmt::Display>::fmt
/// main                                     ->  main
/// ```
pub fn short_function_name(name: &str) -> String {
    let segments = split_path(strip_hash(name));
    let Some(func) = segments.iter().rposition(|s| !is_closure_marker(s)) else {
        return segments.join("::");
    };
    let owner = func.saturating_sub(1);
    segments[owner..].join("::")
}

/// `{{closure}}` (legacy mangling) or `{closure#0}`, `{shim:vtable#0}` (v0).
fn is_closure_marker(segment: &str) -> bool {
    segment.starts_with('{')
        && segment.ends_with('}')
        && (segment.starts_with("{{") || segment.contains('#'))
}

/// Drop a trailing legacy-mangling hash segment (`::h` + 16 hex digits).
fn strip_hash(name: &str) -> &str {
    match name.rsplit_once("::") {
        Some((head, hash))
            if hash.len() == 17
                && hash.starts_with('h')
                && hash[1..].bytes().all(|b| b.is_ascii_hexdigit()) =>
        {
            head
        }
        _ => name,
    }
}

/// Split on `::` outside of angle brackets.
fn split_path(name: &str) -> Vec<&str> {
    let bytes = name.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            // `->` inside generic arguments is not a closing bracket
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&name[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&name[start..]);
    segments
}
