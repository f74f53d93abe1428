//! The process-wide frame filter.
//!
//! A filter decides, per displayed frame, whether to hide it. It receives the
//! trimmed file name and the shortened function name and returns `true` to
//! exclude the frame.
//!
//! The default filter hides frames from the cargo registry, so dependency
//! internals don't clutter traces. After `/src/` trimming those paths start
//! with the registry directory name, e.g.
//! `index.crates.io-6f17d22bba15001f/serde-1.0.200/src/de.rs`.
//!
//! ## Global state
//!
//! The setting is global and last-writer-wins. Configure it once at start-up,
//! before errors are rendered on other threads. A [`Renderer`](crate::Renderer)
//! takes a snapshot when it is built, so a render already in progress is never
//! affected. Code that must not depend on global state should build its own
//! `Renderer` with [`with_filter`](crate::Renderer::with_filter).

use std::sync::{Arc, PoisonError, RwLock};

/// A frame filter: `(file, function) -> exclude`.
pub type FilterFn = dyn Fn(&str, &str) -> bool + Send + Sync;

/// Path prefixes hidden by [`default_filter`]: the cargo registry source
/// directories (current sparse index and the older git index).
pub const DEFAULT_NOISE_PREFIXES: &[&str] = &["index.crates.io-", "github.com-"];

/// The filter used until [`set_filter_func`] is called.
pub fn default_filter(file: &str, _function: &str) -> bool {
    DEFAULT_NOISE_PREFIXES
        .iter()
        .any(|prefix| file.starts_with(prefix))
}

enum Setting {
    Default,
    Custom(Arc<FilterFn>),
    Off,
}

static FILTER: RwLock<Setting> = RwLock::new(Setting::Default);

/// Replace the process-wide frame filter.
///
/// ```rust
/// // Hide everything generated by the test harness as well.
/// errstack::set_filter_func(|file, func| {
///     errstack::default_filter(file, func) || func.starts_with("test::")
/// });
/// # errstack::reset_filter_func();
/// ```
pub fn set_filter_func<F>(filter: F)
where
    F: Fn(&str, &str) -> bool + Send + Sync + 'static,
{
    store(Setting::Custom(Arc::new(filter)));
    log::debug!("frame filter replaced");
}

/// Disable frame filtering entirely. Runtime frames are still dropped.
pub fn clear_filter_func() {
    store(Setting::Off);
    log::debug!("frame filter disabled");
}

/// Restore [`default_filter`].
pub fn reset_filter_func() {
    store(Setting::Default);
    log::debug!("frame filter reset to default");
}

fn store(setting: Setting) {
    *FILTER.write().unwrap_or_else(PoisonError::into_inner) = setting;
}

/// Snapshot of the current setting; `None` when filtering is off.
pub(crate) fn current() -> Option<Arc<FilterFn>> {
    match &*FILTER.read().unwrap_or_else(PoisonError::into_inner) {
        Setting::Default => Some(Arc::new(default_filter) as Arc<FilterFn>),
        Setting::Custom(filter) => Some(Arc::clone(filter)),
        Setting::Off => None,
    }
}
