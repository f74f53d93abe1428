//! The process-wide filter is global state, so everything touching it lives in
//! one test in its own binary.

use errstack::{
    Cause, Error, Renderer, clear_filter_func, errorf, reset_filter_func, set_filter_func,
};

/// Function names survive without debuginfo, file names don't.
const THIS_MODULE: &str = "global_filter::";

fn from_this_module(_file: &str, function: &str) -> bool {
    function.starts_with(THIS_MODULE)
}

#[inline(never)]
fn fail(message: &'static str) -> Error {
    errorf(Cause::Nil, message)
}

#[test]
fn global_filter_lifecycle() {
    // Default: frames from this test are shown.
    let before = fail("default");
    assert!(before.to_string().contains(THIS_MODULE), "Got:\n{before}");

    // Custom: hide them.
    set_filter_func(from_this_module);
    let hidden = fail("custom");
    assert!(!hidden.to_string().contains(THIS_MODULE), "Got:\n{hidden}");
    assert!(
        before.to_string().contains(THIS_MODULE),
        "An already rendered error keeps its cached text"
    );

    // A renderer snapshots the filter it was built with.
    let snapshot = Renderer::new();
    reset_filter_func();
    let after_reset = fail("reset");
    assert!(!after_reset.render_with(&snapshot).contains(THIS_MODULE));
    assert!(Renderer::new().render(&after_reset).contains(THIS_MODULE));

    // Off: nothing filtered beyond the runtime.
    clear_filter_func();
    let unfiltered = fail("off");
    let rendered = unfiltered.to_string();
    assert!(rendered.contains(THIS_MODULE), "Got:\n{rendered}");
    assert!(!rendered.contains("/rustc/"), "Runtime frames are always dropped");

    reset_filter_func();
}
