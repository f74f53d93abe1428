//! Integration tests for the rendered output, against real captured stacks.

use errstack::{Cause, Error, MAX_FRAMES, ResultErrExt, errorf};

/// File and line assertions need debuginfo, which the default test profile
/// pairs with debug assertions. Without it records read `???:0:<function>`.
const DEBUGINFO: bool = cfg!(debug_assertions);

/// Split a rendered trace into its records, without the `\n\t[` lead-in.
fn records(rendered: &str) -> Vec<&str> {
    rendered.split("\n\t[").skip(1).collect()
}

#[inline(never)]
fn origin() -> (Error, u32) {
    (errorf(Cause::Nil, "A"), line!())
}

#[inline(never)]
fn middle() -> (Error, u32) {
    let (err, line) = origin();
    (errorf(err, "B"), line)
}

#[inline(never)]
fn outer() -> (Error, u32) {
    let (err, line) = middle();
    (errorf(err, "C"), line)
}

// ============================================================================
// Record shape
// ============================================================================

#[test]
fn every_record_has_the_bracketed_shape() {
    let (err, _) = outer();
    let rendered = err.to_string();

    assert!(
        rendered.starts_with("\n\t["),
        "Should start with the first record. Got:\n{rendered}"
    );
    assert!(!rendered.ends_with('\n'), "No trailing newline. Got:\n{rendered}");
    for record in records(&rendered) {
        assert!(record.ends_with(']'), "Record not closed: {record:?}");
        assert!(
            record.matches(':').count() >= 3,
            "Record should have file:line:function:message. Got: {record:?}"
        );
    }
}

#[test]
fn messages_pair_innermost_first() {
    let (err, line) = outer();
    let rendered = err.to_string();
    let records = records(&rendered);

    assert!(records.len() >= 3, "Got:\n{rendered}");
    if DEBUGINFO {
        assert!(
            records[0].contains(&format!("output_format.rs:{line}:")),
            "Origin record should point at the errorf call. Got:\n{rendered}"
        );
    }
    assert!(records[0].ends_with("origin:A]"), "Got:\n{rendered}");
    assert!(records[1].ends_with("middle:B]"), "Got:\n{rendered}");
    assert!(records[2].ends_with("outer:C]"), "Got:\n{rendered}");
}

#[test]
fn frames_past_the_last_message_have_empty_message() {
    let (err, _) = outer();
    let rendered = err.to_string();
    let records = records(&rendered);

    assert!(records.len() >= 4, "Got:\n{rendered}");
    assert!(
        records[3].contains("frames_past_the_last_message_have_empty_message"),
        "Fourth record should be the test itself. Got:\n{rendered}"
    );
    assert!(records[3].ends_with(":]"), "Got:\n{rendered}");
}

#[test]
fn runtime_and_library_frames_are_hidden() {
    let (err, _) = outer();
    let rendered = err.to_string();

    assert!(!rendered.contains("/rustc/"), "Got:\n{rendered}");
    assert!(!rendered.contains("index.crates.io"), "Got:\n{rendered}");
    assert!(
        !rendered.contains("stack.rs") && !rendered.contains("Stack::capture"),
        "The capturer's own frames should be skipped. Got:\n{rendered}"
    );
}

#[test]
fn wrapped_error_is_shown_with_origin_message() {
    let err = errorf(errstack::new("not found"), "unexpected param");
    let rendered = err.to_string();

    assert!(
        records(&rendered)[0].ends_with(":unexpected param err:not found]"),
        "Got:\n{rendered}"
    );
}

#[test]
fn closures_keep_their_marker() {
    // Optimized builds inline the closure away.
    if !DEBUGINFO {
        return;
    }
    let make = || errorf(Cause::Nil, "in closure");
    let err = make();
    let rendered = err.to_string();

    let first = records(&rendered)[0];
    assert!(
        first.ends_with("closures_keep_their_marker::{{closure}}:in closure]")
            || first.ends_with("closures_keep_their_marker::{closure#0}:in closure]"),
        "Got:\n{rendered}"
    );
}

#[test]
fn extension_trait_points_at_caller() {
    let err = "x".parse::<u8>().errorf("parsing").unwrap_err();
    let rendered = err.to_string();

    let first = records(&rendered)[0];
    if DEBUGINFO {
        assert!(first.contains("output_format.rs:"), "Got:\n{rendered}");
    }
    assert!(
        first.ends_with("extension_trait_points_at_caller:parsing err:invalid digit found in string]"),
        "Got:\n{rendered}"
    );
}

// ============================================================================
// Caching and limits
// ============================================================================

#[test]
fn display_is_stable() {
    let (err, _) = outer();
    let first = err.to_string();
    let second = err.to_string();
    assert_eq!(first, second);
    assert_eq!(err.rendered(), Some(first.as_str()));
}

#[inline(never)]
fn recurse(depth: usize) -> Error {
    if depth == 0 {
        errorf(Cause::Nil, "bottom")
    } else {
        let err = recurse(depth - 1);
        std::hint::black_box(&err);
        err
    }
}

#[test]
fn deep_stacks_are_truncated() {
    let err = recurse(300);
    assert_eq!(err.stack().len(), MAX_FRAMES);

    let rendered = err.to_string();
    let records = records(&rendered);
    assert!(records[0].ends_with("recurse:bottom]"), "Got: {:?}", records[0]);
    assert!(records.iter().skip(1).all(|r| r.ends_with("recurse:]")));
}
