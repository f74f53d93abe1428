//! Integration tests for building chains and getting the wrapped error back,
//! alongside `thiserror` types and `anyhow`.

use std::error::Error as StdError;

use errstack::prelude::*;
use errstack::{BoxError, Plain};

static UNEXPECTED: Plain = Plain::from_static("some unexpected");

#[derive(Debug, PartialEq, thiserror::Error)]
enum StoreError {
    #[error("record {0} not found")]
    NotFound(u32),
    #[error("store closed")]
    Closed,
}

fn query(id: u32) -> Result<String, StoreError> {
    match id {
        0 => Err(StoreError::Closed),
        1..=9 => Ok(format!("record-{id}")),
        _ => Err(StoreError::NotFound(id)),
    }
}

fn load(id: u32) -> Result<String, Error> {
    query(id).errorf_with(|| format!("loading id={id}"))
}

fn handle(request: &str, id: u32) -> Result<String, Error> {
    load(id).map_err(|err| errorf!(err, "[{request}] handling"))
}

// ============================================================================
// Sentinels
// ============================================================================

#[test]
fn sentinel_survives_three_layers() {
    let err = errorf(UNEXPECTED.clone(), "unexpected param");
    let err = errorf(err, "i=3");
    let err = errorf(err, "[11] 123");

    assert_eq!(err.depth(), 3);
    assert!(err.inner_most_is(&UNEXPECTED));
    assert!(err.inner().is_none(), "Only the origin wraps a value");

    let inner = get_inner_most(Some(&err)).and_then(|e| e.downcast_ref::<Plain>());
    assert_eq!(inner, Some(&UNEXPECTED));
}

#[test]
fn typed_error_is_recovered() {
    let err = handle("req-7", 42).unwrap_err();

    assert_eq!(
        err.inner_most_downcast_ref::<StoreError>(),
        Some(&StoreError::NotFound(42))
    );
    let messages: Vec<_> = err.chain().map(|node| node.message()).collect();
    assert_eq!(messages, ["[req-7] handling", "loading id=42"]);
}

#[test]
fn ok_values_pass_through() {
    assert_eq!(handle("req-1", 3).unwrap(), "record-3");
}

#[test]
fn origin_without_wrapped_value() {
    let err = errorf!("nothing underneath");
    let err = errorf!(err, "outer");

    assert!(err.inner_most().is_none());
    assert!(get_inner_most(Some(&err)).is_none());
    assert!(!err.inner_most_is(&UNEXPECTED));
}

#[test]
fn plain_errors_pass_through_accessors() {
    let err = StoreError::Closed;
    let inner = get_inner(Some(&err)).unwrap();
    assert_eq!(inner.to_string(), "store closed");

    let inner = get_inner_most(Some(&err)).unwrap();
    assert_eq!(inner.downcast_ref::<StoreError>(), Some(&StoreError::Closed));

    assert!(get_inner(None).is_none());
    assert!(get_inner_most(None).is_none());
}

#[test]
fn option_ext_starts_a_chain() {
    let missing: Option<u32> = None;
    let err = missing.errorf("no port configured").unwrap_err();
    assert!(err.is_origin());
    assert!(err.inner().is_none());
    assert_eq!(err.message(), "no port configured");

    assert_eq!(Some(8080).errorf("unused").unwrap(), 8080);
}

// ============================================================================
// Boxed errors
// ============================================================================

fn boxed_layer(id: u32) -> Result<String, BoxError> {
    Ok(load(id)?)
}

#[test]
fn boxed_chain_is_extended_not_restarted() {
    let boxed = boxed_layer(0).unwrap_err();
    let err = errorf(boxed, "top");

    assert_eq!(err.depth(), 2, "Boxed chain should be unboxed and extended");
    assert_eq!(
        err.inner_most_downcast_ref::<StoreError>(),
        Some(&StoreError::Closed)
    );
}

#[test]
fn source_walks_to_the_wrapped_value() {
    let err = handle("req-2", 0).unwrap_err();

    let mut sources = Vec::new();
    let mut current = err.source();
    while let Some(source) = current {
        sources.push(source);
        current = source.source();
    }

    assert_eq!(sources.len(), 2, "One link node, then the wrapped error");
    assert!(sources[0].downcast_ref::<Error>().is_some());
    assert_eq!(
        sources[1].downcast_ref::<StoreError>(),
        Some(&StoreError::Closed)
    );
}

// ============================================================================
// anyhow interop
// ============================================================================

fn anyhow_layer(id: u32) -> anyhow::Result<String> {
    let record = handle("req-3", id)?;
    Ok(record)
}

#[test]
fn converts_into_anyhow() {
    let err = anyhow_layer(11).unwrap_err();

    let node = err.downcast_ref::<Error>().expect("chain should be kept as is");
    assert_eq!(node.message(), "[req-3] handling");
    assert_eq!(err.chain().count(), 3);
    assert_eq!(
        err.root_cause().downcast_ref::<StoreError>(),
        Some(&StoreError::NotFound(11))
    );
}

#[test]
fn anyhow_error_can_start_a_chain() {
    let source: BoxError = anyhow::anyhow!("socket hang up").into();
    let err = errorf(source, "fetching feed");

    assert!(err.is_origin());
    assert_eq!(
        err.inner().map(|inner| inner.to_string()).as_deref(),
        Some("socket hang up")
    );
}
