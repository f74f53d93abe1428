//! A request that fails three calls deep, logged once at the top.
//!
//! Run with: RUST_LOG=debug cargo run --example layered

use errstack::prelude::*;
use errstack::Plain;

static SOME_UNEXPECTED: Plain = Plain::from_static("some unexpected");

// ============================================================================
// Scenario 1: nothing to wrap, start the chain with a message
// ============================================================================

fn handle_request() {
    let request_id = "1";
    if let Err(err) = load_item() {
        let err = errorf!(err, "[{request_id}] 123");
        log::error!("{err}");
    }
}

fn load_item() -> Result<(), Error> {
    let i = 3;
    check_param(i).map_err(|err| errorf!(err, "i={i}"))
}

fn check_param(_i: u32) -> Result<(), Error> {
    Err(errorf!("unexpected param"))
}

// ============================================================================
// Scenario 2: wrap a sentinel and recognize it further up
// ============================================================================

fn handle_request_sentinel() {
    let request_id = "11";
    if let Err(err) = load_item_sentinel() {
        let err = errorf!(err, "[{request_id}] 123");
        log::error!("{err}");
        if err.inner_most_is(&SOME_UNEXPECTED) {
            log::info!("recognized innermost error: {SOME_UNEXPECTED}");
        }
    }
}

fn load_item_sentinel() -> Result<(), Error> {
    let i = 3;
    check_param_sentinel(i).map_err(|err| {
        let inner = get_inner_most(Some(&err)).and_then(|e| e.downcast_ref::<Plain>());
        if inner == Some(&SOME_UNEXPECTED) {
            log::info!("recognized error from the previous step: {SOME_UNEXPECTED}");
        }
        errorf!(err, "i={i}")
    })
}

fn check_param_sentinel(_i: u32) -> Result<(), Error> {
    Err(errorf!(SOME_UNEXPECTED.clone(), "unexpected param"))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    handle_request();
    handle_request_sentinel();
}
