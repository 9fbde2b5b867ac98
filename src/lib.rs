#![doc(test(attr(deny(warnings))))]

//! Nightly Close reconciles a venue's end-of-night takings and costs, derives
//! the closure totals with exact decimal arithmetic, and keeps an append-only
//! JSON ledger of saved closures with CSV and raw exports.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod export;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Nightly Close tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
