//! Duo Ledger: a two-person household expense tracker with installment
//! projection, monthly bills and CSV export, driven from an interactive shell.
//!
//! The engine lives in `duo-core`; this crate wires it to storage, configuration
//! and the terminal.

pub mod cli;
pub mod errors;
pub mod utils;

pub use duo_config as config;
pub use duo_core as core;
pub use duo_domain as domain;
pub use duo_storage_json as storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Duo Ledger tracing initialized.");
    });
}
