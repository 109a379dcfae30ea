#![doc(test(attr(deny(warnings))))]

//! Finance Core turns a transaction history into spending patterns, budget
//! tracking, savings goals, reports, and cash-flow forecasts.

pub mod analysis;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod time;
pub mod utils;

pub use crate::core::{FinanceManager, FinanceSnapshot};
pub use errors::{FinanceError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            "finance_core tracing initialized"
        );
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init();
        super::init();
    }
}
