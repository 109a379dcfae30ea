use std::result::Result as StdResult;

use thiserror::Error;

/// Error type shared by the persistence, configuration, and service layers.
///
/// Arithmetic edge cases never surface here; calculators resolve them to
/// fallbacks. Only validation and I/O failures are reported.
#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, FinanceError>;
