//! Error types for the activity ledger

use thiserror::Error;

/// Errors raised by ledger, metric and boundary operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid day key: {0}")]
    InvalidDayKey(String),

    #[error("Cannot average over an empty ledger")]
    EmptyLedger,

    #[error("Degenerate measurement: {0}")]
    DegenerateMeasurement(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
