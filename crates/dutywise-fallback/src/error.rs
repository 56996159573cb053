//! Fallback error types

use thiserror::Error;

/// Errors that can occur while building or running a fallback chain
#[derive(Error, Debug)]
pub enum FallbackError {
    /// Store error inside a strategy
    #[error("Store error: {0}")]
    Store(String),

    /// The strategy chain violates confidence ordering or is empty
    #[error("Invalid fallback chain: {0}")]
    InvalidChain(String),
}
