//! Volatility error types

use thiserror::Error;

/// Errors that can occur while separating savings or monitoring rates
#[derive(Error, Debug)]
pub enum VolatilityError {
    /// Reference store error
    #[error("Store error: {0}")]
    Store(String),

    /// The tracked code is no longer in the reference table
    #[error("No reference record for {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
