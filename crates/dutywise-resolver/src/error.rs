//! Resolver error types

use thiserror::Error;

/// Errors that can occur during code resolution
#[derive(Error, Debug)]
pub enum ResolverError {
    /// Store error during lookup
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
