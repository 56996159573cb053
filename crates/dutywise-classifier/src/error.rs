//! Classifier error types

use thiserror::Error;

/// Errors that can occur during classification
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Store error while loading candidate codes
    #[error("Store error: {0}")]
    Store(String),

    /// Taxonomy table is malformed
    #[error("Taxonomy error: {0}")]
    Taxonomy(String),
}
