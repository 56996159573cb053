//! Qualifier error types

use dutywise_domain::{ErrorKind, Issue};
use thiserror::Error;

/// Errors that can occur while evaluating a qualification request
#[derive(Error, Debug)]
pub enum QualifierError {
    /// Rules store error
    #[error("Store error: {0}")]
    Store(String),

    /// Component breakdown or a required field is missing or inconsistent
    #[error("Incomplete request: {0}")]
    Incomplete(String),

    /// No rule covers the code, its category, its chapter or the default
    #[error("No qualification rule applies to {0}")]
    NoApplicableRule(String),

    /// Destination is not a member of the agreement territory
    #[error("Destination {0} is outside the agreement territory")]
    DestinationOutsideTerritory(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QualifierError {
    /// The taxonomy kind this error maps to
    pub fn kind(&self) -> ErrorKind {
        match self {
            QualifierError::Store(_) => ErrorKind::ServiceUnavailable,
            _ => ErrorKind::Incomplete,
        }
    }

    /// Structured issue for the `qualify` stage
    pub fn to_issue(&self) -> Issue {
        Issue::new(self.kind(), "qualify", self.to_string())
    }
}
