//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reference database error
    #[error("Store error: {0}")]
    Store(#[from] dutywise_store::StoreError),

    /// Engine error
    #[error(transparent)]
    Pipeline(#[from] dutywise_pipeline::PipelineError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML encoding error
    #[error("TOML encoding error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No reference database has been loaded yet
    #[error("No reference database at {0}. Load one with 'dutywise import <file>'.")]
    NoDatabase(String),
}
