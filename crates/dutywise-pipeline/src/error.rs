//! Pipeline error types

use dutywise_classifier::ClassifierError;
use dutywise_domain::{ErrorKind, Issue};
use dutywise_fallback::FallbackError;
use dutywise_qualifier::QualifierError;
use dutywise_resolver::ResolverError;
use dutywise_volatility::VolatilityError;
use thiserror::Error;

/// Errors surfaced by the individual pipeline stages
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Classifier error
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Resolver error
    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    /// Fallback error
    #[error("Fallback error: {0}")]
    Fallback(#[from] FallbackError),

    /// Qualifier error
    #[error("Qualifier error: {0}")]
    Qualifier(#[from] QualifierError),

    /// Volatility error
    #[error("Volatility error: {0}")]
    Volatility(#[from] VolatilityError),
}

impl PipelineError {
    /// The taxonomy kind this error maps to
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Classifier(ClassifierError::Store(_))
            | PipelineError::Resolver(ResolverError::Store(_))
            | PipelineError::Fallback(FallbackError::Store(_))
            | PipelineError::Volatility(VolatilityError::Store(_)) => ErrorKind::ServiceUnavailable,
            PipelineError::Qualifier(e) => e.kind(),
            PipelineError::Volatility(VolatilityError::NotFound(_)) => ErrorKind::NotFound,
            _ => ErrorKind::Incomplete,
        }
    }

    /// Structured issue attributed to a stage
    pub fn to_issue(&self, stage: &str) -> Issue {
        Issue::new(self.kind(), stage, self.to_string())
    }
}
