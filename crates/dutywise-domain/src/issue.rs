//! Structured failure taxonomy
//!
//! Per-input problems never surface as panics or bare errors. They become an
//! [`Issue`] with a kind, a confidence label and explicit next steps.

use serde::{Deserialize, Serialize};

/// Kind of problem encountered while resolving a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No record at any lookup level
    NotFound,
    /// Several candidates tied for the top score; the first by code order was kept
    Ambiguous,
    /// Value shares do not sum to 100 % or a required field is missing
    Incomplete,
    /// Every fallback tier failed
    ExhaustedFallback,
    /// The underlying store was unreachable
    ServiceUnavailable,
}

impl ErrorKind {
    /// Get the kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Ambiguous => "ambiguous",
            ErrorKind::Incomplete => "incomplete",
            ErrorKind::ExhaustedFallback => "exhausted_fallback",
            ErrorKind::ServiceUnavailable => "service_unavailable",
        }
    }

    /// Only an unreachable store is worth retrying with the same input
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::ServiceUnavailable)
    }
}

/// Ordinal confidence label shown next to every estimate and option
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLabel {
    /// Essentially a guess
    VeryLow,
    /// Rough estimate
    Low,
    /// Reasonable estimate
    Medium,
    /// Verified or professionally reviewed
    High,
}

impl ConfidenceLabel {
    /// Get the label as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLabel::VeryLow => "very_low",
            ConfidenceLabel::Low => "low",
            ConfidenceLabel::Medium => "medium",
            ConfidenceLabel::High => "high",
        }
    }
}

impl std::fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured, non-fatal problem attached to a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// What went wrong
    pub kind: ErrorKind,
    /// Pipeline stage that raised it (e.g. `"resolve"`)
    pub stage: String,
    /// Confidence of whatever result accompanies the issue
    pub confidence: ConfidenceLabel,
    /// Human-readable explanation
    pub message: String,
    /// What the caller can do about it
    pub next_steps: Vec<String>,
}

impl Issue {
    /// Create an issue with default next steps for its kind
    pub fn new(kind: ErrorKind, stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage: stage.into(),
            confidence: ConfidenceLabel::VeryLow,
            message: message.into(),
            next_steps: default_next_steps(kind),
        }
    }

    /// Override the confidence label
    pub fn with_confidence(mut self, confidence: ConfidenceLabel) -> Self {
        self.confidence = confidence;
        self
    }

    /// Whether the caller should retry the same input later
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

fn default_next_steps(kind: ErrorKind) -> Vec<String> {
    let steps: &[&str] = match kind {
        ErrorKind::NotFound => &[
            "Enter a classification code manually",
            "Request professional classification",
        ],
        ErrorKind::Ambiguous => &[
            "Review the alternatives and confirm the intended code",
            "Add detail to the product description",
        ],
        ErrorKind::Incomplete => &[
            "Complete the component breakdown so value shares sum to 100%",
            "Supply the missing fields and resubmit",
        ],
        ErrorKind::ExhaustedFallback => &[
            "Enter a classification code manually",
            "Request professional classification",
        ],
        ErrorKind::ServiceUnavailable => &["Retry the request later"],
    };
    steps.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_service_unavailable_is_retryable() {
        assert!(ErrorKind::ServiceUnavailable.is_retryable());
        for kind in [
            ErrorKind::NotFound,
            ErrorKind::Ambiguous,
            ErrorKind::Incomplete,
            ErrorKind::ExhaustedFallback,
        ] {
            assert!(!kind.is_retryable(), "{} should be terminal", kind.as_str());
        }
    }

    #[test]
    fn test_every_issue_has_next_steps() {
        let issue = Issue::new(ErrorKind::NotFound, "resolve", "no record");
        assert!(!issue.next_steps.is_empty());
        assert_eq!(issue.confidence, ConfidenceLabel::VeryLow);
    }

    #[test]
    fn test_confidence_label_ordering() {
        assert!(ConfidenceLabel::High > ConfidenceLabel::Medium);
        assert!(ConfidenceLabel::Low > ConfidenceLabel::VeryLow);
    }
}
