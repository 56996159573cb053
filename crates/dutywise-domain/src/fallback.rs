//! Fallback estimate types
//!
//! A [`FallbackResult`] is never a verified rate. Its method tag and disclosure
//! message are mandatory, and it always offers the caller explicit options.

use crate::{ClassificationCode, ConfidenceLabel, Rate};
use serde::{Deserialize, Serialize};

/// Confidence of a fallback estimate, ordered `VeryLow < Low < Medium`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackConfidence {
    /// Terminal failure or unusable input
    VeryLow,
    /// Rough estimate
    Low,
    /// Estimate backed by a meaningful sample
    Medium,
}

impl FallbackConfidence {
    /// Get the confidence as a string
    pub fn as_str(&self) -> &'static str {
        self.label().as_str()
    }

    /// The general-purpose label for this confidence
    pub fn label(&self) -> ConfidenceLabel {
        match self {
            FallbackConfidence::VeryLow => ConfidenceLabel::VeryLow,
            FallbackConfidence::Low => ConfidenceLabel::Low,
            FallbackConfidence::Medium => ConfidenceLabel::Medium,
        }
    }
}

/// Which strategy produced a fallback result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMethod {
    /// Averaged over records whose description shares a keyword
    KeywordMatch,
    /// Averaged over the chapter of a partial code
    ChapterAverage,
    /// Averaged over the whole reference table
    GlobalAverage,
    /// No tier produced an estimate
    TerminalFailure,
    /// The store could not be reached
    ServiceUnavailable,
}

impl FallbackMethod {
    /// Get the method as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackMethod::KeywordMatch => "keyword_match",
            FallbackMethod::ChapterAverage => "chapter_average",
            FallbackMethod::GlobalAverage => "global_average",
            FallbackMethod::TerminalFailure => "terminal_failure",
            FallbackMethod::ServiceUnavailable => "service_unavailable",
        }
    }
}

/// Estimated rates with the derived savings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EstimatedRates {
    /// Estimated base (MFN) rate
    pub base_rate: Rate,
    /// Estimated preferential rate
    pub preferential_rate: Rate,
    /// `max(0, base - preferential)`, unknown if either side is
    pub savings: Rate,
}

impl EstimatedRates {
    /// Build from the two rates, deriving savings
    pub fn new(base_rate: Rate, preferential_rate: Rate) -> Self {
        Self {
            base_rate,
            preferential_rate,
            savings: Rate::savings(base_rate, preferential_rate),
        }
    }

    /// All fields unknown
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// The kind of choice offered to the user alongside an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserOptionKind {
    /// Proceed with the estimate as shown
    AcceptEstimate,
    /// Type a known classification code instead
    EnterCodeManually,
    /// Ask a licensed broker or classification specialist
    RequestProfessionalClassification,
    /// Retry once the store is reachable again
    RetryLater,
}

/// One explicit next step, labelled with the confidence it would yield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserOption {
    /// What the option does
    pub kind: UserOptionKind,
    /// Text shown to the user
    pub label: String,
    /// Confidence of the outcome if chosen
    pub confidence: ConfidenceLabel,
}

impl UserOption {
    /// The three options every fallback result carries
    pub fn standard_set(estimate_confidence: FallbackConfidence) -> Vec<UserOption> {
        vec![
            UserOption {
                kind: UserOptionKind::AcceptEstimate,
                label: format!(
                    "Accept the estimate ({} confidence)",
                    estimate_confidence.as_str()
                ),
                confidence: estimate_confidence.label(),
            },
            UserOption {
                kind: UserOptionKind::EnterCodeManually,
                label: "Enter a classification code manually".to_string(),
                confidence: ConfidenceLabel::Medium,
            },
            UserOption {
                kind: UserOptionKind::RequestProfessionalClassification,
                label: "Request professional classification".to_string(),
                confidence: ConfidenceLabel::High,
            },
        ]
    }
}

/// Result of the rate fallback chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackResult {
    /// Estimated rates (all unknown on terminal failure)
    pub rates: EstimatedRates,
    /// Confidence of the estimate
    pub confidence: FallbackConfidence,
    /// Strategy that produced it
    pub method: FallbackMethod,
    /// Mandatory explanation of where the numbers came from
    pub disclosure_message: String,
    /// Explicit choices for the consuming surface
    pub user_options: Vec<UserOption>,
    /// Number of records averaged
    pub sample_size: usize,
    /// Closest single record, when the method has one
    pub best_match: Option<BestMatch>,
    /// The caller must pick an option before relying on the rates
    pub requires_user_decision: bool,
}

/// The single reference row that best supported an estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestMatch {
    /// Code of the row
    pub code: ClassificationCode,
    /// Description of the row
    pub description: String,
}

impl FallbackResult {
    /// A fallback estimate with the standard option set
    pub fn estimate(
        rates: EstimatedRates,
        confidence: FallbackConfidence,
        method: FallbackMethod,
        disclosure_message: impl Into<String>,
        sample_size: usize,
    ) -> Self {
        Self {
            rates,
            confidence,
            method,
            disclosure_message: disclosure_message.into(),
            user_options: UserOption::standard_set(confidence),
            sample_size,
            best_match: None,
            requires_user_decision: confidence < FallbackConfidence::Medium,
        }
    }

    /// Null rates, very-low confidence, and a user decision required
    pub fn terminal_failure(disclosure_message: impl Into<String>) -> Self {
        let mut result = Self::estimate(
            EstimatedRates::unknown(),
            FallbackConfidence::VeryLow,
            FallbackMethod::TerminalFailure,
            disclosure_message,
            0,
        );
        result.user_options[0].label = "Proceed without a rate (savings unknown)".to_string();
        result.requires_user_decision = true;
        result
    }

    /// Terminal-style result for an unreachable store; the only retryable outcome
    pub fn service_unavailable(disclosure_message: impl Into<String>) -> Self {
        let mut result = Self::terminal_failure(disclosure_message);
        result.method = FallbackMethod::ServiceUnavailable;
        result.user_options.push(UserOption {
            kind: UserOptionKind::RetryLater,
            label: "Retry once the reference data is reachable".to_string(),
            confidence: ConfidenceLabel::Medium,
        });
        result
    }

    /// Attach the best-matching record
    pub fn with_best_match(mut self, code: ClassificationCode, description: impl Into<String>) -> Self {
        self.best_match = Some(BestMatch {
            code,
            description: description.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_ordering() {
        assert!(FallbackConfidence::Medium > FallbackConfidence::Low);
        assert!(FallbackConfidence::Low > FallbackConfidence::VeryLow);
    }

    #[test]
    fn test_terminal_failure_shape() {
        let result = FallbackResult::terminal_failure("nothing found");
        assert_eq!(result.method, FallbackMethod::TerminalFailure);
        assert_eq!(result.rates, EstimatedRates::unknown());
        assert_eq!(result.confidence, FallbackConfidence::VeryLow);
        assert!(result.requires_user_decision);
        assert!(!result.disclosure_message.is_empty());
        let kinds: Vec<_> = result.user_options.iter().map(|o| o.kind).collect();
        assert!(kinds.contains(&UserOptionKind::AcceptEstimate));
        assert!(kinds.contains(&UserOptionKind::EnterCodeManually));
        assert!(kinds.contains(&UserOptionKind::RequestProfessionalClassification));
    }

    #[test]
    fn test_service_unavailable_offers_retry() {
        let result = FallbackResult::service_unavailable("store down");
        assert_eq!(result.method, FallbackMethod::ServiceUnavailable);
        assert!(result
            .user_options
            .iter()
            .any(|o| o.kind == UserOptionKind::RetryLater));
    }

    #[test]
    fn test_estimated_rates_derive_savings() {
        let rates = EstimatedRates::new(Rate::Known(6.0), Rate::Known(1.5));
        assert_eq!(rates.savings, Rate::Known(4.5));
        let unknown = EstimatedRates::new(Rate::Known(6.0), Rate::Unknown);
        assert_eq!(unknown.savings, Rate::Unknown);
    }
}
