//! Assessment request and result types

use chrono::NaiveDate;
use dutywise_domain::{
    ClassificationCandidate, ComponentOrigin, EstimatedRates, FallbackResult, Issue,
    QualificationResult, RateObservation, Route,
};
use dutywise_resolver::{Resolution, VerificationContext};
use dutywise_volatility::SavingsEstimate;
use serde::{Deserialize, Serialize};

/// One end-to-end request
///
/// Either a description or a code is required. Everything else is optional
/// and enables later stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentRequest {
    /// Free-text product description
    pub description: Option<String>,

    /// Business or industry hint for the classifier
    pub hint: Option<String>,

    /// Classification code as typed
    pub code: Option<String>,

    /// Product category for qualification rule lookup
    pub category: Option<String>,

    /// Component breakdown; empty skips qualification
    pub components: Vec<ComponentOrigin>,

    /// Destination country
    pub destination: Option<String>,

    /// Trade route; without one, savings are not annotated
    pub route: Option<Route>,

    /// Annual import value for money savings
    pub import_value: Option<f64>,

    /// Trust-score context
    pub context: VerificationContext,

    /// Earlier snapshots of tracked rates; changes since then are attached
    /// to the savings annotation
    pub tracked_rates: Vec<RateObservation>,

    /// Date stamped on fresh observations; today when absent
    pub as_of: Option<NaiveDate>,
}

impl AssessmentRequest {
    /// Request for a description
    pub fn for_description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Request for a code
    pub fn for_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// Destination from the explicit field, else the route's
    pub fn effective_destination(&self) -> Option<String> {
        self.destination
            .clone()
            .or_else(|| self.route.as_ref().map(|r| r.destination.clone()))
    }
}

/// Where the final rates came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// A resolved reference record
    Reference,
    /// The fallback chain
    Fallback,
    /// No stage could run
    Unavailable,
}

/// Everything the pipeline produced for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Classifier output (empty when a code was given)
    pub candidates: Vec<ClassificationCandidate>,

    /// Resolver output, if a code was resolved
    pub resolution: Option<Resolution>,

    /// Fallback output, if the chain ran
    pub fallback: Option<FallbackResult>,

    /// Final rates
    pub rates: EstimatedRates,

    /// Origin of [`rates`](Self::rates)
    pub rate_source: RateSource,

    /// Qualification verdict, if components were given and evaluation succeeded
    pub qualification: Option<QualificationResult>,

    /// Savings with stability annotation, if a route was given; carries
    /// alerts for any tracked rate that moved
    pub savings: Option<SavingsEstimate>,

    /// Problems raised by any stage
    pub issues: Vec<Issue>,
}

impl Assessment {
    /// Whether the caller must choose an option before relying on the rates
    pub fn requires_user_decision(&self) -> bool {
        self.fallback
            .as_ref()
            .is_some_and(|f| f.requires_user_decision)
    }
}
