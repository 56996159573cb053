//! Classification candidates produced by the classifier and the resolver

use crate::ClassificationCode;
use serde::{Deserialize, Serialize};

/// How a candidate was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginMethod {
    /// Keyword overlap with a chapter-range taxonomy entry
    CategoryMatch,
    /// Exact reference-store hit
    Exact,
    /// Closest reference-store row after truncation
    Fuzzy,
}

/// How a user-typed code matched the reference store
///
/// Callers must handle both cases: a fuzzy match carries the score that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchType {
    /// The normalized input exists verbatim
    Exact,
    /// A different, nearby code was chosen
    Fuzzy {
        /// Match score of the chosen code
        score: f64,
    },
}

impl MatchType {
    /// The matching method this corresponds to
    pub fn origin_method(&self) -> OriginMethod {
        match self {
            MatchType::Exact => OriginMethod::Exact,
            MatchType::Fuzzy { .. } => OriginMethod::Fuzzy,
        }
    }
}

/// A ranked guess at the classification code for a product
///
/// Created per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationCandidate {
    /// Suggested code; `None` only for the "no clear match" placeholder
    pub code: Option<ClassificationCode>,

    /// Description of the suggested code or chapter range
    pub description: String,

    /// Confidence in [0, 100]
    pub confidence: f64,

    /// Input keywords that supported this candidate
    pub matched_keywords: Vec<String>,

    /// How the candidate was produced
    pub origin_method: OriginMethod,

    /// Set on the single placeholder returned when nothing in the taxonomy matched
    #[serde(default)]
    pub no_clear_match: bool,
}

impl ClassificationCandidate {
    /// The placeholder candidate for input that matched no chapter range
    pub fn no_clear_match(confidence: f64) -> Self {
        Self {
            code: None,
            description: "No clear match - enter a code manually or request professional classification"
                .to_string(),
            confidence: confidence.clamp(0.0, 100.0),
            matched_keywords: Vec::new(),
            origin_method: OriginMethod::CategoryMatch,
            no_clear_match: true,
        }
    }
}
