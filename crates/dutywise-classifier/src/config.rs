//! Classifier configuration

use serde::{Deserialize, Serialize};

/// Confidence weights for category matching
///
/// `confidence = min(categoryScore × category_multiplier, category_cap)
///             + min(overlap × overlap_multiplier, overlap_cap)`, capped at
/// `confidence_cap`, where `overlap` is the share of input keywords found in
/// the candidate record's description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierWeights {
    /// Points per taxonomy keyword hit
    pub category_multiplier: f64,

    /// Ceiling on the category term
    pub category_cap: f64,

    /// Points for a full keyword overlap with the record description
    pub overlap_multiplier: f64,

    /// Ceiling on the overlap term
    pub overlap_cap: f64,

    /// Ceiling on the total
    pub confidence_cap: f64,
}

impl Default for ClassifierWeights {
    fn default() -> Self {
        Self {
            category_multiplier: 20.0,
            category_cap: 80.0,
            overlap_multiplier: 20.0,
            overlap_cap: 15.0,
            confidence_cap: 95.0,
        }
    }
}

/// Configuration for the product classifier
///
/// # Examples
///
/// ```
/// use dutywise_classifier::ClassifierConfig;
///
/// let config = ClassifierConfig::default();
/// assert_eq!(config.top_n, 3);
///
/// let strict = ClassifierConfig::strict();
/// assert_eq!(strict.top_n, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Maximum candidates returned
    pub top_n: usize,

    /// Highest-scoring chapter ranges queried against the store
    pub top_ranges: usize,

    /// Records loaded per chapter range
    pub records_per_range: usize,

    /// Confidence of the "no clear match" placeholder
    pub no_match_confidence: f64,

    /// Scoring weights
    pub weights: ClassifierWeights,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            top_ranges: 2,
            records_per_range: 200,
            no_match_confidence: 5.0,
            weights: ClassifierWeights::default(),
        }
    }
}

impl ClassifierConfig {
    /// Only the single best candidate from the best range
    pub fn strict() -> Self {
        Self {
            top_n: 1,
            top_ranges: 1,
            ..Self::default()
        }
    }

    /// Wider net: more ranges and more candidates
    pub fn lenient() -> Self {
        Self {
            top_n: 5,
            top_ranges: 3,
            records_per_range: 500,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClassifierConfig::default();
        assert_eq!(config.top_ranges, 2);
        assert_eq!(config.weights.confidence_cap, 95.0);
    }

    #[test]
    fn test_lenient_config() {
        let config = ClassifierConfig::lenient();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.no_match_confidence, 5.0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ClassifierConfig = toml::from_str("top_n = 4").unwrap();
        assert_eq!(config.top_n, 4);
        assert_eq!(config.records_per_range, 200);
    }
}
