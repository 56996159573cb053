//! Resolver configuration

use crate::ResolverError;
use serde::{Deserialize, Serialize};

/// Match-score weight table
///
/// `total = functional_weight × functional_bonus + prefix_weight × prefixScore
///        + length_weight × lengthScore + tariff_weight × tariff_bonus`
///
/// The defaults reproduce the established scoring: the tariff term carries a
/// weight of 1.0, so its bonus is effectively added flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverWeights {
    /// Weight of the same-subcategory term
    pub functional_weight: f64,
    /// Bonus when the 4-digit subcategories agree
    pub functional_bonus: f64,
    /// Weight of the common-prefix term
    pub prefix_weight: f64,
    /// Weight of the length-similarity term
    pub length_weight: f64,
    /// Weight of the recorded-rate term
    pub tariff_weight: f64,
    /// Bonus when the candidate has a non-zero base rate
    pub tariff_bonus: f64,
    /// Digit difference at which the length term reaches zero
    pub length_divisor: f64,
}

impl Default for ResolverWeights {
    fn default() -> Self {
        Self {
            functional_weight: 0.4,
            functional_bonus: 0.15,
            prefix_weight: 0.3,
            length_weight: 0.2,
            tariff_weight: 1.0,
            tariff_bonus: 0.1,
            length_divisor: 10.0,
        }
    }
}

/// Data-completeness weights for the trust score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustWeights {
    /// A record exists at all
    pub record_exists: f64,
    /// The record has a non-trivial description
    pub description: f64,
    /// The base rate is populated
    pub rates: f64,
    /// The caller reports a complete supply chain
    pub supply_chain: f64,
    /// The caller supplied a manufacturing location
    pub manufacturing_location: f64,
    /// The record comes from a reliable source
    pub source_reliability: f64,
    /// Multiplier applied when manual verification is required
    pub manual_verification_factor: f64,
    /// Minimum score after the manual-verification penalty
    pub manual_verification_floor: f64,
}

impl Default for TrustWeights {
    fn default() -> Self {
        Self {
            record_exists: 0.3,
            description: 0.2,
            rates: 0.2,
            supply_chain: 0.1,
            manufacturing_location: 0.1,
            source_reliability: 0.1,
            manual_verification_factor: 0.5,
            manual_verification_floor: 0.1,
        }
    }
}

/// Configuration for the code resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Prefix lengths tried after an exact miss, longest first
    pub prefix_lengths: Vec<usize>,

    /// Maximum alternatives returned
    pub max_alternatives: usize,

    /// Rows scanned per subcategory/chapter when building alternatives
    pub alternative_scan_limit: usize,

    /// Confidence of an alternative in the same 4-digit subcategory
    pub subcategory_alternative_confidence: f64,

    /// Confidence of an alternative in the same chapter only
    pub chapter_alternative_confidence: f64,

    /// Source names (case-insensitive substrings) considered reliable
    pub reliable_sources: Vec<String>,

    /// Match-score weights
    pub weights: ResolverWeights,

    /// Trust-score weights
    pub trust: TrustWeights,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            prefix_lengths: vec![8, 7, 6, 5, 4],
            max_alternatives: 5,
            alternative_scan_limit: 200,
            subcategory_alternative_confidence: 0.8,
            chapter_alternative_confidence: 0.5,
            reliable_sources: ["usitc", "hts", "cbp", "cbsa", "wco", "federal register"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            weights: ResolverWeights::default(),
            trust: TrustWeights::default(),
        }
    }
}

impl ResolverConfig {
    /// Only 6- and 8-digit prefixes; fewer alternatives
    pub fn strict() -> Self {
        Self {
            prefix_lengths: vec![8, 6],
            max_alternatives: 3,
            ..Self::default()
        }
    }

    /// Every prefix down to the chapter
    pub fn lenient() -> Self {
        Self {
            prefix_lengths: vec![8, 7, 6, 5, 4, 3, 2],
            ..Self::default()
        }
    }

    /// Reject tables that cannot produce a meaningful score
    pub fn validate(&self) -> Result<(), ResolverError> {
        if self.weights.length_divisor <= 0.0 {
            return Err(ResolverError::Config(
                "length_divisor must be positive".to_string(),
            ));
        }
        if self.prefix_lengths.iter().any(|&len| len < 2) {
            return Err(ResolverError::Config(
                "prefix lengths must be at least 2 digits".to_string(),
            ));
        }
        let factor = self.trust.manual_verification_factor;
        if !(0.0..=1.0).contains(&factor) {
            return Err(ResolverError::Config(format!(
                "manual_verification_factor {} is outside 0-1",
                factor
            )));
        }
        Ok(())
    }

    /// Whether a source name is on the reliable list
    pub fn is_reliable_source(&self, source: &str) -> bool {
        let source = source.to_lowercase();
        self.reliable_sources
            .iter()
            .any(|s| source.contains(&s.to_lowercase()))
    }
}
