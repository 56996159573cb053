//! Pipeline configuration

use dutywise_classifier::{ClassifierConfig, Taxonomy};
use dutywise_fallback::FallbackConfig;
use dutywise_qualifier::QualifierConfig;
use dutywise_resolver::ResolverConfig;
use dutywise_volatility::VolatilityConfig;
use serde::{Deserialize, Serialize};

/// Thresholds that decide how stages hand off to each other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Resolver trust below which the record's rates are replaced by a fallback estimate
    pub min_trust_for_rates: f64,

    /// Classifier confidence needed before the top candidate's code is resolved
    pub min_candidate_confidence: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_trust_for_rates: 0.5,
            min_candidate_confidence: 40.0,
        }
    }
}

/// Every engine configuration in one place
///
/// # Examples
///
/// ```
/// use dutywise_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.settings.min_trust_for_rates, 0.5);
/// assert_eq!(config.taxonomy.ranges().len(), 6);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Stage hand-off thresholds
    pub settings: PipelineSettings,
    /// Chapter-range keyword table
    pub taxonomy: Taxonomy,
    /// Product classifier
    pub classifier: ClassifierConfig,
    /// Code resolver
    pub resolver: ResolverConfig,
    /// Rate fallback chain
    pub fallback: FallbackConfig,
    /// Qualification evaluator
    pub qualifier: QualifierConfig,
    /// Volatility separator and monitor
    pub volatility: VolatilityConfig,
}

impl PipelineConfig {
    /// Strict preset for every engine
    pub fn strict() -> Self {
        Self {
            settings: PipelineSettings {
                min_trust_for_rates: 0.7,
                min_candidate_confidence: 60.0,
            },
            taxonomy: Taxonomy::standard(),
            classifier: ClassifierConfig::strict(),
            resolver: ResolverConfig::strict(),
            fallback: FallbackConfig::strict(),
            qualifier: QualifierConfig::strict(),
            volatility: VolatilityConfig::strict(),
        }
    }

    /// Lenient preset for every engine
    pub fn lenient() -> Self {
        Self {
            settings: PipelineSettings {
                min_trust_for_rates: 0.3,
                min_candidate_confidence: 20.0,
            },
            taxonomy: Taxonomy::standard(),
            classifier: ClassifierConfig::lenient(),
            resolver: ResolverConfig::lenient(),
            fallback: FallbackConfig::lenient(),
            qualifier: QualifierConfig::lenient(),
            volatility: VolatilityConfig::lenient(),
        }
    }
}
