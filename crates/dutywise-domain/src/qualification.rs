//! Qualification rules and results

use crate::ClassificationCode;
use serde::{Deserialize, Serialize};

/// What a qualification rule applies to, most specific first
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RuleScope {
    /// A specific code (and everything beneath it)
    Code(ClassificationCode),
    /// A named product category
    Category(String),
    /// A 2-digit chapter
    Chapter(String),
    /// The agreement-wide default
    Default,
}

impl RuleScope {
    /// Lower is more specific
    pub fn specificity(&self) -> u8 {
        match self {
            RuleScope::Code(_) => 0,
            RuleScope::Category(_) => 1,
            RuleScope::Chapter(_) => 2,
            RuleScope::Default => 3,
        }
    }

    /// Get the scope kind as a string
    pub fn kind_str(&self) -> &'static str {
        match self {
            RuleScope::Code(_) => "code",
            RuleScope::Category(_) => "category",
            RuleScope::Chapter(_) => "chapter",
            RuleScope::Default => "default",
        }
    }

    /// The scope value, if any
    pub fn value(&self) -> Option<&str> {
        match self {
            RuleScope::Code(code) => Some(code.as_str()),
            RuleScope::Category(c) | RuleScope::Chapter(c) => Some(c),
            RuleScope::Default => None,
        }
    }
}

impl std::fmt::Display for RuleScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value() {
            Some(v) => write!(f, "{}:{}", self.kind_str(), v),
            None => f.write_str(self.kind_str()),
        }
    }
}

/// Origin rule family named by the rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Regional value content threshold
    RegionalValueContent,
    /// Tariff shift requirement (RVC still reported)
    TariffShift,
    /// Wholly obtained in the territory
    WhollyObtained,
    /// Specific manufacturing process
    SpecificManufacturing,
}

impl RuleType {
    /// Get the rule type as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::RegionalValueContent => "regional_value_content",
            RuleType::TariffShift => "tariff_shift",
            RuleType::WhollyObtained => "wholly_obtained",
            RuleType::SpecificManufacturing => "specific_manufacturing",
        }
    }

    /// Parse a rule type from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "regional_value_content" | "rvc" => Some(RuleType::RegionalValueContent),
            "tariff_shift" => Some(RuleType::TariffShift),
            "wholly_obtained" => Some(RuleType::WhollyObtained),
            "specific_manufacturing" => Some(RuleType::SpecificManufacturing),
            _ => None,
        }
    }
}

/// A rule from the qualification metadata store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationRule {
    /// What the rule applies to
    pub scope: RuleScope,
    /// Required regional value content in percent
    pub threshold_percent: f64,
    /// Rule family
    #[serde(default = "default_rule_type")]
    pub rule_type: RuleType,
    /// Documents normally required to support a claim under this rule
    #[serde(default)]
    pub required_documentation: Vec<String>,
}

fn default_rule_type() -> RuleType {
    RuleType::RegionalValueContent
}

/// Qualification verdict band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationLevel {
    /// Below threshold
    NotQualified,
    /// At or above threshold
    Qualified,
    /// Comfortably above threshold
    HighlyQualified,
}

impl QualificationLevel {
    /// Get the level as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            QualificationLevel::NotQualified => "not_qualified",
            QualificationLevel::Qualified => "qualified",
            QualificationLevel::HighlyQualified => "highly_qualified",
        }
    }
}

/// One component as seen by the evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentBreakdown {
    /// ISO-2 origin
    pub country: String,
    /// Share in percent after scale normalization
    pub share_percent: f64,
    /// Whether the origin lies inside the agreement territory
    pub regional: bool,
}

/// Result of a regional value content evaluation
///
/// Qualification is a function of aggregate value content only; it never
/// implies anything about the preferential rate of any code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationResult {
    /// Regional value content in percent
    pub regional_value_content: f64,
    /// Threshold from the applied rule, in percent
    pub required_threshold: f64,
    /// `regional_value_content >= required_threshold`
    pub qualifies: bool,
    /// Percentage points missing, when not qualifying
    pub shortfall: Option<f64>,
    /// Documentation normally required to support the claim
    pub required_documentation: Vec<String>,
    /// Verdict band
    pub qualification_level: QualificationLevel,
    /// Family of the applied rule
    pub rule_type: RuleType,
    /// Which rule was applied
    pub rule_scope: RuleScope,
    /// Per-component view
    pub components: Vec<ComponentBreakdown>,
}
