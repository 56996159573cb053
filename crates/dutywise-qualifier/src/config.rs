//! Qualifier configuration

use crate::QualifierError;
use dutywise_domain::normalize_country;
use serde::{Deserialize, Serialize};

/// Configuration for the qualification evaluator
///
/// # Examples
///
/// ```
/// use dutywise_qualifier::QualifierConfig;
///
/// let config = QualifierConfig::default();
/// assert!(config.is_member("Mexico"));
/// assert!(!config.is_member("CN"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualifierConfig {
    /// ISO-2 members of the agreement territory
    pub territory: Vec<String>,

    /// Allowed deviation of the share sum from 100, in percentage points
    pub share_tolerance: f64,

    /// Points above threshold that count as highly qualified
    pub high_qualification_margin: f64,
}

impl Default for QualifierConfig {
    fn default() -> Self {
        Self {
            territory: vec!["US".to_string(), "CA".to_string(), "MX".to_string()],
            share_tolerance: 0.5,
            high_qualification_margin: 10.0,
        }
    }
}

impl QualifierConfig {
    /// Shares must add up almost exactly
    pub fn strict() -> Self {
        Self {
            share_tolerance: 0.01,
            high_qualification_margin: 15.0,
            ..Self::default()
        }
    }

    /// Rounded breakdowns are accepted
    pub fn lenient() -> Self {
        Self {
            share_tolerance: 1.0,
            high_qualification_margin: 5.0,
            ..Self::default()
        }
    }

    /// Whether a country (any common spelling) belongs to the territory
    pub fn is_member(&self, country: &str) -> bool {
        let code = normalize_country(country);
        self.territory.iter().any(|t| normalize_country(t) == code)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), QualifierError> {
        if self.territory.is_empty() {
            return Err(QualifierError::Config("territory is empty".to_string()));
        }
        if !(0.0..100.0).contains(&self.share_tolerance) {
            return Err(QualifierError::Config(format!(
                "share_tolerance {} must be within [0, 100)",
                self.share_tolerance
            )));
        }
        if self.high_qualification_margin.is_nan() || self.high_qualification_margin < 0.0 {
            return Err(QualifierError::Config(
                "high_qualification_margin must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
