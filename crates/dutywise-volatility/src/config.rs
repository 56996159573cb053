//! Volatility configuration

use crate::VolatilityError;
use dutywise_domain::{normalize_country, Severity};
use serde::{Deserialize, Serialize};

/// Configuration for the volatility separator and rate monitor
///
/// # Examples
///
/// ```
/// use dutywise_volatility::VolatilityConfig;
/// use dutywise_domain::Severity;
///
/// let config = VolatilityConfig::default();
/// assert_eq!(config.stability_multiplier, 1.2);
/// assert_eq!(config.severity_for(12.0), Severity::High);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityConfig {
    /// Premium applied to savings whose preferential leg is treaty-locked
    pub stability_multiplier: f64,

    /// Change in percentage points at or above which an alert is high severity
    pub high_severity_points: f64,

    /// Change in percentage points at or above which an alert is medium severity
    pub medium_severity_points: f64,

    /// ISO-2 members of the agreement territory
    pub territory: Vec<String>,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            stability_multiplier: 1.2,
            high_severity_points: 10.0,
            medium_severity_points: 2.5,
            territory: vec!["US".to_string(), "CA".to_string(), "MX".to_string()],
        }
    }
}

impl VolatilityConfig {
    /// No stability premium; smaller changes escalate
    pub fn strict() -> Self {
        Self {
            stability_multiplier: 1.0,
            high_severity_points: 5.0,
            medium_severity_points: 1.0,
            ..Self::default()
        }
    }

    /// Only large changes escalate
    pub fn lenient() -> Self {
        Self {
            high_severity_points: 15.0,
            medium_severity_points: 5.0,
            ..Self::default()
        }
    }

    /// Severity of a change of `points` percentage points (sign ignored)
    pub fn severity_for(&self, points: f64) -> Severity {
        let points = points.abs();
        if points >= self.high_severity_points {
            Severity::High
        } else if points >= self.medium_severity_points {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Whether a country belongs to the territory
    pub fn is_member(&self, country: &str) -> bool {
        let code = normalize_country(country);
        self.territory.iter().any(|t| normalize_country(t) == code)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), VolatilityError> {
        if !self.stability_multiplier.is_finite() || self.stability_multiplier < 1.0 {
            return Err(VolatilityError::Config(format!(
                "stability_multiplier {} must be at least 1.0",
                self.stability_multiplier
            )));
        }
        if self.medium_severity_points.is_nan()
            || self.medium_severity_points < 0.0
            || self.high_severity_points < self.medium_severity_points
        {
            return Err(VolatilityError::Config(
                "severity thresholds must satisfy 0 <= medium <= high".to_string(),
            ));
        }
        if self.territory.is_empty() {
            return Err(VolatilityError::Config("territory is empty".to_string()));
        }
        Ok(())
    }
}
