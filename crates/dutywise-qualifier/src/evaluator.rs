//! Regional value content evaluation
//!
//! Qualification answers one question: does the product's aggregate regional
//! value content meet the applicable rule's threshold? It never looks at, or
//! changes, the duty rate of any code. A component sourced inside the
//! territory contributes its value share and nothing else.

use crate::{QualifierConfig, QualifierError};
use dutywise_domain::traits::RulesStore;
use dutywise_domain::{
    normalize_country, ClassificationCode, ComponentBreakdown, ComponentOrigin,
    QualificationLevel, QualificationResult, QualificationRule,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Input to a qualification evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualificationRequest {
    /// Resolved classification code, if known
    #[serde(default)]
    pub code: Option<ClassificationCode>,

    /// Product category, if known
    #[serde(default)]
    pub category: Option<String>,

    /// Component breakdown
    pub components: Vec<ComponentOrigin>,

    /// Destination country
    pub destination: String,
}

impl QualificationRequest {
    /// Request for the given components and destination
    pub fn new(components: Vec<ComponentOrigin>, destination: impl Into<String>) -> Self {
        Self {
            code: None,
            category: None,
            components,
            destination: destination.into(),
        }
    }

    /// Builder-style code
    pub fn with_code(mut self, code: ClassificationCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Builder-style category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    fn subject(&self) -> String {
        match (&self.code, &self.category) {
            (Some(code), _) => code.dotted(),
            (None, Some(category)) => format!("category {}", category),
            (None, None) => "this request".to_string(),
        }
    }
}

/// Evaluates component breakdowns against qualification rules
pub struct QualificationEvaluator {
    config: QualifierConfig,
}

impl QualificationEvaluator {
    /// Create an evaluator, rejecting an invalid configuration
    pub fn new(config: QualifierConfig) -> Result<Self, QualifierError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create an evaluator with the default configuration
    pub fn default_config() -> Self {
        Self {
            config: QualifierConfig::default(),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &QualifierConfig {
        &self.config
    }

    /// Evaluate a request
    ///
    /// Per-input problems come back as [`QualifierError`]s whose
    /// [`kind`](QualifierError::kind) is `Incomplete`; only a rules store
    /// failure maps to `ServiceUnavailable`.
    pub fn evaluate<R: RulesStore>(
        &self,
        request: &QualificationRequest,
        rules: &R,
    ) -> Result<QualificationResult, QualifierError>
    where
        R::Error: std::fmt::Display,
    {
        let destination = normalize_country(&request.destination);
        if destination.is_empty() {
            return Err(QualifierError::Incomplete("destination is missing".to_string()));
        }
        if !self.config.is_member(&destination) {
            return Err(QualifierError::DestinationOutsideTerritory(destination));
        }

        let components = self.breakdown(&request.components)?;
        let rule = self.select_rule(request, rules)?;
        let result = self.measure(components, rule);

        info!(
            "Qualification for {}: RVC {:.2}% vs {:.2}% ({}) -> {}",
            request.subject(),
            result.regional_value_content,
            result.required_threshold,
            result.rule_scope,
            result.qualification_level.as_str()
        );
        Ok(result)
    }

    /// Pick the most specific rule for the request
    pub fn select_rule<R: RulesStore>(
        &self,
        request: &QualificationRequest,
        rules: &R,
    ) -> Result<QualificationRule, QualifierError>
    where
        R::Error: std::fmt::Display,
    {
        let candidates = rules
            .rules_for(request.code.as_ref(), request.category.as_deref())
            .map_err(|e| QualifierError::Store(e.to_string()))?;
        debug!("{} candidate rule(s) for {}", candidates.len(), request.subject());

        candidates
            .into_iter()
            .min_by_key(|rule| rule.scope.specificity())
            .ok_or_else(|| QualifierError::NoApplicableRule(request.subject()))
    }

    /// Validate the shares and express them in percent
    ///
    /// The scale is decided once for the whole request: if every share is at
    /// most 1 and they sum to 1 (within tolerance), all of them are fractions.
    fn breakdown(&self, components: &[ComponentOrigin]) -> Result<Vec<ComponentBreakdown>, QualifierError> {
        if components.is_empty() {
            return Err(QualifierError::Incomplete("no components given".to_string()));
        }

        for (i, component) in components.iter().enumerate() {
            if component.country.trim().is_empty() {
                return Err(QualifierError::Incomplete(format!(
                    "component {} has no country of origin",
                    i + 1
                )));
            }
            if !component.value_share.is_finite() || component.value_share < 0.0 {
                return Err(QualifierError::Incomplete(format!(
                    "component {} has an invalid value share ({})",
                    i + 1,
                    component.value_share
                )));
            }
        }

        let raw_sum: f64 = components.iter().map(|c| c.value_share).sum();
        let tolerance = self.config.share_tolerance;
        let fractional = components.iter().all(|c| c.value_share <= 1.0)
            && (raw_sum - 1.0).abs() <= tolerance / 100.0;
        let scale = if fractional { 100.0 } else { 1.0 };

        let total = round6(raw_sum * scale);
        if (total - 100.0).abs() > tolerance {
            return Err(QualifierError::Incomplete(format!(
                "value shares sum to {}% instead of 100%",
                total
            )));
        }

        Ok(components
            .iter()
            .map(|c| {
                let country = c.country_code();
                ComponentBreakdown {
                    regional: self.config.is_member(&country),
                    country,
                    share_percent: round6(c.value_share * scale),
                }
            })
            .collect())
    }

    fn measure(&self, components: Vec<ComponentBreakdown>, rule: QualificationRule) -> QualificationResult {
        let regional_value_content = round6(
            components
                .iter()
                .filter(|c| c.regional)
                .map(|c| c.share_percent)
                .sum::<f64>(),
        );
        let threshold = rule.threshold_percent;
        let qualifies = regional_value_content >= threshold;

        let qualification_level = if !qualifies {
            QualificationLevel::NotQualified
        } else if regional_value_content >= threshold + self.config.high_qualification_margin {
            QualificationLevel::HighlyQualified
        } else {
            QualificationLevel::Qualified
        };

        QualificationResult {
            regional_value_content,
            required_threshold: threshold,
            qualifies,
            shortfall: (!qualifies).then(|| round6(threshold - regional_value_content)),
            required_documentation: rule.required_documentation,
            qualification_level,
            rule_type: rule.rule_type,
            rule_scope: rule.scope,
            components,
        }
    }
}

/// Round to six decimal places
fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}
