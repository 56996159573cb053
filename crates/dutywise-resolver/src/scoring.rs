//! Match and trust scoring

use crate::{ResolverConfig, ResolverWeights};
use dutywise_domain::{ClassificationCode, TariffRecord};
use serde::{Deserialize, Serialize};

/// Breakdown of a candidate's match score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    /// `1 − |len(candidate) − len(input)| / length_divisor`, floored at 0
    pub length_score: f64,
    /// Longest common prefix over the longer length
    pub prefix_score: f64,
    /// Subcategory bonus (before weighting)
    pub functional_bonus: f64,
    /// Recorded-rate bonus (before weighting)
    pub tariff_bonus: f64,
    /// Weighted total
    pub total: f64,
}

impl MatchScore {
    /// Score `record` as a match for `input`
    pub fn compute(
        input: &ClassificationCode,
        record: &TariffRecord,
        weights: &ResolverWeights,
    ) -> Self {
        let candidate = &record.code;
        let (lc, li) = (candidate.len() as f64, input.len() as f64);

        let length_score = (1.0 - (lc - li).abs() / weights.length_divisor).max(0.0);
        let prefix_score = candidate.common_prefix_len(input) as f64 / lc.max(li);
        let functional_bonus = match (candidate.subcategory(), input.subcategory()) {
            (Some(a), Some(b)) if a == b => weights.functional_bonus,
            _ => 0.0,
        };
        let tariff_bonus = if record.has_recorded_base_rate() {
            weights.tariff_bonus
        } else {
            0.0
        };

        let total = weights.functional_weight * functional_bonus
            + weights.prefix_weight * prefix_score
            + weights.length_weight * length_score
            + weights.tariff_weight * tariff_bonus;

        Self {
            length_score,
            prefix_score,
            functional_bonus,
            tariff_bonus,
            total,
        }
    }
}

/// Caller-supplied context for the trust score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationContext {
    /// The caller's supply-chain information is complete
    #[serde(default)]
    pub supply_chain_complete: bool,

    /// Where the product is manufactured, if known
    #[serde(default)]
    pub manufacturing_location: Option<String>,

    /// The caller flagged the code as requiring manual verification
    #[serde(default)]
    pub requires_manual_verification: bool,
}

/// Trust in `[0, 1]` derived from data completeness
///
/// `record` is `None` on the "no data" branch.
pub fn trust_score(
    record: Option<&TariffRecord>,
    context: &VerificationContext,
    config: &ResolverConfig,
) -> f64 {
    let w = &config.trust;
    let mut score = 0.0;

    if let Some(record) = record {
        score += w.record_exists;
        if record.has_meaningful_description() {
            score += w.description;
        }
        if record.base_rate.is_known() {
            score += w.rates;
        }
        if record
            .source_name
            .as_deref()
            .map(|s| config.is_reliable_source(s))
            .unwrap_or(false)
        {
            score += w.source_reliability;
        }
    }

    if context.supply_chain_complete {
        score += w.supply_chain;
    }
    if context
        .manufacturing_location
        .as_deref()
        .map(|l| !l.trim().is_empty())
        .unwrap_or(false)
    {
        score += w.manufacturing_location;
    }

    if context.requires_manual_verification {
        score = (score * w.manual_verification_factor).max(w.manual_verification_floor);
    }

    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dutywise_domain::Rate;

    fn code(s: &str) -> ClassificationCode {
        ClassificationCode::parse(s).unwrap()
    }

    fn record(c: &str, base: Rate) -> TariffRecord {
        TariffRecord::new(code(c), "Insulated electric conductors, other").with_rates(base, Rate::Known(0.0))
    }

    #[test]
    fn test_score_formula() {
        let weights = ResolverWeights::default();
        let score = MatchScore::compute(&code("85442900"), &record("8544290010", Rate::Known(2.6)), &weights);

        assert!((score.length_score - 0.8).abs() < 1e-12);
        assert!((score.prefix_score - 0.8).abs() < 1e-12);
        assert_eq!(score.functional_bonus, 0.15);
        assert_eq!(score.tariff_bonus, 0.1);
        // 0.4×0.15 + 0.3×0.8 + 0.2×0.8 + 0.1
        assert!((score.total - 0.56).abs() < 1e-12);
    }

    #[test]
    fn test_zero_base_rate_gets_no_tariff_bonus() {
        let weights = ResolverWeights::default();
        let score = MatchScore::compute(&code("85442900"), &record("85442910", Rate::Known(0.0)), &weights);
        assert_eq!(score.tariff_bonus, 0.0);
    }

    #[test]
    fn test_different_subcategory_gets_no_functional_bonus() {
        let weights = ResolverWeights::default();
        let score = MatchScore::compute(&code("85442900"), &record("85431000", Rate::Known(2.6)), &weights);
        assert_eq!(score.functional_bonus, 0.0);
    }

    #[test]
    fn test_trust_full_marks() {
        let config = ResolverConfig::default();
        let mut r = record("85442900", Rate::Known(2.6));
        r.source_name = Some("USITC".into());
        let context = VerificationContext {
            supply_chain_complete: true,
            manufacturing_location: Some("Monterrey, MX".into()),
            requires_manual_verification: false,
        };
        assert!((trust_score(Some(&r), &context, &config) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_trust_no_data_branch() {
        let config = ResolverConfig::default();
        let score = trust_score(None, &VerificationContext::default(), &config);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_manual_verification_halves_with_floor() {
        let config = ResolverConfig::default();
        let r = record("85442900", Rate::Known(2.6));
        let manual = VerificationContext {
            requires_manual_verification: true,
            ..Default::default()
        };
        // 0.3 + 0.2 + 0.2 = 0.7, halved
        assert!((trust_score(Some(&r), &manual, &config) - 0.35).abs() < 1e-12);
        assert_eq!(trust_score(None, &manual, &config), 0.1);
    }
}
