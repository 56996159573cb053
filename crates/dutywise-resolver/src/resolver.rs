//! Malformed-code correction: exact lookup, then prefix search with scoring

use crate::scoring::{trust_score, MatchScore, VerificationContext};
use crate::{ResolverConfig, ResolverError};
use dutywise_domain::traits::{RecordQuery, ReferenceStore};
use dutywise_domain::{
    ClassificationCode, ErrorKind, EstimatedRates, Issue, MatchType, TariffRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How an alternative relates to the input code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternativeRelation {
    /// Same 4-digit subcategory
    SameSubcategory,
    /// Same 2-digit chapter, different subcategory
    SameChapter,
}

/// A nearby code the caller may have meant instead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    /// Alternative code
    pub code: ClassificationCode,
    /// Its description
    pub description: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Relation to the input
    pub relation: AlternativeRelation,
}

/// Result of resolving a user-supplied code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Raw input
    pub input: String,
    /// Input with every non-digit stripped
    pub normalized: String,
    /// A reference record was found
    pub verified: bool,
    /// How it was found, when it was
    pub match_type: Option<MatchType>,
    /// The matched code
    pub code: Option<ClassificationCode>,
    /// Description of the matched code
    pub description: Option<String>,
    /// Data-completeness trust in [0, 1]
    pub trust_score: f64,
    /// Rates of the matched record (unknown when unmatched)
    pub rates: EstimatedRates,
    /// Up to `max_alternatives` nearby codes
    pub alternatives: Vec<Alternative>,
    /// Advice when the result should not be relied on
    pub recommendation: Option<String>,
    /// Structured problems encountered
    pub issues: Vec<Issue>,
    /// The matched reference row
    pub record: Option<TariffRecord>,
}

/// Resolves possibly malformed codes against the reference store
pub struct CodeResolver {
    config: ResolverConfig,
}

impl CodeResolver {
    /// Create a resolver, validating its weight tables
    pub fn new(config: ResolverConfig) -> Result<Self, ResolverError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a resolver with default configuration
    pub fn default_config() -> Self {
        Self {
            config: ResolverConfig::default(),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a code string
    ///
    /// # Arguments
    ///
    /// * `input` - Code as typed, separators allowed
    /// * `context` - Caller-supplied data for the trust score
    /// * `store` - Reference store (read only)
    ///
    /// # Returns
    ///
    /// A resolution. An unmatched code is not an error: it comes back with
    /// `verified: false`, a recommendation and a `NotFound` issue.
    pub fn resolve<S: ReferenceStore>(
        &self,
        input: &str,
        context: &VerificationContext,
        store: &S,
    ) -> Result<Resolution, ResolverError>
    where
        S::Error: std::fmt::Display,
    {
        let normalized = ClassificationCode::normalize(input);
        let code = match ClassificationCode::parse(input) {
            Ok(code) => code,
            Err(e) => {
                tracing::info!(input, error = %e, "Unparseable classification code");
                let mut resolution = self.unmatched(input, normalized, context, Vec::new());
                resolution
                    .issues
                    .push(Issue::new(ErrorKind::Incomplete, "resolve", e.to_string()));
                return Ok(resolution);
            }
        };

        if let Some(record) = store
            .get_record(&code)
            .map_err(|e| ResolverError::Store(e.to_string()))?
        {
            tracing::info!(code = %code, "Exact match");
            let alternatives = self.alternatives(&code, &record.code, store)?;
            return Ok(self.matched(input, record, MatchType::Exact, context, alternatives, Vec::new()));
        }

        let candidates = self.prefix_candidates(&code, store)?;
        let alternatives = if candidates.is_empty() {
            self.alternatives(&code, &code, store)?
        } else {
            Vec::new()
        };
        let Some((best, score, tied)) = self.best_candidate(&code, candidates) else {
            tracing::info!(code = %code, "No reference record at any prefix length");
            let mut resolution = self.unmatched(input, normalized, context, alternatives);
            resolution.issues.push(Issue::new(
                ErrorKind::NotFound,
                "resolve",
                format!("No reference record matches {} at any prefix length", code.dotted()),
            ));
            return Ok(resolution);
        };

        let mut issues = Vec::new();
        if tied > 1 {
            tracing::warn!(code = %best.code, tied, "Tied top match score; kept lowest code");
            issues.push(Issue::new(
                ErrorKind::Ambiguous,
                "resolve",
                format!(
                    "{} codes share the top match score {:.3}; {} was chosen as the lowest code",
                    tied, score.total, best.code
                ),
            ));
        }

        tracing::info!(input = %code, matched = %best.code, score = score.total, "Fuzzy match");
        let alternatives = self.alternatives(&code, &best.code, store)?;
        Ok(self.matched(
            input,
            best,
            MatchType::Fuzzy { score: score.total },
            context,
            alternatives,
            issues,
        ))
    }

    /// Every record under any configured prefix of `code`, deduplicated and code-ordered
    fn prefix_candidates<S: ReferenceStore>(
        &self,
        code: &ClassificationCode,
        store: &S,
    ) -> Result<BTreeMap<ClassificationCode, TariffRecord>, ResolverError>
    where
        S::Error: std::fmt::Display,
    {
        let mut lengths: Vec<usize> = self
            .config
            .prefix_lengths
            .iter()
            .copied()
            .filter(|&len| len <= code.len())
            .collect();
        lengths.sort_unstable_by(|a, b| b.cmp(a));
        lengths.dedup();

        let mut candidates = BTreeMap::new();
        for len in lengths {
            let Some(prefix) = code.prefix(len) else {
                continue;
            };
            let records = store
                .query_records(&RecordQuery::prefix(prefix))
                .map_err(|e| ResolverError::Store(e.to_string()))?;
            tracing::debug!(prefix, found = records.len(), "Prefix search");
            for record in records {
                candidates.entry(record.code.clone()).or_insert(record);
            }
        }
        Ok(candidates)
    }

    /// Highest score wins; among equals the lowest code. Returns the tie count.
    fn best_candidate(
        &self,
        input: &ClassificationCode,
        candidates: BTreeMap<ClassificationCode, TariffRecord>,
    ) -> Option<(TariffRecord, MatchScore, usize)> {
        let mut best: Option<(TariffRecord, MatchScore, usize)> = None;
        for record in candidates.into_values() {
            let score = MatchScore::compute(input, &record, &self.config.weights);
            tracing::debug!(candidate = %record.code, score = score.total, "Scored candidate");
            best = match best {
                None => Some((record, score, 1)),
                Some((current, current_score, tied)) => {
                    if score.total > current_score.total + f64::EPSILON {
                        Some((record, score, 1))
                    } else if (score.total - current_score.total).abs() <= f64::EPSILON {
                        Some((current, current_score, tied + 1))
                    } else {
                        Some((current, current_score, tied))
                    }
                }
            };
        }
        best
    }

    /// Same-subcategory codes first, then same-chapter codes, excluding `matched`
    fn alternatives<S: ReferenceStore>(
        &self,
        input: &ClassificationCode,
        matched: &ClassificationCode,
        store: &S,
    ) -> Result<Vec<Alternative>, ResolverError>
    where
        S::Error: std::fmt::Display,
    {
        let mut alternatives: Vec<Alternative> = Vec::new();
        let limit = self.config.alternative_scan_limit;

        let subcategory = input.subcategory();
        if let Some(subcategory) = subcategory {
            let records = store
                .query_records(&RecordQuery::prefix(subcategory).with_limit(limit))
                .map_err(|e| ResolverError::Store(e.to_string()))?;
            alternatives.extend(records.into_iter().filter(|r| &r.code != matched).map(|r| {
                Alternative {
                    code: r.code,
                    description: r.description,
                    confidence: self.config.subcategory_alternative_confidence,
                    relation: AlternativeRelation::SameSubcategory,
                }
            }));
        }

        if alternatives.len() < self.config.max_alternatives {
            let records = store
                .query_records(&RecordQuery::prefix(input.chapter()).with_limit(limit))
                .map_err(|e| ResolverError::Store(e.to_string()))?;
            alternatives.extend(
                records
                    .into_iter()
                    .filter(|r| &r.code != matched)
                    .filter(|r| subcategory.map(|s| !r.code.starts_with(s)).unwrap_or(true))
                    .map(|r| Alternative {
                        code: r.code,
                        description: r.description,
                        confidence: self.config.chapter_alternative_confidence,
                        relation: AlternativeRelation::SameChapter,
                    }),
            );
        }

        alternatives.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.code.cmp(&b.code))
        });
        alternatives.truncate(self.config.max_alternatives);
        Ok(alternatives)
    }

    fn matched(
        &self,
        input: &str,
        record: TariffRecord,
        match_type: MatchType,
        context: &VerificationContext,
        alternatives: Vec<Alternative>,
        mut issues: Vec<Issue>,
    ) -> Resolution {
        let trust = trust_score(Some(&record), context, &self.config);
        if !record.base_rate.is_known() {
            issues.push(Issue::new(
                ErrorKind::NotFound,
                "resolve",
                format!("{} has no recorded base rate", record.code.dotted()),
            ));
        }
        let recommendation = if context.requires_manual_verification {
            Some("Flagged for manual verification; confirm the code with a licensed customs broker before filing".to_string())
        } else if !record.base_rate.is_known() {
            Some("The matched record has no recorded base rate; use a fallback estimate or request professional classification".to_string())
        } else {
            None
        };

        Resolution {
            input: input.to_string(),
            normalized: ClassificationCode::normalize(input),
            verified: true,
            match_type: Some(match_type),
            code: Some(record.code.clone()),
            description: Some(record.description.clone()),
            trust_score: trust,
            rates: EstimatedRates::new(record.base_rate, record.preferential_rate),
            alternatives,
            recommendation,
            issues,
            record: Some(record),
        }
    }

    fn unmatched(
        &self,
        input: &str,
        normalized: String,
        context: &VerificationContext,
        alternatives: Vec<Alternative>,
    ) -> Resolution {
        Resolution {
            input: input.to_string(),
            normalized,
            verified: false,
            match_type: None,
            code: None,
            description: None,
            trust_score: trust_score(None, context, &self.config),
            rates: EstimatedRates::unknown(),
            alternatives,
            recommendation: Some(
                "No matching reference record; seek manual or professional classification".to_string(),
            ),
            issues: Vec::new(),
            record: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dutywise_domain::Rate;

    struct FixedStore(Vec<TariffRecord>);

    impl ReferenceStore for FixedStore {
        type Error = String;

        fn get_record(&self, code: &ClassificationCode) -> Result<Option<TariffRecord>, String> {
            Ok(self.0.iter().find(|r| &r.code == code).cloned())
        }

        fn query_records(&self, query: &RecordQuery) -> Result<Vec<TariffRecord>, String> {
            let mut out: Vec<TariffRecord> =
                self.0.iter().filter(|r| query.matches(r)).cloned().collect();
            out.sort_by(|a, b| a.code.cmp(&b.code));
            if let Some(limit) = query.limit {
                out.truncate(limit);
            }
            Ok(out)
        }
    }

    fn record(code: &str, description: &str, base: Rate) -> TariffRecord {
        TariffRecord::new(ClassificationCode::parse(code).unwrap(), description)
            .with_rates(base, Rate::Known(0.0))
    }

    fn store() -> FixedStore {
        FixedStore(vec![
            record("85442900", "Insulated electric conductors, other", Rate::Known(2.6)),
            record("85444290", "Electric conductors fitted with connectors", Rate::Known(2.6)),
            record("85441100", "Winding wire of copper", Rate::Known(3.5)),
            record("85437099", "Other electrical machines and apparatus", Rate::Known(2.6)),
            record("85423100", "Processors and controllers", Rate::Known(0.0)),
        ])
    }

    #[test]
    fn test_exact_match() {
        let resolver = CodeResolver::default_config();
        let resolution = resolver
            .resolve("8544.29.00", &VerificationContext::default(), &store())
            .unwrap();
        assert!(resolution.verified);
        assert_eq!(resolution.match_type, Some(MatchType::Exact));
        assert_eq!(resolution.code.unwrap().as_str(), "85442900");
        assert_eq!(resolution.rates.base_rate, Rate::Known(2.6));
        assert!(resolution.issues.is_empty());
        // 0.3 exists + 0.2 description + 0.2 rates
        assert!((resolution.trust_score - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_alternatives_prefer_subcategory() {
        let resolver = CodeResolver::default_config();
        let resolution = resolver
            .resolve("85442900", &VerificationContext::default(), &store())
            .unwrap();
        let alts = &resolution.alternatives;
        assert_eq!(alts.len(), 4);
        assert_eq!(alts[0].relation, AlternativeRelation::SameSubcategory);
        assert_eq!(alts[0].confidence, 0.8);
        assert_eq!(alts[0].code.as_str(), "85441100");
        assert_eq!(alts[1].code.as_str(), "85444290");
        assert_eq!(alts[2].relation, AlternativeRelation::SameChapter);
        assert_eq!(alts[2].confidence, 0.5);
        assert!(alts.iter().all(|a| a.code.as_str() != "85442900"));
    }

    #[test]
    fn test_fuzzy_match_on_wrong_length() {
        let resolver = CodeResolver::default_config();
        let resolution = resolver
            .resolve("8544-29-00-10", &VerificationContext::default(), &store())
            .unwrap();
        assert!(resolution.verified);
        assert_eq!(resolution.code.as_ref().unwrap().as_str(), "85442900");
        match resolution.match_type {
            Some(MatchType::Fuzzy { score }) => assert!(score > 0.0),
            other => panic!("expected fuzzy match, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_at_any_prefix() {
        let resolver = CodeResolver::default_config();
        let resolution = resolver
            .resolve("9403.60", &VerificationContext::default(), &store())
            .unwrap();
        assert!(!resolution.verified);
        assert!(resolution.match_type.is_none());
        assert_eq!(resolution.trust_score, 0.0);
        assert_eq!(resolution.rates.base_rate, Rate::Unknown);
        assert!(resolution.recommendation.is_some());
        assert_eq!(resolution.issues[0].kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_unparseable_input_is_incomplete() {
        let resolver = CodeResolver::default_config();
        let resolution = resolver
            .resolve("H.S.", &VerificationContext::default(), &store())
            .unwrap();
        assert!(!resolution.verified);
        assert_eq!(resolution.issues[0].kind, ErrorKind::Incomplete);
    }

    #[test]
    fn test_tie_breaks_to_lowest_code() {
        let tied = FixedStore(vec![
            record("85442911", "Insulated conductors, type B", Rate::Known(2.6)),
            record("85442919", "Insulated conductors, type A", Rate::Known(2.6)),
        ]);
        let resolver = CodeResolver::default_config();
        let resolution = resolver
            .resolve("854429", &VerificationContext::default(), &tied)
            .unwrap();
        assert_eq!(resolution.code.unwrap().as_str(), "85442911");
        assert!(resolution.issues.iter().any(|i| i.kind == ErrorKind::Ambiguous));
    }

    #[test]
    fn test_manual_verification_lowers_trust() {
        let resolver = CodeResolver::default_config();
        let context = VerificationContext {
            requires_manual_verification: true,
            ..Default::default()
        };
        let resolution = resolver.resolve("85442900", &context, &store()).unwrap();
        assert!((resolution.trust_score - 0.35).abs() < 1e-12);
        assert!(resolution.recommendation.is_some());
    }
}
