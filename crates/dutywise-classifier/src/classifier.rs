//! Free-text to classification candidate matching

use crate::{ChapterRange, ClassifierConfig, ClassifierError, Taxonomy};
use dutywise_domain::keywords::tokenize;
use dutywise_domain::traits::{RecordQuery, ReferenceStore};
use dutywise_domain::{ClassificationCandidate, ClassificationCode, OriginMethod, TariffRecord};
use std::collections::HashMap;

/// A chapter range with the input tokens that hit it
#[derive(Debug, Clone)]
struct RangeScore<'t> {
    range: &'t ChapterRange,
    matched: Vec<String>,
}

impl RangeScore<'_> {
    fn score(&self) -> usize {
        self.matched.len()
    }
}

/// The product classifier maps descriptions to ranked candidates
pub struct Classifier<'t> {
    taxonomy: &'t Taxonomy,
    config: ClassifierConfig,
}

impl<'t> Classifier<'t> {
    /// Create a classifier over a taxonomy
    pub fn new(taxonomy: &'t Taxonomy, config: ClassifierConfig) -> Self {
        Self { taxonomy, config }
    }

    /// The active configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a free-text description
    ///
    /// # Arguments
    ///
    /// * `description` - Product description (required)
    /// * `hint` - Optional business or industry hint, scored with the description
    /// * `store` - Reference store queried for codes in the winning chapter ranges
    ///
    /// # Returns
    ///
    /// Up to `top_n` candidates by descending confidence. Empty when the
    /// description has no meaningful tokens; a single "no clear match"
    /// placeholder when no chapter range scores.
    pub fn classify<S: ReferenceStore>(
        &self,
        description: &str,
        hint: Option<&str>,
        store: &S,
    ) -> Result<Vec<ClassificationCandidate>, ClassifierError>
    where
        S::Error: std::fmt::Display,
    {
        if tokenize(description).is_empty() {
            tracing::debug!("Description has no meaningful tokens");
            return Ok(Vec::new());
        }

        let text = match hint {
            Some(hint) => format!("{} {}", description, hint),
            None => description.to_string(),
        };
        let tokens = tokenize(&text);

        let ranked = self.rank_ranges(&tokens);
        if ranked.is_empty() {
            tracing::info!(tokens = tokens.len(), "No chapter range matched");
            return Ok(vec![ClassificationCandidate::no_clear_match(
                self.config.no_match_confidence,
            )]);
        }

        let mut candidates = Vec::new();
        for scored in ranked.iter().take(self.config.top_ranges) {
            tracing::debug!(
                range = %scored.range.label(),
                score = scored.score(),
                "Querying chapter range"
            );
            let query = RecordQuery::chapters(scored.range.chapter_start, scored.range.chapter_end)
                .with_limit(self.config.records_per_range);
            let records = store
                .query_records(&query)
                .map_err(|e| ClassifierError::Store(e.to_string()))?;

            if records.is_empty() {
                candidates.push(self.range_candidate(scored)?);
                continue;
            }

            for record in &records {
                candidates.push(self.record_candidate(scored, record, &tokens));
            }
        }

        let ranked = Self::deduplicate_and_rank(candidates, self.config.top_n);
        tracing::info!(
            candidates = ranked.len(),
            top_confidence = ranked.first().map(|c| c.confidence).unwrap_or(0.0),
            "Classification produced"
        );
        Ok(ranked)
    }

    /// Ranges with at least one hit, best first (table order breaks ties)
    fn rank_ranges(&self, tokens: &[String]) -> Vec<RangeScore<'t>> {
        let mut scores: Vec<RangeScore<'t>> = self
            .taxonomy
            .ranges()
            .iter()
            .map(|range| RangeScore {
                range,
                matched: range.matching_tokens(tokens).into_iter().cloned().collect(),
            })
            .filter(|s| s.score() > 0)
            .collect();
        scores.sort_by(|a, b| b.score().cmp(&a.score()));
        scores
    }

    fn category_term(&self, score: usize) -> f64 {
        let w = &self.config.weights;
        (score as f64 * w.category_multiplier).min(w.category_cap)
    }

    fn record_candidate(
        &self,
        scored: &RangeScore<'_>,
        record: &TariffRecord,
        tokens: &[String],
    ) -> ClassificationCandidate {
        let w = &self.config.weights;
        let record_tokens = tokenize(&record.description);
        let overlapping: Vec<&String> = tokens
            .iter()
            .filter(|t| record_tokens.contains(t))
            .collect();
        let overlap = overlapping.len() as f64 / tokens.len() as f64;

        let confidence = (self.category_term(scored.score())
            + (overlap * w.overlap_multiplier).min(w.overlap_cap))
        .min(w.confidence_cap)
        .clamp(0.0, 100.0);

        let mut matched_keywords = scored.matched.clone();
        for token in overlapping {
            if !matched_keywords.contains(token) {
                matched_keywords.push(token.clone());
            }
        }

        ClassificationCandidate {
            code: Some(record.code.clone()),
            description: record.description.clone(),
            confidence,
            matched_keywords,
            origin_method: OriginMethod::CategoryMatch,
            no_clear_match: false,
        }
    }

    /// Chapter-level candidate for a range with no reference rows
    fn range_candidate(&self, scored: &RangeScore<'_>) -> Result<ClassificationCandidate, ClassifierError> {
        let code = ClassificationCode::parse(&format!("{:02}", scored.range.chapter_start))
            .map_err(|e| ClassifierError::Taxonomy(e.to_string()))?;
        let confidence = self
            .category_term(scored.score())
            .min(self.config.weights.confidence_cap);

        Ok(ClassificationCandidate {
            code: Some(code),
            description: format!("{} (chapters {})", scored.range.name, scored.range.label()),
            confidence,
            matched_keywords: scored.matched.clone(),
            origin_method: OriginMethod::CategoryMatch,
            no_clear_match: false,
        })
    }

    /// Keep the best entry per code, order by confidence then code, truncate
    fn deduplicate_and_rank(
        candidates: Vec<ClassificationCandidate>,
        top_n: usize,
    ) -> Vec<ClassificationCandidate> {
        let mut best: HashMap<Option<ClassificationCode>, ClassificationCandidate> = HashMap::new();
        for candidate in candidates {
            match best.get(&candidate.code) {
                Some(existing) if existing.confidence >= candidate.confidence => {}
                _ => {
                    best.insert(candidate.code.clone(), candidate);
                }
            }
        }

        let mut ranked: Vec<ClassificationCandidate> = best.into_values().collect();
        ranked.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.code.cmp(&b.code))
        });
        ranked.truncate(top_n);
        ranked
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
            if let Some(limit) = query.limit {
                out.truncate(limit);
            }
            Ok(out)
        }
    }

    struct DownStore;

    impl ReferenceStore for DownStore {
        type Error = String;

        fn get_record(&self, _code: &ClassificationCode) -> Result<Option<TariffRecord>, String> {
            Err("connection refused".into())
        }

        fn query_records(&self, _query: &RecordQuery) -> Result<Vec<TariffRecord>, String> {
            Err("connection refused".into())
        }
    }

    fn record(code: &str, description: &str) -> TariffRecord {
        TariffRecord::new(ClassificationCode::parse(code).unwrap(), description)
            .with_rates(Rate::Known(2.6), Rate::Known(0.0))
    }

    fn store() -> FixedStore {
        FixedStore(vec![
            record("85258900", "Digital cameras and video camera recorders"),
            record("85423100", "Electronic integrated circuits, processors and controllers"),
            record("85441100", "Winding wire of copper"),
            record("87083000", "Brakes and servo-brakes and parts thereof"),
        ])
    }

    #[test]
    fn test_empty_description_returns_nothing() {
        let taxonomy = Taxonomy::standard();
        let classifier = Classifier::new(&taxonomy, ClassifierConfig::default());
        assert!(classifier.classify("", None, &store()).unwrap().is_empty());
        assert!(classifier.classify("a of to", Some("electronics"), &store()).unwrap().is_empty());
    }

    #[test]
    fn test_unmatched_description_returns_placeholder() {
        let taxonomy = Taxonomy::standard();
        let classifier = Classifier::new(&taxonomy, ClassifierConfig::default());
        let candidates = classifier.classify("handmade ceramic vase", None, &store()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].no_clear_match);
        assert!(candidates[0].code.is_none());
        assert_eq!(candidates[0].confidence, 5.0);
    }

    #[test]
    fn test_overlap_ranks_closest_record_first() {
        let taxonomy = Taxonomy::standard();
        let classifier = Classifier::new(&taxonomy, ClassifierConfig::default());
        let candidates = classifier
            .classify("CMOS image sensor for digital camera", None, &store())
            .unwrap();

        // sensor + digital hit the electronics range: 2 × 20 = 40
        // "digital" and "camera" overlap the camera record: 2/5 × 20 = 8
        assert_eq!(candidates[0].code.as_ref().unwrap().as_str(), "85258900");
        assert!((candidates[0].confidence - 48.0).abs() < 1e-9);
        assert!(candidates[0].matched_keywords.contains(&"camera".to_string()));
        assert!(candidates.len() <= 3);
    }

    #[test]
    fn test_confidence_is_capped() {
        let taxonomy = Taxonomy::standard();
        let classifier = Classifier::new(&taxonomy, ClassifierConfig::default());
        let candidates = classifier
            .classify(
                "smart digital wireless bluetooth electronic processor computer sensor",
                None,
                &store(),
            )
            .unwrap();
        assert!(candidates.iter().all(|c| c.confidence <= 95.0));
        assert!(candidates[0].confidence > 80.0);
    }

    #[test]
    fn test_empty_range_yields_chapter_candidate() {
        let taxonomy = Taxonomy::standard();
        let classifier = Classifier::new(&taxonomy, ClassifierConfig::default());
        let candidates = classifier
            .classify("cotton yarn and textile fabric", None, &store())
            .unwrap();
        assert_eq!(candidates.len(), 1);
        // yarn + textile + fabric: 3 × 20
        assert_eq!(candidates[0].code.as_ref().unwrap().as_str(), "50");
        assert_eq!(candidates[0].confidence, 60.0);
    }

    #[test]
    fn test_hint_contributes_to_scoring() {
        let taxonomy = Taxonomy::standard();
        let classifier = Classifier::new(&taxonomy, ClassifierConfig::default());
        let without = classifier.classify("servo brakes", None, &store()).unwrap();
        let with = classifier
            .classify("servo brakes", Some("automotive"), &store())
            .unwrap();
        assert!(with[0].confidence > without[0].confidence);
    }

    #[test]
    fn test_store_failure_is_reported() {
        let taxonomy = Taxonomy::standard();
        let classifier = Classifier::new(&taxonomy, ClassifierConfig::default());
        let result = classifier.classify("digital sensor", None, &DownStore);
        assert!(matches!(result, Err(ClassifierError::Store(_))));
    }

    #[test]
    fn test_deduplicate_keeps_highest() {
        let code = ClassificationCode::parse("8544").unwrap();
        let make = |confidence| ClassificationCandidate {
            code: Some(code.clone()),
            description: "Insulated wire".into(),
            confidence,
            matched_keywords: vec![],
            origin_method: OriginMethod::CategoryMatch,
            no_clear_match: false,
        };
        let ranked = Classifier::deduplicate_and_rank(vec![make(20.0), make(60.0), make(40.0)], 3);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].confidence, 60.0);
    }
}
