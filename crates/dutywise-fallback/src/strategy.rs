//! Fallback strategies
//!
//! Each tier implements [`FallbackStrategy`]. A tier that has nothing to say
//! returns `Ok(None)` and the engine moves on to the next one.

use crate::FallbackError;
use dutywise_domain::keywords::extract_keywords;
use dutywise_domain::traits::{RateAverage, RecordQuery, ReferenceStore};
use dutywise_domain::{
    ClassificationCode, EstimatedRates, FallbackConfidence, FallbackMethod, FallbackResult,
    TariffRecord,
};
use serde::{Deserialize, Serialize};

/// What the fallback chain is asked to estimate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FallbackInput {
    /// Product description
    #[serde(default)]
    pub description: String,

    /// Partial or unverified code, if any
    #[serde(default)]
    pub partial_code: Option<String>,
}

impl FallbackInput {
    /// Input with a description only
    pub fn from_description(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            partial_code: None,
        }
    }

    /// Builder-style partial code
    pub fn with_partial_code(mut self, code: impl Into<String>) -> Self {
        self.partial_code = Some(code.into());
        self
    }

    /// The partial code, if it parses to at least a chapter
    pub fn parsed_code(&self) -> Option<ClassificationCode> {
        self.partial_code
            .as_deref()
            .and_then(|c| ClassificationCode::parse(c).ok())
    }
}

/// One tier of the fallback chain
pub trait FallbackStrategy<S: ReferenceStore> {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Highest confidence this tier may report
    fn ceiling(&self) -> FallbackConfidence;

    /// Try to produce an estimate
    fn attempt(&self, input: &FallbackInput, store: &S) -> Result<Option<FallbackResult>, FallbackError>;
}

fn store_error<E: std::fmt::Display>(e: E) -> FallbackError {
    FallbackError::Store(e.to_string())
}

/// Tier 1: average over records whose description shares a keyword
pub struct KeywordMatch {
    /// Keywords taken from the description
    pub max_keywords: usize,
    /// Matches needed for medium confidence
    pub medium_match_threshold: usize,
}

impl KeywordMatch {
    fn hits(record: &TariffRecord, keywords: &[String]) -> usize {
        let description = record.description.to_lowercase();
        keywords.iter().filter(|k| description.contains(k.as_str())).count()
    }
}

impl<S> FallbackStrategy<S> for KeywordMatch
where
    S: ReferenceStore,
    S::Error: std::fmt::Display,
{
    fn name(&self) -> &'static str {
        "keyword_match"
    }

    fn ceiling(&self) -> FallbackConfidence {
        FallbackConfidence::Medium
    }

    fn attempt(&self, input: &FallbackInput, store: &S) -> Result<Option<FallbackResult>, FallbackError> {
        let keywords = extract_keywords(&input.description, self.max_keywords);
        if keywords.is_empty() {
            return Ok(None);
        }

        let query = RecordQuery {
            description_keywords: keywords.clone(),
            require_nonzero_base: true,
            ..Default::default()
        };
        let records = store.query_records(&query).map_err(store_error)?;
        if records.is_empty() {
            return Ok(None);
        }

        let mut best = &records[0];
        let mut best_hits = Self::hits(best, &keywords);
        for record in &records[1..] {
            let hits = Self::hits(record, &keywords);
            if hits > best_hits {
                best = record;
                best_hits = hits;
            }
        }

        let average = RateAverage::from_records(&records);
        let confidence = if records.len() >= self.medium_match_threshold {
            FallbackConfidence::Medium
        } else {
            FallbackConfidence::Low
        };
        let disclosure = format!(
            "Estimated from {} reference record(s) whose descriptions share keywords [{}]. \
             Closest match: {} \"{}\". This is an average, not a verified rate for your product.",
            records.len(),
            keywords.join(", "),
            best.code.dotted(),
            best.description
        );

        Ok(Some(
            FallbackResult::estimate(
                EstimatedRates::new(average.base_rate, average.preferential_rate),
                confidence,
                FallbackMethod::KeywordMatch,
                disclosure,
                average.sample_size,
            )
            .with_best_match(best.code.clone(), best.description.clone()),
        ))
    }
}

/// Tier 2: average over the chapter of a partial code
pub struct ChapterAverage;

impl<S> FallbackStrategy<S> for ChapterAverage
where
    S: ReferenceStore,
    S::Error: std::fmt::Display,
{
    fn name(&self) -> &'static str {
        "chapter_average"
    }

    fn ceiling(&self) -> FallbackConfidence {
        FallbackConfidence::Medium
    }

    fn attempt(&self, input: &FallbackInput, store: &S) -> Result<Option<FallbackResult>, FallbackError> {
        let Some(code) = input.parsed_code() else {
            return Ok(None);
        };
        let chapter = code.chapter();

        let query = RecordQuery {
            code_prefix: Some(chapter.to_string()),
            require_known_base: true,
            ..Default::default()
        };
        let average = store.average_rates(&query).map_err(store_error)?;
        if average.sample_size == 0 || !average.base_rate.is_known() {
            return Ok(None);
        }

        let disclosure = format!(
            "Estimated as the average of {} reference record(s) in chapter {}. \
             Rates within a chapter vary; confirm the full code before relying on this figure.",
            average.sample_size, chapter
        );
        Ok(Some(FallbackResult::estimate(
            EstimatedRates::new(average.base_rate, average.preferential_rate),
            FallbackConfidence::Medium,
            FallbackMethod::ChapterAverage,
            disclosure,
            average.sample_size,
        )))
    }
}

/// Tier 3: average over the whole reference table, zero and unknown base rates excluded
pub struct GlobalAverage;

impl<S> FallbackStrategy<S> for GlobalAverage
where
    S: ReferenceStore,
    S::Error: std::fmt::Display,
{
    fn name(&self) -> &'static str {
        "global_average"
    }

    fn ceiling(&self) -> FallbackConfidence {
        FallbackConfidence::Low
    }

    fn attempt(&self, _input: &FallbackInput, store: &S) -> Result<Option<FallbackResult>, FallbackError> {
        let query = RecordQuery {
            require_nonzero_base: true,
            ..Default::default()
        };
        let average = store.average_rates(&query).map_err(store_error)?;
        if average.sample_size == 0 || !average.base_rate.is_known() {
            return Ok(None);
        }

        let disclosure = format!(
            "Rough, non-specific estimate: the average of {} reference record(s) across all \
             chapters with a non-zero base rate. It says nothing about your product specifically.",
            average.sample_size
        );
        Ok(Some(FallbackResult::estimate(
            EstimatedRates::new(average.base_rate, average.preferential_rate),
            FallbackConfidence::Low,
            FallbackMethod::GlobalAverage,
            disclosure,
            average.sample_size,
        )))
    }
}

/// Tier 4: always answers, with null rates
pub struct TerminalFailure;

/// Disclosure used when no tier produced an estimate
pub const TERMINAL_DISCLOSURE: &str = "No rate could be estimated from the reference data. \
     Enter the classification code manually or request professional classification help.";

impl<S: ReferenceStore> FallbackStrategy<S> for TerminalFailure {
    fn name(&self) -> &'static str {
        "terminal_failure"
    }

    fn ceiling(&self) -> FallbackConfidence {
        FallbackConfidence::VeryLow
    }

    fn attempt(&self, _input: &FallbackInput, _store: &S) -> Result<Option<FallbackResult>, FallbackError> {
        Ok(Some(FallbackResult::terminal_failure(TERMINAL_DISCLOSURE)))
    }
}
