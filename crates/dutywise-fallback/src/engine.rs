//! The ordered fallback chain

use crate::strategy::{
    ChapterAverage, FallbackInput, FallbackStrategy, GlobalAverage, KeywordMatch, TerminalFailure,
    TERMINAL_DISCLOSURE,
};
use crate::{FallbackConfig, FallbackError};
use dutywise_domain::traits::ReferenceStore;
use dutywise_domain::{FallbackConfidence, FallbackResult, UserOption};
use tracing::{debug, info, warn};

/// Runs strategies in order until one produces an estimate
///
/// Ceilings never increase along the chain, so a later tier can never report
/// more confidence than an earlier one.
pub struct FallbackEngine<S> {
    chain: Vec<Box<dyn FallbackStrategy<S>>>,
}

impl<S> FallbackEngine<S>
where
    S: ReferenceStore + 'static,
    S::Error: std::fmt::Display,
{
    /// Build an engine from an explicit chain
    pub fn new(chain: Vec<Box<dyn FallbackStrategy<S>>>) -> Result<Self, FallbackError> {
        if chain.is_empty() {
            return Err(FallbackError::InvalidChain("chain is empty".to_string()));
        }
        for pair in chain.windows(2) {
            if pair[1].ceiling() > pair[0].ceiling() {
                return Err(FallbackError::InvalidChain(format!(
                    "{} ({}) follows {} ({})",
                    pair[1].name(),
                    pair[1].ceiling().as_str(),
                    pair[0].name(),
                    pair[0].ceiling().as_str()
                )));
            }
        }
        Ok(Self { chain })
    }

    /// Keyword match, chapter average, global average, terminal failure
    pub fn standard(config: &FallbackConfig) -> Self {
        let mut chain: Vec<Box<dyn FallbackStrategy<S>>> = vec![Box::new(KeywordMatch {
            max_keywords: config.max_keywords,
            medium_match_threshold: config.medium_match_threshold,
        })];
        if config.enable_chapter_average {
            chain.push(Box::new(ChapterAverage));
        }
        if config.enable_global_average {
            chain.push(Box::new(GlobalAverage));
        }
        chain.push(Box::new(TerminalFailure));
        Self { chain }
    }

    /// Names of the tiers, in order
    pub fn tiers(&self) -> Vec<&'static str> {
        self.chain.iter().map(|s| s.name()).collect()
    }

    /// Run the chain. Always returns a result, never a bare failure.
    pub fn run(&self, input: &FallbackInput, store: &S) -> FallbackResult {
        for strategy in &self.chain {
            match strategy.attempt(input, store) {
                Ok(Some(result)) => {
                    let result = clamp(result, strategy.ceiling());
                    info!(
                        "Fallback produced by {} (confidence {}, sample {})",
                        strategy.name(),
                        result.confidence.as_str(),
                        result.sample_size
                    );
                    return result;
                }
                Ok(None) => {
                    debug!("Fallback tier {} had no estimate", strategy.name());
                }
                Err(FallbackError::Store(e)) => {
                    warn!("Reference data unavailable during {}: {}", strategy.name(), e);
                    return FallbackResult::service_unavailable(
                        "The reference data could not be reached, so no estimate was made. \
                         Try again later or enter the rate manually.",
                    );
                }
                Err(e) => {
                    warn!("Fallback tier {} failed: {}", strategy.name(), e);
                }
            }
        }

        info!("Fallback chain exhausted");
        FallbackResult::terminal_failure(TERMINAL_DISCLOSURE)
    }
}

fn clamp(mut result: FallbackResult, ceiling: FallbackConfidence) -> FallbackResult {
    if result.confidence > ceiling {
        result.confidence = ceiling;
        result.user_options = UserOption::standard_set(ceiling);
        result.requires_user_decision = true;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use dutywise_domain::traits::RecordQuery;
    use dutywise_domain::{
        ClassificationCode, EstimatedRates, FallbackMethod, Rate, TariffRecord,
    };

    struct EmptyStore;

    impl ReferenceStore for EmptyStore {
        type Error = String;

        fn get_record(&self, _code: &ClassificationCode) -> Result<Option<TariffRecord>, String> {
            Ok(None)
        }

        fn query_records(&self, _query: &RecordQuery) -> Result<Vec<TariffRecord>, String> {
            Ok(Vec::new())
        }
    }

    struct DownStore;

    impl ReferenceStore for DownStore {
        type Error = String;

        fn get_record(&self, _code: &ClassificationCode) -> Result<Option<TariffRecord>, String> {
            Err("connection refused".to_string())
        }

        fn query_records(&self, _query: &RecordQuery) -> Result<Vec<TariffRecord>, String> {
            Err("connection refused".to_string())
        }
    }

    /// Claims medium confidence from a low-ceiling slot
    struct Overconfident;

    impl<S: ReferenceStore> FallbackStrategy<S> for Overconfident {
        fn name(&self) -> &'static str {
            "overconfident"
        }

        fn ceiling(&self) -> FallbackConfidence {
            FallbackConfidence::Low
        }

        fn attempt(&self, _input: &FallbackInput, _store: &S) -> Result<Option<FallbackResult>, FallbackError> {
            Ok(Some(FallbackResult::estimate(
                EstimatedRates::new(Rate::Known(1.0), Rate::Known(0.0)),
                FallbackConfidence::Medium,
                FallbackMethod::GlobalAverage,
                "test",
                1,
            )))
        }
    }

    #[test]
    fn test_empty_chain_rejected() {
        let result = FallbackEngine::<EmptyStore>::new(Vec::new());
        assert!(matches!(result, Err(FallbackError::InvalidChain(_))));
    }

    #[test]
    fn test_increasing_ceiling_rejected() {
        let chain: Vec<Box<dyn FallbackStrategy<EmptyStore>>> =
            vec![Box::new(GlobalAverage), Box::new(ChapterAverage)];
        assert!(matches!(
            FallbackEngine::new(chain),
            Err(FallbackError::InvalidChain(_))
        ));
    }

    #[test]
    fn test_standard_tiers() {
        let engine = FallbackEngine::<EmptyStore>::standard(&FallbackConfig::default());
        assert_eq!(
            engine.tiers(),
            vec!["keyword_match", "chapter_average", "global_average", "terminal_failure"]
        );

        let strict = FallbackEngine::<EmptyStore>::standard(&FallbackConfig::strict());
        assert!(!strict.tiers().contains(&"global_average"));
    }

    #[test]
    fn test_empty_store_ends_in_terminal_failure() {
        let engine = FallbackEngine::standard(&FallbackConfig::default());
        let result = engine.run(
            &FallbackInput::from_description("copper wire").with_partial_code("85"),
            &EmptyStore,
        );
        assert_eq!(result.method, FallbackMethod::TerminalFailure);
        assert_eq!(result.rates.base_rate, Rate::Unknown);
        assert!(result.requires_user_decision);
    }

    #[test]
    fn test_store_failure_is_service_unavailable() {
        let engine = FallbackEngine::standard(&FallbackConfig::default());
        let result = engine.run(&FallbackInput::from_description("copper wire"), &DownStore);
        assert_eq!(result.method, FallbackMethod::ServiceUnavailable);
        assert_eq!(result.rates.base_rate, Rate::Unknown);
    }

    #[test]
    fn test_confidence_clamped_to_ceiling() {
        let chain: Vec<Box<dyn FallbackStrategy<EmptyStore>>> = vec![Box::new(Overconfident)];
        let engine = FallbackEngine::new(chain).unwrap();
        let result = engine.run(&FallbackInput::default(), &EmptyStore);
        assert_eq!(result.confidence, FallbackConfidence::Low);
        assert!(result.requires_user_decision);
    }

    #[test]
    fn test_exhausted_custom_chain_is_terminal() {
        let chain: Vec<Box<dyn FallbackStrategy<EmptyStore>>> = vec![Box::new(GlobalAverage)];
        let engine = FallbackEngine::new(chain).unwrap();
        let result = engine.run(&FallbackInput::default(), &EmptyStore);
        assert_eq!(result.method, FallbackMethod::TerminalFailure);
    }
}
