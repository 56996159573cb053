//! Sequential request pipeline
//!
//! classify or resolve → fallback when no confidently-rated code exists →
//! qualify when components are given → annotate savings when a route is given.
//! Per-input problems become [`Issue`]s on the assessment; no stage failure
//! aborts the request.
//!
//! Rate trust only decides where the headline rates come from. A verified
//! record still supplies its category for rule lookup and its overlays for
//! the stability annotation when the rates themselves come from the fallback
//! chain.

use crate::{
    Assessment, AssessmentRequest, PipelineConfig, PipelineError, PipelineSettings, RateSource,
};
use dutywise_classifier::{Classifier, ClassifierConfig, Taxonomy};
use dutywise_domain::traits::{ReferenceStore, RulesStore};
use chrono::Local;
use dutywise_domain::{
    ClassificationCandidate, ConfidenceLabel, ErrorKind, EstimatedRates, FallbackMethod,
    FallbackResult, Issue, QualificationResult, Route, TariffRecord, VolatilityAlert,
};
use dutywise_fallback::{FallbackEngine, FallbackInput};
use dutywise_qualifier::{QualificationEvaluator, QualificationRequest};
use dutywise_resolver::{CodeResolver, Resolution, VerificationContext};
use dutywise_volatility::{
    RateMonitor, SavingsEstimate, SavingsInput, TracingAlertSink, VolatilityConfig,
    VolatilitySeparator,
};
use tracing::{debug, info};

/// Runs every stage against one store
///
/// The store is passed per call; the pipeline holds only engines and configuration.
pub struct Pipeline<S> {
    settings: PipelineSettings,
    taxonomy: Taxonomy,
    classifier: ClassifierConfig,
    resolver: CodeResolver,
    fallback: FallbackEngine<S>,
    qualifier: QualificationEvaluator,
    separator: VolatilitySeparator,
    volatility: VolatilityConfig,
}

impl<S> Pipeline<S>
where
    S: ReferenceStore + RulesStore + 'static,
    <S as ReferenceStore>::Error: std::fmt::Display,
    <S as RulesStore>::Error: std::fmt::Display,
{
    /// Build every engine, rejecting invalid configuration
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            resolver: CodeResolver::new(config.resolver)?,
            fallback: FallbackEngine::standard(&config.fallback),
            qualifier: QualificationEvaluator::new(config.qualifier)?,
            separator: VolatilitySeparator::new(config.volatility.clone())?,
            volatility: config.volatility,
            settings: config.settings,
            taxonomy: config.taxonomy,
            classifier: config.classifier,
        })
    }

    /// Pipeline with every default
    pub fn default_config() -> Result<Self, PipelineError> {
        Self::new(PipelineConfig::default())
    }

    /// Stage hand-off thresholds
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Map a description to ranked candidates
    pub fn classify(
        &self,
        description: &str,
        hint: Option<&str>,
        store: &S,
    ) -> Result<Vec<ClassificationCandidate>, PipelineError> {
        let classifier = Classifier::new(&self.taxonomy, self.classifier.clone());
        Ok(classifier.classify(description, hint, store)?)
    }

    /// Resolve a possibly malformed code
    pub fn resolve(
        &self,
        code: &str,
        context: &VerificationContext,
        store: &S,
    ) -> Result<Resolution, PipelineError> {
        Ok(self.resolver.resolve(code, context, store)?)
    }

    /// Estimate rates through the fallback chain
    pub fn fallback(&self, input: &FallbackInput, store: &S) -> FallbackResult {
        self.fallback.run(input, store)
    }

    /// Evaluate regional value content
    pub fn qualify(
        &self,
        request: &QualificationRequest,
        store: &S,
    ) -> Result<QualificationResult, PipelineError> {
        Ok(self.qualifier.evaluate(request, store)?)
    }

    /// Savings with stability annotation
    pub fn separate(&self, input: &SavingsInput, route: &Route, import_value: Option<f64>) -> SavingsEstimate {
        self.separator.separate(input, route, import_value)
    }

    /// Rate monitor over the same store
    pub fn monitor<'s>(&self, store: &'s S) -> Result<RateMonitor<'s, S>, PipelineError> {
        Ok(RateMonitor::new(store, self.volatility.clone())?)
    }

    /// Run the whole pipeline for one request
    pub fn assess(&self, request: &AssessmentRequest, store: &S) -> Assessment {
        let mut issues = Vec::new();
        let mut candidates = Vec::new();
        let mut resolution: Option<Resolution> = None;

        let code = request.code.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let description = request
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        let mut partial_code = code.map(str::to_string);

        match (code, description) {
            (Some(code), _) => match self.resolve(code, &request.context, store) {
                Ok(found) => resolution = Some(found),
                Err(e) => issues.push(e.to_issue("resolve")),
            },
            (None, Some(description)) => match self.classify(description, request.hint.as_deref(), store) {
                Ok(found) => {
                    if let Some(top) = found.first() {
                        partial_code = top.code.as_ref().map(|c| c.as_str().to_string());
                    }
                    match self.pick_candidate(&found) {
                        Ok(code) => match self.resolve(code, &request.context, store) {
                            Ok(resolved) => resolution = Some(resolved),
                            Err(e) => issues.push(e.to_issue("resolve")),
                        },
                        Err(issue) => issues.push(issue),
                    }
                    candidates = found;
                }
                Err(e) => issues.push(e.to_issue("classify")),
            },
            (None, None) => {
                issues.push(Issue::new(
                    ErrorKind::Incomplete,
                    "assess",
                    "Either a product description or a classification code is required",
                ));
                return Assessment {
                    candidates,
                    resolution,
                    fallback: None,
                    rates: EstimatedRates::unknown(),
                    rate_source: RateSource::Unavailable,
                    qualification: None,
                    savings: None,
                    issues,
                };
            }
        }

        if let Some(resolved) = &resolution {
            issues.extend(resolved.issues.iter().cloned());
        }

        let record = resolution
            .as_ref()
            .filter(|r| r.verified)
            .and_then(|r| r.record.clone());

        // Rates: the resolved record when it is trustworthy, otherwise the fallback chain
        let confident = resolution.as_ref().filter(|r| {
            r.verified
                && r.trust_score >= self.settings.min_trust_for_rates
                && r.rates.base_rate.is_known()
        });
        let (rates, rate_source, fallback) = match confident {
            Some(resolved) => (resolved.rates, RateSource::Reference, None),
            None => {
                let input = FallbackInput {
                    description: description
                        .map(str::to_string)
                        .or_else(|| resolution.as_ref().and_then(|r| r.description.clone()))
                        .unwrap_or_default(),
                    partial_code,
                };
                debug!("No confidently-rated code; running fallback chain");
                let result = self.fallback(&input, store);
                match result.method {
                    FallbackMethod::TerminalFailure => issues.push(
                        Issue::new(ErrorKind::ExhaustedFallback, "fallback", result.disclosure_message.clone())
                            .with_confidence(ConfidenceLabel::VeryLow),
                    ),
                    FallbackMethod::ServiceUnavailable => issues.push(Issue::new(
                        ErrorKind::ServiceUnavailable,
                        "fallback",
                        result.disclosure_message.clone(),
                    )),
                    _ => {}
                }
                (result.rates, RateSource::Fallback, Some(result))
            }
        };

        // Qualification is independent of the rates chosen above
        let qualification = if request.components.is_empty() {
            None
        } else {
            let qualification_request = QualificationRequest {
                code: resolution.as_ref().and_then(|r| r.code.clone()),
                category: request
                    .category
                    .clone()
                    .or_else(|| record.as_ref().and_then(|r| r.category.clone())),
                components: request.components.clone(),
                destination: request.effective_destination().unwrap_or_default(),
            };
            match self.qualify(&qualification_request, store) {
                Ok(result) => Some(result),
                Err(e) => {
                    issues.push(e.to_issue("qualify"));
                    None
                }
            }
        };

        let savings = request.route.as_ref().map(|route| {
            let input = savings_input(record.as_ref(), &rates);
            let estimate = self.separate(&input, route, request.import_value);
            let alerts = self.tracked_alerts(request, store, &mut issues);
            estimate.with_alerts(alerts)
        });

        info!(
            "Assessment complete: rates from {:?}, {} candidate(s), {} issue(s)",
            rate_source,
            candidates.len(),
            issues.len()
        );

        Assessment {
            candidates,
            resolution,
            fallback,
            rates,
            rate_source,
            qualification,
            savings,
            issues,
        }
    }

    /// Alerts for tracked rates that moved since their snapshots
    fn tracked_alerts(
        &self,
        request: &AssessmentRequest,
        store: &S,
        issues: &mut Vec<Issue>,
    ) -> Vec<VolatilityAlert> {
        if request.tracked_rates.is_empty() {
            return Vec::new();
        }
        let observed_on = request.as_of.unwrap_or_else(|| Local::now().date_naive());
        let checked = self.monitor(store).and_then(|monitor| {
            Ok(monitor.check_and_notify(&request.tracked_rates, observed_on, &mut TracingAlertSink)?)
        });
        match checked {
            Ok(alerts) => alerts,
            Err(e) => {
                issues.push(e.to_issue("monitor"));
                Vec::new()
            }
        }
    }

    /// The top candidate's code, when it is specific and confident enough
    fn pick_candidate<'c>(&self, candidates: &'c [ClassificationCandidate]) -> Result<&'c str, Issue> {
        let Some(top) = candidates.first() else {
            return Err(Issue::new(
                ErrorKind::Incomplete,
                "classify",
                "The description has no meaningful words to classify",
            ));
        };
        let code = match &top.code {
            Some(code) if !top.no_clear_match => code,
            _ => {
                return Err(Issue::new(
                    ErrorKind::NotFound,
                    "classify",
                    "No chapter range matched the description",
                ))
            }
        };
        if code.len() <= 2 {
            return Err(Issue::new(
                ErrorKind::NotFound,
                "classify",
                format!(
                    "Only chapter {} could be determined; no reference record carries its rates",
                    code.chapter()
                ),
            )
            .with_confidence(ConfidenceLabel::Low));
        }
        if top.confidence < self.settings.min_candidate_confidence {
            return Err(Issue::new(
                ErrorKind::NotFound,
                "classify",
                format!(
                    "Best candidate {} has confidence {:.0}, below the {:.0} needed to use its rates",
                    code.dotted(),
                    top.confidence,
                    self.settings.min_candidate_confidence
                ),
            )
            .with_confidence(ConfidenceLabel::Low));
        }
        Ok(code.as_str())
    }
}

/// Rates for the savings estimate
///
/// A record with a known base rate is used whole. Estimated rates fill in an
/// unknown base, and the record's overlays apply either way.
fn savings_input(record: Option<&TariffRecord>, rates: &EstimatedRates) -> SavingsInput {
    match record {
        Some(record) if record.base_rate.is_known() => SavingsInput::from_record(record),
        Some(record) => SavingsInput::from_estimate(rates).with_overlays_from(record),
        None => SavingsInput::from_estimate(rates),
    }
}
