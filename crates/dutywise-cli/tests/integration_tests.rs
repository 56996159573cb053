//! CLI tests against the bundled sample reference data

use dutywise_cli::cli::{ContextArgs, ImportArgs, WatchArgs};
use dutywise_cli::commands::{self, Store};
use dutywise_cli::config::OutputFormat;
use dutywise_cli::{CliError, Config, Formatter};
use dutywise_domain::{
    ComponentOrigin, Rate, RateObservation, Route, RuleScope, StabilityClass,
};
use dutywise_pipeline::{AssessmentRequest, Pipeline, RateSource};
use dutywise_resolver::VerificationContext;
use std::path::PathBuf;
use tempfile::TempDir;

const SAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/sample_reference.json");

fn quiet() -> Formatter {
    Formatter::new(OutputFormat::Quiet, false)
}

fn loaded(dir: &TempDir) -> (Config, Store, Pipeline<Store>) {
    let database = dir.path().join("reference.db");
    commands::execute_import(ImportArgs { file: PathBuf::from(SAMPLE) }, &database, &quiet()).unwrap();

    let mut config = Config::default();
    config.store.database = Some(database);
    let store = commands::open_store(&config, None).unwrap();
    let pipeline = commands::build_pipeline(&config).unwrap();
    (config, store, pipeline)
}

#[test]
fn test_lookup_without_database_explains_import() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.store.database = Some(dir.path().join("missing.db"));

    let err = commands::open_store(&config, None).unwrap_err();
    assert!(matches!(err, CliError::NoDatabase(_)));
    assert!(err.to_string().contains("dutywise import"));
}

#[test]
fn test_lookup_runs_against_imported_database() {
    let dir = TempDir::new().unwrap();
    let (config, _, _) = loaded(&dir);

    let rate = commands::with_reference(&config, None, |pipeline, store| {
        let resolution = pipeline.resolve("85444290", &VerificationContext::default(), store)?;
        Ok(resolution.rates.base_rate)
    })
    .unwrap();
    assert_eq!(rate, Rate::Known(2.6));
}

#[test]
fn test_lookup_checks_configuration_before_database() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.store.database = Some(dir.path().join("missing.db"));

    let mut ran = false;
    let err = commands::with_reference(&config, None, |_, _| {
        ran = true;
        Ok(())
    })
    .unwrap_err();
    assert!(matches!(err, CliError::NoDatabase(_)));
    assert!(!ran);

    config.pipeline.volatility.stability_multiplier = 0.5;
    let err = commands::with_reference(&config, None, |_, _| Ok(())).unwrap_err();
    assert!(matches!(err, CliError::Pipeline(_)));
}

#[test]
fn test_sample_data_assessment() {
    let dir = TempDir::new().unwrap();
    let (_, store, pipeline) = loaded(&dir);

    let request = AssessmentRequest {
        code: Some("8544.42.90".to_string()),
        components: vec![ComponentOrigin::new("MX", 55.0), ComponentOrigin::new("CN", 45.0)],
        route: Route::parse("CN>MX>US"),
        import_value: Some(100_000.0),
        context: VerificationContext {
            supply_chain_complete: true,
            ..VerificationContext::default()
        },
        ..AssessmentRequest::default()
    };
    let assessment = pipeline.assess(&request, &store);

    assert_eq!(assessment.rate_source, RateSource::Reference);
    assert_eq!(assessment.rates.base_rate, Rate::Known(2.6));

    let qualification = assessment.qualification.as_ref().unwrap();
    assert!(matches!(qualification.rule_scope, RuleScope::Code(_)));
    assert_eq!(qualification.required_threshold, 50.0);
    assert!(qualification.qualifies);

    let savings = assessment.savings.as_ref().unwrap();
    assert_eq!(savings.annotation.base_stability, StabilityClass::Volatile);
    assert_eq!(savings.annotation.preferential_stability, StabilityClass::TreatyLocked);
    let effective = savings.effective_base_rate.value().unwrap();
    assert!((effective - 27.6).abs() < 1e-9);
}

#[test]
fn test_resolve_and_classify_commands_run() {
    let dir = TempDir::new().unwrap();
    let (_, store, pipeline) = loaded(&dir);
    let formatter = quiet();

    commands::execute_resolve(
        dutywise_cli::cli::ResolveArgs {
            code: "8544-42-90".to_string(),
            context: ContextArgs::default(),
        },
        &pipeline,
        &store,
        &formatter,
    )
    .unwrap();

    let candidates = pipeline.classify("digital camera sensor", None, &store).unwrap();
    let top = candidates[0].code.as_ref().unwrap();
    assert!(matches!(top.chapter(), "84" | "85"));
}

#[test]
fn test_unknown_rates_fall_back_with_disclosure() {
    let dir = TempDir::new().unwrap();
    let (_, store, pipeline) = loaded(&dir);

    let assessment = pipeline.assess(&AssessmentRequest::for_code("9018.90.80"), &store);
    assert_eq!(assessment.rate_source, RateSource::Fallback);
    let fallback = assessment.fallback.as_ref().unwrap();
    assert!(!fallback.disclosure_message.is_empty());
    assert!(!fallback.user_options.is_empty());
}

#[test]
fn test_watch_records_snapshot() {
    let dir = TempDir::new().unwrap();
    let (_, store, pipeline) = loaded(&dir);
    let snapshot = dir.path().join("snapshots").join("7318.json");

    let watch = |no_update| WatchArgs {
        code: "7318.15.20".to_string(),
        snapshot: Some(snapshot.clone()),
        no_update,
    };

    commands::execute_watch(watch(false), &pipeline, &store, &quiet()).unwrap();
    let saved: Vec<RateObservation> =
        serde_json::from_str(&std::fs::read_to_string(&snapshot).unwrap()).unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].rate, Rate::Known(8.5));
    assert!(saved[1].active);

    // Unchanged rates: the second run compares cleanly and leaves the file alone
    let before = std::fs::read_to_string(&snapshot).unwrap();
    commands::execute_watch(watch(true), &pipeline, &store, &quiet()).unwrap();
    assert_eq!(std::fs::read_to_string(&snapshot).unwrap(), before);
}

#[test]
fn test_watch_unknown_code_is_an_error() {
    let dir = TempDir::new().unwrap();
    let (_, store, pipeline) = loaded(&dir);
    let args = WatchArgs {
        code: "0101.21.00".to_string(),
        snapshot: Some(dir.path().join("horse.json")),
        no_update: false,
    };
    assert!(commands::execute_watch(args, &pipeline, &store, &quiet()).is_err());
}
