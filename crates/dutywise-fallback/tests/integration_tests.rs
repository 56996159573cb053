//! Integration tests for dutywise-fallback against a SQLite reference store

use dutywise_domain::{
    ClassificationCode, FallbackConfidence, FallbackMethod, Rate, TariffRecord, UserOptionKind,
};
use dutywise_fallback::{FallbackConfig, FallbackEngine, FallbackInput};
use dutywise_store::SqliteStore;
use proptest::prelude::*;

fn seeded_store() -> SqliteStore {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let rows = [
        ("85442900", "Insulated copper wire conductors", Some(2.6), Some(0.0)),
        ("85444290", "Copper wire harness with connectors", Some(4.0), Some(1.0)),
        ("85441100", "Winding wire of copper", Some(0.0), Some(0.0)),
        ("85011020", "Electric motors of an output not exceeding 37.5 W", Some(2.8), Some(0.0)),
        ("73181520", "Steel bolts", None, None),
    ];
    let records: Vec<TariffRecord> = rows
        .iter()
        .map(|(code, description, base, pref)| {
            TariffRecord::new(ClassificationCode::parse(code).unwrap(), *description).with_rates(
                Rate::from_option(*base).unwrap(),
                Rate::from_option(*pref).unwrap(),
            )
        })
        .collect();
    store.import_records(&records).unwrap();
    store
}

fn approx(rate: Rate, expected: f64) -> bool {
    rate.value().is_some_and(|v| (v - expected).abs() < 1e-9)
}

#[test]
fn test_keyword_match_is_first_tier() {
    let store = seeded_store();
    let engine = FallbackEngine::standard(&FallbackConfig::default());
    let result = engine.run(&FallbackInput::from_description("copper wire"), &store);

    assert_eq!(result.method, FallbackMethod::KeywordMatch);
    assert_eq!(result.sample_size, 2);
    assert!(approx(result.rates.base_rate, 3.3));
    assert!(approx(result.rates.preferential_rate, 0.5));
    assert_eq!(result.confidence, FallbackConfidence::Low);
    assert!(result.requires_user_decision);
    assert!(!result.disclosure_message.is_empty());
}

#[test]
fn test_medium_threshold_from_config() {
    let store = seeded_store();
    let config = FallbackConfig {
        medium_match_threshold: 2,
        ..FallbackConfig::default()
    };
    let engine = FallbackEngine::standard(&config);
    let result = engine.run(&FallbackInput::from_description("copper wire"), &store);

    assert_eq!(result.confidence, FallbackConfidence::Medium);
    assert!(!result.requires_user_decision);
}

#[test]
fn test_chapter_average_when_keywords_miss() {
    let store = seeded_store();
    let engine = FallbackEngine::standard(&FallbackConfig::default());
    let input = FallbackInput::from_description("xyzzy gizmo").with_partial_code("85");
    let result = engine.run(&input, &store);

    assert_eq!(result.method, FallbackMethod::ChapterAverage);
    assert_eq!(result.sample_size, 4);
    assert!(approx(result.rates.base_rate, 2.35));
    assert_eq!(result.confidence, FallbackConfidence::Medium);
}

#[test]
fn test_global_average_without_partial_code() {
    let store = seeded_store();
    let engine = FallbackEngine::standard(&FallbackConfig::default());
    let result = engine.run(&FallbackInput::from_description("xyzzy gizmo"), &store);

    assert_eq!(result.method, FallbackMethod::GlobalAverage);
    assert_eq!(result.sample_size, 3);
    assert!(approx(result.rates.base_rate, (2.6 + 4.0 + 2.8) / 3.0));
    assert_eq!(result.confidence, FallbackConfidence::Low);
}

#[test]
fn test_empty_reference_table_is_terminal() {
    let store = SqliteStore::new(":memory:").unwrap();
    let engine = FallbackEngine::standard(&FallbackConfig::default());
    let result = engine.run(
        &FallbackInput::from_description("copper wire").with_partial_code("85"),
        &store,
    );

    assert_eq!(result.method, FallbackMethod::TerminalFailure);
    assert_eq!(result.rates.base_rate, Rate::Unknown);
    assert_eq!(result.rates.preferential_rate, Rate::Unknown);
    assert_eq!(result.rates.savings, Rate::Unknown);
    assert_eq!(result.confidence, FallbackConfidence::VeryLow);
    assert!(result.requires_user_decision);
    assert!(result
        .user_options
        .iter()
        .any(|o| o.kind == UserOptionKind::EnterCodeManually));
}

#[test]
fn test_strict_config_skips_global_average() {
    let store = seeded_store();
    let engine = FallbackEngine::standard(&FallbackConfig::strict());
    let result = engine.run(&FallbackInput::from_description("xyzzy gizmo"), &store);
    assert_eq!(result.method, FallbackMethod::TerminalFailure);
}

fn tier_rank(method: FallbackMethod) -> usize {
    match method {
        FallbackMethod::KeywordMatch => 0,
        FallbackMethod::ChapterAverage => 1,
        FallbackMethod::GlobalAverage => 2,
        FallbackMethod::TerminalFailure | FallbackMethod::ServiceUnavailable => 3,
    }
}

proptest! {
    #[test]
    fn prop_confidence_never_exceeds_tier_ceiling(
        description in "[a-z ]{0,24}",
        partial in prop::option::of(prop::sample::select(vec!["85", "8544", "73", "99"])),
    ) {
        let store = seeded_store();
        let engine = FallbackEngine::standard(&FallbackConfig::default());
        let mut input = FallbackInput::from_description(description);
        if let Some(code) = partial {
            input = input.with_partial_code(code);
        }
        let result = engine.run(&input, &store);

        let ceiling = match tier_rank(result.method) {
            0 | 1 => FallbackConfidence::Medium,
            2 => FallbackConfidence::Low,
            _ => FallbackConfidence::VeryLow,
        };
        prop_assert!(result.confidence <= ceiling);
        prop_assert!(!result.disclosure_message.is_empty());
        if result.confidence < FallbackConfidence::Medium {
            prop_assert!(result.requires_user_decision);
        }
    }
}
