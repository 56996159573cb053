//! Integration tests for dutywise-store
//!
//! These tests verify the import → read-only lookup cycle on a real database file.

use dutywise_domain::traits::{RecordQuery, ReferenceStore, RulesStore};
use dutywise_domain::{ClassificationCode, PolicyInstrument, Rate, RuleScope};
use dutywise_store::{CachedStore, ReferenceData, SqliteStore, StoreError};
use tempfile::TempDir;

const SAMPLE: &str = r#"{
  "records": [
    {
      "code": "8544.29.00",
      "description": "Insulated electric conductors, other",
      "category": "electronics",
      "base_rate": 2.6,
      "preferential_rate": 0.0,
      "source_name": "USITC HTS",
      "verified_date": "2025-01-15",
      "surcharges": [
        { "instrument": "section_301", "rate": 25.0, "active": true, "effective_date": "2024-09-27" },
        { "instrument": "safeguard", "rate": 10.0, "active": false }
      ]
    },
    {
      "code": "8544.42.90",
      "description": "Electric conductors fitted with connectors",
      "base_rate": 2.6,
      "preferential_rate": 0.0
    },
    {
      "code": "8471.30.01",
      "description": "Portable automatic data processing machines",
      "base_rate": 0.0,
      "preferential_rate": 0.0
    },
    {
      "code": "8703.23.01",
      "description": "Motor cars with spark-ignition engine",
      "category": "automotive",
      "base_rate": 2.5,
      "preferential_rate": null
    }
  ],
  "rules": [
    { "scope": { "kind": "category", "value": "automotive" }, "threshold_percent": 75.0,
      "required_documentation": ["USMCA certification of origin", "Bill of materials"] },
    { "scope": { "kind": "default" }, "threshold_percent": 60.0 }
  ]
}"#;

fn seeded_database() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dutywise.db");
    let mut store = SqliteStore::new(&path).unwrap();
    let data = ReferenceData::from_json(SAMPLE).unwrap();
    let (records, rules) = store.import_data(&data).unwrap();
    assert_eq!(records, 4);
    assert_eq!(rules, 2);
    (dir, path)
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
    assert_eq!(store.unwrap().record_count().unwrap(), 0);
}

#[test]
fn test_read_only_lookup_after_import() {
    let (_dir, path) = seeded_database();
    let store = SqliteStore::open_read_only(&path).unwrap();
    assert!(store.is_read_only());

    let code = ClassificationCode::parse("85442900").unwrap();
    let record = store.get_record(&code).unwrap().expect("record should exist");
    assert_eq!(record.base_rate, Rate::Known(2.6));
    assert_eq!(record.surcharges.len(), 2);
    assert_eq!(record.effective_base_rate(), Rate::Known(27.6));
    assert!(record
        .surcharges
        .iter()
        .any(|s| s.instrument == PolicyInstrument::Safeguard && !s.active));
    assert_eq!(record.verified_date.unwrap().to_string(), "2025-01-15");
}

#[test]
fn test_read_only_store_rejects_imports() {
    let (_dir, path) = seeded_database();
    let mut store = SqliteStore::open_read_only(&path).unwrap();
    let result = store.import_records(&[]);
    assert!(matches!(result, Err(StoreError::ReadOnly)));
}

#[test]
fn test_query_by_prefix_and_nonzero_base() {
    let (_dir, path) = seeded_database();
    let store = SqliteStore::open_read_only(&path).unwrap();

    let chapter_85 = store.query_records(&RecordQuery::prefix("85")).unwrap();
    assert_eq!(chapter_85.len(), 2);
    assert!(chapter_85.windows(2).all(|w| w[0].code <= w[1].code));

    let nonzero = RecordQuery {
        require_nonzero_base: true,
        ..Default::default()
    };
    let records = store.query_records(&nonzero).unwrap();
    assert!(records.iter().all(|r| r.base_rate.is_nonzero()));
    assert_eq!(records.len(), 3);
}

#[test]
fn test_query_by_chapter_range_and_keywords() {
    let (_dir, path) = seeded_database();
    let store = SqliteStore::open_read_only(&path).unwrap();

    let query = RecordQuery {
        chapter_range: Some((84, 85)),
        description_keywords: vec!["connectors".into(), "PORTABLE".into()],
        ..Default::default()
    };
    let records = store.query_records(&query).unwrap();
    let codes: Vec<&str> = records.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["84713001", "85444290"]);

    let limited = store
        .query_records(&RecordQuery::chapters(84, 87).with_limit(1))
        .unwrap();
    assert_eq!(limited.len(), 1);
}

#[test]
fn test_unknown_preferential_rate_survives_storage() {
    let (_dir, path) = seeded_database();
    let store = SqliteStore::open_read_only(&path).unwrap();
    let code = ClassificationCode::parse("8703.23.01").unwrap();
    let record = store.get_record(&code).unwrap().unwrap();
    assert_eq!(record.preferential_rate, Rate::Unknown);
}

#[test]
fn test_rules_lookup_by_category() {
    let (_dir, path) = seeded_database();
    let store = SqliteStore::open_read_only(&path).unwrap();
    let code = ClassificationCode::parse("87032301").unwrap();

    let rules = store.rules_for(Some(&code), Some("automotive")).unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].scope, RuleScope::Category("automotive".into()));
    assert_eq!(rules[0].threshold_percent, 75.0);
    assert_eq!(rules[0].required_documentation.len(), 2);
    assert_eq!(rules[1].scope, RuleScope::Default);
}

#[test]
fn test_cached_store_matches_underlying_store() {
    let (_dir, path) = seeded_database();
    let cached = CachedStore::new(SqliteStore::open_read_only(&path).unwrap(), 16);
    let code = ClassificationCode::parse("85442900").unwrap();

    let direct = cached.inner().get_record(&code).unwrap();
    let first = cached.get_record(&code).unwrap();
    let second = cached.get_record(&code).unwrap();
    assert_eq!(direct, first);
    assert_eq!(first, second);
    assert_eq!(cached.stats(), (1, 1));
}
