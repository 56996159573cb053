//! Dutywise Storage Layer
//!
//! Implements the `ReferenceStore` and `RulesStore` traits on SQLite.
//!
//! # Architecture
//!
//! - SQLite for tariff records, policy overlays and qualification rules
//! - Resolution opens the database read-only ([`SqliteStore::open_read_only`]);
//!   lookups never write
//! - Loading reference data is a separate administrative path
//!   ([`SqliteStore::import_records`], [`SqliteStore::import_rules`])
//! - [`CachedStore`] is an optional read-through cache in front of any store
//!
//! # Examples
//!
//! ```no_run
//! use dutywise_store::SqliteStore;
//!
//! let store = SqliteStore::open_read_only("dutywise.db").unwrap();
//! // Store is now ready for lookups
//! ```

#![warn(missing_docs)]

mod cache;
mod import;

pub use cache::CachedStore;
pub use import::ReferenceData;

use chrono::NaiveDate;
use dutywise_domain::traits::{RateAverage, RecordQuery, ReferenceStore, RulesStore};
use dutywise_domain::{
    ClassificationCode, PolicyInstrument, QualificationRule, Rate, RuleScope, RuleType, Surcharge,
    TariffRecord,
};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A write was attempted on a read-only store
    #[error("Store is opened read-only")]
    ReadOnly,
}

/// SQLite-based implementation of `ReferenceStore` and `RulesStore`
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own SqliteStore instance.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    read_only: bool,
}

const RECORD_COLUMNS: &str =
    "code, description, category, base_rate, preferential_rate, source_name, verified_date";

impl SqliteStore {
    /// Open (or create) a read-write store with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dutywise_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("dutywise.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            read_only: false,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an existing database for lookups only
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self {
            conn,
            read_only: true,
        })
    }

    /// Whether writes are rejected
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Number of tariff records
    pub fn record_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tariff_records", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Number of qualification rules
    pub fn rule_count(&self) -> Result<usize, StoreError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM qualification_rules", [], |row| {
                    row.get(0)
                })?;
        Ok(count as usize)
    }

    /// Insert or replace tariff records and their overlays
    ///
    /// Administrative path only; resolution never calls this.
    pub fn import_records(&mut self, records: &[TariffRecord]) -> Result<usize, StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }

        let tx = self.conn.transaction()?;
        for record in records {
            tx.execute(
                "INSERT INTO tariff_records (code, description, category, base_rate, preferential_rate, source_name, verified_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(code) DO UPDATE SET
                 description = excluded.description, category = excluded.category,
                 base_rate = excluded.base_rate, preferential_rate = excluded.preferential_rate,
                 source_name = excluded.source_name, verified_date = excluded.verified_date",
                params![
                    record.code.as_str(),
                    &record.description,
                    &record.category,
                    record.base_rate.value(),
                    record.preferential_rate.value(),
                    &record.source_name,
                    record.verified_date.map(|d| d.to_string()),
                ],
            )?;

            tx.execute(
                "DELETE FROM surcharges WHERE code = ?1",
                params![record.code.as_str()],
            )?;
            for surcharge in &record.surcharges {
                tx.execute(
                    "INSERT INTO surcharges (code, instrument, rate, active, effective_date)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        record.code.as_str(),
                        surcharge.instrument.as_str(),
                        surcharge.rate.value(),
                        surcharge.active,
                        surcharge.effective_date.map(|d| d.to_string()),
                    ],
                )?;
            }
        }
        tx.commit()?;

        tracing::info!(count = records.len(), "Imported tariff records");
        Ok(records.len())
    }

    /// Append qualification rules
    ///
    /// Administrative path only; resolution never calls this.
    pub fn import_rules(&mut self, rules: &[QualificationRule]) -> Result<usize, StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }

        let tx = self.conn.transaction()?;
        for rule in rules {
            if !(0.0..=100.0).contains(&rule.threshold_percent) {
                return Err(StoreError::InvalidData(format!(
                    "Threshold {} for rule {} is outside 0-100",
                    rule.threshold_percent, rule.scope
                )));
            }
            tx.execute(
                "INSERT INTO qualification_rules (scope_kind, scope_value, threshold_percent, rule_type, required_documentation)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    rule.scope.kind_str(),
                    rule.scope.value(),
                    rule.threshold_percent,
                    rule.rule_type.as_str(),
                    serde_json::to_string(&rule.required_documentation)?,
                ],
            )?;
        }
        tx.commit()?;

        tracing::info!(count = rules.len(), "Imported qualification rules");
        Ok(rules.len())
    }

    /// Import a whole reference data file
    pub fn import_data(&mut self, data: &ReferenceData) -> Result<(usize, usize), StoreError> {
        let records = self.import_records(&data.records)?;
        let rules = self.import_rules(&data.rules)?;
        Ok((records, rules))
    }

    /// Build the WHERE clause shared by record queries and averages
    fn where_clause(query: &RecordQuery) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut sql = String::from(" WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(prefix) = &query.code_prefix {
            sql.push_str(" AND code LIKE ?");
            params.push(Box::new(format!("{}%", ClassificationCode::normalize(prefix))));
        }

        if let Some((start, end)) = query.chapter_range {
            sql.push_str(" AND CAST(substr(code, 1, 2) AS INTEGER) BETWEEN ? AND ?");
            params.push(Box::new(start));
            params.push(Box::new(end));
        }

        if !query.description_keywords.is_empty() {
            let clauses = vec!["description LIKE ?"; query.description_keywords.len()];
            sql.push_str(&format!(" AND ({})", clauses.join(" OR ")));
            for keyword in &query.description_keywords {
                let escaped = keyword.replace('%', "").replace('_', "");
                params.push(Box::new(format!("%{}%", escaped)));
            }
        }

        if query.require_nonzero_base {
            sql.push_str(" AND base_rate IS NOT NULL AND base_rate > 0");
        }

        if query.require_known_base {
            sql.push_str(" AND base_rate IS NOT NULL");
        }

        (sql, params)
    }

    fn record_from_row(row: &Row<'_>) -> rusqlite::Result<TariffRecord> {
        let code: String = row.get(0)?;
        let code = ClassificationCode::parse(&code).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(TariffRecord {
            code,
            description: row.get(1)?,
            category: row.get(2)?,
            base_rate: rate_column(row, 3)?,
            preferential_rate: rate_column(row, 4)?,
            surcharges: Vec::new(),
            source_name: row.get(5)?,
            verified_date: date_column(row, 6)?,
        })
    }

    fn load_surcharges(&self, record: &mut TariffRecord) -> Result<(), StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT instrument, rate, active, effective_date
             FROM surcharges WHERE code = ?1 ORDER BY instrument",
        )?;

        record.surcharges = stmt
            .query_map(params![record.code.as_str()], |row| {
                let name: String = row.get(0)?;
                let instrument = PolicyInstrument::parse(&name).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        Box::new(StoreError::InvalidData(format!(
                            "Unknown policy instrument: {}",
                            name
                        ))),
                    )
                })?;
                Ok(Surcharge {
                    instrument,
                    rate: rate_column(row, 1)?,
                    active: row.get(2)?,
                    effective_date: date_column(row, 3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(())
    }
}

/// Read a nullable rate column; NULL is unknown, never zero
fn rate_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Rate> {
    let value: Option<f64> = row.get(idx)?;
    Rate::from_option(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Real, Box::new(e))
    })
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let value: Option<String> = row.get(idx)?;
    value
        .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

impl ReferenceStore for SqliteStore {
    type Error = StoreError;

    fn get_record(&self, code: &ClassificationCode) -> Result<Option<TariffRecord>, Self::Error> {
        let sql = format!("SELECT {} FROM tariff_records WHERE code = ?1", RECORD_COLUMNS);
        let record = self
            .conn
            .query_row(&sql, params![code.as_str()], Self::record_from_row)
            .optional()?;

        match record {
            Some(mut record) => {
                self.load_surcharges(&mut record)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn query_records(&self, query: &RecordQuery) -> Result<Vec<TariffRecord>, Self::Error> {
        let (where_sql, mut params) = Self::where_clause(query);
        let mut sql = format!("SELECT {} FROM tariff_records{} ORDER BY code", RECORD_COLUMNS, where_sql);

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut records = stmt
            .query_map(&param_refs[..], Self::record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for record in &mut records {
            self.load_surcharges(record)?;
        }

        tracing::debug!(count = records.len(), "Queried tariff records");
        Ok(records)
    }

    fn average_rates(&self, query: &RecordQuery) -> Result<RateAverage, Self::Error> {
        let (where_sql, params) = Self::where_clause(query);
        let sql = format!(
            "SELECT AVG(base_rate), AVG(preferential_rate), COUNT(*) FROM tariff_records{}",
            where_sql
        );
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let average = self.conn.query_row(&sql, &param_refs[..], |row| {
            let count: i64 = row.get(2)?;
            Ok(RateAverage {
                base_rate: rate_column(row, 0)?,
                preferential_rate: rate_column(row, 1)?,
                sample_size: count as usize,
            })
        })?;

        Ok(average)
    }
}

impl RulesStore for SqliteStore {
    type Error = StoreError;

    fn rules_for(
        &self,
        code: Option<&ClassificationCode>,
        category: Option<&str>,
    ) -> Result<Vec<QualificationRule>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT scope_kind, scope_value, threshold_percent, rule_type, required_documentation
             FROM qualification_rules
             WHERE (scope_kind = 'code' AND ?1 IS NOT NULL AND ?1 LIKE scope_value || '%')
                OR (scope_kind = 'category' AND ?2 IS NOT NULL AND lower(scope_value) = lower(?2))
                OR (scope_kind = 'chapter' AND ?3 IS NOT NULL AND scope_value = ?3)
                OR scope_kind = 'default'
             ORDER BY id",
        )?;

        let code_str = code.map(|c| c.as_str().to_string());
        let chapter = code.map(|c| c.chapter().to_string());

        let rows = stmt
            .query_map(params![code_str, category, chapter], |row| {
                let kind: String = row.get(0)?;
                let value: Option<String> = row.get(1)?;
                let threshold: f64 = row.get(2)?;
                let rule_type: String = row.get(3)?;
                let docs: String = row.get(4)?;
                Ok((kind, value, threshold, rule_type, docs))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut rules = Vec::with_capacity(rows.len());
        for (kind, value, threshold_percent, rule_type, docs) in rows {
            let scope = match (kind.as_str(), value) {
                ("code", Some(v)) => RuleScope::Code(
                    ClassificationCode::parse(&v)
                        .map_err(|e| StoreError::InvalidData(e.to_string()))?,
                ),
                ("category", Some(v)) => RuleScope::Category(v),
                ("chapter", Some(v)) => RuleScope::Chapter(v),
                ("default", _) => RuleScope::Default,
                (other, _) => {
                    return Err(StoreError::InvalidData(format!(
                        "Rule scope '{}' is missing its value",
                        other
                    )))
                }
            };
            let rule_type = RuleType::parse(&rule_type)
                .ok_or_else(|| StoreError::InvalidData(format!("Unknown rule type: {}", rule_type)))?;
            rules.push(QualificationRule {
                scope,
                threshold_percent,
                rule_type,
                required_documentation: serde_json::from_str(&docs)?,
            });
        }

        // Most specific first; longer code prefixes beat shorter ones
        rules.sort_by(|a, b| {
            a.scope.specificity().cmp(&b.scope.specificity()).then_with(|| {
                let len = |s: &RuleScope| s.value().map(str::len).unwrap_or(0);
                len(&b.scope).cmp(&len(&a.scope))
            })
        });

        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, description: &str, base: Rate, pref: Rate) -> TariffRecord {
        TariffRecord::new(ClassificationCode::parse(code).unwrap(), description)
            .with_rates(base, pref)
    }

    #[test]
    fn test_unknown_rates_round_trip_as_null() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        store
            .import_records(&[record(
                "85442900",
                "Insulated electric conductors",
                Rate::Unknown,
                Rate::Known(0.0),
            )])
            .unwrap();

        let code = ClassificationCode::parse("8544.29.00").unwrap();
        let loaded = store.get_record(&code).unwrap().unwrap();
        assert_eq!(loaded.base_rate, Rate::Unknown);
        assert_eq!(loaded.preferential_rate, Rate::Known(0.0));
    }

    #[test]
    fn test_average_ignores_null_rates() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        store
            .import_records(&[
                record("85441100", "Copper winding wire", Rate::Known(2.0), Rate::Known(0.0)),
                record("85442000", "Coaxial cable", Rate::Unknown, Rate::Unknown),
                record("85444200", "Electric conductors fitted with connectors", Rate::Known(4.0), Rate::Known(0.0)),
            ])
            .unwrap();

        let avg = store.average_rates(&RecordQuery::prefix("85")).unwrap();
        assert_eq!(avg.base_rate, Rate::Known(3.0));
        assert_eq!(avg.preferential_rate, Rate::Known(0.0));
        assert_eq!(avg.sample_size, 3);
    }

    #[test]
    fn test_average_of_nothing_is_unknown() {
        let store = SqliteStore::new(":memory:").unwrap();
        let avg = store.average_rates(&RecordQuery::prefix("99")).unwrap();
        assert_eq!(avg.base_rate, Rate::Unknown);
        assert_eq!(avg.sample_size, 0);
    }

    #[test]
    fn test_rules_most_specific_first() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let rule = |scope, threshold| QualificationRule {
            scope,
            threshold_percent: threshold,
            rule_type: RuleType::RegionalValueContent,
            required_documentation: vec!["Certificate of origin".into()],
        };
        store
            .import_rules(&[
                rule(RuleScope::Default, 60.0),
                rule(RuleScope::Chapter("85".into()), 55.0),
                rule(RuleScope::Code(ClassificationCode::parse("8544").unwrap()), 50.0),
                rule(RuleScope::Code(ClassificationCode::parse("854429").unwrap()), 45.0),
                rule(RuleScope::Category("automotive".into()), 75.0),
            ])
            .unwrap();

        let code = ClassificationCode::parse("85442900").unwrap();
        let rules = store.rules_for(Some(&code), Some("Automotive")).unwrap();
        let thresholds: Vec<f64> = rules.iter().map(|r| r.threshold_percent).collect();
        assert_eq!(thresholds, vec![45.0, 50.0, 75.0, 55.0, 60.0]);

        let fallback_only = store.rules_for(None, None).unwrap();
        assert_eq!(fallback_only.len(), 1);
        assert_eq!(fallback_only[0].scope, RuleScope::Default);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let result = store.import_rules(&[QualificationRule {
            scope: RuleScope::Default,
            threshold_percent: 160.0,
            rule_type: RuleType::RegionalValueContent,
            required_documentation: vec![],
        }]);
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }
}
