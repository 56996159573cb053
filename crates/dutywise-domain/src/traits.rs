//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the resolution engines and
//! infrastructure. Implementations live in other crates.

use crate::{ClassificationCode, QualificationRule, Rate, TariffRecord, VolatilityAlert};

/// Read access to the tariff reference table
///
/// Implemented by the infrastructure layer (dutywise-store)
pub trait ReferenceStore {
    /// Error type for store operations
    type Error;

    /// Get the record for an exact code
    fn get_record(&self, code: &ClassificationCode) -> Result<Option<TariffRecord>, Self::Error>;

    /// Query records matching criteria, ordered by code
    fn query_records(&self, query: &RecordQuery) -> Result<Vec<TariffRecord>, Self::Error>;

    /// Average rates over the records matching `query`
    ///
    /// Stores with an aggregate engine should override this.
    fn average_rates(&self, query: &RecordQuery) -> Result<RateAverage, Self::Error> {
        let records = self.query_records(query)?;
        Ok(RateAverage::from_records(&records))
    }
}

/// Query criteria for retrieving tariff records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    /// Filter by code prefix (digits only)
    pub code_prefix: Option<String>,

    /// Filter by inclusive chapter range
    pub chapter_range: Option<(u8, u8)>,

    /// Keep records whose description contains any of these (case-insensitive)
    pub description_keywords: Vec<String>,

    /// Keep only records with a known, non-zero base rate
    pub require_nonzero_base: bool,

    /// Keep only records with a known base rate
    pub require_known_base: bool,

    /// Maximum results to return
    pub limit: Option<usize>,
}

impl RecordQuery {
    /// Records under a code prefix
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            code_prefix: Some(prefix.into()),
            ..Default::default()
        }
    }

    /// Records inside an inclusive chapter range
    pub fn chapters(start: u8, end: u8) -> Self {
        Self {
            chapter_range: Some((start, end)),
            ..Default::default()
        }
    }

    /// Builder-style limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a record satisfies every criterion except `limit`
    pub fn matches(&self, record: &TariffRecord) -> bool {
        if let Some(prefix) = &self.code_prefix {
            if !record.code.starts_with(prefix) {
                return false;
            }
        }
        if let Some((start, end)) = self.chapter_range {
            let chapter = record.code.chapter_number();
            if chapter < start || chapter > end {
                return false;
            }
        }
        if !self.description_keywords.is_empty() {
            let description = record.description.to_lowercase();
            if !self
                .description_keywords
                .iter()
                .any(|k| description.contains(&k.to_lowercase()))
            {
                return false;
            }
        }
        if self.require_nonzero_base && !record.base_rate.is_nonzero() {
            return false;
        }
        if self.require_known_base && !record.base_rate.is_known() {
            return false;
        }
        true
    }
}

/// Averaged rates over a set of records
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RateAverage {
    /// Mean of the known base rates
    pub base_rate: Rate,
    /// Mean of the known preferential rates (zeros included)
    pub preferential_rate: Rate,
    /// Number of records averaged
    pub sample_size: usize,
}

impl RateAverage {
    /// Average the known values; unknown fields stay unknown
    pub fn from_records(records: &[TariffRecord]) -> Self {
        Self {
            base_rate: Rate::mean(records.iter().map(|r| r.base_rate)),
            preferential_rate: Rate::mean(records.iter().map(|r| r.preferential_rate)),
            sample_size: records.len(),
        }
    }
}

/// Read access to qualification rule metadata
///
/// Implemented by the infrastructure layer (dutywise-store)
pub trait RulesStore {
    /// Error type for rule lookups
    type Error;

    /// Every rule applicable to the code or category, most specific first
    fn rules_for(
        &self,
        code: Option<&ClassificationCode>,
        category: Option<&str>,
    ) -> Result<Vec<QualificationRule>, Self::Error>;
}

/// Destination for volatility alerts
///
/// Implemented by the application layer (dutywise-volatility, dutywise-cli)
pub trait AlertSink {
    /// Error type for delivery
    type Error;

    /// Deliver one alert
    fn send(&mut self, alert: &VolatilityAlert) -> Result<(), Self::Error>;
}
