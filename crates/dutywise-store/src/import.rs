//! Reference data import file format

use crate::StoreError;
use dutywise_domain::{QualificationRule, TariffRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of a reference data file: tariff records plus qualification rules
///
/// ```json
/// {
///   "records": [{ "code": "8544.29.00", "description": "...", "base_rate": 2.6,
///                 "preferential_rate": 0.0, "surcharges": [] }],
///   "rules": [{ "scope": { "kind": "chapter", "value": "85" }, "threshold_percent": 55.0 }]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    /// Tariff lines
    #[serde(default)]
    pub records: Vec<TariffRecord>,

    /// Qualification rules
    #[serde(default)]
    pub rules: Vec<QualificationRule>,
}

impl ReferenceData {
    /// Parse from JSON text
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StoreError::InvalidData(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }
}
