//! Tariff record module - one row of the reference table

use crate::{ClassificationCode, Rate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A unilaterally imposed policy instrument layered on top of the base rate
///
/// These can change by executive action on short notice, which is what makes
/// the base leg of a savings estimate volatile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyInstrument {
    /// Section 301 trade-practice tariffs
    #[serde(rename = "section_301", alias = "section301")]
    Section301,
    /// Antidumping duties
    Antidumping,
    /// Countervailing (anti-subsidy) duties
    Countervailing,
    /// Safeguard measures
    Safeguard,
    /// Reciprocal tariffs
    Reciprocal,
    /// Any other unilateral overlay
    Other,
}

impl PolicyInstrument {
    /// Get the instrument name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyInstrument::Section301 => "section_301",
            PolicyInstrument::Antidumping => "antidumping",
            PolicyInstrument::Countervailing => "countervailing",
            PolicyInstrument::Safeguard => "safeguard",
            PolicyInstrument::Reciprocal => "reciprocal",
            PolicyInstrument::Other => "other",
        }
    }

    /// Parse an instrument from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "section_301" | "section301" => Some(PolicyInstrument::Section301),
            "antidumping" | "anti_dumping" => Some(PolicyInstrument::Antidumping),
            "countervailing" => Some(PolicyInstrument::Countervailing),
            "safeguard" => Some(PolicyInstrument::Safeguard),
            "reciprocal" => Some(PolicyInstrument::Reciprocal),
            "other" => Some(PolicyInstrument::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for PolicyInstrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One independently toggleable policy overlay on a tariff line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surcharge {
    /// Which instrument imposes it
    pub instrument: PolicyInstrument,
    /// Additional duty in percent
    pub rate: Rate,
    /// Whether the overlay currently applies
    #[serde(default = "default_active")]
    pub active: bool,
    /// When the current value took effect
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
}

fn default_active() -> bool {
    true
}

/// A reference-table row: classification code plus rate fields
///
/// Every rate field is either confirmed or [`Rate::Unknown`]; nothing here is
/// ever defaulted to zero as a stand-in for missing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffRecord {
    /// Normalized classification code
    pub code: ClassificationCode,

    /// Official description of the tariff line
    pub description: String,

    /// Product category used for qualification rule lookup
    #[serde(default)]
    pub category: Option<String>,

    /// Standard (MFN) duty rate
    #[serde(default)]
    pub base_rate: Rate,

    /// Treaty (USMCA) rate for qualifying goods
    #[serde(default)]
    pub preferential_rate: Rate,

    /// Policy overlays
    #[serde(default)]
    pub surcharges: Vec<Surcharge>,

    /// Publisher of the rate data
    #[serde(default)]
    pub source_name: Option<String>,

    /// When the rate data was last verified
    #[serde(default)]
    pub verified_date: Option<NaiveDate>,
}

impl TariffRecord {
    /// Create a record with unknown rates
    pub fn new(code: ClassificationCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            category: None,
            base_rate: Rate::Unknown,
            preferential_rate: Rate::Unknown,
            surcharges: Vec::new(),
            source_name: None,
            verified_date: None,
        }
    }

    /// Builder-style setter for the two treaty-bound rates
    pub fn with_rates(mut self, base_rate: Rate, preferential_rate: Rate) -> Self {
        self.base_rate = base_rate;
        self.preferential_rate = preferential_rate;
        self
    }

    /// Overlays that currently apply
    pub fn active_surcharges(&self) -> impl Iterator<Item = &Surcharge> {
        self.surcharges.iter().filter(|s| s.active)
    }

    /// Sum of active overlay rates (known zero when there are none)
    pub fn policy_overlay_rate(&self) -> Rate {
        self.active_surcharges()
            .fold(Rate::Known(0.0), |acc, s| acc.plus(s.rate))
    }

    /// Base rate plus every active overlay
    pub fn effective_base_rate(&self) -> Rate {
        self.base_rate.plus(self.policy_overlay_rate())
    }

    /// Whether any active overlay contributes to the base leg
    pub fn has_active_overlay(&self) -> bool {
        self.active_surcharges().next().is_some()
    }

    /// Whether a non-zero base rate is recorded
    pub fn has_recorded_base_rate(&self) -> bool {
        self.base_rate.is_nonzero()
    }

    /// Whether the description says more than a placeholder would
    pub fn has_meaningful_description(&self) -> bool {
        let trimmed = self.description.trim();
        trimmed.len() >= 10 && ClassificationCode::normalize(trimmed) != trimmed
    }
}
