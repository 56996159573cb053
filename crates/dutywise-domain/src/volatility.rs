//! Stability classification and rate-change alerts

use crate::{normalize_country, ClassificationCode, PolicyInstrument, Rate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a rate can move on short notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityClass {
    /// Fixed by a ratified agreement; changes only through formal renegotiation
    TreatyLocked,
    /// Set by unilateral policy action; can change by executive order
    Volatile,
}

impl StabilityClass {
    /// Get the class as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            StabilityClass::TreatyLocked => "treaty_locked",
            StabilityClass::Volatile => "volatile",
        }
    }
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational
    Low,
    /// Worth reviewing
    Medium,
    /// Act now
    High,
}

impl Severity {
    /// Get the severity as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// What changed between two observations of a tracked rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// The rate went up
    RateIncrease,
    /// The rate went down
    RateDecrease,
    /// An overlay started applying
    OverlayActivated,
    /// An overlay stopped applying
    OverlayLifted,
    /// A previously known rate is no longer known
    RateBecameUnknown,
    /// A previously unknown rate now has a confirmed value
    RateConfirmed,
}

impl AlertKind {
    /// Get the kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::RateIncrease => "rate_increase",
            AlertKind::RateDecrease => "rate_decrease",
            AlertKind::OverlayActivated => "overlay_activated",
            AlertKind::OverlayLifted => "overlay_lifted",
            AlertKind::RateBecameUnknown => "rate_became_unknown",
            AlertKind::RateConfirmed => "rate_confirmed",
        }
    }
}

/// A point-in-time reading of one tracked rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    /// Tariff line
    pub code: ClassificationCode,
    /// Overlay being tracked; `None` tracks the base rate
    pub instrument: Option<PolicyInstrument>,
    /// Value at observation time (unknown also covers "overlay inactive")
    pub rate: Rate,
    /// Whether the overlay was active (always true for the base rate)
    pub active: bool,
    /// When the reading was taken
    pub observed_on: NaiveDate,
}

/// A notification that a tracked volatile rate changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityAlert {
    /// Unique alert identifier (UUIDv7)
    pub id: String,
    /// What changed
    #[serde(rename = "type")]
    pub kind: AlertKind,
    /// How urgent it is
    pub severity: Severity,
    /// Human-readable message; every number in it comes from the observations
    pub message: String,
    /// Recommended response
    pub suggested_action: String,
    /// Earlier reading
    pub previous: RateObservation,
    /// Reading taken from the store when the alert was generated
    pub current: RateObservation,
}

/// Stability annotation for a savings estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityAnnotation {
    /// Stability of the savings figure as a whole
    pub stability_class: StabilityClass,
    /// Stability of the base leg
    pub base_stability: StabilityClass,
    /// Stability of the preferential leg
    pub preferential_stability: StabilityClass,
    /// Date the underlying rates took effect or were verified
    pub effective_date: Option<NaiveDate>,
    /// Share of the base rate exposed to volatile overlays, in [0, 1]
    pub risk_score: f64,
    /// Alerts raised for tracked rates
    pub alerts: Vec<VolatilityAlert>,
}

/// A trade route: origin → optional processing territory → destination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    /// Where the goods (or their main inputs) originate, ISO-2
    pub origin: String,
    /// Where they are processed before import, ISO-2
    pub processing: Option<String>,
    /// Where they are imported, ISO-2
    pub destination: String,
}

impl Route {
    /// Create a route, normalizing every country
    pub fn new(origin: &str, processing: Option<&str>, destination: &str) -> Self {
        Self {
            origin: normalize_country(origin),
            processing: processing.map(normalize_country),
            destination: normalize_country(destination),
        }
    }

    /// Parse `"CN>MX>US"` or `"MX>US"` (also accepts `->` and `→`)
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.replace("->", ">").replace('→', ">");
        let parts: Vec<&str> = normalized
            .split('>')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        match parts.as_slice() {
            [origin, destination] => Some(Self::new(origin, None, destination)),
            [origin, processing, destination] => {
                Some(Self::new(origin, Some(processing), destination))
            }
            _ => None,
        }
    }

    /// The territory whose processing determines preferential treatment
    pub fn preferential_leg_origin(&self) -> &str {
        self.processing.as_deref().unwrap_or(&self.origin)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.processing {
            Some(p) => write!(f, "{}>{}>{}", self.origin, p, self.destination),
            None => write!(f, "{}>{}", self.origin, self.destination),
        }
    }
}
