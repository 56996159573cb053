//! Savings estimation with stability separation
//!
//! The base leg of a savings figure is volatile when any active policy overlay
//! contributes to it. The preferential leg is treaty-locked when the treaty
//! rate is known and the route runs through the agreement territory. The
//! stability premium is reported next to the headline figure, never folded
//! into it.

use crate::{VolatilityConfig, VolatilityError};
use chrono::NaiveDate;
use dutywise_domain::{
    EstimatedRates, Rate, Route, StabilityClass, TariffRecord, VolatilityAlert,
    VolatilityAnnotation,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// The rates a savings estimate is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsInput {
    /// Treaty-bound base (MFN) rate
    pub base_rate: Rate,

    /// Sum of active unilateral overlays; known zero when there are none
    pub overlay_rate: Rate,

    /// Treaty (preferential) rate
    pub preferential_rate: Rate,

    /// When the rates took effect or were last verified
    pub effective_date: Option<NaiveDate>,
}

impl SavingsInput {
    /// Rates from a reference record, overlays included
    pub fn from_record(record: &TariffRecord) -> Self {
        let overlay_date = record
            .active_surcharges()
            .filter_map(|s| s.effective_date)
            .max();
        Self {
            base_rate: record.base_rate,
            overlay_rate: record.policy_overlay_rate(),
            preferential_rate: record.preferential_rate,
            effective_date: overlay_date.or(record.verified_date),
        }
    }

    /// Rates from an estimate that carries no overlay information
    pub fn from_estimate(rates: &EstimatedRates) -> Self {
        Self {
            base_rate: rates.base_rate,
            overlay_rate: Rate::Known(0.0),
            preferential_rate: rates.preferential_rate,
            effective_date: None,
        }
    }

    /// Keep these base and preferential rates but take overlays from a record
    pub fn with_overlays_from(self, record: &TariffRecord) -> Self {
        let recorded = Self::from_record(record);
        Self {
            overlay_rate: recorded.overlay_rate,
            effective_date: recorded.effective_date,
            ..self
        }
    }

    /// Base plus overlays
    pub fn effective_base_rate(&self) -> Rate {
        self.base_rate.plus(self.overlay_rate)
    }
}

/// Annual and monthly duty savings for a given import value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoneySavings {
    /// Per year
    pub annual: f64,
    /// Per month
    pub monthly: f64,
}

impl MoneySavings {
    fn from_percent(import_value: f64, percent: Rate) -> Option<Self> {
        let percent = percent.value()?;
        let annual = import_value * percent / 100.0;
        Some(Self {
            annual,
            monthly: annual / 12.0,
        })
    }
}

/// Savings figure with its stability annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsEstimate {
    /// Route the estimate applies to
    pub route: Route,

    /// Base rate plus active overlays
    pub effective_base_rate: Rate,

    /// Treaty rate
    pub preferential_rate: Rate,

    /// `max(0, effective base − preferential)`
    pub savings_percent: Rate,

    /// Premium applied to the adjusted figure (1.0 when none applies)
    pub stability_multiplier: f64,

    /// `savings_percent × stability_multiplier`, reported separately
    pub stability_adjusted_savings_percent: Rate,

    /// Headline savings in money, when an import value was given and rates are known
    pub savings: Option<MoneySavings>,

    /// Stability-adjusted savings in money
    pub stability_adjusted_savings: Option<MoneySavings>,

    /// Stability classification of each leg
    pub annotation: VolatilityAnnotation,
}

impl SavingsEstimate {
    /// Attach alerts raised for the tracked rates
    pub fn with_alerts(mut self, alerts: Vec<VolatilityAlert>) -> Self {
        self.annotation.alerts = alerts;
        self
    }
}

/// Separates treaty-locked from volatile savings
pub struct VolatilitySeparator {
    config: VolatilityConfig,
}

impl VolatilitySeparator {
    /// Create a separator, rejecting an invalid configuration
    pub fn new(config: VolatilityConfig) -> Result<Self, VolatilityError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a separator with the default configuration
    pub fn default_config() -> Self {
        Self {
            config: VolatilityConfig::default(),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &VolatilityConfig {
        &self.config
    }

    /// Build the savings estimate for a route
    pub fn separate(&self, input: &SavingsInput, route: &Route, import_value: Option<f64>) -> SavingsEstimate {
        let effective_base_rate = input.effective_base_rate();
        let savings_percent = Rate::savings(effective_base_rate, input.preferential_rate);

        let base_stability = match input.overlay_rate {
            Rate::Known(v) if v == 0.0 => StabilityClass::TreatyLocked,
            _ => StabilityClass::Volatile,
        };
        let preferential_stability = if input.preferential_rate.is_known()
            && self.config.is_member(route.preferential_leg_origin())
            && self.config.is_member(&route.destination)
        {
            StabilityClass::TreatyLocked
        } else {
            StabilityClass::Volatile
        };
        let stability_class = if base_stability == StabilityClass::TreatyLocked
            && preferential_stability == StabilityClass::TreatyLocked
        {
            StabilityClass::TreatyLocked
        } else {
            StabilityClass::Volatile
        };

        let stability_multiplier = if preferential_stability == StabilityClass::TreatyLocked {
            self.config.stability_multiplier
        } else {
            1.0
        };
        let stability_adjusted_savings_percent = savings_percent.scaled(stability_multiplier);

        let import_value = import_value.filter(|v| v.is_finite() && *v >= 0.0);
        let savings = import_value.and_then(|v| MoneySavings::from_percent(v, savings_percent));
        let stability_adjusted_savings =
            import_value.and_then(|v| MoneySavings::from_percent(v, stability_adjusted_savings_percent));

        let estimate = SavingsEstimate {
            route: route.clone(),
            effective_base_rate,
            preferential_rate: input.preferential_rate,
            savings_percent,
            stability_multiplier,
            stability_adjusted_savings_percent,
            savings,
            stability_adjusted_savings,
            annotation: VolatilityAnnotation {
                stability_class,
                base_stability,
                preferential_stability,
                effective_date: input.effective_date,
                risk_score: risk_score(input),
                alerts: Vec::new(),
            },
        };

        info!(
            "Savings on {}: {} (x{:.2} -> {}), base {}, preferential {}",
            route,
            estimate.savings_percent,
            stability_multiplier,
            estimate.stability_adjusted_savings_percent,
            base_stability.as_str(),
            preferential_stability.as_str()
        );
        estimate
    }
}

/// Share of the effective base rate that comes from volatile overlays
///
/// An unknown overlay is treated as full exposure.
fn risk_score(input: &SavingsInput) -> f64 {
    match (input.overlay_rate, input.effective_base_rate()) {
        (Rate::Known(overlay), _) if overlay == 0.0 => 0.0,
        (Rate::Known(overlay), Rate::Known(total)) if total > 0.0 => (overlay / total).clamp(0.0, 1.0),
        _ => 1.0,
    }
}
