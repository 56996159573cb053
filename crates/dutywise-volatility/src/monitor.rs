//! Rate-change monitoring
//!
//! A [`RateObservation`] is a snapshot of one tracked rate. Checking a
//! snapshot re-reads the current value from the reference store, so every
//! number quoted in an alert comes from the store at generation time.

use crate::{VolatilityConfig, VolatilityError};
use chrono::NaiveDate;
use dutywise_domain::traits::{AlertSink, ReferenceStore};
use dutywise_domain::{
    AlertKind, ClassificationCode, PolicyInstrument, Rate, RateObservation, Severity,
    TariffRecord, VolatilityAlert,
};
use tracing::{debug, info, warn};

/// Reads tracked rates from a store and raises alerts when they move
pub struct RateMonitor<'s, S> {
    store: &'s S,
    config: VolatilityConfig,
}

impl<'s, S> RateMonitor<'s, S>
where
    S: ReferenceStore,
    S::Error: std::fmt::Display,
{
    /// Create a monitor over a store
    pub fn new(store: &'s S, config: VolatilityConfig) -> Result<Self, VolatilityError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    fn record(&self, code: &ClassificationCode) -> Result<TariffRecord, VolatilityError> {
        self.store
            .get_record(code)
            .map_err(|e| VolatilityError::Store(e.to_string()))?
            .ok_or_else(|| VolatilityError::NotFound(code.dotted()))
    }

    /// Snapshot one tracked rate; `None` tracks the base rate
    pub fn observe(
        &self,
        code: &ClassificationCode,
        instrument: Option<PolicyInstrument>,
        observed_on: NaiveDate,
    ) -> Result<RateObservation, VolatilityError> {
        let record = self.record(code)?;
        Ok(observation(&record, instrument, observed_on))
    }

    /// Snapshot the base rate and every overlay recorded for a code
    pub fn observe_all(
        &self,
        code: &ClassificationCode,
        observed_on: NaiveDate,
    ) -> Result<Vec<RateObservation>, VolatilityError> {
        let record = self.record(code)?;
        let mut observations = vec![observation(&record, None, observed_on)];
        observations.extend(
            record
                .surcharges
                .iter()
                .map(|s| observation(&record, Some(s.instrument), observed_on)),
        );
        debug!("Observed {} rate(s) for {}", observations.len(), code.dotted());
        Ok(observations)
    }

    /// Compare a snapshot against the store's current value
    pub fn check(
        &self,
        previous: &RateObservation,
        observed_on: NaiveDate,
    ) -> Result<Option<VolatilityAlert>, VolatilityError> {
        let current = self.observe(&previous.code, previous.instrument, observed_on)?;
        Ok(compare(previous, current, &self.config))
    }

    /// Check every snapshot and deliver the resulting alerts
    ///
    /// Delivery failures are logged and do not stop the check.
    pub fn check_and_notify<A>(
        &self,
        previous: &[RateObservation],
        observed_on: NaiveDate,
        sink: &mut A,
    ) -> Result<Vec<VolatilityAlert>, VolatilityError>
    where
        A: AlertSink,
        A::Error: std::fmt::Display,
    {
        let mut alerts = Vec::new();
        for snapshot in previous {
            if let Some(alert) = self.check(snapshot, observed_on)? {
                info!(
                    "Rate alert {} for {} ({})",
                    alert.kind.as_str(),
                    alert.current.code.dotted(),
                    alert.severity.as_str()
                );
                if let Err(e) = sink.send(&alert) {
                    warn!("Failed to deliver alert {}: {}", alert.id, e);
                }
                alerts.push(alert);
            }
        }
        Ok(alerts)
    }
}

fn observation(
    record: &TariffRecord,
    instrument: Option<PolicyInstrument>,
    observed_on: NaiveDate,
) -> RateObservation {
    let (rate, active) = match instrument {
        None => (record.base_rate, true),
        Some(instrument) => record
            .surcharges
            .iter()
            .find(|s| s.instrument == instrument)
            .map(|s| (s.rate, s.active))
            .unwrap_or((Rate::Unknown, false)),
    };
    RateObservation {
        code: record.code.clone(),
        instrument,
        rate,
        active,
        observed_on,
    }
}

fn subject(observation: &RateObservation) -> String {
    match observation.instrument {
        Some(instrument) => format!("{} overlay on {}", instrument, observation.code.dotted()),
        None => format!("base rate of {}", observation.code.dotted()),
    }
}

/// Decide whether two observations of the same rate warrant an alert
pub fn compare(
    previous: &RateObservation,
    current: RateObservation,
    config: &VolatilityConfig,
) -> Option<VolatilityAlert> {
    let what = subject(&current);

    let (kind, severity, message, suggested_action) = match (previous.active, current.active) {
        (false, true) => {
            let severity = match current.rate {
                Rate::Known(v) => config.severity_for(v),
                Rate::Unknown => Severity::High,
            };
            (
                AlertKind::OverlayActivated,
                severity,
                format!("The {} is now in force at {}.", what, current.rate),
                "Re-run the assessment and review sourcing for this code; the overlay can change again without notice.".to_string(),
            )
        }
        (true, false) => (
            AlertKind::OverlayLifted,
            Severity::Low,
            format!("The {} (previously {}) no longer applies.", what, previous.rate),
            "Re-run the assessment to see the updated savings.".to_string(),
        ),
        (false, false) => return None,
        (true, true) => match (previous.rate, current.rate) {
            (Rate::Known(before), Rate::Known(after)) if (after - before).abs() > 1e-9 => {
                let delta = after - before;
                let kind = if delta > 0.0 {
                    AlertKind::RateIncrease
                } else {
                    AlertKind::RateDecrease
                };
                (
                    kind,
                    config.severity_for(delta),
                    format!(
                        "The {} moved from {} to {} ({:+.2} points).",
                        what, previous.rate, current.rate, delta
                    ),
                    if delta > 0.0 {
                        "Re-run the assessment and review whether qualifying sourcing would offset the increase.".to_string()
                    } else {
                        "Re-run the assessment to see the updated savings.".to_string()
                    },
                )
            }
            (Rate::Known(_), Rate::Unknown) => (
                AlertKind::RateBecameUnknown,
                Severity::High,
                format!(
                    "The {} was {} and is no longer recorded in the reference data.",
                    what, previous.rate
                ),
                "Verify the rate with an official source before relying on any savings figure.".to_string(),
            ),
            (Rate::Unknown, Rate::Known(_)) => (
                AlertKind::RateConfirmed,
                Severity::Low,
                format!("The {} is now recorded at {}.", what, current.rate),
                "Re-run the assessment now that a confirmed rate exists.".to_string(),
            ),
            _ => return None,
        },
    };

    Some(VolatilityAlert {
        id: uuid::Uuid::now_v7().to_string(),
        kind,
        severity,
        message,
        suggested_action,
        previous: previous.clone(),
        current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryAlertSink;
    use dutywise_domain::traits::RecordQuery;
    use dutywise_domain::Surcharge;
    use std::cell::RefCell;

    struct MutableStore(RefCell<Vec<TariffRecord>>);

    impl ReferenceStore for MutableStore {
        type Error = String;

        fn get_record(&self, code: &ClassificationCode) -> Result<Option<TariffRecord>, String> {
            Ok(self.0.borrow().iter().find(|r| &r.code == code).cloned())
        }

        fn query_records(&self, query: &RecordQuery) -> Result<Vec<TariffRecord>, String> {
            Ok(self.0.borrow().iter().filter(|r| query.matches(r)).cloned().collect())
        }
    }

    struct RefusingSink;

    impl AlertSink for RefusingSink {
        type Error = String;

        fn send(&mut self, _alert: &VolatilityAlert) -> Result<(), String> {
            Err("webhook returned 503".to_string())
        }
    }

    fn code() -> ClassificationCode {
        ClassificationCode::parse("8544.42.90").unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn store() -> MutableStore {
        let mut record = TariffRecord::new(code(), "Electric conductors fitted with connectors")
            .with_rates(Rate::Known(2.6), Rate::Known(0.0));
        record.surcharges.push(Surcharge {
            instrument: PolicyInstrument::Section301,
            rate: Rate::Known(7.5),
            active: true,
            effective_date: None,
        });
        record.surcharges.push(Surcharge {
            instrument: PolicyInstrument::Safeguard,
            rate: Rate::Known(10.0),
            active: false,
            effective_date: None,
        });
        MutableStore(RefCell::new(vec![record]))
    }

    fn set_overlay(store: &MutableStore, instrument: PolicyInstrument, rate: Rate, active: bool) {
        let mut records = store.0.borrow_mut();
        if let Some(s) = records[0].surcharges.iter_mut().find(|s| s.instrument == instrument) {
            s.rate = rate;
            s.active = active;
        }
    }

    #[test]
    fn test_no_change_no_alert() {
        let store = store();
        let monitor = RateMonitor::new(&store, VolatilityConfig::default()).unwrap();
        let snapshot = monitor.observe(&code(), Some(PolicyInstrument::Section301), day(1)).unwrap();
        assert!(monitor.check(&snapshot, day(2)).unwrap().is_none());
    }

    #[test]
    fn test_increase_quotes_store_values() {
        let store = store();
        let monitor = RateMonitor::new(&store, VolatilityConfig::default()).unwrap();
        let snapshot = monitor.observe(&code(), Some(PolicyInstrument::Section301), day(1)).unwrap();

        set_overlay(&store, PolicyInstrument::Section301, Rate::Known(25.0), true);
        let alert = monitor.check(&snapshot, day(2)).unwrap().unwrap();

        assert_eq!(alert.kind, AlertKind::RateIncrease);
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.current.rate, Rate::Known(25.0));
        assert!(alert.message.contains("7.50%"));
        assert!(alert.message.contains("25.00%"));
        assert!(!alert.suggested_action.is_empty());
        assert!(uuid::Uuid::parse_str(&alert.id).is_ok());
    }

    #[test]
    fn test_overlay_activation_and_lift() {
        let store = store();
        let monitor = RateMonitor::new(&store, VolatilityConfig::default()).unwrap();
        let snapshots = monitor.observe_all(&code(), day(1)).unwrap();
        assert_eq!(snapshots.len(), 3);

        set_overlay(&store, PolicyInstrument::Safeguard, Rate::Known(10.0), true);
        set_overlay(&store, PolicyInstrument::Section301, Rate::Known(7.5), false);

        let mut sink = MemoryAlertSink::default();
        let alerts = monitor.check_and_notify(&snapshots, day(2), &mut sink).unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(sink.alerts().len(), 2);

        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert!(kinds.contains(&AlertKind::OverlayActivated));
        assert!(kinds.contains(&AlertKind::OverlayLifted));
        let activated = alerts.iter().find(|a| a.kind == AlertKind::OverlayActivated).unwrap();
        assert_eq!(activated.severity, Severity::High);
    }

    #[test]
    fn test_base_rate_becoming_unknown_is_high() {
        let store = store();
        let monitor = RateMonitor::new(&store, VolatilityConfig::default()).unwrap();
        let snapshot = monitor.observe(&code(), None, day(1)).unwrap();
        store.0.borrow_mut()[0].base_rate = Rate::Unknown;

        let alert = monitor.check(&snapshot, day(2)).unwrap().unwrap();
        assert_eq!(alert.kind, AlertKind::RateBecameUnknown);
        assert_eq!(alert.severity, Severity::High);
    }

    #[test]
    fn test_first_confirmed_rate_is_not_an_increase() {
        let store = store();
        store.0.borrow_mut()[0].base_rate = Rate::Unknown;
        let monitor = RateMonitor::new(&store, VolatilityConfig::default()).unwrap();
        let snapshot = monitor.observe(&code(), None, day(1)).unwrap();
        store.0.borrow_mut()[0].base_rate = Rate::Known(12.0);

        let alert = monitor.check(&snapshot, day(2)).unwrap().unwrap();
        assert_eq!(alert.kind, AlertKind::RateConfirmed);
        assert_eq!(alert.severity, Severity::Low);
        assert_eq!(alert.current.rate, Rate::Known(12.0));
    }

    #[test]
    fn test_sink_failure_does_not_abort() {
        let store = store();
        let monitor = RateMonitor::new(&store, VolatilityConfig::default()).unwrap();
        let snapshot = monitor.observe(&code(), Some(PolicyInstrument::Section301), day(1)).unwrap();
        set_overlay(&store, PolicyInstrument::Section301, Rate::Known(8.0), true);

        let alerts = monitor
            .check_and_notify(&[snapshot], day(2), &mut RefusingSink)
            .unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Low);
    }

    #[test]
    fn test_removed_code_is_not_found() {
        let store = store();
        let monitor = RateMonitor::new(&store, VolatilityConfig::default()).unwrap();
        let snapshot = monitor.observe(&code(), None, day(1)).unwrap();
        store.0.borrow_mut().clear();
        assert!(matches!(monitor.check(&snapshot, day(2)), Err(VolatilityError::NotFound(_))));
    }
}
