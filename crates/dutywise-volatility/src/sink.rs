//! Alert sinks

use dutywise_domain::traits::AlertSink;
use dutywise_domain::{Severity, VolatilityAlert};
use std::convert::Infallible;
use tracing::{info, warn};

/// Logs every alert: high severity at `warn`, the rest at `info`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    type Error = Infallible;

    fn send(&mut self, alert: &VolatilityAlert) -> Result<(), Self::Error> {
        if alert.severity == Severity::High {
            warn!(
                alert_id = %alert.id,
                kind = alert.kind.as_str(),
                "{} {}",
                alert.message,
                alert.suggested_action
            );
        } else {
            info!(
                alert_id = %alert.id,
                kind = alert.kind.as_str(),
                severity = alert.severity.as_str(),
                "{}",
                alert.message
            );
        }
        Ok(())
    }
}

/// Keeps alerts in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryAlertSink {
    alerts: Vec<VolatilityAlert>,
}

impl MemoryAlertSink {
    /// Alerts received so far
    pub fn alerts(&self) -> &[VolatilityAlert] {
        &self.alerts
    }

    /// Take the received alerts, leaving the sink empty
    pub fn drain(&mut self) -> Vec<VolatilityAlert> {
        std::mem::take(&mut self.alerts)
    }
}

impl AlertSink for MemoryAlertSink {
    type Error = Infallible;

    fn send(&mut self, alert: &VolatilityAlert) -> Result<(), Self::Error> {
        self.alerts.push(alert.clone());
        Ok(())
    }
}
