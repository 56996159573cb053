//! Watch command implementation.
//!
//! Compares the rates recorded in a snapshot file against the reference
//! database, reports what moved, then replaces the snapshot.

use crate::cli::WatchArgs;
use crate::commands::Store;
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use chrono::{Local, NaiveDate};
use dutywise_domain::{ClassificationCode, RateObservation, Rate, VolatilityAlert};
use dutywise_pipeline::{Pipeline, PipelineError};
use dutywise_volatility::TracingAlertSink;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Serialize)]
struct WatchReport<'a> {
    alerts: &'a [VolatilityAlert],
    observations: &'a [RateObservation],
    snapshot_updated: bool,
}

/// Execute the watch command.
pub fn execute_watch(
    args: WatchArgs,
    pipeline: &Pipeline<Store>,
    store: &Store,
    formatter: &Formatter,
) -> Result<()> {
    let code = ClassificationCode::parse(&args.code).map_err(|e| CliError::InvalidInput(e.to_string()))?;
    let path = match args.snapshot {
        Some(path) => path,
        None => Config::snapshot_path(code.as_str())?,
    };
    let today = Local::now().date_naive();

    let monitor = pipeline.monitor(store)?;
    let current = monitor.observe_all(&code, today).map_err(PipelineError::from)?;

    let alerts = match load_snapshot(&path, &code)? {
        Some(previous) => {
            let previous = with_new_overlays(previous, &current);
            monitor.check_and_notify(&previous, today, &mut TracingAlertSink).map_err(PipelineError::from)?
        }
        None => {
            if formatter.format() == OutputFormat::Table {
                println!("{}", formatter.info(&format!("No snapshot for {} yet; recording current rates", code.dotted())));
            }
            Vec::new()
        }
    };

    let snapshot_updated = !args.no_update;
    if snapshot_updated {
        save_snapshot(&path, &current)?;
        debug!("Snapshot for {} written to {}", code.dotted(), path.display());
    }

    match formatter.format() {
        OutputFormat::Json => {
            let report = WatchReport {
                alerts: &alerts,
                observations: &current,
                snapshot_updated,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Quiet => {
            let out = formatter.format_alerts(&alerts)?;
            if !out.is_empty() {
                println!("{}", out);
            }
        }
        OutputFormat::Table => {
            println!("{}", formatter.format_alerts(&alerts)?);
            println!("{}", formatter.format_observations(&current)?);
        }
    }

    Ok(())
}

/// Read a snapshot; `None` when the file does not exist yet.
fn load_snapshot(path: &Path, code: &ClassificationCode) -> Result<Option<Vec<RateObservation>>> {
    if !path.exists() {
        return Ok(None);
    }
    let previous: Vec<RateObservation> = serde_json::from_str(&fs::read_to_string(path)?)?;
    if let Some(other) = previous.iter().find(|o| &o.code != code) {
        return Err(CliError::InvalidInput(format!(
            "Snapshot {} tracks {}, not {}",
            path.display(),
            other.code.dotted(),
            code.dotted()
        )));
    }
    Ok(Some(previous))
}

fn save_snapshot(path: &Path, observations: &[RateObservation]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(observations)?)?;
    Ok(())
}

/// Overlays recorded since the snapshot count as previously inactive.
fn with_new_overlays(mut previous: Vec<RateObservation>, current: &[RateObservation]) -> Vec<RateObservation> {
    let taken_on = previous
        .iter()
        .map(|o| o.observed_on)
        .max()
        .unwrap_or(NaiveDate::MIN);
    let added: Vec<RateObservation> = current
        .iter()
        .filter(|c| c.instrument.is_some())
        .filter(|c| !previous.iter().any(|p| p.instrument == c.instrument))
        .map(|c| RateObservation {
            code: c.code.clone(),
            instrument: c.instrument,
            rate: Rate::Unknown,
            active: false,
            observed_on: taken_on,
        })
        .collect();
    previous.extend(added);
    previous
}

#[cfg(test)]
mod tests {
    use super::*;
    use dutywise_domain::PolicyInstrument;
    use tempfile::TempDir;

    fn observation(instrument: Option<PolicyInstrument>, rate: Rate, active: bool) -> RateObservation {
        RateObservation {
            code: ClassificationCode::parse("85444290").unwrap(),
            instrument,
            rate,
            active,
            observed_on: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        }
    }

    #[test]
    fn test_new_overlay_starts_inactive() {
        let previous = vec![observation(None, Rate::Known(2.6), true)];
        let current = vec![
            observation(None, Rate::Known(2.6), true),
            observation(Some(PolicyInstrument::Safeguard), Rate::Known(25.0), true),
        ];
        let merged = with_new_overlays(previous, &current);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].instrument, Some(PolicyInstrument::Safeguard));
        assert!(!merged[1].active);
        assert_eq!(merged[1].rate, Rate::Unknown);
    }

    #[test]
    fn test_known_overlay_is_not_duplicated() {
        let previous = vec![
            observation(None, Rate::Known(2.6), true),
            observation(Some(PolicyInstrument::Safeguard), Rate::Known(10.0), true),
        ];
        let current = previous.clone();
        assert_eq!(with_new_overlays(previous, &current).len(), 2);
    }

    #[test]
    fn test_snapshot_round_trip_and_code_check() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshots").join("85444290.json");
        let code = ClassificationCode::parse("8544.42.90").unwrap();

        assert!(load_snapshot(&path, &code).unwrap().is_none());
        save_snapshot(&path, &[observation(None, Rate::Known(2.6), true)]).unwrap();
        assert_eq!(load_snapshot(&path, &code).unwrap().unwrap().len(), 1);

        let other = ClassificationCode::parse("7318.15.20").unwrap();
        assert!(matches!(load_snapshot(&path, &other), Err(CliError::InvalidInput(_))));
    }
}
