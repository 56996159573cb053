//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use dutywise_domain::{
    ClassificationCandidate, FallbackResult, Issue, QualificationResult, Rate, RateObservation,
    VolatilityAlert,
};
use dutywise_pipeline::Assessment;
use dutywise_resolver::Resolution;
use dutywise_volatility::SavingsEstimate;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The active format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format classifier candidates.
    pub fn format_candidates(&self, candidates: &[ClassificationCandidate]) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(&candidates),
            OutputFormat::Quiet => Ok(candidates
                .iter()
                .filter_map(|c| c.code.as_ref().map(|code| code.dotted()))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if candidates.is_empty() {
                    return Ok(self.colorize("No candidates found.", "yellow"));
                }
                let rows = candidates.iter().map(|c| {
                    vec![
                        c.code.as_ref().map(|code| code.dotted()).unwrap_or_else(|| "-".into()),
                        c.description.clone(),
                        format!("{:.0}", c.confidence),
                        c.matched_keywords.join(", "),
                    ]
                });
                Ok(table(["Code", "Description", "Confidence", "Keywords"], rows))
            }
        }
    }

    /// Format a code resolution.
    pub fn format_resolution(&self, resolution: &Resolution) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(resolution),
            OutputFormat::Quiet => Ok(resolution
                .code
                .as_ref()
                .map(|c| format!("{}\t{}\t{}", c.dotted(), resolution.rates.base_rate, resolution.rates.preferential_rate))
                .unwrap_or_default()),
            OutputFormat::Table => {
                let mut out = String::new();
                let status = if resolution.verified {
                    self.success(&format!("Verified {}", resolution.normalized))
                } else {
                    self.warning(&format!("Could not verify '{}'", resolution.input))
                };
                out.push_str(&status);
                out.push('\n');

                let mut fields = vec![
                    ("Code", resolution.code.as_ref().map(|c| c.dotted()).unwrap_or_else(|| "-".into())),
                    ("Description", resolution.description.clone().unwrap_or_else(|| "-".into())),
                    ("Trust", format!("{:.2}", resolution.trust_score)),
                    ("Base rate", resolution.rates.base_rate.to_string()),
                    ("Preferential rate", resolution.rates.preferential_rate.to_string()),
                    ("Savings", resolution.rates.savings.to_string()),
                ];
                if let Some(record) = &resolution.record {
                    fields.push(("Effective base rate", record.effective_base_rate().to_string()));
                }
                out.push_str(&key_values(fields));

                if !resolution.alternatives.is_empty() {
                    out.push_str("\n\nAlternatives:\n");
                    let rows = resolution.alternatives.iter().map(|a| {
                        vec![a.code.dotted(), a.description.clone(), format!("{:.2}", a.confidence)]
                    });
                    out.push_str(&table(["Code", "Description", "Confidence"], rows));
                }
                if let Some(recommendation) = &resolution.recommendation {
                    out.push('\n');
                    out.push_str(&self.info(recommendation));
                }
                out.push_str(&self.issues(&resolution.issues));
                Ok(out)
            }
        }
    }

    /// Format a fallback estimate with its disclosure and options.
    pub fn format_fallback(&self, result: &FallbackResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(result),
            OutputFormat::Quiet => Ok(format!(
                "{}\t{}\t{}",
                result.method.as_str(),
                result.rates.base_rate,
                result.rates.preferential_rate
            )),
            OutputFormat::Table => {
                let mut fields = vec![
                    ("Method", result.method.as_str().to_string()),
                    ("Confidence", result.confidence.as_str().to_string()),
                    ("Base rate", result.rates.base_rate.to_string()),
                    ("Preferential rate", result.rates.preferential_rate.to_string()),
                    ("Savings", result.rates.savings.to_string()),
                    ("Sample size", result.sample_size.to_string()),
                ];
                if let Some(best) = &result.best_match {
                    fields.push(("Closest record", format!("{} {}", best.code.dotted(), best.description)));
                }
                let mut out = key_values(fields);
                out.push('\n');
                out.push_str(&self.warning(&result.disclosure_message));
                if !result.user_options.is_empty() {
                    out.push_str("\n\nOptions:");
                    for (i, option) in result.user_options.iter().enumerate() {
                        out.push_str(&format!("\n  {}. {} [{}]", i + 1, option.label, option.confidence));
                    }
                }
                Ok(out)
            }
        }
    }

    /// Format a qualification verdict.
    pub fn format_qualification(&self, result: &QualificationResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(result),
            OutputFormat::Quiet => Ok(format!(
                "{}\t{:.2}\t{:.2}",
                result.qualification_level.as_str(),
                result.regional_value_content,
                result.required_threshold
            )),
            OutputFormat::Table => {
                let mut out = if result.qualifies {
                    self.success(&format!(
                        "Qualifies: {:.2}% regional content against {:.2}% required",
                        result.regional_value_content, result.required_threshold
                    ))
                } else {
                    self.error(&format!(
                        "Does not qualify: {:.2}% regional content against {:.2}% required",
                        result.regional_value_content, result.required_threshold
                    ))
                };
                out.push('\n');

                let mut fields = vec![
                    ("Level", result.qualification_level.as_str().to_string()),
                    ("Rule", format!("{} ({})", result.rule_scope, result.rule_type.as_str())),
                ];
                if let Some(shortfall) = result.shortfall {
                    fields.push(("Shortfall", format!("{:.2} points", shortfall)));
                }
                out.push_str(&key_values(fields));
                out.push('\n');

                let rows = result.components.iter().map(|c| {
                    vec![
                        c.country.clone(),
                        format!("{:.2}%", c.share_percent),
                        if c.regional { "yes".into() } else { "no".into() },
                    ]
                });
                out.push_str(&table(["Country", "Share", "Regional"], rows));

                if !result.required_documentation.is_empty() {
                    out.push_str("\n\nDocumentation:");
                    for doc in &result.required_documentation {
                        out.push_str(&format!("\n  - {}", doc));
                    }
                }
                Ok(out)
            }
        }
    }

    /// Format a savings estimate with its stability annotation.
    pub fn format_savings(&self, estimate: &SavingsEstimate) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(estimate),
            OutputFormat::Quiet => Ok(format!(
                "{}\t{}\t{}",
                estimate.savings_percent,
                estimate.stability_adjusted_savings_percent,
                estimate.annotation.stability_class.as_str()
            )),
            OutputFormat::Table => {
                let annotation = &estimate.annotation;
                let mut fields = vec![
                    ("Route", estimate.route.to_string()),
                    ("Effective base rate", estimate.effective_base_rate.to_string()),
                    ("Preferential rate", estimate.preferential_rate.to_string()),
                    ("Savings", estimate.savings_percent.to_string()),
                    (
                        "Stability-adjusted",
                        format!("{} (x{:.2})", estimate.stability_adjusted_savings_percent, estimate.stability_multiplier),
                    ),
                    ("Base leg", annotation.base_stability.as_str().to_string()),
                    ("Preferential leg", annotation.preferential_stability.as_str().to_string()),
                    ("Overlay exposure", format!("{:.0}%", annotation.risk_score * 100.0)),
                ];
                if let Some(date) = annotation.effective_date {
                    fields.push(("Effective date", date.to_string()));
                }
                if let Some(money) = estimate.savings {
                    fields.push(("Annual savings", format!("{:.2}", money.annual)));
                    fields.push(("Monthly savings", format!("{:.2}", money.monthly)));
                }
                let mut out = key_values(fields);
                let class = annotation.stability_class.as_str();
                out.push('\n');
                out.push_str(&match annotation.stability_class {
                    dutywise_domain::StabilityClass::TreatyLocked => self.success(&format!("Savings are {}", class)),
                    dutywise_domain::StabilityClass::Volatile => self.warning(&format!("Savings are {}", class)),
                });
                if !annotation.alerts.is_empty() {
                    out.push_str("\n\n");
                    out.push_str(&self.format_alerts(&annotation.alerts)?);
                }
                Ok(out)
            }
        }
    }

    /// Format a full pipeline assessment.
    pub fn format_assessment(&self, assessment: &Assessment) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(assessment),
            OutputFormat::Quiet => {
                let code = assessment
                    .resolution
                    .as_ref()
                    .and_then(|r| r.code.as_ref())
                    .map(|c| c.dotted())
                    .unwrap_or_else(|| "-".into());
                Ok(format!(
                    "{}\t{}\t{}\t{}",
                    code, assessment.rates.base_rate, assessment.rates.preferential_rate, assessment.rates.savings
                ))
            }
            OutputFormat::Table => {
                let mut sections = Vec::new();
                if !assessment.candidates.is_empty() {
                    sections.push(format!("Candidates:\n{}", self.format_candidates(&assessment.candidates)?));
                }
                if let Some(resolution) = &assessment.resolution {
                    // Issues are listed once at the end
                    let mut shown = Resolution { issues: Vec::new(), ..resolution.clone() };
                    shown.alternatives.truncate(3);
                    sections.push(format!("Resolution:\n{}", self.format_resolution(&shown)?));
                }
                match &assessment.fallback {
                    Some(fallback) => sections.push(format!("Estimate:\n{}", self.format_fallback(fallback)?)),
                    None => sections.push(key_values(vec![
                        ("Rates from", format!("{:?}", assessment.rate_source).to_lowercase()),
                        ("Base rate", assessment.rates.base_rate.to_string()),
                        ("Preferential rate", assessment.rates.preferential_rate.to_string()),
                    ])),
                }
                if let Some(qualification) = &assessment.qualification {
                    sections.push(format!("Qualification:\n{}", self.format_qualification(qualification)?));
                }
                if let Some(savings) = &assessment.savings {
                    sections.push(format!("Savings:\n{}", self.format_savings(savings)?));
                }
                let mut out = sections.join("\n\n");
                out.push_str(&self.issues(&assessment.issues));
                Ok(out)
            }
        }
    }

    /// Format rate snapshots.
    pub fn format_observations(&self, observations: &[RateObservation]) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(&observations),
            OutputFormat::Quiet => Ok(observations
                .iter()
                .map(|o| format!("{}\t{}", tracked(o), o.rate))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let rows = observations.iter().map(|o| {
                    vec![
                        o.code.dotted(),
                        tracked(o),
                        o.rate.to_string(),
                        if o.active { "yes".into() } else { "no".into() },
                        o.observed_on.to_string(),
                    ]
                });
                Ok(table(["Code", "Tracked", "Rate", "Active", "Observed"], rows))
            }
        }
    }

    /// Format rate-change alerts.
    pub fn format_alerts(&self, alerts: &[VolatilityAlert]) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(&alerts),
            OutputFormat::Quiet => Ok(alerts.iter().map(|a| a.id.clone()).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                if alerts.is_empty() {
                    return Ok(self.success("No rate changes since the last snapshot."));
                }
                let rows = alerts.iter().map(|a| {
                    vec![
                        a.severity.as_str().to_string(),
                        a.kind.as_str().to_string(),
                        rate_change(a.previous.rate, a.current.rate),
                        a.message.clone(),
                        a.suggested_action.clone(),
                    ]
                });
                Ok(table(["Severity", "Change", "Rates", "Message", "Action"], rows))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Format issues with their next steps; empty when there are none.
    fn issues(&self, issues: &[Issue]) -> String {
        let mut out = String::new();
        for issue in issues {
            out.push('\n');
            out.push_str(&self.warning(&format!(
                "[{}] {} ({} confidence)",
                issue.kind.as_str(),
                issue.message,
                issue.confidence
            )));
            for step in &issue.next_steps {
                out.push_str(&format!("\n    → {}", step));
            }
        }
        out
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn table<const N: usize, I>(header: [&str; N], rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn key_values(fields: Vec<(&str, String)>) -> String {
    let mut builder = Builder::default();
    for (key, value) in fields {
        builder.push_record([key.to_string(), value]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn tracked(observation: &RateObservation) -> String {
    match observation.instrument {
        Some(instrument) => instrument.to_string(),
        None => "base".to_string(),
    }
}

fn rate_change(previous: Rate, current: Rate) -> String {
    format!("{} → {}", previous, current)
}
