//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use dutywise_domain::{ComponentOrigin, Rate, Route};
use std::path::PathBuf;

/// Dutywise CLI - Classify products, resolve duty rates and check USMCA qualification.
#[derive(Debug, Parser)]
#[command(name = "dutywise")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "DUTYWISE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reference database path
    #[arg(long, global = true, env = "DUTYWISE_DB")]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (codes and rates only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Suggest classification codes for a product description
    Classify(ClassifyArgs),

    /// Normalize and verify a classification code
    Resolve(ResolveArgs),

    /// Estimate rates when no verified code is available
    Fallback(FallbackArgs),

    /// Evaluate regional value content against the applicable rule
    Qualify(QualifyArgs),

    /// Run the full pipeline for one product
    Assess(AssessArgs),

    /// Load tariff records and qualification rules from a JSON file
    Import(ImportArgs),

    /// Snapshot a code's rates and report changes since the last snapshot
    Watch(WatchArgs),

    /// Show or create the configuration file
    Config(ConfigArgs),
}

/// Arguments for the classify command.
#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Product description
    pub description: String,

    /// Business or industry hint
    #[arg(long)]
    pub hint: Option<String>,
}

/// Trust-score context shared by the commands that resolve codes.
#[derive(Debug, Clone, Default, Args)]
pub struct ContextArgs {
    /// Flag the code as requiring manual verification
    #[arg(long)]
    pub manual_verification: bool,

    /// Supply-chain information is complete
    #[arg(long)]
    pub supply_chain_complete: bool,

    /// Where the product is manufactured
    #[arg(long)]
    pub manufacturing_location: Option<String>,
}

/// Arguments for the resolve command.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Classification code, in any common spelling (8544.42.90, 85444290, 8544-42)
    pub code: String,

    #[command(flatten)]
    pub context: ContextArgs,
}

/// Arguments for the fallback command.
#[derive(Debug, Args)]
pub struct FallbackArgs {
    /// Product description
    pub description: String,

    /// Partial code used for the chapter average
    #[arg(long)]
    pub partial_code: Option<String>,
}

/// Arguments for the qualify command.
#[derive(Debug, Args)]
pub struct QualifyArgs {
    /// Classification code used for rule lookup
    #[arg(long)]
    pub code: Option<String>,

    /// Product category used for rule lookup
    #[arg(long)]
    pub category: Option<String>,

    /// Component as COUNTRY=SHARE or COUNTRY=SHARE@RATE (repeatable)
    #[arg(long = "component", value_parser = parse_component, required = true)]
    pub components: Vec<ComponentOrigin>,

    /// Destination country
    #[arg(long)]
    pub destination: String,
}

/// Arguments for the assess command.
#[derive(Debug, Args)]
pub struct AssessArgs {
    /// Read the whole request from a JSON file instead of flags
    #[arg(long, conflicts_with_all = ["description", "code"])]
    pub request: Option<PathBuf>,

    /// Product description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Business or industry hint
    #[arg(long)]
    pub hint: Option<String>,

    /// Classification code, if already known
    #[arg(long)]
    pub code: Option<String>,

    /// Product category used for rule lookup
    #[arg(long)]
    pub category: Option<String>,

    /// Component as COUNTRY=SHARE or COUNTRY=SHARE@RATE (repeatable)
    #[arg(long = "component", value_parser = parse_component)]
    pub components: Vec<ComponentOrigin>,

    /// Destination country (defaults to the route's)
    #[arg(long)]
    pub destination: Option<String>,

    /// Trade route such as CN>MX>US
    #[arg(long, value_parser = parse_route)]
    pub route: Option<Route>,

    /// Annual import value for money savings
    #[arg(long)]
    pub import_value: Option<f64>,

    /// Snapshot file written by `watch`; rate changes since then are reported
    #[arg(long)]
    pub tracked: Option<PathBuf>,

    #[command(flatten)]
    pub context: ContextArgs,
}

/// Arguments for the import command.
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON file with `records` and `rules`
    pub file: PathBuf,
}

/// Arguments for the watch command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Classification code to track
    pub code: String,

    /// Snapshot file (defaults to ~/.dutywise/snapshots/<code>.json)
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Compare only; keep the previous snapshot
    #[arg(long)]
    pub no_update: bool,
}

/// Arguments for configuration management.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a configuration file with every default
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        /// Start from a preset instead of the defaults
        #[arg(long, value_enum)]
        preset: Option<PresetArg>,
    },
}

/// Engine presets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Higher thresholds, tighter tolerances
    Strict,
    /// Lower thresholds, looser tolerances
    Lenient,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<&ContextArgs> for dutywise_resolver::VerificationContext {
    fn from(args: &ContextArgs) -> Self {
        Self {
            supply_chain_complete: args.supply_chain_complete,
            manufacturing_location: args.manufacturing_location.clone(),
            requires_manual_verification: args.manual_verification,
        }
    }
}

/// Parse `COUNTRY=SHARE` or `COUNTRY=SHARE@RATE`.
pub fn parse_component(s: &str) -> Result<ComponentOrigin, String> {
    let (country, rest) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COUNTRY=SHARE, got '{}'", s))?;
    let country = country.trim();
    if country.is_empty() {
        return Err(format!("missing country in '{}'", s));
    }
    let (share, rate) = match rest.split_once('@') {
        Some((share, rate)) => (share, Some(rate)),
        None => (rest, None),
    };
    let share: f64 = share
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|_| format!("invalid share '{}'", share.trim()))?;

    let mut component = ComponentOrigin::new(country, share);
    if let Some(rate) = rate {
        let rate: f64 = rate
            .trim()
            .trim_end_matches('%')
            .parse()
            .map_err(|_| format!("invalid rate '{}'", rate.trim()))?;
        component.declared_rate = Rate::known(rate).map_err(|e| e.to_string())?;
    }
    Ok(component)
}

/// Parse a route such as `CN>MX>US`.
pub fn parse_route(s: &str) -> Result<Route, String> {
    Route::parse(s).ok_or_else(|| format!("expected ORIGIN>DESTINATION or ORIGIN>PROCESSING>DESTINATION, got '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_command() {
        let cli = Cli::parse_from(["dutywise", "classify", "copper wire harness", "--hint", "automotive"]);
        match cli.command {
            Command::Classify(args) => {
                assert_eq!(args.description, "copper wire harness");
                assert_eq!(args.hint.as_deref(), Some("automotive"));
            }
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["dutywise", "resolve", "8544.42.90", "--format", "json", "-vv", "--no-color"]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_color);
        match cli.command {
            Command::Resolve(args) => assert!(!args.context.manual_verification),
            _ => panic!("Expected Resolve command"),
        }
    }

    #[test]
    fn test_qualify_components() {
        let cli = Cli::parse_from([
            "dutywise",
            "qualify",
            "--code",
            "8544.42",
            "--component",
            "MX=60",
            "--component",
            "China=40@2.5",
            "--destination",
            "US",
        ]);
        let Command::Qualify(args) = cli.command else {
            panic!("Expected Qualify command");
        };
        assert_eq!(args.components.len(), 2);
        assert_eq!(args.components[0].country, "MX");
        assert_eq!(args.components[0].value_share, 60.0);
        assert_eq!(args.components[0].declared_rate, Rate::Unknown);
        assert_eq!(args.components[1].declared_rate, Rate::Known(2.5));
    }

    #[test]
    fn test_qualify_requires_components() {
        let result = Cli::try_parse_from(["dutywise", "qualify", "--destination", "US"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_component_parsing_errors() {
        assert!(parse_component("MX").is_err());
        assert!(parse_component("=40").is_err());
        assert!(parse_component("MX=lots").is_err());
        assert!(parse_component("MX=40@-1").is_err());
        assert_eq!(parse_component("US=35%").unwrap().value_share, 35.0);
    }

    #[test]
    fn test_assess_route() {
        let cli = Cli::parse_from(["dutywise", "assess", "-d", "wire harness", "--route", "CN>MX>US"]);
        let Command::Assess(args) = cli.command else {
            panic!("Expected Assess command");
        };
        let route = args.route.unwrap();
        assert_eq!(route.processing.as_deref(), Some("MX"));
        assert!(parse_route("US").is_err());
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["dutywise", "config", "init", "--force", "--preset", "strict"]);
        match cli.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { force, preset },
            }) => {
                assert!(force);
                assert!(matches!(preset, Some(PresetArg::Strict)));
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
