//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs, PresetArg};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use dutywise_pipeline::PipelineConfig;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(args: ConfigArgs, config: &Config, path: &Path, formatter: &Formatter) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            println!("# {}", path.display());
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Init { force, preset } => {
            if path.exists() && !force {
                return Err(CliError::Config(format!(
                    "{} already exists; pass --force to overwrite",
                    path.display()
                )));
            }
            let config = Config {
                pipeline: match preset {
                    Some(PresetArg::Strict) => PipelineConfig::strict(),
                    Some(PresetArg::Lenient) => PipelineConfig::lenient(),
                    None => PipelineConfig::default(),
                },
                ..Config::default()
            };
            config.save_to(path)?;
            println!("{}", formatter.success(&format!("Wrote {}", path.display())));
        }
    }

    Ok(())
}
