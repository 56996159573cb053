//! Dutywise CLI - Classify products, resolve duty rates and check USMCA qualification.

use anyhow::Context;
use clap::Parser;
use dutywise_cli::commands;
use dutywise_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `-v` flags override `RUST_LOG`.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = Config::path(cli.config.as_deref())?;
    let config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let format = cli.format.map(Into::into).unwrap_or(config.output.format);
    let color_enabled = !cli.no_color && config.output.color;
    let formatter = Formatter::new(format, color_enabled);

    let db = cli.db.as_deref();
    match cli.command {
        Command::Config(args) => commands::execute_config(args, &config, &config_path, &formatter)?,
        Command::Import(args) => {
            let database = config.database_path(db)?;
            commands::execute_import(args, &database, &formatter)?
        }
        Command::Classify(args) => commands::with_reference(&config, db, |pipeline, store| {
            commands::execute_classify(args, pipeline, store, &formatter)
        })?,
        Command::Resolve(args) => commands::with_reference(&config, db, |pipeline, store| {
            commands::execute_resolve(args, pipeline, store, &formatter)
        })?,
        Command::Fallback(args) => commands::with_reference(&config, db, |pipeline, store| {
            commands::execute_fallback(args, pipeline, store, &formatter)
        })?,
        Command::Qualify(args) => commands::with_reference(&config, db, |pipeline, store| {
            commands::execute_qualify(args, pipeline, store, &formatter)
        })?,
        Command::Assess(args) => commands::with_reference(&config, db, |pipeline, store| {
            commands::execute_assess(args, pipeline, store, &formatter)
        })?,
        Command::Watch(args) => commands::with_reference(&config, db, |pipeline, store| {
            commands::execute_watch(args, pipeline, store, &formatter)
        })?,
    }

    Ok(())
}
