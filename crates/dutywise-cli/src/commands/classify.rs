//! Classify command implementation.

use crate::cli::ClassifyArgs;
use crate::commands::Store;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use dutywise_pipeline::Pipeline;

/// Execute the classify command.
pub fn execute_classify(
    args: ClassifyArgs,
    pipeline: &Pipeline<Store>,
    store: &Store,
    formatter: &Formatter,
) -> Result<()> {
    if args.description.trim().is_empty() {
        return Err(CliError::InvalidInput("Description must not be empty".to_string()));
    }

    let candidates = pipeline.classify(&args.description, args.hint.as_deref(), store)?;
    println!("{}", formatter.format_candidates(&candidates)?);

    Ok(())
}
