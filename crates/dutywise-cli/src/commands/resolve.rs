//! Resolve command implementation.

use crate::cli::ResolveArgs;
use crate::commands::Store;
use crate::error::Result;
use crate::output::Formatter;
use dutywise_pipeline::Pipeline;
use dutywise_resolver::VerificationContext;

/// Execute the resolve command.
///
/// An unverifiable code is not an error: the resolution carries its issues.
pub fn execute_resolve(
    args: ResolveArgs,
    pipeline: &Pipeline<Store>,
    store: &Store,
    formatter: &Formatter,
) -> Result<()> {
    let context = VerificationContext::from(&args.context);
    let resolution = pipeline.resolve(&args.code, &context, store)?;
    println!("{}", formatter.format_resolution(&resolution)?);

    Ok(())
}
