//! Fallback command implementation.

use crate::cli::FallbackArgs;
use crate::commands::Store;
use crate::error::Result;
use crate::output::Formatter;
use dutywise_fallback::FallbackInput;
use dutywise_pipeline::Pipeline;

/// Execute the fallback command.
pub fn execute_fallback(
    args: FallbackArgs,
    pipeline: &Pipeline<Store>,
    store: &Store,
    formatter: &Formatter,
) -> Result<()> {
    let mut input = FallbackInput::from_description(args.description);
    if let Some(code) = args.partial_code {
        input = input.with_partial_code(code);
    }

    let result = pipeline.fallback(&input, store);
    println!("{}", formatter.format_fallback(&result)?);

    Ok(())
}
