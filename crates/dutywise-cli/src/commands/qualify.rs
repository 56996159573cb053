//! Qualify command implementation.

use crate::cli::QualifyArgs;
use crate::commands::Store;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use dutywise_domain::ClassificationCode;
use dutywise_pipeline::Pipeline;
use dutywise_qualifier::QualificationRequest;

/// Execute the qualify command.
pub fn execute_qualify(
    args: QualifyArgs,
    pipeline: &Pipeline<Store>,
    store: &Store,
    formatter: &Formatter,
) -> Result<()> {
    let mut request = QualificationRequest::new(args.components, args.destination);
    if let Some(code) = args.code {
        let code = ClassificationCode::parse(&code).map_err(|e| CliError::InvalidInput(e.to_string()))?;
        request = request.with_code(code);
    }
    if let Some(category) = args.category {
        request = request.with_category(category);
    }

    let result = pipeline.qualify(&request, store)?;
    println!("{}", formatter.format_qualification(&result)?);

    Ok(())
}
