//! Assess command implementation.

use crate::cli::AssessArgs;
use crate::commands::Store;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use dutywise_domain::RateObservation;
use dutywise_pipeline::{AssessmentRequest, Pipeline};
use dutywise_resolver::VerificationContext;
use std::fs;

/// Execute the assess command.
pub fn execute_assess(
    args: AssessArgs,
    pipeline: &Pipeline<Store>,
    store: &Store,
    formatter: &Formatter,
) -> Result<()> {
    let request = build_request(args)?;
    let assessment = pipeline.assess(&request, store);
    println!("{}", formatter.format_assessment(&assessment)?);

    Ok(())
}

/// The request from `--request FILE`, or from the individual flags.
///
/// `--tracked` adds the observations of a `watch` snapshot either way.
pub fn build_request(args: AssessArgs) -> Result<AssessmentRequest> {
    let tracked = args.tracked.clone();
    let mut request = match args.request.clone() {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => request_from_flags(args)?,
    };
    if let Some(path) = tracked {
        request.tracked_rates = serde_json::from_str::<Vec<RateObservation>>(&fs::read_to_string(path)?)?;
    }
    Ok(request)
}

fn request_from_flags(args: AssessArgs) -> Result<AssessmentRequest> {
    if args.description.is_none() && args.code.is_none() {
        return Err(CliError::InvalidInput(
            "Must specify --description, --code or --request".to_string(),
        ));
    }
    if let Some(value) = args.import_value {
        if !value.is_finite() || value < 0.0 {
            return Err(CliError::InvalidInput(
                "Import value must be a non-negative number".to_string(),
            ));
        }
    }

    Ok(AssessmentRequest {
        description: args.description,
        hint: args.hint,
        code: args.code,
        category: args.category,
        components: args.components,
        destination: args.destination,
        route: args.route,
        import_value: args.import_value,
        context: VerificationContext::from(&args.context),
        ..AssessmentRequest::default()
    })
}
