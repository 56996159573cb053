//! Dutywise Pipeline
//!
//! Wires the classifier, resolver, fallback engine, qualification evaluator
//! and volatility separator into one sequential request flow.
//!
//! Each stage is also exposed on its own ([`Pipeline::classify`],
//! [`Pipeline::resolve`], [`Pipeline::fallback`], [`Pipeline::qualify`]).
//! [`Pipeline::assess`] never fails for per-input problems: they come back
//! as issues on the [`Assessment`].
//!
//! # Examples
//!
//! ```no_run
//! use dutywise_pipeline::{AssessmentRequest, Pipeline};
//! use dutywise_store::SqliteStore;
//!
//! let store = SqliteStore::open_read_only("dutywise.db").unwrap();
//! let pipeline = Pipeline::<SqliteStore>::default_config().unwrap();
//!
//! let assessment = pipeline.assess(&AssessmentRequest::for_code("8544.42.90"), &store);
//! println!("{:?} rates, {} issue(s)", assessment.rate_source, assessment.issues.len());
//! ```

#![warn(missing_docs)]

mod assessment;
mod config;
mod error;
mod pipeline;

pub use assessment::{Assessment, AssessmentRequest, RateSource};
pub use config::{PipelineConfig, PipelineSettings};
pub use error::PipelineError;
pub use pipeline::Pipeline;
