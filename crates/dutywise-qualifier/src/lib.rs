//! Dutywise Qualification Evaluator
//!
//! Measures a product's regional value content against the threshold of the
//! most specific applicable rule.
//!
//! The evaluator provides:
//! - Share validation (fraction or percent scale, must sum to 100)
//! - Country normalization to ISO-2 and territory membership
//! - Rule selection by specificity (code, category, chapter, default)
//! - A verdict band, shortfall and the rule's documentation list
//!
//! Qualification and rate lookup are independent. A component originating
//! inside the territory never changes any code's preferential rate.
//!
//! # Examples
//!
//! ```no_run
//! use dutywise_domain::ComponentOrigin;
//! use dutywise_qualifier::{QualificationEvaluator, QualificationRequest};
//! use dutywise_store::SqliteStore;
//!
//! let store = SqliteStore::open_read_only("dutywise.db").unwrap();
//! let evaluator = QualificationEvaluator::default_config();
//!
//! let request = QualificationRequest::new(
//!     vec![ComponentOrigin::new("MX", 70.0), ComponentOrigin::new("CN", 30.0)],
//!     "US",
//! );
//! let result = evaluator.evaluate(&request, &store).unwrap();
//! println!("RVC {:.1}% qualifies: {}", result.regional_value_content, result.qualifies);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod evaluator;

pub use config::QualifierConfig;
pub use error::QualifierError;
pub use evaluator::{QualificationEvaluator, QualificationRequest};
