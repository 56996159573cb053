//! Dutywise Product Classifier
//!
//! Maps free-text product descriptions to ranked classification candidates.
//!
//! The classifier:
//! - Tokenizes the description (and optional business hint)
//! - Scores each chapter range of a [`Taxonomy`] by keyword hits
//! - Loads reference codes for the best ranges and scores them by description overlap
//! - Deduplicates by code and returns the top candidates
//!
//! # Examples
//!
//! ```no_run
//! use dutywise_classifier::{Classifier, ClassifierConfig, Taxonomy};
//! use dutywise_store::SqliteStore;
//!
//! let store = SqliteStore::open_read_only("dutywise.db").unwrap();
//! let taxonomy = Taxonomy::standard();
//! let classifier = Classifier::new(&taxonomy, ClassifierConfig::default());
//!
//! let candidates = classifier
//!     .classify("CMOS image sensor for digital camera", None, &store)
//!     .unwrap();
//! ```

#![warn(missing_docs)]

mod classifier;
mod config;
mod error;
mod taxonomy;

pub use classifier::Classifier;
pub use config::{ClassifierConfig, ClassifierWeights};
pub use error::ClassifierError;
pub use taxonomy::{ChapterRange, Taxonomy};
