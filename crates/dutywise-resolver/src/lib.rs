//! Dutywise Code Resolver
//!
//! Turns a user-typed, possibly malformed classification code into a single
//! best reference match.
//!
//! The resolver provides:
//! - Normalization (every non-digit stripped, so `8544.29.00` ≡ `85442900`)
//! - Exact lookup, then a prefix search scored by [`MatchScore`]
//! - A data-completeness trust score, separate from the match score
//! - Ranked alternatives from the same subcategory, then the same chapter
//!
//! # Examples
//!
//! ```no_run
//! use dutywise_resolver::{CodeResolver, VerificationContext};
//! use dutywise_store::SqliteStore;
//!
//! let store = SqliteStore::open_read_only("dutywise.db").unwrap();
//! let resolver = CodeResolver::default_config();
//!
//! let resolution = resolver
//!     .resolve("8544.29.00", &VerificationContext::default(), &store)
//!     .unwrap();
//! println!("verified: {}, trust: {:.2}", resolution.verified, resolution.trust_score);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod resolver;
mod scoring;

pub use config::{ResolverConfig, ResolverWeights, TrustWeights};
pub use error::ResolverError;
pub use resolver::{Alternative, AlternativeRelation, CodeResolver, Resolution};
pub use scoring::{trust_score, MatchScore, VerificationContext};
