//! Dutywise Rate Fallback Engine
//!
//! When no authoritative rate exists, produces a labelled estimate from an
//! ordered chain of strategies, each with a confidence ceiling:
//!
//! 1. Keyword match: average of records sharing description keywords (medium or low)
//! 2. Chapter average: average of the partial code's chapter (medium)
//! 3. Global average: every record with a non-zero base rate (low)
//! 4. Terminal failure: null rates, very low, user decision required
//!
//! Every result carries its method, a disclosure message and the set of
//! options the caller may choose from. An unknown rate stays unknown.
//!
//! # Examples
//!
//! ```no_run
//! use dutywise_fallback::{FallbackConfig, FallbackEngine, FallbackInput};
//! use dutywise_store::SqliteStore;
//!
//! let store = SqliteStore::open_read_only("dutywise.db").unwrap();
//! let engine = FallbackEngine::standard(&FallbackConfig::default());
//!
//! let result = engine.run(&FallbackInput::from_description("copper wire harness"), &store);
//! println!("{} ({})", result.disclosure_message, result.confidence.as_str());
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod strategy;

pub use config::FallbackConfig;
pub use engine::FallbackEngine;
pub use error::FallbackError;
pub use strategy::{
    ChapterAverage, FallbackInput, FallbackStrategy, GlobalAverage, KeywordMatch,
    TerminalFailure, TERMINAL_DISCLOSURE,
};
