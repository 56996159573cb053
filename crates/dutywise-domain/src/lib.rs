//! Dutywise Domain Layer
//!
//! This crate contains the value objects and trait interfaces shared by every
//! stage of duty-exposure resolution. It holds no I/O: storage, notification
//! and presentation live in other crates and plug in through [`traits`].
//!
//! ## Key Concepts
//!
//! - **ClassificationCode**: a normalized, hierarchical tariff code (chapter = 2 digits,
//!   subcategory = 4 digits)
//! - **Rate**: a duty rate that is either a confirmed non-negative percentage or
//!   explicitly unknown, never a silent zero
//! - **TariffRecord**: one row of the reference table, with its policy overlays
//! - **FallbackResult**: an estimate produced when no authoritative rate exists,
//!   always tagged with its method and a disclosure
//! - **QualificationResult**: regional value content measured against a rule threshold
//! - **VolatilityAnnotation**: treaty-locked vs. volatile classification of a savings figure
//!
//! ## Architecture
//!
//! - Pure data and pure functions only
//! - Trait definitions for the reference store, the rules metadata store and the
//!   alert sink
//! - Engines (classifier, resolver, fallback, qualifier, volatility) depend on
//!   this crate and nothing else from the workspace

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod candidate;
pub mod code;
pub mod fallback;
pub mod issue;
pub mod keywords;
pub mod origin;
pub mod qualification;
pub mod rate;
pub mod record;
pub mod traits;
pub mod volatility;

// Re-exports for convenience
pub use candidate::{ClassificationCandidate, MatchType, OriginMethod};
pub use code::{ClassificationCode, CodeError};
pub use fallback::{
    BestMatch, EstimatedRates, FallbackConfidence, FallbackMethod, FallbackResult, UserOption,
    UserOptionKind,
};
pub use issue::{ConfidenceLabel, ErrorKind, Issue};
pub use origin::{normalize_country, ComponentOrigin};
pub use qualification::{
    ComponentBreakdown, QualificationLevel, QualificationResult, QualificationRule, RuleScope,
    RuleType,
};
pub use rate::{Rate, RateError};
pub use record::{PolicyInstrument, Surcharge, TariffRecord};
pub use traits::{AlertSink, RateAverage, RecordQuery, ReferenceStore, RulesStore};
pub use volatility::{
    AlertKind, RateObservation, Route, Severity, StabilityClass, VolatilityAlert,
    VolatilityAnnotation,
};
