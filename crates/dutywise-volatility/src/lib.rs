//! Dutywise Volatility Separator
//!
//! Splits a savings figure into the part that rests on ratified treaty rates
//! and the part exposed to unilateral policy overlays, and watches tracked
//! rates for changes.
//!
//! The crate provides:
//! - [`VolatilitySeparator`]: savings, stability classes, risk score and the
//!   separately reported stability premium
//! - [`RateMonitor`]: snapshots of tracked rates and alerts when they move
//! - [`TracingAlertSink`] and [`MemoryAlertSink`] for alert delivery
//!
//! # Examples
//!
//! ```
//! use dutywise_domain::{EstimatedRates, Rate, Route};
//! use dutywise_volatility::{SavingsInput, VolatilitySeparator};
//!
//! let separator = VolatilitySeparator::default_config();
//! let input = SavingsInput::from_estimate(&EstimatedRates::new(Rate::Known(5.0), Rate::Known(0.0)));
//! let route = Route::parse("CN>MX>US").unwrap();
//!
//! let estimate = separator.separate(&input, &route, Some(100_000.0));
//! assert_eq!(estimate.savings_percent, Rate::Known(5.0));
//! assert_eq!(estimate.stability_multiplier, 1.2);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod monitor;
mod separator;
mod sink;

pub use config::VolatilityConfig;
pub use error::VolatilityError;
pub use monitor::{compare, RateMonitor};
pub use separator::{MoneySavings, SavingsEstimate, SavingsInput, VolatilitySeparator};
pub use sink::{MemoryAlertSink, TracingAlertSink};
