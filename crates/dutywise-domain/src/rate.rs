//! Duty rate module
//!
//! A rate is a percentage of customs value. Absence of data is a first-class
//! state: [`Rate::Unknown`] propagates through every arithmetic helper instead
//! of collapsing to `0.0`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when a number cannot be a duty rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateError(pub f64);

impl fmt::Display for RateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not a valid duty rate (must be finite and >= 0)", self.0)
    }
}

impl std::error::Error for RateError {}

/// A duty rate in percent, or explicitly unknown
///
/// Serializes as a JSON number, or `null` when unknown.
///
/// # Examples
///
/// ```
/// use dutywise_domain::Rate;
///
/// let base = Rate::known(7.5).unwrap();
/// let preferential = Rate::known(0.0).unwrap();
/// assert_eq!(Rate::savings(base, preferential), Rate::known(7.5).unwrap());
/// assert_eq!(Rate::savings(base, Rate::Unknown), Rate::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Option<f64>", into = "Option<f64>")]
pub enum Rate {
    /// A confirmed, non-negative percentage
    Known(f64),
    /// No authoritative value exists
    #[default]
    Unknown,
}

impl Rate {
    /// A confirmed rate; rejects negative and non-finite values
    pub fn known(value: f64) -> Result<Self, RateError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Rate::Known(value))
        } else {
            Err(RateError(value))
        }
    }

    /// Build from a nullable column value
    pub fn from_option(value: Option<f64>) -> Result<Self, RateError> {
        match value {
            Some(v) => Self::known(v),
            None => Ok(Rate::Unknown),
        }
    }

    /// Known rate if valid, otherwise unknown
    pub fn checked(value: f64) -> Self {
        Self::known(value).unwrap_or(Rate::Unknown)
    }

    /// The percentage, if known
    pub fn value(&self) -> Option<f64> {
        match self {
            Rate::Known(v) => Some(*v),
            Rate::Unknown => None,
        }
    }

    /// Whether a confirmed value exists
    pub fn is_known(&self) -> bool {
        matches!(self, Rate::Known(_))
    }

    /// Whether a confirmed, strictly positive value exists
    pub fn is_nonzero(&self) -> bool {
        matches!(self, Rate::Known(v) if *v > 0.0)
    }

    /// Sum of two rates; unknown if either side is unknown
    pub fn plus(self, other: Rate) -> Rate {
        match (self, other) {
            (Rate::Known(a), Rate::Known(b)) => Rate::Known(a + b),
            _ => Rate::Unknown,
        }
    }

    /// Scale by a non-negative factor; unknown stays unknown
    pub fn scaled(self, factor: f64) -> Rate {
        match self {
            Rate::Known(v) => Rate::checked(v * factor),
            Rate::Unknown => Rate::Unknown,
        }
    }

    /// `max(0, base - preferential)`; unknown if either rate is unknown
    pub fn savings(base: Rate, preferential: Rate) -> Rate {
        match (base, preferential) {
            (Rate::Known(b), Rate::Known(p)) => Rate::Known((b - p).max(0.0)),
            _ => Rate::Unknown,
        }
    }

    /// Arithmetic mean of the known values; unknown if there are none
    pub fn mean<I: IntoIterator<Item = Rate>>(rates: I) -> Rate {
        let (sum, count) = rates
            .into_iter()
            .filter_map(|r| r.value())
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        if count == 0 {
            Rate::Unknown
        } else {
            Rate::checked(sum / count as f64)
        }
    }
}

impl TryFrom<Option<f64>> for Rate {
    type Error = RateError;

    fn try_from(value: Option<f64>) -> Result<Self, Self::Error> {
        Rate::from_option(value)
    }
}

impl From<Rate> for Option<f64> {
    fn from(rate: Rate) -> Self {
        rate.value()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rate::Known(v) => write!(f, "{:.2}%", v),
            Rate::Unknown => f.write_str("unknown"),
        }
    }
}
