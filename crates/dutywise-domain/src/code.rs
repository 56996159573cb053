//! Classification code module - normalized hierarchical tariff identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors produced when a raw string cannot become a classification code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// Fewer digits than a chapter (2)
    TooShort {
        /// The raw input
        input: String,
        /// Digits remaining after normalization
        digits: usize,
    },
    /// More digits than any national tariff line uses
    TooLong {
        /// The raw input
        input: String,
        /// Digits remaining after normalization
        digits: usize,
    },
}

impl fmt::Display for CodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeError::TooShort { input, digits } => write!(
                f,
                "'{}' has {} digit(s); a classification code needs at least {}",
                input,
                digits,
                ClassificationCode::MIN_DIGITS
            ),
            CodeError::TooLong { input, digits } => write!(
                f,
                "'{}' has {} digits; a classification code has at most {}",
                input,
                digits,
                ClassificationCode::MAX_DIGITS
            ),
        }
    }
}

impl std::error::Error for CodeError {}

/// A classification code in normalized form (digits only)
///
/// Codes are hierarchical: the first 2 digits are the chapter, the first 4 the
/// subcategory. A shorter code is a broader category, so prefixes are meaningful.
/// The code is always stored and compared with separators stripped, which makes
/// `"8544.29.00"`, `"8544 29 00"` and `"85442900"` the same value.
///
/// # Examples
///
/// ```
/// use dutywise_domain::ClassificationCode;
///
/// let dotted = ClassificationCode::parse("8544.29.00").unwrap();
/// let plain = ClassificationCode::parse("85442900").unwrap();
/// assert_eq!(dotted, plain);
/// assert_eq!(dotted.chapter(), "85");
/// assert_eq!(dotted.subcategory(), Some("8544"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassificationCode(String);

impl ClassificationCode {
    /// Minimum digits (a chapter)
    pub const MIN_DIGITS: usize = 2;

    /// Maximum digits accepted after normalization
    pub const MAX_DIGITS: usize = 12;

    /// Strip every non-digit character from a raw code
    pub fn normalize(raw: &str) -> String {
        raw.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// Parse and normalize a raw code
    pub fn parse(raw: &str) -> Result<Self, CodeError> {
        let digits = Self::normalize(raw);
        if digits.len() < Self::MIN_DIGITS {
            return Err(CodeError::TooShort {
                input: raw.to_string(),
                digits: digits.len(),
            });
        }
        if digits.len() > Self::MAX_DIGITS {
            return Err(CodeError::TooLong {
                input: raw.to_string(),
                digits: digits.len(),
            });
        }
        Ok(Self(digits))
    }

    /// The normalized digits
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of digits
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a parsed code has at least a chapter
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The 2-digit chapter
    pub fn chapter(&self) -> &str {
        &self.0[..Self::MIN_DIGITS]
    }

    /// The chapter as a number (e.g. `85`)
    pub fn chapter_number(&self) -> u8 {
        let bytes = self.0.as_bytes();
        (bytes[0] - b'0') * 10 + (bytes[1] - b'0')
    }

    /// The 4-digit subcategory, if the code is at least that long
    pub fn subcategory(&self) -> Option<&str> {
        self.prefix(4)
    }

    /// The first `len` digits, if the code is at least that long
    pub fn prefix(&self, len: usize) -> Option<&str> {
        self.0.get(..len)
    }

    /// Truncate to `len` digits (no-op if already shorter)
    pub fn truncated(&self, len: usize) -> Self {
        let len = len.max(Self::MIN_DIGITS).min(self.0.len());
        Self(self.0[..len].to_string())
    }

    /// Whether this code falls under the given digit prefix
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Length of the longest common prefix with another code
    pub fn common_prefix_len(&self, other: &ClassificationCode) -> usize {
        self.0
            .bytes()
            .zip(other.0.bytes())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Human-readable dotted form (`8544.29.00`)
    pub fn dotted(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 4);
        out.push_str(&self.0[..self.0.len().min(4)]);
        let mut rest = self.0.get(4..).unwrap_or("");
        while !rest.is_empty() {
            let take = rest.len().min(2);
            out.push('.');
            out.push_str(&rest[..take]);
            rest = &rest[take..];
        }
        out
    }
}

impl fmt::Display for ClassificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ClassificationCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClassificationCode {
    type Error = CodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClassificationCode> for String {
    fn from(code: ClassificationCode) -> Self {
        code.0
    }
}
