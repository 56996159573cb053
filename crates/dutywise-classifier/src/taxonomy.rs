//! Chapter-range taxonomy
//!
//! Built once and passed by reference into the classifier.

use crate::ClassifierError;
use dutywise_domain::keywords::keyword_matches;
use serde::{Deserialize, Serialize};

/// A contiguous range of chapters with the keywords that point at it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterRange {
    /// Display name
    pub name: String,

    /// First chapter (inclusive)
    pub chapter_start: u8,

    /// Last chapter (inclusive)
    pub chapter_end: u8,

    /// Lower-case keywords
    pub keywords: Vec<String>,
}

impl ChapterRange {
    /// Create a range
    pub fn new(name: &str, chapter_start: u8, chapter_end: u8, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            chapter_start,
            chapter_end,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Input tokens that hit one of this range's keywords
    pub fn matching_tokens<'a>(&self, tokens: &'a [String]) -> Vec<&'a String> {
        tokens
            .iter()
            .filter(|token| self.keywords.iter().any(|k| keyword_matches(token, k)))
            .collect()
    }

    /// `"84-85"` or `"87"`
    pub fn label(&self) -> String {
        if self.chapter_start == self.chapter_end {
            format!("{:02}", self.chapter_start)
        } else {
            format!("{:02}-{:02}", self.chapter_start, self.chapter_end)
        }
    }
}

/// Immutable chapter-range lookup table
///
/// Deserializes from a list of ranges and goes through the same validation
/// as [`Taxonomy::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ChapterRange>", into = "Vec<ChapterRange>")]
pub struct Taxonomy {
    ranges: Vec<ChapterRange>,
}

impl Taxonomy {
    /// Build a taxonomy, rejecting inverted or out-of-range chapters
    pub fn new(ranges: Vec<ChapterRange>) -> Result<Self, ClassifierError> {
        for range in &ranges {
            if range.chapter_start > range.chapter_end || range.chapter_end > 99 {
                return Err(ClassifierError::Taxonomy(format!(
                    "Invalid chapter range {} for '{}'",
                    range.label(),
                    range.name
                )));
            }
            if range.keywords.is_empty() {
                return Err(ClassifierError::Taxonomy(format!(
                    "Range '{}' has no keywords",
                    range.name
                )));
            }
        }
        let ranges = ranges
            .into_iter()
            .map(|mut r| {
                r.keywords = r.keywords.iter().map(|k| k.to_lowercase()).collect();
                r
            })
            .collect();
        Ok(Self { ranges })
    }

    /// The built-in table
    pub fn standard() -> Self {
        Self {
            ranges: vec![
                ChapterRange::new(
                    "Automotive Parts & Accessories",
                    87,
                    87,
                    &[
                        "automotive", "vehicle", "car", "truck", "engine", "transmission", "brake",
                        "suspension", "cnc", "machined", "precision", "part", "component",
                    ],
                ),
                ChapterRange::new(
                    "Electronics & Machinery",
                    84,
                    85,
                    &[
                        "electronic", "electrical", "machine", "computer", "processor", "sensor",
                        "bluetooth", "wireless", "iot", "smart", "digital",
                    ],
                ),
                ChapterRange::new(
                    "Precision Instruments",
                    90,
                    92,
                    &["instrument", "measuring", "precision", "optical", "medical"],
                ),
                ChapterRange::new(
                    "Transportation",
                    86,
                    89,
                    &["vehicle", "automotive", "transport", "aircraft", "ship"],
                ),
                ChapterRange::new(
                    "Metals & Tools",
                    72,
                    83,
                    &["metal", "steel", "iron", "aluminum", "copper", "tool"],
                ),
                ChapterRange::new(
                    "Textiles",
                    50,
                    63,
                    &["fabric", "textile", "clothing", "yarn", "fiber"],
                ),
            ],
        }
    }

    /// All ranges in table order
    pub fn ranges(&self) -> &[ChapterRange] {
        &self.ranges
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<ChapterRange>> for Taxonomy {
    type Error = ClassifierError;

    fn try_from(ranges: Vec<ChapterRange>) -> Result<Self, Self::Error> {
        Self::new(ranges)
    }
}

impl From<Taxonomy> for Vec<ChapterRange> {
    fn from(taxonomy: Taxonomy) -> Self {
        taxonomy.ranges
    }
}
