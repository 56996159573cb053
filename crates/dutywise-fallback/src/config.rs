//! Fallback configuration

use serde::{Deserialize, Serialize};

/// Configuration for the standard fallback chain
///
/// # Examples
///
/// ```
/// use dutywise_fallback::FallbackConfig;
///
/// let config = FallbackConfig::default();
/// assert_eq!(config.max_keywords, 5);
/// assert_eq!(config.medium_match_threshold, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Keywords taken from the description for the keyword tier
    pub max_keywords: usize,

    /// Matches needed for the keyword tier to report medium confidence
    pub medium_match_threshold: usize,

    /// Whether the chapter-average tier runs when a partial code is given
    pub enable_chapter_average: bool,

    /// Whether the global-average tier runs
    pub enable_global_average: bool,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            max_keywords: 5,
            medium_match_threshold: 5,
            enable_chapter_average: true,
            enable_global_average: true,
        }
    }
}

impl FallbackConfig {
    /// No global average; more matches needed for medium confidence
    pub fn strict() -> Self {
        Self {
            medium_match_threshold: 10,
            enable_global_average: false,
            ..Self::default()
        }
    }

    /// Every tier, medium confidence from fewer matches
    pub fn lenient() -> Self {
        Self {
            max_keywords: 8,
            medium_match_threshold: 3,
            ..Self::default()
        }
    }
}
