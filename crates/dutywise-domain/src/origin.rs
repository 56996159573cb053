//! Component origins for regional value content

use crate::Rate;
use serde::{Deserialize, Serialize};

/// One component of a product with its country of origin and value share
///
/// `value_share` may be expressed as a fraction (0–1) or a percentage (0–100);
/// the scale must be consistent within a request. `declared_rate` is carried
/// for display only. It never feeds qualification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentOrigin {
    /// Optional component description
    #[serde(default)]
    pub description: Option<String>,

    /// Country of origin (any common spelling; see [`normalize_country`])
    pub country: String,

    /// Share of the product's value
    pub value_share: f64,

    /// Duty rate declared or resolved for the component itself
    #[serde(default)]
    pub declared_rate: Rate,
}

impl ComponentOrigin {
    /// Create a component with an unknown declared rate
    pub fn new(country: impl Into<String>, value_share: f64) -> Self {
        Self {
            description: None,
            country: country.into(),
            value_share,
            declared_rate: Rate::Unknown,
        }
    }

    /// ISO-2 country code
    pub fn country_code(&self) -> String {
        normalize_country(&self.country)
    }
}

/// Normalize a country name or ISO-3 code to ISO-2 (upper case)
///
/// Unrecognized input is trimmed and upper-cased unchanged.
///
/// # Examples
///
/// ```
/// use dutywise_domain::normalize_country;
///
/// assert_eq!(normalize_country("Mexico"), "MX");
/// assert_eq!(normalize_country("usa"), "US");
/// assert_eq!(normalize_country("cn"), "CN");
/// ```
pub fn normalize_country(raw: &str) -> String {
    let key = raw.trim().to_lowercase().replace('.', "").replace('_', " ");
    let key = key.split_whitespace().collect::<Vec<_>>().join(" ");
    let iso2 = match key.as_str() {
        "us" | "usa" | "united states" | "united states of america" | "america" => "US",
        "ca" | "can" | "canada" => "CA",
        "mx" | "mex" | "mexico" | "méxico" => "MX",
        "cn" | "chn" | "china" | "prc" => "CN",
        "vn" | "vnm" | "vietnam" | "viet nam" => "VN",
        "de" | "deu" | "germany" => "DE",
        "jp" | "jpn" | "japan" => "JP",
        "kr" | "kor" | "korea" | "south korea" => "KR",
        "tw" | "twn" | "taiwan" => "TW",
        "in" | "ind" | "india" => "IN",
        _ => return raw.trim().to_uppercase(),
    };
    iso2.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_aliases() {
        assert_eq!(normalize_country("United States"), "US");
        assert_eq!(normalize_country(" U.S.A. "), "US");
        assert_eq!(normalize_country("MEX"), "MX");
        assert_eq!(normalize_country("canada"), "CA");
        assert_eq!(normalize_country("br"), "BR");
    }

    #[test]
    fn test_component_country_code() {
        let component = ComponentOrigin::new("Mexico", 40.0);
        assert_eq!(component.country_code(), "MX");
        assert_eq!(component.declared_rate, Rate::Unknown);
    }
}
