// ==========================================
// CAERS Core - Validation Features
// ==========================================
// A run is scoped to a set of rule features;
// every registered rule set belongs to exactly one
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationFeature {
    /// Federal business rules, applied to every report
    Federal,
    /// State/local/tribal agency rules
    Slt,
}

impl ValidationFeature {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationFeature::Federal => "FEDERAL",
            ValidationFeature::Slt => "SLT",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "FEDERAL" => Some(ValidationFeature::Federal),
            "SLT" => Some(ValidationFeature::Slt),
            _ => None,
        }
    }

    /// Parses feature codes, silently skipping unknown ones
    pub fn parse_set<'a>(codes: impl IntoIterator<Item = &'a str>) -> BTreeSet<ValidationFeature> {
        codes.into_iter().filter_map(Self::from_code).collect()
    }

    pub fn all() -> BTreeSet<ValidationFeature> {
        [ValidationFeature::Federal, ValidationFeature::Slt].into_iter().collect()
    }

    pub fn federal_only() -> BTreeSet<ValidationFeature> {
        [ValidationFeature::Federal].into_iter().collect()
    }
}

impl fmt::Display for ValidationFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_is_case_insensitive() {
        assert_eq!(ValidationFeature::from_code("slt"), Some(ValidationFeature::Slt));
        assert_eq!(ValidationFeature::from_code(" Federal "), Some(ValidationFeature::Federal));
        assert_eq!(ValidationFeature::from_code("STATE"), None);
    }

    #[test]
    fn test_parse_set_skips_unknown() {
        let set = ValidationFeature::parse_set(["FEDERAL", "BOGUS", "SLT"]);
        assert_eq!(set, ValidationFeature::all());
    }
}
