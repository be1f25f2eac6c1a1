// ==========================================
// CAERS Core - Reference Data Records
// ==========================================
// Immutable code-table records, looked up by code
// and carried by value on the report entities
// ==========================================

use crate::domain::types::UnitType;
use serde::{Deserialize, Serialize};

// ==========================================
// UnitMeasure
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMeasure {
    pub code: String,
    pub description: String,
    pub unit_type: UnitType,
    /// Conversion expression over base units, e.g. "[lb]" or "2000*[lb]"
    pub calculation_variable: String,
    pub legacy: bool,
    /// Usable as an emissions unit design-capacity unit
    pub unit_design_capacity: bool,
}

impl UnitMeasure {
    pub fn new(code: &str, description: &str, unit_type: UnitType, calculation_variable: &str) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
            unit_type,
            calculation_variable: calculation_variable.to_string(),
            legacy: false,
            unit_design_capacity: true,
        }
    }

    pub fn is_convertible_to(&self, other: &UnitMeasure) -> bool {
        self.unit_type == other.unit_type
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code == code
    }
}

// ==========================================
// CalculationMethod
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationMethod {
    pub code: String,
    pub description: String,
    pub total_direct_entry: bool,
    pub epa_emission_factor: bool,
    pub control_indicator: bool,
}

// ==========================================
// Pollutant
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pollutant {
    pub code: String,
    pub name: String,
    pub last_inventory_year: Option<i32>,
}

impl Pollutant {
    pub fn is_legacy(&self, report_year: i32) -> bool {
        matches!(self.last_inventory_year, Some(last) if last < report_year)
    }
}

// ==========================================
// EmissionFormulaVariableCode
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmissionFormulaVariableCode {
    pub code: String,
    pub description: String,
}

impl EmissionFormulaVariableCode {
    pub fn new(code: &str, description: &str) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
        }
    }
}

// ==========================================
// NaicsCode
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaicsCode {
    pub code: String,
    pub description: String,
    pub last_inventory_year: Option<i32>,
    /// Replacement code for a retired NAICS code
    pub map_to: Option<String>,
}

impl NaicsCode {
    pub fn is_legacy(&self, report_year: i32) -> bool {
        matches!(self.last_inventory_year, Some(last) if last < report_year)
    }
}

// ==========================================
// County
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct County {
    pub code: String,
    pub name: String,
    /// USPS state abbreviation the county belongs to
    pub state_code: String,
    pub last_inventory_year: Option<i32>,
}

impl County {
    pub fn is_legacy(&self, report_year: i32) -> bool {
        matches!(self.last_inventory_year, Some(last) if last < report_year)
    }
}

// ==========================================
// CodeDescription
// ==========================================
// Generic code table row: source types, release point types,
// unit types, operating types, materials, parameter types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDescription {
    pub code: String,
    pub description: String,
    pub last_inventory_year: Option<i32>,
}

impl CodeDescription {
    pub fn new(code: &str, description: &str) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
            last_inventory_year: None,
        }
    }

    pub fn is_legacy(&self, report_year: i32) -> bool {
        matches!(self.last_inventory_year, Some(last) if last < report_year)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code == code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_is_strictly_before_report_year() {
        let mut pollutant = Pollutant {
            code: "NOX".to_string(),
            name: "Nitrogen Oxides".to_string(),
            last_inventory_year: Some(2019),
        };
        assert!(pollutant.is_legacy(2020));
        assert!(!pollutant.is_legacy(2019));

        pollutant.last_inventory_year = None;
        assert!(!pollutant.is_legacy(2030));
    }

    #[test]
    fn test_unit_measure_convertibility_follows_family() {
        let lb = UnitMeasure::new("LB", "Pounds", UnitType::Mass, "[lb]");
        let ton = UnitMeasure::new("TON", "Tons", UnitType::Mass, "sTon");
        let gal = UnitMeasure::new("GAL", "Gallons", UnitType::Volume, "[gall]");

        assert!(lb.is_convertible_to(&ton));
        assert!(!lb.is_convertible_to(&gal));
    }
}
