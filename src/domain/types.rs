// ==========================================
// CAERS Core - Domain Types
// ==========================================
// Status codes, unit families, classification enums
// and the fixed reference codes the rule catalog keys on
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Reference codes
// ==========================================

/// Facility source type whose processes keep emitting after shutdown
pub const LANDFILL_SOURCE_TYPE_CODE: &str = "104";

/// Release point type code for fugitive releases
pub const FUGITIVE_RELEASE_POINT_TYPE_CODE: &str = "1";

/// Contact type required on every facility (emissions inventory contact)
pub const EMISSIONS_INVENTORY_CONTACT_TYPE: &str = "EI";

/// Calculation method "Engineering Judgement"
pub const ENGINEERING_JUDGEMENT_METHOD_CODE: &str = "2";

/// Radionuclides pollutant, reported in curies
pub const RADIONUCLIDES_POLLUTANT_CODE: &str = "605";
pub const CURIE_UOM_CODE: &str = "CURIE";

/// Formula variable codes with dedicated range checks
pub const ASH_VARIABLE_CODE: &str = "A";
pub const SULFUR_VARIABLE_CODE: &str = "SU";

pub const FEET_UOM_CODE: &str = "FT";
pub const ACFS_UOM_CODE: &str = "ACFS";
pub const ACFM_UOM_CODE: &str = "ACFM";
pub const FPS_UOM_CODE: &str = "FPS";
pub const FPM_UOM_CODE: &str = "FPM";

// ==========================================
// Operating status
// ==========================================
// Serialized as the inventory code (OP/TS/PS/ONP/ONRE)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatingStatus {
    #[serde(rename = "OP")]
    Operating,
    #[serde(rename = "TS")]
    TemporarilyShutdown,
    #[serde(rename = "PS")]
    PermanentlyShutdown,
    #[serde(rename = "ONP")]
    OperatingNonpoint, // facility only
    #[serde(rename = "ONRE")]
    OperatingNotReporting, // facility only
}

impl OperatingStatus {
    pub fn code(&self) -> &'static str {
        match self {
            OperatingStatus::Operating => "OP",
            OperatingStatus::TemporarilyShutdown => "TS",
            OperatingStatus::PermanentlyShutdown => "PS",
            OperatingStatus::OperatingNonpoint => "ONP",
            OperatingStatus::OperatingNotReporting => "ONRE",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            OperatingStatus::Operating => "Operating",
            OperatingStatus::TemporarilyShutdown => "Temporarily Shutdown",
            OperatingStatus::PermanentlyShutdown => "Permanently Shutdown",
            OperatingStatus::OperatingNonpoint => "Operating - Reported as Nonpoint",
            OperatingStatus::OperatingNotReporting => "Operating - Not Reporting",
        }
    }

    pub fn is_operating(&self) -> bool {
        matches!(self, OperatingStatus::Operating)
    }

    /// TS or PS
    pub fn is_shutdown(&self) -> bool {
        matches!(
            self,
            OperatingStatus::TemporarilyShutdown | OperatingStatus::PermanentlyShutdown
        )
    }

    pub fn is_permanently_shutdown(&self) -> bool {
        matches!(self, OperatingStatus::PermanentlyShutdown)
    }
}

impl fmt::Display for OperatingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// Unit-of-measure family
// ==========================================
// Two measures convert into each other only within one family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitType {
    Mass,
    Volume,
    Energy,
    Time,
    Length,
    Area,
    Power,
    Radioactivity,
    FlowRate,
    Velocity,
    Temperature,
    #[serde(other)]
    Other,
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitType::Mass => write!(f, "MASS"),
            UnitType::Volume => write!(f, "VOLUME"),
            UnitType::Energy => write!(f, "ENERGY"),
            UnitType::Time => write!(f, "TIME"),
            UnitType::Length => write!(f, "LENGTH"),
            UnitType::Area => write!(f, "AREA"),
            UnitType::Power => write!(f, "POWER"),
            UnitType::Radioactivity => write!(f, "RADIOACTIVITY"),
            UnitType::FlowRate => write!(f, "FLOW_RATE"),
            UnitType::Velocity => write!(f, "VELOCITY"),
            UnitType::Temperature => write!(f, "TEMPERATURE"),
            UnitType::Other => write!(f, "OTHER"),
        }
    }
}

// ==========================================
// NAICS classification
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NaicsCodeType {
    Primary,
    Secondary,
    Tertiary,
}

// ==========================================
// Entity type (diagnostics)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    EmissionsReport,
    FacilitySite,
    EmissionsUnit,
    EmissionsProcess,
    ReportingPeriod,
    Emission,
    ReleasePoint,
    Control,
    ControlPath,
    ControlAssignment,
    ReleasePointAppt,
    EmissionFormulaVariable,
    FacilityNaics,
    FacilitySiteContact,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::EmissionsReport => write!(f, "EMISSIONS_REPORT"),
            EntityType::FacilitySite => write!(f, "FACILITY_SITE"),
            EntityType::EmissionsUnit => write!(f, "EMISSIONS_UNIT"),
            EntityType::EmissionsProcess => write!(f, "EMISSIONS_PROCESS"),
            EntityType::ReportingPeriod => write!(f, "REPORTING_PERIOD"),
            EntityType::Emission => write!(f, "EMISSION"),
            EntityType::ReleasePoint => write!(f, "RELEASE_POINT"),
            EntityType::Control => write!(f, "CONTROL"),
            EntityType::ControlPath => write!(f, "CONTROL_PATH"),
            EntityType::ControlAssignment => write!(f, "CONTROL_ASSIGNMENT"),
            EntityType::ReleasePointAppt => write!(f, "RELEASE_POINT_APPT"),
            EntityType::EmissionFormulaVariable => write!(f, "EMISSION_FORMULA_VARIABLE"),
            EntityType::FacilityNaics => write!(f, "FACILITY_NAICS"),
            EntityType::FacilitySiteContact => write!(f, "FACILITY_SITE_CONTACT"),
        }
    }
}

// ==========================================
// Report validation status
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Unvalidated,
    Passed,
    PassedWarnings,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationStatus::Unvalidated => write!(f, "UNVALIDATED"),
            ValidationStatus::Passed => write!(f, "PASSED"),
            ValidationStatus::PassedWarnings => write!(f, "PASSED_WARNINGS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operating_status_serializes_as_code() {
        let json = serde_json::to_string(&OperatingStatus::TemporarilyShutdown).unwrap();
        assert_eq!(json, "\"TS\"");

        let status: OperatingStatus = serde_json::from_str("\"ONRE\"").unwrap();
        assert_eq!(status, OperatingStatus::OperatingNotReporting);
    }

    #[test]
    fn test_shutdown_classification() {
        assert!(OperatingStatus::TemporarilyShutdown.is_shutdown());
        assert!(OperatingStatus::PermanentlyShutdown.is_shutdown());
        assert!(!OperatingStatus::Operating.is_shutdown());
        assert!(!OperatingStatus::OperatingNonpoint.is_operating());
    }

    #[test]
    fn test_unknown_unit_type_falls_back_to_other() {
        let unit_type: UnitType = serde_json::from_str("\"HEAT_CONTENT\"").unwrap();
        assert_eq!(unit_type, UnitType::Other);
    }
}
