// ==========================================
// CAERS Core - Facility Entities
// ==========================================
// EmissionsReport → FacilitySite and the facility-level
// collections: release points, controls, control paths
// ==========================================

use crate::domain::emission::{Emission, EmissionsProcess, EmissionsUnit, ReportingPeriod};
use crate::domain::reference::{CodeDescription, County, NaicsCode, UnitMeasure};
use crate::domain::types::{
    NaicsCodeType, OperatingStatus, ValidationStatus, FUGITIVE_RELEASE_POINT_TYPE_CODE,
    LANDFILL_SOURCE_TYPE_CODE,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// EmissionsReport
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsReport {
    pub id: i64,
    pub year: i32,
    pub eis_program_id: String,
    pub master_facility_id: i64,
    pub validation_status: ValidationStatus,
    pub facility_site: FacilitySite,
}

impl EmissionsReport {
    /// Every emission in the report, in tree order
    pub fn emissions(&self) -> impl Iterator<Item = &Emission> {
        self.facility_site.reporting_periods().flat_map(|p| p.emissions.iter())
    }
}

// ==========================================
// FacilitySite
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilitySite {
    pub id: i64,
    pub name: String,
    pub status: OperatingStatus,
    pub status_year: Option<i32>,
    pub source_type: Option<CodeDescription>,
    pub county: Option<County>,
    pub state_code: Option<String>,
    pub postal_code: Option<String>,
    pub mailing_postal_code: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub naics: Vec<FacilityNaics>,
    pub contacts: Vec<FacilitySiteContact>,
    pub emissions_units: Vec<EmissionsUnit>,
    pub release_points: Vec<ReleasePoint>,
    pub controls: Vec<Control>,
    pub control_paths: Vec<ControlPath>,
}

impl FacilitySite {
    pub fn is_landfill(&self) -> bool {
        self.source_type
            .as_ref()
            .map(|s| s.has_code(LANDFILL_SOURCE_TYPE_CODE))
            .unwrap_or(false)
    }

    pub fn processes(&self) -> impl Iterator<Item = &EmissionsProcess> {
        self.emissions_units.iter().flat_map(|u| u.processes.iter())
    }

    pub fn reporting_periods(&self) -> impl Iterator<Item = &ReportingPeriod> {
        self.processes().flat_map(|p| p.reporting_periods.iter())
    }

    pub fn release_point(&self, id: i64) -> Option<&ReleasePoint> {
        self.release_points.iter().find(|rp| rp.id == id)
    }

    pub fn control(&self, id: i64) -> Option<&Control> {
        self.controls.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityNaics {
    pub id: i64,
    pub naics: NaicsCode,
    pub naics_type: NaicsCodeType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilitySiteContact {
    pub id: i64,
    pub contact_type: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub postal_code: Option<String>,
    pub mailing_postal_code: Option<String>,
    pub county: Option<County>,
    pub state_code: Option<String>,
}

impl FacilitySiteContact {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

// ==========================================
// ReleasePoint
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleasePoint {
    pub id: i64,
    pub release_point_identifier: String,
    pub description: Option<String>,
    pub type_code: Option<CodeDescription>,
    pub status: OperatingStatus,
    pub status_year: Option<i32>,

    // Stack dimensions
    pub stack_height: Option<Decimal>,
    pub stack_height_uom: Option<UnitMeasure>,
    pub stack_diameter: Option<Decimal>,
    pub stack_diameter_uom: Option<UnitMeasure>,
    pub stack_length: Option<Decimal>,
    pub stack_length_uom: Option<UnitMeasure>,
    pub stack_width: Option<Decimal>,
    pub stack_width_uom: Option<UnitMeasure>,

    // Exit gas
    pub exit_gas_temperature: Option<i32>,
    pub exit_gas_velocity: Option<Decimal>,
    pub exit_gas_velocity_uom: Option<UnitMeasure>,
    pub exit_gas_flow_rate: Option<Decimal>,
    pub exit_gas_flow_uom: Option<UnitMeasure>,

    // Fugitive dimensions
    pub fugitive_height: Option<Decimal>,
    pub fugitive_height_uom: Option<UnitMeasure>,
    pub fugitive_length: Option<Decimal>,
    pub fugitive_length_uom: Option<UnitMeasure>,
    pub fugitive_width: Option<Decimal>,
    pub fugitive_width_uom: Option<UnitMeasure>,
    pub fugitive_angle: Option<i32>,

    pub fence_line_distance: Option<Decimal>,
    pub fence_line_uom: Option<UnitMeasure>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
}

impl ReleasePoint {
    pub fn is_fugitive(&self) -> bool {
        self.type_code
            .as_ref()
            .map(|t| t.has_code(FUGITIVE_RELEASE_POINT_TYPE_CODE))
            .unwrap_or(false)
    }
}

// ==========================================
// Control
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub id: i64,
    pub identifier: String,
    pub description: Option<String>,
    pub status: OperatingStatus,
    pub status_year: Option<i32>,
    pub percent_control: Option<Decimal>,
    pub percent_capture: Option<Decimal>,
}

// ==========================================
// ControlPath
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPath {
    pub id: i64,
    pub path_identifier: String,
    pub description: Option<String>,
    pub percent_control: Option<Decimal>,
    pub assignments: Vec<ControlAssignment>,
}

/// One step of a control path: a control device or a nested child path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlAssignment {
    pub id: i64,
    pub sequence_number: i32,
    pub control_id: Option<i64>,
    pub control_path_child_id: Option<i64>,
    pub percent_apportionment: Decimal,
}
