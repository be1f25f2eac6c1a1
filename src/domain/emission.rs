// ==========================================
// CAERS Core - Emission Entities
// ==========================================
// EmissionsUnit → EmissionsProcess → ReportingPeriod → Emission
// Children are owned lists; cross references use entity ids
// ==========================================

use crate::domain::reference::{
    CalculationMethod, CodeDescription, EmissionFormulaVariableCode, Pollutant, UnitMeasure,
};
use crate::domain::types::OperatingStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// EmissionsUnit
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsUnit {
    pub id: i64,
    pub unit_identifier: String,
    pub description: Option<String>,
    pub status: OperatingStatus,
    pub status_year: Option<i32>,
    pub unit_type: Option<CodeDescription>,
    pub design_capacity: Option<Decimal>,
    pub capacity_uom: Option<UnitMeasure>,
    pub processes: Vec<EmissionsProcess>,
}

// ==========================================
// EmissionsProcess
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsProcess {
    pub id: i64,
    pub process_identifier: String,
    pub description: Option<String>,
    pub status: OperatingStatus,
    pub status_year: Option<i32>,
    pub previous_year_status: Option<OperatingStatus>, // status carried in from the prior report
    pub scc_code: Option<String>,
    pub release_point_appts: Vec<ReleasePointAppt>,
    pub reporting_periods: Vec<ReportingPeriod>,
}

// ==========================================
// ReleasePointAppt
// ==========================================
// Share of a process's emissions routed to one release point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleasePointAppt {
    pub id: i64,
    pub release_point_id: i64,
    pub control_path_id: Option<i64>,
    pub percent: Decimal,
}

// ==========================================
// ReportingPeriod
// ==========================================
// Throughput basis for every emission below it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub id: i64,
    pub period_type: Option<CodeDescription>,
    pub operating_type: Option<CodeDescription>,
    pub calculation_parameter_type: Option<CodeDescription>,
    pub calculation_parameter_value: Option<Decimal>,
    pub calculation_parameter_uom: Option<UnitMeasure>,
    pub calculation_material: Option<CodeDescription>,
    pub fuel_use_value: Option<Decimal>,
    pub fuel_use_uom: Option<UnitMeasure>,
    pub emissions: Vec<Emission>,
}

// ==========================================
// Emission
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emission {
    pub id: i64,
    pub pollutant: Option<Pollutant>,
    pub calculation_method: Option<CalculationMethod>,
    pub total_manual_entry: bool,
    pub formula_indicator: bool,
    pub emissions_factor: Option<Decimal>,
    pub emissions_factor_formula: Option<String>,
    pub emissions_factor_text: Option<String>,
    pub emissions_numerator_uom: Option<UnitMeasure>,
    pub emissions_denominator_uom: Option<UnitMeasure>,
    pub emissions_uom: Option<UnitMeasure>,
    pub overall_control_percent: Option<Decimal>,
    pub total_emissions: Option<Decimal>,
    pub calculated_emissions_tons: Option<Decimal>, // derived, never user input
    pub comments: Option<String>,
    pub calculation_comment: Option<String>,
    pub variables: Vec<EmissionFormulaVariable>,
}

impl Emission {
    /// Total is taken from caller input: direct-entry method or manual override
    pub fn is_total_entered(&self) -> bool {
        self.total_manual_entry || self.is_direct_entry()
    }

    pub fn is_direct_entry(&self) -> bool {
        self.calculation_method
            .as_ref()
            .map(|m| m.total_direct_entry)
            .unwrap_or(false)
    }

    pub fn pollutant_code(&self) -> Option<&str> {
        self.pollutant.as_ref().map(|p| p.code.as_str())
    }

    pub fn pollutant_name(&self) -> &str {
        self.pollutant.as_ref().map(|p| p.name.as_str()).unwrap_or("")
    }

    pub fn variable(&self, code: &str) -> Option<&EmissionFormulaVariable> {
        self.variables.iter().find(|v| v.variable_code.code == code)
    }
}

// ==========================================
// EmissionFormulaVariable
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFormulaVariable {
    pub id: i64,
    pub variable_code: EmissionFormulaVariableCode,
    pub value: Option<Decimal>,
}

impl EmissionFormulaVariable {
    pub fn new(id: i64, code: &str, value: Decimal) -> Self {
        Self {
            id,
            variable_code: EmissionFormulaVariableCode::new(code, code),
            value: Some(value),
        }
    }
}
