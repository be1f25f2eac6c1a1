// ==========================================
// CAERS Core - Validator Context & Scopes
// ==========================================
// ValidationSettings: typed snapshot of the config a run reads
// ValidatorContext: settings + unit table + lookups, shared by every rule
// *Scope: one entity plus the parents a rule needs to see
// Validator: the per-entity rule-set trait
// ==========================================

use crate::config::config_manager::{
    DEFAULT_COORDINATE_TOLERANCE, DEFAULT_ERROR_TOLERANCE, DEFAULT_SLT_CHANGE_THRESHOLD,
    DEFAULT_WARNING_TOLERANCE,
};
use crate::config::error::ConfigResult;
use crate::config::validation_config_trait::ValidationConfigReader;
use crate::domain::emission::{Emission, EmissionsProcess, EmissionsUnit, ReportingPeriod};
use crate::domain::facility::{Control, ControlPath, EmissionsReport, FacilitySite, ReleasePoint};
use crate::domain::types::EntityType;
use crate::engine::units::UnitConversionTable;
use crate::repository::lookups::Lookups;
use crate::validation::error::RuleResult;
use crate::validation::feature::ValidationFeature;
use crate::validation::result::{ValidationDetail, Violation};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

// ==========================================
// ValidationSettings
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationSettings {
    pub error_tolerance: Decimal,
    pub warning_tolerance: Decimal,
    pub default_coordinate_tolerance: Decimal,
    pub slt_change_threshold: Decimal,
    pub features: BTreeSet<ValidationFeature>,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            error_tolerance: DEFAULT_ERROR_TOLERANCE,
            warning_tolerance: DEFAULT_WARNING_TOLERANCE,
            default_coordinate_tolerance: DEFAULT_COORDINATE_TOLERANCE,
            slt_change_threshold: DEFAULT_SLT_CHANGE_THRESHOLD,
            features: ValidationFeature::federal_only(),
        }
    }
}

impl ValidationSettings {
    pub fn load(config: &dyn ValidationConfigReader) -> ConfigResult<Self> {
        let codes = config.get_enabled_features()?;
        Ok(Self {
            error_tolerance: config.get_error_tolerance()?,
            warning_tolerance: config.get_warning_tolerance()?,
            default_coordinate_tolerance: config.get_default_coordinate_tolerance()?,
            slt_change_threshold: config.get_slt_change_threshold()?,
            features: ValidationFeature::parse_set(codes.iter().map(String::as_str)),
        })
    }

    pub fn with_tolerances(mut self, error_tolerance: Decimal, warning_tolerance: Decimal) -> Self {
        self.error_tolerance = error_tolerance;
        self.warning_tolerance = warning_tolerance;
        self
    }
}

// ==========================================
// ValidatorContext
// ==========================================
pub struct ValidatorContext<'a> {
    pub settings: &'a ValidationSettings,
    pub units: &'a UnitConversionTable,
    pub lookups: &'a Lookups,
}

impl<'a> ValidatorContext<'a> {
    pub fn new(settings: &'a ValidationSettings, units: &'a UnitConversionTable, lookups: &'a Lookups) -> Self {
        Self {
            settings,
            units,
            lookups,
        }
    }

    /// Coordinate tolerance for a facility, falling back to the configured default
    pub fn coordinate_tolerance(&self, eis_program_id: &str) -> Decimal {
        self.lookups
            .coordinate_tolerances
            .tolerance(eis_program_id)
            .unwrap_or(self.settings.default_coordinate_tolerance)
    }

    /// Year of the facility's most recent report before this one
    pub fn previous_report_year(&self, report: &EmissionsReport) -> RuleResult<Option<i32>> {
        Ok(self
            .lookups
            .prior_years
            .previous_report_year(report.master_facility_id, report.year)?)
    }
}

// ==========================================
// Validator
// ==========================================
/// A rule set for one entity level.
///
/// Rules never stop at the first failure: every applicable check runs and
/// all violations come back together. `Err` is reserved for lookups that fail.
pub trait Validator<S>: Send + Sync {
    fn name(&self) -> &'static str;

    fn feature(&self) -> ValidationFeature {
        ValidationFeature::Federal
    }

    fn validate(&self, scope: &S, ctx: &ValidatorContext<'_>) -> RuleResult<Vec<Violation>>;
}

/// An entity under validation; supplies the default detail for its violations
pub trait ValidationScope {
    fn detail(&self) -> ValidationDetail;
}

// ==========================================
// Scopes
// ==========================================
pub struct FacilityScope<'a> {
    pub report: &'a EmissionsReport,
    pub facility: &'a FacilitySite,
}

pub struct ReleasePointScope<'a> {
    pub report: &'a EmissionsReport,
    pub facility: &'a FacilitySite,
    pub release_point: &'a ReleasePoint,
}

pub struct ControlScope<'a> {
    pub report: &'a EmissionsReport,
    pub facility: &'a FacilitySite,
    pub control: &'a Control,
}

pub struct ControlPathScope<'a> {
    pub report: &'a EmissionsReport,
    pub facility: &'a FacilitySite,
    pub control_path: &'a ControlPath,
}

pub struct UnitScope<'a> {
    pub report: &'a EmissionsReport,
    pub facility: &'a FacilitySite,
    pub unit: &'a EmissionsUnit,
}

pub struct ProcessScope<'a> {
    pub report: &'a EmissionsReport,
    pub facility: &'a FacilitySite,
    pub unit: &'a EmissionsUnit,
    pub process: &'a EmissionsProcess,
}

pub struct PeriodScope<'a> {
    pub report: &'a EmissionsReport,
    pub facility: &'a FacilitySite,
    pub unit: &'a EmissionsUnit,
    pub process: &'a EmissionsProcess,
    pub period: &'a ReportingPeriod,
}

pub struct EmissionScope<'a> {
    pub report: &'a EmissionsReport,
    pub facility: &'a FacilitySite,
    pub unit: &'a EmissionsUnit,
    pub process: &'a EmissionsProcess,
    pub period: &'a ReportingPeriod,
    pub emission: &'a Emission,
}

impl ValidationScope for FacilityScope<'_> {
    fn detail(&self) -> ValidationDetail {
        ValidationDetail::new(
            self.facility.id,
            self.report.eis_program_id.clone(),
            EntityType::FacilitySite,
            "Facility Site",
        )
    }
}

impl ValidationScope for ReleasePointScope<'_> {
    fn detail(&self) -> ValidationDetail {
        release_point_detail(self.release_point).with_parent(self.facility.id, EntityType::FacilitySite)
    }
}

impl ValidationScope for ControlScope<'_> {
    fn detail(&self) -> ValidationDetail {
        control_detail(self.control).with_parent(self.facility.id, EntityType::FacilitySite)
    }
}

impl ValidationScope for ControlPathScope<'_> {
    fn detail(&self) -> ValidationDetail {
        ValidationDetail::new(
            self.control_path.id,
            self.control_path.path_identifier.clone(),
            EntityType::ControlPath,
            format!("Control Path: {}", self.control_path.path_identifier),
        )
        .with_parent(self.facility.id, EntityType::FacilitySite)
    }
}

impl ValidationScope for UnitScope<'_> {
    fn detail(&self) -> ValidationDetail {
        unit_detail(self.unit).with_parent(self.facility.id, EntityType::FacilitySite)
    }
}

impl ValidationScope for ProcessScope<'_> {
    fn detail(&self) -> ValidationDetail {
        process_detail(self.unit, self.process)
    }
}

impl ValidationScope for PeriodScope<'_> {
    fn detail(&self) -> ValidationDetail {
        ValidationDetail::new(
            self.period.id,
            self.process.process_identifier.clone(),
            EntityType::ReportingPeriod,
            process_description(self.unit, self.process),
        )
        .with_parent(self.process.id, EntityType::EmissionsProcess)
    }
}

impl ValidationScope for EmissionScope<'_> {
    fn detail(&self) -> ValidationDetail {
        emission_detail(self.unit, self.process, self.period, self.emission)
    }
}

// ==========================================
// Detail builders
// ==========================================
// Used directly when a rule reports on an entity other than its own

pub fn unit_detail(unit: &EmissionsUnit) -> ValidationDetail {
    ValidationDetail::new(
        unit.id,
        unit.unit_identifier.clone(),
        EntityType::EmissionsUnit,
        format!("Emissions Unit: {}", unit.unit_identifier),
    )
}

pub fn release_point_detail(release_point: &ReleasePoint) -> ValidationDetail {
    ValidationDetail::new(
        release_point.id,
        release_point.release_point_identifier.clone(),
        EntityType::ReleasePoint,
        format!("Release Point: {}", release_point.release_point_identifier),
    )
}

pub fn control_detail(control: &Control) -> ValidationDetail {
    ValidationDetail::new(
        control.id,
        control.identifier.clone(),
        EntityType::Control,
        format!("Control: {}", control.identifier),
    )
}

pub fn process_detail(unit: &EmissionsUnit, process: &EmissionsProcess) -> ValidationDetail {
    ValidationDetail::new(
        process.id,
        process.process_identifier.clone(),
        EntityType::EmissionsProcess,
        process_description(unit, process),
    )
    .with_parent(unit.id, EntityType::EmissionsUnit)
}

pub fn emission_detail(
    unit: &EmissionsUnit,
    process: &EmissionsProcess,
    period: &ReportingPeriod,
    emission: &Emission,
) -> ValidationDetail {
    ValidationDetail::new(
        emission.id,
        emission.pollutant_name(),
        EntityType::Emission,
        format!(
            "Emission Unit: {}, Emission Process: {}, Pollutant: {}",
            unit.unit_identifier,
            process.process_identifier,
            emission.pollutant_name()
        ),
    )
    .with_parent(period.id, EntityType::ReportingPeriod)
}

fn process_description(unit: &EmissionsUnit, process: &EmissionsProcess) -> String {
    format!(
        "Emission Unit: {}, Emission Process: {}",
        unit.unit_identifier, process.process_identifier
    )
}
