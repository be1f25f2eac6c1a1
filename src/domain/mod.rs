// ==========================================
// CAERS Core - Domain Layer
// ==========================================
// Responsibility: report entity tree, reference records, type enums
// No calculation logic, no rule logic
// ==========================================

pub mod emission;
pub mod facility;
pub mod reference;
pub mod types;

pub use emission::{
    Emission, EmissionFormulaVariable, EmissionsProcess, EmissionsUnit, ReleasePointAppt,
    ReportingPeriod,
};
pub use facility::{
    Control, ControlAssignment, ControlPath, EmissionsReport, FacilityNaics, FacilitySite,
    FacilitySiteContact, ReleasePoint,
};
pub use reference::{
    CalculationMethod, CodeDescription, County, EmissionFormulaVariableCode, NaicsCode, Pollutant,
    UnitMeasure,
};
pub use types::{EntityType, NaicsCodeType, OperatingStatus, UnitType, ValidationStatus};
