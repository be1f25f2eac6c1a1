// ==========================================
// CAERS Core - Library Root
// ==========================================
// Emissions calculation and validation for annual
// air-emissions inventory reports.
// Host applications own persistence and transport;
// this crate reads a report tree and lookups, and returns
// calculated totals and validation results.
// ==========================================

// Message catalog
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// Modules
// ==========================================

// Configuration - tolerances, feature switches
pub mod config;

// Domain - report entity tree and reference records
pub mod domain;

// Calculation - units, formulas, totals, bulk entry, copy forward
pub mod engine;

// Message localization
pub mod i18n;

// Logging setup
pub mod logging;

// Lookups - reference data, coordinate tolerances, prior years
pub mod repository;

// Validation - rule catalogs and the report walk
pub mod validation;

// ==========================================
// Re-exports
// ==========================================

pub use config::{ConfigManager, ValidationConfigReader};

pub use domain::{
    Control, ControlPath, Emission, EmissionsProcess, EmissionsReport, EmissionsUnit, FacilitySite,
    OperatingStatus, ReleasePoint, ReportingPeriod, ValidationStatus,
};

pub use engine::{
    bulk_update, copy_report_forward, CalculationError, CalculationMode, EmissionCalculator,
    UnitConversionTable,
};

pub use repository::{Lookups, LookupError};

pub use validation::{
    ValidationEngine, ValidationFeature, ValidationRegistry, ValidationResult, ValidationSettings,
};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
