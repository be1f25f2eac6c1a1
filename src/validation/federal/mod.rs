// ==========================================
// CAERS Core - Federal Rule Catalog
// ==========================================
// One rule set per entity level; registered in walk order
// ==========================================

pub mod control;
pub mod control_path;
pub mod emission;
pub mod emissions_process;
pub mod emissions_unit;
pub mod facility_site;
pub mod format;
pub mod release_point;
pub mod reporting_period;

pub use control::ControlValidator;
pub use control_path::ControlPathValidator;
pub use emission::EmissionValidator;
pub use emissions_process::EmissionsProcessValidator;
pub use emissions_unit::EmissionsUnitValidator;
pub use facility_site::FacilitySiteValidator;
pub use release_point::ReleasePointValidator;
pub use reporting_period::ReportingPeriodValidator;

use crate::validation::engine::ValidationRegistry;

/// Adds every federal rule set to the registry
pub fn register(registry: &mut ValidationRegistry) {
    registry
        .register_facility(FacilitySiteValidator)
        .register_release_point(ReleasePointValidator)
        .register_control(ControlValidator)
        .register_control_path(ControlPathValidator)
        .register_unit(EmissionsUnitValidator)
        .register_process(EmissionsProcessValidator)
        .register_period(ReportingPeriodValidator)
        .register_emission(EmissionValidator);
}
