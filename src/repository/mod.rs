// ==========================================
// CAERS Core - Lookup Layer
// ==========================================
// Responsibility: read-only access to reference data, coordinate
// tolerances and prior-year reports
// No writes, no persistence strategy
// ==========================================

pub mod coordinate_tolerance;
pub mod error;
pub mod lookups;
pub mod prior_year;
pub mod reference_data;

pub use coordinate_tolerance::{CoordinateToleranceLookup, InMemoryCoordinateTolerances};
pub use error::{LookupError, LookupResult};
pub use lookups::Lookups;
pub use prior_year::{
    InMemoryPriorReports, PriorEmission, PriorEntityStatus, PriorProcess, PriorYearLookup,
};
pub use reference_data::{InMemoryReferenceData, ReferenceDataLookup};
