// ==========================================
// CAERS Core - Lookup Aggregate
// ==========================================
// Bundles every read-only lookup the calculation and
// validation layers consume, so callers inject one value
// ==========================================

use std::sync::Arc;

use crate::repository::coordinate_tolerance::{CoordinateToleranceLookup, InMemoryCoordinateTolerances};
use crate::repository::prior_year::{InMemoryPriorReports, PriorYearLookup};
use crate::repository::reference_data::{InMemoryReferenceData, ReferenceDataLookup};

/// Lookup collection
///
/// - `reference`: UoM, pollutant, calculation method, formula variable codes
/// - `coordinate_tolerances`: EIS program id → coordinate tolerance
/// - `prior_years`: previous reports of the same facility
#[derive(Clone)]
pub struct Lookups {
    pub reference: Arc<dyn ReferenceDataLookup>,
    pub coordinate_tolerances: Arc<dyn CoordinateToleranceLookup>,
    pub prior_years: Arc<dyn PriorYearLookup>,
}

impl Lookups {
    pub fn new(
        reference: Arc<dyn ReferenceDataLookup>,
        coordinate_tolerances: Arc<dyn CoordinateToleranceLookup>,
        prior_years: Arc<dyn PriorYearLookup>,
    ) -> Self {
        Self {
            reference,
            coordinate_tolerances,
            prior_years,
        }
    }

    /// Empty tables, no prior reports
    pub fn empty() -> Self {
        Self {
            reference: Arc::new(InMemoryReferenceData::new()),
            coordinate_tolerances: Arc::new(InMemoryCoordinateTolerances::new()),
            prior_years: Arc::new(InMemoryPriorReports::default()),
        }
    }

    pub fn with_reference(mut self, reference: Arc<dyn ReferenceDataLookup>) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_coordinate_tolerances(mut self, tolerances: Arc<dyn CoordinateToleranceLookup>) -> Self {
        self.coordinate_tolerances = tolerances;
        self
    }

    pub fn with_prior_years(mut self, prior_years: Arc<dyn PriorYearLookup>) -> Self {
        self.prior_years = prior_years;
        self
    }
}
