// ==========================================
// CAERS Core - Coordinate Tolerance Lookup
// ==========================================
// Per-facility override of how far a release point may sit
// from the facility coordinates, keyed by EIS program id
// ==========================================

use rust_decimal::Decimal;
use std::collections::HashMap;

pub trait CoordinateToleranceLookup: Send + Sync {
    /// None when the facility uses the default tolerance
    fn tolerance(&self, eis_program_id: &str) -> Option<Decimal>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCoordinateTolerances {
    tolerances: HashMap<String, Decimal>,
}

impl InMemoryCoordinateTolerances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, eis_program_id: &str, tolerance: Decimal) -> Self {
        self.tolerances.insert(eis_program_id.to_string(), tolerance);
        self
    }
}

impl CoordinateToleranceLookup for InMemoryCoordinateTolerances {
    fn tolerance(&self, eis_program_id: &str) -> Option<Decimal> {
        self.tolerances.get(eis_program_id).copied()
    }
}
