// ==========================================
// CAERS Core - SLT Rule Catalog
// ==========================================
// Agency rules; only run when the SLT feature is enabled
// ==========================================

pub mod emission_change;

pub use emission_change::EmissionChangeValidator;

use crate::validation::engine::ValidationRegistry;

pub fn register(registry: &mut ValidationRegistry) {
    registry.register_emission(EmissionChangeValidator);
}
