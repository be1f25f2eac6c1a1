// ==========================================
// CAERS Core - Validation Layer
// ==========================================
// Responsibility: rule catalogs, report walk, result aggregation
// Rules read the report tree and lookups; they never mutate
// ==========================================

pub mod context;
pub mod engine;
pub mod error;
pub mod feature;
pub mod federal;
pub mod field;
pub mod result;
pub mod slt;

pub use context::{
    ControlPathScope, ControlScope, EmissionScope, FacilityScope, PeriodScope, ProcessScope,
    ReleasePointScope, UnitScope, ValidationScope, ValidationSettings, Validator, ValidatorContext,
};
pub use engine::{ValidationEngine, ValidationRegistry};
pub use error::{RuleResult, ValidationError};
pub use feature::ValidationFeature;
pub use field::ValidationField;
pub use result::{Severity, ValidationDetail, ValidationEntry, ValidationResult, Violation};
