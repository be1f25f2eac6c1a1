// ==========================================
// CAERS Core - Validation Error Types
// ==========================================
// Only hard failures live here; business-rule
// violations are entries on the ValidationResult
// ==========================================

use crate::config::error::ConfigError;
use crate::repository::error::LookupError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Lookup failed during validation: {0}")]
    Lookup(#[from] LookupError),

    #[error("Validation settings unavailable: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for a single rule set or a whole run
pub type RuleResult<T> = Result<T, ValidationError>;
