// ==========================================
// CAERS Core - Calculation Error Types
// ==========================================
// InvalidArgument: a precondition on the emission/period is not met
// Everything else: formula or unit evaluation failed
// ==========================================

use thiserror::Error;

/// Calculation layer error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculationError {
    // ===== Preconditions =====
    #[error("{message}")]
    InvalidArgument { field: String, message: String },

    #[error("{from} cannot be converted into {to}")]
    IncompatibleUnits { from: String, to: String },

    // ===== Formula evaluation =====
    #[error("Formula '{formula}' is missing values for: {}", .missing.join(", "))]
    MissingVariables {
        formula: String,
        missing: Vec<String>,
    },

    #[error("Formula '{formula}' is invalid at position {position}: {message}")]
    FormulaSyntax {
        formula: String,
        position: usize,
        message: String,
    },

    #[error("Unknown unit in conversion expression: {0}")]
    UnknownUnit(String),

    #[error("Only whole-number exponents are supported, got {0}")]
    UnsupportedExponent(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Numeric overflow")]
    Overflow,
}

impl CalculationError {
    pub fn invalid_argument(field: &str, message: impl Into<String>) -> Self {
        CalculationError::InvalidArgument {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Missing formula tokens, empty for every other variant
    pub fn missing_variables(&self) -> &[String] {
        match self {
            CalculationError::MissingVariables { missing, .. } => missing,
            _ => &[],
        }
    }
}

/// Result alias
pub type CalculationResult<T> = Result<T, CalculationError>;
