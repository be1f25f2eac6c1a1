// ==========================================
// CAERS Core - Lookup Error Types
// ==========================================

use thiserror::Error;

/// Lookup layer error
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Record not found: {entity} with key={key}")]
    NotFound { entity: String, key: String },

    #[error("Lookup source unavailable: {0}")]
    Unavailable(String),

    /// Failures from a host-supplied backend (database, service client)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result alias
pub type LookupResult<T> = Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_passes_through() {
        let err: LookupError = anyhow::anyhow!("connection reset").into();
        assert_eq!(err.to_string(), "connection reset");
    }
}
