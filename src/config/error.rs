// ==========================================
// CAERS Core - Config Error Types
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config value (key={key}, value={value}): {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Config snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Config lock poisoned")]
    LockPoisoned,
}

/// Result alias
pub type ConfigResult<T> = Result<T, ConfigError>;
