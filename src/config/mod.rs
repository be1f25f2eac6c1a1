// ==========================================
// CAERS Core - Config Layer
// ==========================================
// Responsibility: tolerances, feature switches, snapshots
// Storage: in-memory key/value map
// ==========================================

pub mod config_manager;
pub mod error;
pub mod validation_config_trait;

pub use config_manager::{config_keys, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use validation_config_trait::ValidationConfigReader;
