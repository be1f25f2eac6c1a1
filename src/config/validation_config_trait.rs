// ==========================================
// CAERS Core - Validation Config Reader Trait
// ==========================================
// Responsibility: configuration the calculation and validation
// layers read (no writes, no business logic)
// Implementors: ConfigManager, test mocks
// ==========================================

use crate::config::error::ConfigResult;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

pub trait ValidationConfigReader: Send + Sync {
    /// Relative tolerance above which a calculated/reported mismatch is an error
    ///
    /// # Default
    /// - 0.05
    fn get_error_tolerance(&self) -> ConfigResult<Decimal>;

    /// Relative tolerance above which a mismatch is a warning
    ///
    /// # Default
    /// - 0.01
    fn get_warning_tolerance(&self) -> ConfigResult<Decimal>;

    /// Release point coordinate tolerance in degrees when no per-facility override exists
    ///
    /// # Default
    /// - 0.003
    fn get_default_coordinate_tolerance(&self) -> ConfigResult<Decimal>;

    /// Upper-cased feature names enabled for a validation run
    ///
    /// # Default
    /// - {"FEDERAL"}
    fn get_enabled_features(&self) -> ConfigResult<BTreeSet<String>>;

    /// Percent change in an emission total vs. the prior year that the SLT rules flag
    ///
    /// # Default
    /// - 50
    fn get_slt_change_threshold(&self) -> ConfigResult<Decimal>;
}
