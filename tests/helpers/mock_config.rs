// ==========================================
// Mock config - integration tests
// ==========================================

#![allow(dead_code)]

use caers_core::config::{ConfigError, ConfigResult, ValidationConfigReader};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub error_tolerance: Decimal,
    pub warning_tolerance: Decimal,
    pub coordinate_tolerance: Decimal,
    pub features: BTreeSet<String>,
    pub slt_change_threshold: Decimal,
    pub fail_features: bool,
}

impl MockConfig {
    pub fn default() -> Self {
        Self {
            error_tolerance: dec!(0.05),
            warning_tolerance: dec!(0.01),
            coordinate_tolerance: dec!(0.003),
            features: BTreeSet::from(["FEDERAL".to_string()]),
            slt_change_threshold: dec!(50),
            fail_features: false,
        }
    }

    /// Federal and SLT rules with the given change threshold
    pub fn with_slt(threshold: Decimal) -> Self {
        let mut config = Self::default();
        config.features.insert("SLT".to_string());
        config.slt_change_threshold = threshold;
        config
    }

    /// Feature lookup fails, as a broken config store would
    pub fn broken() -> Self {
        let mut config = Self::default();
        config.fail_features = true;
        config
    }
}

impl ValidationConfigReader for MockConfig {
    fn get_error_tolerance(&self) -> ConfigResult<Decimal> {
        Ok(self.error_tolerance)
    }

    fn get_warning_tolerance(&self) -> ConfigResult<Decimal> {
        Ok(self.warning_tolerance)
    }

    fn get_default_coordinate_tolerance(&self) -> ConfigResult<Decimal> {
        Ok(self.coordinate_tolerance)
    }

    fn get_enabled_features(&self) -> ConfigResult<BTreeSet<String>> {
        if self.fail_features {
            return Err(ConfigError::LockPoisoned);
        }
        Ok(self.features.clone())
    }

    fn get_slt_change_threshold(&self) -> ConfigResult<Decimal> {
        Ok(self.slt_change_threshold)
    }
}
