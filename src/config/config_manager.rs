// ==========================================
// CAERS Core - Config Manager
// ==========================================
// Responsibility: load, query and override configuration
// Storage: in-memory key/value map, JSON snapshots
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::validation_config_trait::ValidationConfigReader;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::RwLock;
use tracing::info;

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    /// Relative difference between calculated and reported totals that is an error
    pub const EMISSIONS_TOTAL_ERROR_TOLERANCE: &str = "emissions.total.errorTolerance";
    /// Relative difference that is a warning
    pub const EMISSIONS_TOTAL_WARNING_TOLERANCE: &str = "emissions.total.warningTolerance";
    /// Degrees a release point may sit from the facility without an override
    pub const COORDINATE_DEFAULT_TOLERANCE: &str = "releasePoint.coordinate.defaultTolerance";
    /// Comma separated feature list (FEDERAL, SLT)
    pub const VALIDATION_FEATURES: &str = "validation.features";
    /// Percent change vs. the prior year that triggers the SLT warning
    pub const SLT_EMISSION_CHANGE_THRESHOLD: &str = "slt.emission.changeThresholdPercent";
}

pub const DEFAULT_ERROR_TOLERANCE: Decimal = dec!(0.05);
pub const DEFAULT_WARNING_TOLERANCE: Decimal = dec!(0.01);
pub const DEFAULT_COORDINATE_TOLERANCE: Decimal = dec!(0.003);
pub const DEFAULT_SLT_CHANGE_THRESHOLD: Decimal = dec!(50);
pub const DEFAULT_VALIDATION_FEATURES: &str = "FEDERAL";

// Keys carrying metadata in a snapshot, never restored
const META_PREFIX: &str = "__meta_";

// ==========================================
// ConfigManager
// ==========================================
#[derive(Debug, Default)]
pub struct ConfigManager {
    values: RwLock<HashMap<String, String>>,
}

impl ConfigManager {
    /// Empty manager: every getter returns its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager seeded with key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let manager = Self::new();
        for (key, value) in pairs {
            manager.set_config_value(&key.into(), &value.into())?;
        }
        Ok(manager)
    }

    /// Reads a raw value
    ///
    /// # Returns
    /// - Some(String): configured value
    /// - None: key not configured
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let values = self.values.read().map_err(|_| ConfigError::LockPoisoned)?;
        Ok(values.get(key).cloned())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Writes a value after checking it parses for keys with a known type
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        check_value(key, value)?;
        let mut values = self.values.write().map_err(|_| ConfigError::LockPoisoned)?;
        values.insert(key.to_string(), value.trim().to_string());
        Ok(())
    }

    pub fn remove_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let mut values = self.values.write().map_err(|_| ConfigError::LockPoisoned)?;
        Ok(values.remove(key))
    }

    /// Snapshot of every configured value as a JSON object string
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let values = self.values.read().map_err(|_| ConfigError::LockPoisoned)?;
        let sorted: std::collections::BTreeMap<&String, &String> = values.iter().collect();
        Ok(serde_json::to_string(&json!(sorted))?)
    }

    /// Restores values from a snapshot, overwriting existing keys
    ///
    /// # Returns
    /// - number of keys restored (metadata keys skipped)
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let restored: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        // validate everything before touching the live map
        for (key, value) in restored.iter() {
            if !key.starts_with(META_PREFIX) {
                check_value(key, value)?;
            }
        }

        let mut values = self.values.write().map_err(|_| ConfigError::LockPoisoned)?;
        let mut count = 0;
        for (key, value) in restored {
            if key.starts_with(META_PREFIX) {
                continue;
            }
            values.insert(key, value);
            count += 1;
        }
        info!(count, "configuration restored from snapshot");
        Ok(count)
    }

    // ===== Typed getters =====

    fn get_decimal(&self, key: &str, default: Decimal) -> ConfigResult<Decimal> {
        match self.get_config_value(key)? {
            Some(raw) => parse_decimal(key, &raw),
            None => Ok(default),
        }
    }
}

fn parse_decimal(key: &str, raw: &str) -> ConfigResult<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_features(key: &str, raw: &str) -> ConfigResult<BTreeSet<String>> {
    let mut features = BTreeSet::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let feature = part.to_ascii_uppercase();
        if feature != "FEDERAL" && feature != "SLT" {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
                reason: format!("unknown feature '{}'", part),
            });
        }
        features.insert(feature);
    }
    Ok(features)
}

fn check_value(key: &str, value: &str) -> ConfigResult<()> {
    match key {
        config_keys::EMISSIONS_TOTAL_ERROR_TOLERANCE | config_keys::EMISSIONS_TOTAL_WARNING_TOLERANCE => {
            let tolerance = parse_decimal(key, value)?;
            if tolerance < Decimal::ZERO || tolerance > Decimal::ONE {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason: "tolerance must be between 0 and 1".to_string(),
                });
            }
            Ok(())
        }
        config_keys::COORDINATE_DEFAULT_TOLERANCE | config_keys::SLT_EMISSION_CHANGE_THRESHOLD => {
            let number = parse_decimal(key, value)?;
            if number < Decimal::ZERO {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason: "must not be negative".to_string(),
                });
            }
            Ok(())
        }
        config_keys::VALIDATION_FEATURES => parse_features(key, value).map(|_| ()),
        _ => Ok(()),
    }
}

impl ValidationConfigReader for ConfigManager {
    fn get_error_tolerance(&self) -> ConfigResult<Decimal> {
        self.get_decimal(config_keys::EMISSIONS_TOTAL_ERROR_TOLERANCE, DEFAULT_ERROR_TOLERANCE)
    }

    fn get_warning_tolerance(&self) -> ConfigResult<Decimal> {
        self.get_decimal(config_keys::EMISSIONS_TOTAL_WARNING_TOLERANCE, DEFAULT_WARNING_TOLERANCE)
    }

    fn get_default_coordinate_tolerance(&self) -> ConfigResult<Decimal> {
        self.get_decimal(config_keys::COORDINATE_DEFAULT_TOLERANCE, DEFAULT_COORDINATE_TOLERANCE)
    }

    fn get_enabled_features(&self) -> ConfigResult<BTreeSet<String>> {
        let raw = self.get_config_or_default(config_keys::VALIDATION_FEATURES, DEFAULT_VALIDATION_FEATURES)?;
        parse_features(config_keys::VALIDATION_FEATURES, &raw)
    }

    fn get_slt_change_threshold(&self) -> ConfigResult<Decimal> {
        self.get_decimal(config_keys::SLT_EMISSION_CHANGE_THRESHOLD, DEFAULT_SLT_CHANGE_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = ConfigManager::new();
        assert_eq!(config.get_error_tolerance().unwrap(), dec!(0.05));
        assert_eq!(config.get_warning_tolerance().unwrap(), dec!(0.01));
        assert_eq!(config.get_default_coordinate_tolerance().unwrap(), dec!(0.003));
        assert_eq!(
            config.get_enabled_features().unwrap(),
            BTreeSet::from(["FEDERAL".to_string()])
        );
    }

    #[test]
    fn test_override_values() {
        let config = ConfigManager::from_pairs([
            (config_keys::EMISSIONS_TOTAL_WARNING_TOLERANCE, "0.02"),
            (config_keys::VALIDATION_FEATURES, "federal, slt"),
        ])
        .unwrap();

        assert_eq!(config.get_warning_tolerance().unwrap(), dec!(0.02));
        assert_eq!(config.get_enabled_features().unwrap().len(), 2);
    }

    #[test]
    fn test_out_of_range_tolerance_rejected() {
        let config = ConfigManager::new();
        let err = config
            .set_config_value(config_keys::EMISSIONS_TOTAL_ERROR_TOLERANCE, "1.5")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(config.get_error_tolerance().unwrap(), DEFAULT_ERROR_TOLERANCE);
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let config = ConfigManager::new();
        assert!(config
            .set_config_value(config_keys::VALIDATION_FEATURES, "FEDERAL,STATE")
            .is_err());
    }

    #[test]
    fn test_snapshot_round_trip_skips_meta() {
        let source = ConfigManager::from_pairs([
            (config_keys::EMISSIONS_TOTAL_ERROR_TOLERANCE, "0.1"),
            ("custom.key", "value"),
        ])
        .unwrap();
        let snapshot = source.get_config_snapshot().unwrap();

        let mut with_meta: HashMap<String, String> = serde_json::from_str(&snapshot).unwrap();
        with_meta.insert("__meta_label".to_string(), "2024 baseline".to_string());
        let snapshot = serde_json::to_string(&with_meta).unwrap();

        let target = ConfigManager::new();
        assert_eq!(target.restore_config_from_snapshot(&snapshot).unwrap(), 2);
        assert_eq!(target.get_error_tolerance().unwrap(), dec!(0.1));
        assert_eq!(target.get_config_value("__meta_label").unwrap(), None);
    }

    #[test]
    fn test_invalid_snapshot_leaves_config_untouched() {
        let config = ConfigManager::from_pairs([("custom.key", "before")]).unwrap();
        let snapshot = r#"{"custom.key":"after","emissions.total.errorTolerance":"abc"}"#;

        assert!(config.restore_config_from_snapshot(snapshot).is_err());
        assert_eq!(config.get_config_value("custom.key").unwrap(), Some("before".to_string()));
    }
}
