// ==========================================
// CAERS Core - Validation Result
// ==========================================
// Violation: what a rule reports (field, key, severity, args)
// ValidationEntry: a violation placed on an entity and feature
// ValidationResult: every entry of one run + the verdict
// ==========================================

use crate::domain::types::{EntityType, ValidationStatus};
use crate::i18n;
use crate::validation::feature::ValidationFeature;
use crate::validation::field::ValidationField;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Severity
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Error,   // blocks the report from passing
    Warning, // reported, never blocks
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

// ==========================================
// ValidationDetail
// ==========================================
/// Which entity a violation is about, for display only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDetail {
    pub id: i64,
    pub name: String,
    pub entity_type: EntityType,
    /// Human readable location, e.g. "Emission Unit: U1, Emission Process: P1"
    pub description: String,
    pub parent_id: Option<i64>,
    pub parent_type: Option<EntityType>,
}

impl ValidationDetail {
    pub fn new(id: i64, name: impl Into<String>, entity_type: EntityType, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            entity_type,
            description: description.into(),
            parent_id: None,
            parent_type: None,
        }
    }

    pub fn with_parent(mut self, parent_id: i64, parent_type: EntityType) -> Self {
        self.parent_id = Some(parent_id);
        self.parent_type = Some(parent_type);
        self
    }
}

// ==========================================
// Violation
// ==========================================
/// One failed rule as returned by a validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: ValidationField,
    pub message_key: String,
    pub severity: Severity,
    pub args: Vec<String>,
    /// Entity override; defaults to the entity being validated
    pub detail: Option<ValidationDetail>,
}

impl Violation {
    pub fn error(field: ValidationField, message_key: &str) -> Self {
        Self::new(field, message_key, Severity::Error)
    }

    pub fn warning(field: ValidationField, message_key: &str) -> Self {
        Self::new(field, message_key, Severity::Warning)
    }

    fn new(field: ValidationField, message_key: &str, severity: Severity) -> Self {
        Self {
            field,
            message_key: message_key.to_string(),
            severity,
            args: Vec::new(),
            detail: None,
        }
    }

    pub fn with_arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.args.extend(args.into_iter().map(|a| a.to_string()));
        self
    }

    pub fn with_detail(mut self, detail: ValidationDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ==========================================
// ValidationEntry
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationEntry {
    pub field: ValidationField,
    pub message_key: String,
    pub severity: Severity,
    pub feature: ValidationFeature,
    pub detail: ValidationDetail,
    pub args: Vec<String>,
}

impl ValidationEntry {
    pub fn from_violation(violation: Violation, default_detail: &ValidationDetail, feature: ValidationFeature) -> Self {
        Self {
            field: violation.field,
            detail: violation.detail.unwrap_or_else(|| default_detail.clone()),
            message_key: violation.message_key,
            severity: violation.severity,
            feature,
            args: violation.args,
        }
    }

    /// Message rendered in the active locale, positional args as %{0}, %{1}, ...
    pub fn message(&self) -> String {
        i18n::t_positional(&self.message_key, &self.args)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ==========================================
// ValidationResult
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    entries: Vec<ValidationEntry>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, entry: ValidationEntry) {
        self.entries.push(entry);
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[ValidationEntry] {
        &self.entries
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationEntry> {
        self.entries.iter().filter(|e| e.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationEntry> {
        self.entries.iter().filter(|e| e.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// No errors at any level
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn has_any_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn status(&self) -> ValidationStatus {
        if !self.is_valid() {
            ValidationStatus::Unvalidated
        } else if self.has_any_warnings() {
            ValidationStatus::PassedWarnings
        } else {
            ValidationStatus::Passed
        }
    }

    /// Entries raised with the given message key
    pub fn with_key<'a>(&'a self, message_key: &'a str) -> impl Iterator<Item = &'a ValidationEntry> + 'a {
        self.entries.iter().filter(move |e| e.message_key == message_key)
    }

    pub fn has_key(&self, message_key: &str) -> bool {
        self.with_key(message_key).next().is_some()
    }
}
