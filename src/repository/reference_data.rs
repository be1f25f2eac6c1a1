// ==========================================
// CAERS Core - Reference Data Lookup
// ==========================================
// Read-only code tables, built once and shared by reference.
// Tests substitute a fixture table.
// ==========================================

use crate::domain::reference::{
    CalculationMethod, EmissionFormulaVariableCode, Pollutant, UnitMeasure,
};
use crate::repository::error::{LookupError, LookupResult};
use std::collections::HashMap;

pub trait ReferenceDataLookup: Send + Sync {
    fn unit_measure(&self, code: &str) -> Option<UnitMeasure>;

    fn pollutant(&self, code: &str) -> Option<Pollutant>;

    fn calculation_method(&self, code: &str) -> Option<CalculationMethod>;

    /// Every formula variable code, in table order
    fn formula_variable_codes(&self) -> Vec<EmissionFormulaVariableCode>;

    /// UoM that must exist, e.g. the TON target of a tons derivation
    fn require_unit_measure(&self, code: &str) -> LookupResult<UnitMeasure> {
        self.unit_measure(code).ok_or_else(|| LookupError::NotFound {
            entity: "UnitMeasure".to_string(),
            key: code.to_string(),
        })
    }
}

// ==========================================
// InMemoryReferenceData
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InMemoryReferenceData {
    unit_measures: HashMap<String, UnitMeasure>,
    pollutants: HashMap<String, Pollutant>,
    calculation_methods: HashMap<String, CalculationMethod>,
    formula_variable_codes: Vec<EmissionFormulaVariableCode>,
}

impl InMemoryReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit_measures(mut self, uoms: impl IntoIterator<Item = UnitMeasure>) -> Self {
        for uom in uoms {
            self.unit_measures.insert(uom.code.clone(), uom);
        }
        self
    }

    pub fn with_pollutants(mut self, pollutants: impl IntoIterator<Item = Pollutant>) -> Self {
        for pollutant in pollutants {
            self.pollutants.insert(pollutant.code.clone(), pollutant);
        }
        self
    }

    pub fn with_calculation_methods(mut self, methods: impl IntoIterator<Item = CalculationMethod>) -> Self {
        for method in methods {
            self.calculation_methods.insert(method.code.clone(), method);
        }
        self
    }

    pub fn with_formula_variable_codes(
        mut self,
        codes: impl IntoIterator<Item = EmissionFormulaVariableCode>,
    ) -> Self {
        self.formula_variable_codes.extend(codes);
        self
    }
}

impl ReferenceDataLookup for InMemoryReferenceData {
    fn unit_measure(&self, code: &str) -> Option<UnitMeasure> {
        self.unit_measures.get(code).cloned()
    }

    fn pollutant(&self, code: &str) -> Option<Pollutant> {
        self.pollutants.get(code).cloned()
    }

    fn calculation_method(&self, code: &str) -> Option<CalculationMethod> {
        self.calculation_methods.get(code).cloned()
    }

    fn formula_variable_codes(&self) -> Vec<EmissionFormulaVariableCode> {
        self.formula_variable_codes.clone()
    }
}
