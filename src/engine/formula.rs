// ==========================================
// CAERS Core - Emission Factor Formulas
// ==========================================
// parse_formula_variables: which known variable codes a formula uses
// calculate_emission_formula: evaluates a formula against bound values
// ==========================================

use crate::domain::emission::EmissionFormulaVariable;
use crate::domain::reference::EmissionFormulaVariableCode;
use crate::engine::error::CalculationResult;
use crate::engine::expression::{Expression, Symbol};
use crate::repository::reference_data::ReferenceDataLookup;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Finds the known variable codes embedded in a formula.
///
/// Codes are tried longest first; every occurrence of a matched code is
/// removed from the working text before shorter codes are tried, so "SUA"
/// with codes A and SU yields SU then A. Result order follows the sorted
/// code list, not position in the formula.
pub fn parse_formula_variables(
    formula: &str,
    known_codes: &[EmissionFormulaVariableCode],
) -> Vec<EmissionFormulaVariableCode> {
    let mut sorted: Vec<&EmissionFormulaVariableCode> = known_codes.iter().collect();
    // stable: equal-length codes keep their lookup order
    sorted.sort_by(|a, b| b.code.len().cmp(&a.code.len()));

    let mut working = formula.to_string();
    let mut found = Vec::new();
    for code in sorted {
        if code.code.is_empty() {
            continue;
        }
        if working.contains(code.code.as_str()) {
            working = working.replace(code.code.as_str(), "");
            found.push(code.clone());
        }
    }
    found
}

/// Evaluates an emission-factor formula with each variable bound by code.
///
/// Unbound or valueless variables are all reported in one
/// `CalculationError::MissingVariables`.
pub fn calculate_emission_formula(
    formula: &str,
    variables: &[EmissionFormulaVariable],
) -> CalculationResult<Decimal> {
    let bound: HashMap<&str, Decimal> = variables
        .iter()
        .filter_map(|v| v.value.map(|value| (v.variable_code.code.as_str(), value)))
        .collect();

    Expression::parse(formula)?.evaluate(|symbol| match symbol {
        Symbol::Variable(name) => bound.get(name).copied(),
        Symbol::Unit(_) => None,
    })
}

/// parse_formula_variables against the full code table
pub fn lookup_formula_variables(
    formula: &str,
    reference: &dyn ReferenceDataLookup,
) -> Vec<EmissionFormulaVariableCode> {
    parse_formula_variables(formula, &reference.formula_variable_codes())
}
