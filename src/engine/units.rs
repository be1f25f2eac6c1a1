// ==========================================
// CAERS Core - Unit Conversion Table
// ==========================================
// Each UnitMeasure carries a calculation variable: an expression
// over bracketed base units and named derived units.
// convert(from, to) = value(from) / value(to), both in SI terms.
// The table is read-only after construction and shared by reference.
// ==========================================

use crate::domain::reference::UnitMeasure;
use crate::engine::error::{CalculationError, CalculationResult};
use crate::engine::expression::{checked_div, Expression, Symbol};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use tracing::debug;

const DAYS_PER_YEAR: Decimal = dec!(365);
const DAYS_PER_LEAP_YEAR: Decimal = dec!(366);

/// Leap-year test used by every conversion: divisible by four.
///
/// Century years are not special-cased; inventory years never reach one
/// where the Gregorian rule differs.
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0
}

// ==========================================
// UnitConversionTable
// ==========================================
#[derive(Debug, Clone)]
pub struct UnitConversionTable {
    base_units: HashMap<String, Decimal>,
    derived_units: HashMap<String, String>,
}

impl Default for UnitConversionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl UnitConversionTable {
    /// Base units in SI terms (kg, m, m2, m3, J, s) and the named derived units
    pub fn standard() -> Self {
        let base: &[(&str, Decimal)] = &[
            // mass
            ("kg", dec!(1)),
            ("g", dec!(0.001)),
            // gram spelling used in stored unit expressions; not grains
            ("gr", dec!(0.001)),
            ("mg", dec!(0.000001)),
            ("t", dec!(1000)),
            ("lb", dec!(0.45359237)),
            ("oz", dec!(0.028349523125)),
            // length
            ("m", dec!(1)),
            ("km", dec!(1000)),
            ("cm", dec!(0.01)),
            ("mm", dec!(0.001)),
            ("ft", dec!(0.3048)),
            ("inch", dec!(0.0254)),
            ("yd", dec!(0.9144)),
            ("mile", dec!(1609.344)),
            // area
            ("m2", dec!(1)),
            ("acre", dec!(4046.8564224)),
            ("ha", dec!(10000)),
            // volume
            ("m3", dec!(1)),
            ("l", dec!(0.001)),
            ("ml", dec!(0.000001)),
            ("gall", dec!(0.003785411784)),
            ("bbl", dec!(0.158987294928)),
            // energy
            ("J", dec!(1)),
            ("kJ", dec!(1000)),
            ("cal", dec!(4.1868)),
            // time
            ("s", dec!(1)),
            ("min", dec!(60)),
            ("h", dec!(3600)),
            ("day", dec!(86400)),
            ("week", dec!(604800)),
        ];
        let derived: &[(&str, &str)] = &[
            ("ft3", "[ft]^3"),
            ("sTon", "2000*[lb]"),
            ("btu", "1055.05585*[J]"),
            ("w", "[J]/[s]"),
            ("hp", "745.69987158*[J]/[s]"),
        ];

        Self {
            base_units: base.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            derived_units: derived
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Registers or replaces a base unit value
    pub fn with_base_unit(mut self, name: &str, value: Decimal) -> Self {
        self.base_units.insert(name.to_string(), value);
        self
    }

    /// Registers or replaces a named derived unit expression
    pub fn with_derived_unit(mut self, name: &str, expression: &str) -> Self {
        self.derived_units.insert(name.to_string(), expression.to_string());
        self
    }

    /// Conversion factor that turns a quantity in `from` into one in `to`.
    ///
    /// Fails when the two measures belong to different unit families.
    pub fn convert(
        &self,
        from: &UnitMeasure,
        to: &UnitMeasure,
        leap_year: bool,
    ) -> CalculationResult<Decimal> {
        if !from.is_convertible_to(to) {
            return Err(CalculationError::IncompatibleUnits {
                from: from.description.clone(),
                to: to.description.clone(),
            });
        }
        let factor = self.convert_variables(&from.calculation_variable, &to.calculation_variable, leap_year)?;
        debug!(from = %from.code, to = %to.code, %factor, leap_year, "unit conversion");
        Ok(factor)
    }

    /// Factor between two raw calculation variables, evaluated as "(1)*(from)/(to)"
    pub fn convert_variables(&self, from: &str, to: &str, leap_year: bool) -> CalculationResult<Decimal> {
        let numerator = self.evaluate(from, leap_year, 0)?;
        let denominator = self.evaluate(to, leap_year, 0)?;
        checked_div(numerator, denominator)
    }

    fn evaluate(&self, variable: &str, leap_year: bool, depth: usize) -> CalculationResult<Decimal> {
        // derived units nest at most a couple of levels
        if depth > 8 {
            return Err(CalculationError::UnknownUnit(variable.to_string()));
        }
        let expression = Expression::parse(variable)?;

        // Resolve named units first so a failure surfaces as UnknownUnit
        let mut named: HashMap<String, Decimal> = HashMap::new();
        for name in expression.variables() {
            let value = self.named_unit(&name, leap_year, depth)?;
            named.insert(name, value);
        }

        expression.evaluate(|symbol| match symbol {
            Symbol::Variable(name) => named.get(name).copied(),
            Symbol::Unit(name) => self.base_units.get(name).copied(),
        })
    }

    fn named_unit(&self, name: &str, leap_year: bool, depth: usize) -> CalculationResult<Decimal> {
        if name == "year" {
            let days = if leap_year { DAYS_PER_LEAP_YEAR } else { DAYS_PER_YEAR };
            let day = self
                .base_units
                .get("day")
                .copied()
                .ok_or_else(|| CalculationError::UnknownUnit("[day]".to_string()))?;
            return days.checked_mul(day).ok_or(CalculationError::Overflow);
        }
        match self.derived_units.get(name) {
            Some(expression) => self.evaluate(expression, leap_year, depth + 1),
            None => Err(CalculationError::UnknownUnit(name.to_string())),
        }
    }
}
