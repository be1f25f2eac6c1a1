// ==========================================
// CAERS Core - Calculation Engine
// ==========================================
// Responsibility: unit conversion, formula evaluation, emission totals,
// bulk recalculation, copy forward
// No persistence, no validation verdicts
// ==========================================

pub mod bulk_entry;
pub mod copy_forward;
pub mod emission_calculator;
pub mod error;
pub mod expression;
pub mod formula;
pub mod mass_units;
pub mod rounding;
pub mod units;

pub use bulk_entry::{
    bulk_update, bulk_update_throughput, recalculate_report_emission_tons, EmissionBulkEntryHolder,
    EmissionBulkEntryRow,
};
pub use copy_forward::{copy_report_forward, IdStrategy, PreserveIds, SequentialIds};
pub use emission_calculator::{recalculate_emission_tons, CalculationMode, EmissionCalculator};
pub use error::{CalculationError, CalculationResult};
pub use expression::{Expression, Symbol};
pub use formula::{calculate_emission_formula, lookup_formula_variables, parse_formula_variables};
pub use mass_units::{convert_mass_units, convert_to_tons, MassUomConversion};
pub use rounding::{set_significant_figures, EMISSIONS_PRECISION};
pub use units::{is_leap_year, UnitConversionTable};
