// ==========================================
// CAERS Core - Emission Calculator
// ==========================================
// Single pass per emission:
//   1. calculation mode (entered total / formula / factor)
//   2. unit preconditions
//   3. formula → emissions factor
//   4. factor × throughput, unit conversions, control efficiency
//   5. significant figures, tons
// Derived fields are written back onto the emission passed in.
// ==========================================

use crate::domain::emission::{Emission, ReportingPeriod};
use crate::domain::reference::UnitMeasure;
use crate::engine::error::{CalculationError, CalculationResult};
use crate::engine::formula::calculate_emission_formula;
use crate::engine::mass_units::convert_to_tons;
use crate::engine::rounding::{set_significant_figures, EMISSIONS_PRECISION};
use crate::engine::units::{is_leap_year, UnitConversionTable};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

const HUNDRED: Decimal = dec!(100);

// ==========================================
// CalculationMode
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationMode {
    TotalEntered, // direct-entry method or manual override
    Formula,      // factor derived from the formula first
    Factor,       // factor supplied directly
}

impl fmt::Display for CalculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationMode::TotalEntered => write!(f, "TOTAL_ENTERED"),
            CalculationMode::Formula => write!(f, "FORMULA"),
            CalculationMode::Factor => write!(f, "FACTOR"),
        }
    }
}

/// Unit measures a factor-based calculation needs, all present
struct CalculationUnits<'e> {
    throughput: &'e UnitMeasure,
    total: &'e UnitMeasure,
    numerator: &'e UnitMeasure,
    denominator: &'e UnitMeasure,
}

// ==========================================
// EmissionCalculator
// ==========================================
pub struct EmissionCalculator<'a> {
    units: &'a UnitConversionTable,
}

impl<'a> EmissionCalculator<'a> {
    pub fn new(units: &'a UnitConversionTable) -> Self {
        Self { units }
    }

    pub fn calculation_mode(emission: &Emission) -> CalculationResult<CalculationMode> {
        if emission.calculation_method.is_none() {
            return Err(CalculationError::invalid_argument(
                "emissionsCalcMethodCode",
                "Emissions Calculation Method must be set.",
            ));
        }
        if emission.is_total_entered() {
            Ok(CalculationMode::TotalEntered)
        } else if emission.formula_indicator {
            Ok(CalculationMode::Formula)
        } else {
            Ok(CalculationMode::Factor)
        }
    }

    /// Recomputes the emission's total (and factor, for formulas) and its tons.
    ///
    /// Entered totals are kept as given; only tons are derived for them.
    /// On error the emission is left unchanged.
    pub fn calculate_total_emissions(
        &self,
        emission: &mut Emission,
        period: &ReportingPeriod,
        report_year: i32,
    ) -> CalculationResult<()> {
        let mode = Self::calculation_mode(emission)?;
        debug!(emission_id = emission.id, %mode, "calculating emission");

        if mode == CalculationMode::TotalEntered {
            recalculate_emission_tons(emission);
            return Ok(());
        }

        let (factor, raw) = {
            let units = check_unit_preconditions(emission, period)?;
            let factor = match mode {
                CalculationMode::Formula => {
                    let formula = emission
                        .emissions_factor_formula
                        .as_deref()
                        .filter(|f| !f.trim().is_empty())
                        .ok_or_else(|| {
                            CalculationError::invalid_argument(
                                "emissionsFactorFormula",
                                "Emission Factor Formula must be set.",
                            )
                        })?;
                    calculate_emission_formula(formula, &emission.variables)?
                }
                _ => emission.emissions_factor.ok_or_else(|| {
                    CalculationError::invalid_argument("emissionsFactor", "Emission Factor must be set.")
                })?,
            };
            let raw = self.raw_total(emission, period, &units, factor, report_year)?;
            (factor, raw)
        };

        let total = set_significant_figures(raw, EMISSIONS_PRECISION)?;
        debug!(emission_id = emission.id, %factor, %raw, %total, "emission total calculated");

        emission.emissions_factor = Some(factor);
        emission.total_emissions = Some(total);
        recalculate_emission_tons(emission);
        Ok(())
    }

    /// Total implied by the emission's stored factor, before rounding.
    ///
    /// Used to compare against a reported total; never mutates.
    pub fn expected_total(
        &self,
        emission: &Emission,
        period: &ReportingPeriod,
        report_year: i32,
    ) -> CalculationResult<Decimal> {
        let units = check_unit_preconditions(emission, period)?;
        let factor = emission.emissions_factor.ok_or_else(|| {
            CalculationError::invalid_argument("emissionsFactor", "Emission Factor must be set.")
        })?;
        self.raw_total(emission, period, &units, factor, report_year)
    }

    fn raw_total(
        &self,
        emission: &Emission,
        period: &ReportingPeriod,
        units: &CalculationUnits<'_>,
        factor: Decimal,
        report_year: i32,
    ) -> CalculationResult<Decimal> {
        let throughput = period.calculation_parameter_value.ok_or_else(|| {
            CalculationError::invalid_argument(
                "calculationParameterValue",
                "Reporting Period Calculation Parameter Value must be set.",
            )
        })?;
        let leap_year = is_leap_year(report_year);

        let mut total = factor.checked_mul(throughput).ok_or(CalculationError::Overflow)?;

        if units.denominator.code != units.throughput.code {
            let conversion = self.units.convert(units.throughput, units.denominator, leap_year)?;
            total = total.checked_mul(conversion).ok_or(CalculationError::Overflow)?;
        }

        if units.numerator.code != units.total.code {
            let conversion = self.units.convert(units.numerator, units.total, leap_year)?;
            total = total.checked_mul(conversion).ok_or(CalculationError::Overflow)?;
        }

        if let Some(control_percent) = emission.overall_control_percent {
            let control_rate = HUNDRED.checked_sub(control_percent).ok_or(CalculationError::Overflow)? / HUNDRED;
            total = total.checked_mul(control_rate).ok_or(CalculationError::Overflow)?;
        }

        Ok(total)
    }
}

fn check_unit_preconditions<'e>(
    emission: &'e Emission,
    period: &'e ReportingPeriod,
) -> CalculationResult<CalculationUnits<'e>> {
    let throughput = period.calculation_parameter_uom.as_ref().ok_or_else(|| {
        CalculationError::invalid_argument(
            "calculationParameterUom",
            "Reporting Period Calculation Unit of Measure must be set.",
        )
    })?;
    let total = emission.emissions_uom.as_ref().ok_or_else(|| {
        CalculationError::invalid_argument("emissionsUomCode", "Total Emissions Unit of Measure must be set.")
    })?;
    let numerator = emission.emissions_numerator_uom.as_ref().ok_or_else(|| {
        CalculationError::invalid_argument(
            "emissionsNumeratorUom",
            "Emission Factor Numerator Unit of Measure must be set.",
        )
    })?;
    let denominator = emission.emissions_denominator_uom.as_ref().ok_or_else(|| {
        CalculationError::invalid_argument(
            "emissionsDenominatorUom",
            "Emission Factor Denominator Unit of Measure must be set.",
        )
    })?;

    if !throughput.is_convertible_to(denominator) {
        return Err(CalculationError::invalid_argument(
            "emissionsDenominatorUom",
            format!(
                "Reporting Period Calculation Unit of Measure {} cannot be converted into Emission Factor Denominator Unit of Measure {}.",
                throughput.description, denominator.description
            ),
        ));
    }
    if !numerator.is_convertible_to(total) {
        return Err(CalculationError::invalid_argument(
            "emissionsNumeratorUom",
            format!(
                "Emission Factor Numerator Unit of Measure {} cannot be converted into Total Emissions Unit of Measure {}.",
                numerator.description, total.description
            ),
        ));
    }

    Ok(CalculationUnits {
        throughput,
        total,
        numerator,
        denominator,
    })
}

/// Re-derives calculated_emissions_tons from the current total and UoM.
///
/// Returns the new value; None when the total is unset or the UoM is not a mass unit.
pub fn recalculate_emission_tons(emission: &mut Emission) -> Option<Decimal> {
    let tons = match (emission.total_emissions, emission.emissions_uom.as_ref()) {
        (Some(total), Some(uom)) => convert_to_tons(total, &uom.code),
        _ => None,
    };
    emission.calculated_emissions_tons = tons;
    tons
}
