// ==========================================
// CAERS Core - Emission Rules
// ==========================================
// Method-driven requirements (factor, UoMs, comments),
// formula variables, factor text, the calculated-vs-reported
// tolerance check, curie UoM, total and control percent ranges.
// Emissions of shut-down processes are not checked.
// ==========================================

use crate::domain::emission::Emission;
use crate::domain::types::{
    ASH_VARIABLE_CODE, CURIE_UOM_CODE, ENGINEERING_JUDGEMENT_METHOD_CODE, RADIONUCLIDES_POLLUTANT_CODE,
    SULFUR_VARIABLE_CODE,
};
use crate::engine::emission_calculator::EmissionCalculator;
use crate::engine::error::CalculationError;
use crate::engine::formula::calculate_emission_formula;
use crate::validation::context::{EmissionScope, Validator, ValidatorContext};
use crate::validation::error::RuleResult;
use crate::validation::federal::format::{in_range, is_blank};
use crate::validation::field::ValidationField;
use crate::validation::result::Violation;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

pub struct EmissionValidator;

impl<'r> Validator<EmissionScope<'r>> for EmissionValidator {
    fn name(&self) -> &'static str {
        "federal.emission"
    }

    fn validate(&self, scope: &EmissionScope<'r>, ctx: &ValidatorContext<'_>) -> RuleResult<Vec<Violation>> {
        let mut violations = Vec::new();
        if scope.process.status.is_shutdown() {
            return Ok(violations);
        }
        let emission = scope.emission;
        let year = scope.report.year;

        if emission.pollutant.as_ref().map(|p| p.is_legacy(year)).unwrap_or(false) {
            violations.push(Violation::error(ValidationField::EmissionPollutant, "pollutant.legacy"));
        }

        check_method_requirements(emission, &mut violations);

        if let Some(uom) = emission.emissions_uom.as_ref().filter(|u| u.legacy) {
            violations.push(
                Violation::error(ValidationField::EmissionUom, "emission.emissionsUom.legacy").with_arg(&uom.description),
            );
        }

        check_factor_units(emission, &mut violations);
        check_variables(emission, &mut violations);

        if let Some(method) = emission.calculation_method.as_ref() {
            if !method.total_direct_entry && !emission.total_manual_entry {
                if is_blank(emission.emissions_factor_text.as_deref()) {
                    let key = if method.epa_emission_factor {
                        "emission.emissionsFactorText.required.emissionsFactor.epa"
                    } else {
                        "emission.emissionsFactorText.required.emissionsFactor"
                    };
                    violations.push(Violation::error(ValidationField::EmissionEfText, key));
                }
                if emission.formula_indicator {
                    check_formula(emission, &mut violations);
                }
                check_tolerance(scope, ctx, &mut violations);
            }
        }

        if emission.pollutant_code() == Some(RADIONUCLIDES_POLLUTANT_CODE)
            && !emission.emissions_uom.as_ref().map(|u| u.has_code(CURIE_UOM_CODE)).unwrap_or(false)
        {
            violations.push(Violation::error(
                ValidationField::EmissionCurieUom,
                "emission.emissionsCurieUom.required",
            ));
        }

        if emission.total_emissions.map(|t| t < Decimal::ZERO).unwrap_or(true) {
            violations.push(Violation::error(ValidationField::EmissionTotalEmissions, "emission.totalEmissions.range"));
        }

        let control_percent = emission.overall_control_percent;
        if control_percent.map(|p| p < Decimal::ZERO || p >= dec!(100)).unwrap_or(false) {
            violations.push(Violation::error(ValidationField::EmissionControlPercent, "emission.controlPercent.range"));
        }

        if emission.total_manual_entry
            && emission.emissions_factor.is_some()
            && is_blank(emission.calculation_comment.as_deref())
        {
            violations.push(Violation::error(
                ValidationField::EmissionCalcDesc,
                "emission.calculationDescription.required",
            ));
        }

        let control_indicator = emission.calculation_method.as_ref().map(|m| m.control_indicator).unwrap_or(false);
        if control_indicator && control_percent.map(|p| !p.is_zero()).unwrap_or(false) {
            violations.push(Violation::error(
                ValidationField::EmissionControlPercent,
                "emission.controlPercent.invalid",
            ));
        }

        Ok(violations)
    }
}

fn check_method_requirements(emission: &Emission, violations: &mut Vec<Violation>) {
    let Some(method) = emission.calculation_method.as_ref() else {
        violations.push(Violation::error(
            ValidationField::EmissionCalcMethod,
            "emission.emissionsCalcMethodCode.required",
        ));
        return;
    };

    if method.total_direct_entry {
        if is_blank(emission.comments.as_deref()) && method.code == ENGINEERING_JUDGEMENT_METHOD_CODE {
            violations.push(Violation::error(ValidationField::EmissionComments, "emission.comments.required.method"));
        }
        if emission.emissions_factor.is_some() {
            violations.push(Violation::error(ValidationField::EmissionEf, "emission.emissionsFactor.banned.method"));
        }
    } else if !emission.formula_indicator && !emission.total_manual_entry && emission.emissions_factor.is_none() {
        violations.push(Violation::error(ValidationField::EmissionEf, "emission.emissionsFactor.required.method"));
    }
}

/// Factor UoMs are required alongside a factor and banned without one
fn check_factor_units(emission: &Emission, violations: &mut Vec<Violation>) {
    if emission.emissions_factor.is_some() || (emission.formula_indicator && emission.total_manual_entry) {
        if emission.emissions_factor.map(|ef| ef <= Decimal::ZERO).unwrap_or(false) {
            violations.push(Violation::error(ValidationField::EmissionEf, "emission.emissionsFactor.range"));
        }

        match emission.emissions_numerator_uom.as_ref() {
            None => violations.push(Violation::error(
                ValidationField::EmissionNumUom,
                "emission.emissionsNumeratorUom.required.emissionsFactor",
            )),
            Some(uom) if uom.legacy => violations.push(
                Violation::error(ValidationField::EmissionNumUom, "emission.emissionsNumeratorUom.legacy")
                    .with_arg(&uom.description),
            ),
            Some(_) => {}
        }

        match emission.emissions_denominator_uom.as_ref() {
            None => violations.push(Violation::error(
                ValidationField::EmissionDenomUom,
                "emission.emissionsDenominatorUom.required.emissionsFactor",
            )),
            Some(uom) if uom.legacy => violations.push(
                Violation::error(ValidationField::EmissionDenomUom, "emission.emissionsDenominatorUom.legacy")
                    .with_arg(&uom.description),
            ),
            Some(_) => {}
        }
    } else if !emission.formula_indicator {
        if emission.emissions_numerator_uom.is_some() {
            violations.push(Violation::error(
                ValidationField::EmissionNumUom,
                "emission.emissionsNumeratorUom.banned.emissionsFactor",
            ));
        }
        if emission.emissions_denominator_uom.is_some() {
            violations.push(Violation::error(
                ValidationField::EmissionDenomUom,
                "emission.emissionsDenominatorUom.banned.emissionsFactor",
            ));
        }
    }
}

fn check_variables(emission: &Emission, violations: &mut Vec<Violation>) {
    if emission.variables.is_empty() {
        return;
    }
    if !emission.formula_indicator {
        violations.push(Violation::error(
            ValidationField::EmissionFormulaVariable,
            "emission.formula.variable.invalid",
        ));
    }

    let out_of = |value: Option<Decimal>, min: Decimal, max: Decimal| value.map(|v| !in_range(v, min, max)).unwrap_or(true);
    for variable in &emission.variables {
        let key = match variable.variable_code.code.as_str() {
            ASH_VARIABLE_CODE if out_of(variable.value, dec!(0.01), dec!(30)) => "emission.formula.variable.ashRange",
            SULFUR_VARIABLE_CODE if out_of(variable.value, dec!(0.00001), dec!(10)) => {
                "emission.formula.variable.sulfurRange"
            }
            _ => continue,
        };
        violations.push(Violation::error(ValidationField::EmissionFormulaVariable, key));
    }
}

fn check_formula(emission: &Emission, violations: &mut Vec<Violation>) {
    let formula = emission.emissions_factor_formula.as_deref().unwrap_or_default();
    match calculate_emission_formula(formula, &emission.variables) {
        Ok(_) => {}
        Err(e @ CalculationError::MissingVariables { .. }) => violations.push(
            Violation::error(ValidationField::EmissionFormulaVariable, "emission.formula.variable.missing")
                .with_arg(e.missing_variables().join(", ")),
        ),
        Err(e) => {
            debug!(emission_id = emission.id, error = %e, "formula evaluation failed");
            violations.push(
                Violation::error(ValidationField::EmissionTotalEmissions, "emission.totalEmissions.calculationFailed")
                    .with_arg(e),
            );
        }
    }
}

/// Reported total against the total the stored factor implies
fn check_tolerance(scope: &EmissionScope<'_>, ctx: &ValidatorContext<'_>, violations: &mut Vec<Violation>) {
    let emission = scope.emission;
    let period = scope.period;
    let (Some(throughput_uom), Some(_), Some(numerator), Some(denominator), Some(total_uom)) = (
        period.calculation_parameter_uom.as_ref(),
        emission.emissions_factor,
        emission.emissions_numerator_uom.as_ref(),
        emission.emissions_denominator_uom.as_ref(),
        emission.emissions_uom.as_ref(),
    ) else {
        return;
    };

    let mut can_calculate = true;
    if !throughput_uom.is_convertible_to(denominator) {
        can_calculate = false;
        violations.push(
            Violation::error(ValidationField::EmissionDenomUom, "emission.emissionsDenominatorUom.mismatch")
                .with_arg(&throughput_uom.description)
                .with_arg(&denominator.description),
        );
    }
    if !numerator.is_convertible_to(total_uom) {
        can_calculate = false;
        violations.push(
            Violation::error(ValidationField::EmissionNumUom, "emission.emissionsNumeratorUom.mismatch")
                .with_arg(&numerator.description)
                .with_arg(&total_uom.description),
        );
    }
    if !can_calculate {
        return;
    }

    let expected = match EmissionCalculator::new(ctx.units).expected_total(emission, period, scope.report.year) {
        Ok(expected) => expected,
        // Missing throughput is reported on the period
        Err(CalculationError::InvalidArgument { .. }) => return,
        Err(e) => {
            debug!(emission_id = emission.id, error = %e, "expected total could not be calculated");
            violations.push(
                Violation::error(ValidationField::EmissionTotalEmissions, "emission.totalEmissions.calculationFailed")
                    .with_arg(e),
            );
            return;
        }
    };
    let Some(reported) = emission.total_emissions else {
        return;
    };

    let settings = ctx.settings;
    // a difference past Decimal::MAX is outside any band; a bound past it contains everything
    let difference = expected.checked_sub(reported).map(|d| d.abs());
    let outside = |tolerance: Decimal| match (difference, expected.checked_mul(tolerance)) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(difference), Some(bound)) => difference > bound,
    };
    let field = ValidationField::EmissionTotalEmissions;
    let key = "emission.totalEmissions.tolerance";
    let (violation, tolerance) = if outside(settings.error_tolerance) {
        (Violation::error(field, key), settings.error_tolerance)
    } else if outside(settings.warning_tolerance) {
        (Violation::warning(field, key), settings.warning_tolerance)
    } else {
        return;
    };
    violations.push(violation.with_arg(tolerance * dec!(100)).with_arg(expected));
}
