// ==========================================
// CAERS Core - Reporting Period Rules
// ==========================================
// Throughput basis completeness, duplicate pollutants,
// PM fraction consistency and HF vs fluorides.
// Periods of shut-down processes are not checked.
// ==========================================

use crate::domain::emission::Emission;
use crate::validation::context::{PeriodScope, Validator, ValidatorContext};
use crate::validation::error::RuleResult;
use crate::validation::field::ValidationField;
use crate::validation::result::Violation;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const PM10_FIL: &str = "PM10-FIL";
const PM10_PRI: &str = "PM10-PRI";
const PM25_FIL: &str = "PM25-FIL";
const PM25_PRI: &str = "PM25-PRI";
const PM_CON: &str = "PM-CON";
const HYDROGEN_FLUORIDE: &str = "7664393";
const FLUORIDES: &str = "16984488";

pub struct ReportingPeriodValidator;

impl<'r> Validator<PeriodScope<'r>> for ReportingPeriodValidator {
    fn name(&self) -> &'static str {
        "federal.reporting_period"
    }

    fn validate(&self, scope: &PeriodScope<'r>, _ctx: &ValidatorContext<'_>) -> RuleResult<Vec<Violation>> {
        let mut violations = Vec::new();
        if scope.process.status.is_shutdown() {
            return Ok(violations);
        }
        let period = scope.period;

        if period.operating_type.is_none() {
            violations.push(Violation::error(
                ValidationField::PeriodOperatingTypeCode,
                "reportingPeriod.operatingTypeCode.required",
            ));
        }

        match period.calculation_parameter_value {
            None => violations.push(Violation::error(
                ValidationField::PeriodCalcValue,
                "reportingPeriod.calculationParameterValue.required",
            )),
            Some(value) if value < Decimal::ZERO => violations.push(Violation::error(
                ValidationField::PeriodCalcValue,
                "reportingPeriod.calculationParameterValue.min",
            )),
            Some(_) => {}
        }

        if period.calculation_material.is_none() {
            violations.push(Violation::error(
                ValidationField::PeriodCalcMatCode,
                "reportingPeriod.calculationMaterialCode.required",
            ));
        }

        if period.calculation_parameter_type.is_none() {
            violations.push(Violation::error(
                ValidationField::PeriodCalcTypeCode,
                "reportingPeriod.calculationParameterTypeCode.required",
            ));
        }

        match period.calculation_parameter_uom.as_ref() {
            None => violations.push(Violation::error(
                ValidationField::PeriodCalcUom,
                "reportingPeriod.calculationParameterUom.required",
            )),
            Some(uom) if uom.legacy => violations.push(
                Violation::error(ValidationField::PeriodCalcUom, "reportingPeriod.calculationParameterUom.legacy")
                    .with_arg(&uom.description),
            ),
            Some(_) => {}
        }

        let by_pollutant = group_by_pollutant(&period.emissions);
        for emissions in by_pollutant.values().filter(|e| e.len() > 1) {
            violations.push(
                Violation::error(ValidationField::PeriodEmission, "reportingPeriod.emission.duplicate")
                    .with_arg(emissions[0].pollutant_name()),
            );
        }

        check_particulate_matter(&by_pollutant, &mut violations);

        let tons = |code: &str| by_pollutant.get(code).and_then(|e| e[0].calculated_emissions_tons);
        if let (Some(hf), Some(fluorides)) = (tons(HYDROGEN_FLUORIDE), tons(FLUORIDES)) {
            if hf > fluorides {
                violations.push(Violation::error(
                    ValidationField::PeriodEmission,
                    "reportingPeriod.emission.hf.greater.fluorides",
                ));
            }
        }

        if let Some(uom) = period.fuel_use_uom.as_ref().filter(|u| u.legacy) {
            violations.push(
                Violation::error(ValidationField::PeriodFuelUom, "reportingPeriod.fuelUseUom.legacy")
                    .with_arg(&uom.description),
            );
        }

        Ok(violations)
    }
}

fn group_by_pollutant(emissions: &[Emission]) -> BTreeMap<&str, Vec<&Emission>> {
    let mut groups: BTreeMap<&str, Vec<&Emission>> = BTreeMap::new();
    for emission in emissions {
        if let Some(code) = emission.pollutant_code() {
            groups.entry(code).or_default().push(emission);
        }
    }
    groups
}

/// PM fractions compared on calculated tons; the first emission of each pollutant counts
fn check_particulate_matter(by_pollutant: &BTreeMap<&str, Vec<&Emission>>, violations: &mut Vec<Violation>) {
    let tons = |code: &str| by_pollutant.get(code).and_then(|e| e[0].calculated_emissions_tons);
    let pm10_fil = tons(PM10_FIL);
    let pm10_pri = tons(PM10_PRI);
    let pm25_fil = tons(PM25_FIL);
    let pm25_pri = tons(PM25_PRI);
    let pm_con = tons(PM_CON);

    let mut fail = |key: &str| violations.push(Violation::error(ValidationField::PeriodEmission, key));
    let exceeds = |a: Option<Decimal>, b: Option<Decimal>| matches!((a, b), (Some(a), Some(b)) if a > b);

    if exceeds(pm10_fil, pm10_pri) {
        fail("reportingPeriod.emission.pm10.fil.greater.pri");
    }
    if exceeds(pm25_fil, pm25_pri) {
        fail("reportingPeriod.emission.pm25.fil.greater.pri");
    }
    if exceeds(pm_con, pm10_pri) {
        fail("reportingPeriod.emission.pm10.con.greater.pri");
    }
    if exceeds(pm_con, pm25_pri) {
        fail("reportingPeriod.emission.pm25.con.greater.pri");
    }
    if let (Some(con), Some(fil), Some(pri)) = (pm_con, pm10_fil, pm10_pri) {
        if con + fil != pri {
            fail("reportingPeriod.emission.pm10.invalid");
        }
    }
    if let (Some(con), Some(fil), Some(pri)) = (pm_con, pm25_fil, pm25_pri) {
        if con + fil != pri {
            fail("reportingPeriod.emission.pm25.invalid");
        }
    }
    if exceeds(pm25_pri, pm10_pri) {
        fail("reportingPeriod.emission.pm25.pri.greater.pm10");
    }
    if exceeds(pm25_fil, pm10_fil) {
        fail("reportingPeriod.emission.pm25.fil.greater.pm10");
    }
}
