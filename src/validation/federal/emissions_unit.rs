// ==========================================
// CAERS Core - Emissions Unit Rules
// ==========================================
// Shutdown cascade onto processes (landfills exempt),
// new-but-shutdown and status-year against the prior report,
// design capacity, duplicate unit/process identifiers
// ==========================================

use crate::domain::emission::EmissionsUnit;
use crate::validation::context::{process_detail, UnitScope, Validator, ValidatorContext};
use crate::validation::error::RuleResult;
use crate::validation::federal::format::{duplicate_identifiers, in_range, is_duplicate_identifier};
use crate::validation::field::ValidationField;
use crate::validation::result::Violation;
use rust_decimal_macros::dec;

/// Unit types expected to report a design capacity (boilers, turbines, heaters, engines)
const CAPACITY_UNIT_TYPES: [&str; 5] = ["100", "120", "140", "160", "180"];

pub struct EmissionsUnitValidator;

impl<'r> Validator<UnitScope<'r>> for EmissionsUnitValidator {
    fn name(&self) -> &'static str {
        "federal.emissions_unit"
    }

    fn validate(&self, scope: &UnitScope<'r>, ctx: &ValidatorContext<'_>) -> RuleResult<Vec<Violation>> {
        let unit = scope.unit;
        let year = scope.report.year;
        let mut violations = Vec::new();

        if scope.facility.is_landfill() {
            check_landfill_processes(unit, &mut violations);
        } else {
            check_process_cascade(unit, &mut violations);
            if !unit.status.is_operating() {
                check_against_prior_year(scope, ctx, &mut violations)?;
            }
        }

        if !unit.status.is_operating() && unit.status_year.is_none() {
            violations.push(Violation::error(
                ValidationField::EmissionsUnitStatusCode,
                "emissionsUnit.statusTypeCode.required",
            ));
        }

        if let Some(status_year) = unit.status_year {
            if !(1900..=year).contains(&status_year) {
                violations.push(
                    Violation::error(ValidationField::EmissionsUnitStatusYear, "emissionsUnit.statusYear.range")
                        .with_arg(year),
                );
            }
        }

        let identifiers = scope.facility.emissions_units.iter().map(|u| u.unit_identifier.as_str());
        if is_duplicate_identifier(&unit.unit_identifier, identifiers) {
            violations.push(Violation::error(
                ValidationField::EmissionsUnitIdentifier,
                "emissionsUnit.unitIdentifier.duplicate",
            ));
        }

        // Shut-down units only send id, status and status year downstream
        if unit.status.is_operating() {
            check_capacity(unit, &mut violations);
        }

        for identifier in duplicate_identifiers(unit.processes.iter().map(|p| p.process_identifier.as_str())) {
            violations.push(
                Violation::error(ValidationField::EmissionsUnitProcess, "emissionsUnit.emissionsProcess.duplicate")
                    .with_arg(identifier),
            );
        }

        Ok(violations)
    }
}

/// Processes follow their unit into shutdown; PS entities are not copied forward
fn check_process_cascade(unit: &EmissionsUnit, violations: &mut Vec<Violation>) {
    if unit.status.is_shutdown() && !unit.status.is_permanently_shutdown() {
        for process in unit.processes.iter().filter(|p| !p.status.is_shutdown()) {
            violations.push(
                Violation::error(ValidationField::ProcessStatusCode, "emissionsProcess.statusTypeCode.temporarilyShutdown")
                    .with_detail(process_detail(unit, process)),
            );
        }
    }

    if unit.status.is_permanently_shutdown() {
        violations.push(Violation::warning(
            ValidationField::EmissionsUnitStatusCode,
            "emissionsUnit.statusTypeCode.psNotCopied",
        ));
        for process in &unit.processes {
            violations.push(
                Violation::warning(ValidationField::ProcessStatusCode, "emissionsProcess.statusTypeCode.notCopied")
                    .with_detail(process_detail(unit, process)),
            );
        }
        for process in unit.processes.iter().filter(|p| !p.status.is_permanently_shutdown()) {
            violations.push(
                Violation::error(ValidationField::ProcessStatusCode, "emissionsProcess.statusTypeCode.permanentShutdown")
                    .with_detail(process_detail(unit, process)),
            );
        }
    } else {
        push_ps_process_warnings(unit, violations);
    }
}

fn check_landfill_processes(unit: &EmissionsUnit, violations: &mut Vec<Violation>) {
    let all_processes_ps = unit.processes.iter().all(|p| p.status.is_permanently_shutdown());
    if all_processes_ps && unit.status.is_permanently_shutdown() {
        violations.push(Violation::warning(
            ValidationField::EmissionsUnitStatusCode,
            "emissionsUnit.statusTypeCode.psNotCopied",
        ));
    }
    push_ps_process_warnings(unit, violations);
}

fn push_ps_process_warnings(unit: &EmissionsUnit, violations: &mut Vec<Violation>) {
    for process in unit.processes.iter().filter(|p| p.status.is_permanently_shutdown()) {
        violations.push(
            Violation::warning(ValidationField::ProcessStatusCode, "emissionsProcess.statusTypeCode.psNotCopied")
                .with_detail(process_detail(unit, process)),
        );
    }
}

/// A shut-down unit must have existed last year, and shut down after it last operated
fn check_against_prior_year(
    scope: &UnitScope<'_>,
    ctx: &ValidatorContext<'_>,
    violations: &mut Vec<Violation>,
) -> RuleResult<()> {
    let unit = scope.unit;
    let prior = match ctx.previous_report_year(scope.report)? {
        Some(previous_year) => ctx.lookups.prior_years.emissions_unit(
            scope.report.master_facility_id,
            previous_year,
            &unit.unit_identifier,
        )?,
        None => None,
    };

    let Some(prior) = prior else {
        violations.push(Violation::error(
            ValidationField::EmissionsUnitStatusCode,
            "emissionsUnit.statusTypeCode.newShutdown",
        ));
        return Ok(());
    };

    if let (true, Some(prior_year)) = (prior.status.is_operating(), prior.status_year) {
        if unit.status_year.map(|y| y <= prior_year).unwrap_or(true) {
            violations.push(
                Violation::error(ValidationField::EmissionsUnitStatusYear, "emissionsUnit.statusYear.invalid")
                    .with_arg(unit.status.description())
                    .with_arg(unit.status_year.map(|y| y.to_string()).unwrap_or_default()),
            );
        }
    }
    Ok(())
}

fn check_capacity(unit: &EmissionsUnit, violations: &mut Vec<Violation>) {
    if let (Some(unit_type), None) = (unit.unit_type.as_ref(), unit.design_capacity) {
        if CAPACITY_UNIT_TYPES.contains(&unit_type.code.as_str()) {
            violations.push(
                Violation::warning(ValidationField::EmissionsUnitCapacity, "emissionsUnit.capacity.check")
                    .with_arg(&unit_type.description),
            );
        }
    }

    if unit
        .design_capacity
        .map(|c| !in_range(c, dec!(0.01), dec!(100000000)))
        .unwrap_or(false)
    {
        violations.push(Violation::error(ValidationField::EmissionsUnitCapacity, "emissionsUnit.capacity.range"));
    }

    if unit.design_capacity.is_some() != unit.capacity_uom.is_some() {
        violations.push(Violation::error(
            ValidationField::EmissionsUnitCapacity,
            "emissionsUnit.capacity.required",
        ));
    }

    if let Some(uom) = unit.capacity_uom.as_ref().filter(|u| u.legacy || !u.unit_design_capacity) {
        violations.push(
            Violation::error(ValidationField::EmissionsUnitUom, "emissionsUnit.capacity.legacy").with_arg(&uom.code),
        );
    }
}
