// ==========================================
// CAERS Core - Emissions Process Rules
// ==========================================
// Release point apportionment (duplicates, status, percents),
// emissions required while operating, prior-year comparisons
// (status year, copied totals, new-but-shutdown) and status years
// ==========================================

use crate::domain::emission::{EmissionsProcess, ReleasePointAppt};
use crate::domain::types::OperatingStatus;
use crate::repository::prior_year::PriorProcess;
use crate::validation::context::{emission_detail, ProcessScope, Validator, ValidatorContext};
use crate::validation::error::RuleResult;
use crate::validation::field::ValidationField;
use crate::validation::result::Violation;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

pub struct EmissionsProcessValidator;

impl<'r> Validator<ProcessScope<'r>> for EmissionsProcessValidator {
    fn name(&self) -> &'static str {
        "federal.emissions_process"
    }

    fn validate(&self, scope: &ProcessScope<'r>, ctx: &ValidatorContext<'_>) -> RuleResult<Vec<Violation>> {
        let process = scope.process;
        let unit = scope.unit;
        let year = scope.report.year;
        let operating = process.status.is_operating();
        let landfill = scope.facility.is_landfill();
        let mut violations = Vec::new();

        check_apportionment(scope, &mut violations);

        if operating {
            for _ in process.reporting_periods.iter().filter(|p| p.emissions.is_empty()) {
                violations.push(Violation::error(
                    ValidationField::ProcessPeriodEmission,
                    "emissionsProcess.emission.required",
                ));
            }
        }

        let previous_year = ctx.previous_report_year(scope.report)?;
        let prior = match previous_year {
            Some(previous_year) => ctx.lookups.prior_years.emissions_process(
                scope.report.master_facility_id,
                previous_year,
                &unit.unit_identifier,
                &process.process_identifier,
            )?,
            None => None,
        };

        if let (Some(prior), Some(previous_year)) = (prior.as_ref(), previous_year) {
            let prior_status = &prior.status;
            if let (false, true, Some(prior_year)) = (operating, prior_status.status.is_operating(), prior_status.status_year) {
                if !landfill && process.status_year.map(|y| y <= prior_year).unwrap_or(true) {
                    violations.push(
                        Violation::error(ValidationField::ProcessStatusYear, "emissionsProcess.statusYear.invalid")
                            .with_arg(process.status.description())
                            .with_arg(process.status_year.map(|y| y.to_string()).unwrap_or_default()),
                    );
                }
            }
            if operating {
                check_copied_totals(scope, prior, previous_year, &mut violations);
            }
        }

        if process.previous_year_status == Some(OperatingStatus::PermanentlyShutdown)
            && !process.status.is_permanently_shutdown()
        {
            violations.push(Violation::error(
                ValidationField::ProcessStatusCode,
                "emissionsProcess.statusTypeCode.psPreviousYear",
            ));
        }

        if let Some(status_year) = process.status_year {
            if !(1900..=year).contains(&status_year) {
                violations.push(
                    Violation::error(ValidationField::ProcessStatusYear, "emissionsProcess.statusYear.range")
                        .with_arg(year),
                );
            }

            // Landfill processes may keep operating under a shut-down unit
            let unit_year = unit.status_year.filter(|_| unit.status.is_operating());
            if let (true, false, Some(unit_year)) = (operating, landfill, unit_year) {
                if status_year < unit_year {
                    violations.push(
                        Violation::error(ValidationField::ProcessStatusYear, "emissionsProcess.statusYear.beforeUnitYear")
                            .with_arg(&unit.unit_identifier),
                    );
                }
            }
        }

        if prior.is_none() && !operating {
            violations.push(Violation::error(
                ValidationField::ProcessStatusCode,
                "emissionsProcess.statusTypeCode.newShutdown",
            ));
        }

        Ok(violations)
    }
}

fn check_apportionment(scope: &ProcessScope<'_>, violations: &mut Vec<Violation>) {
    let process = scope.process;
    let operating = process.status.is_operating();

    let mut by_release_point: BTreeMap<i64, Vec<&ReleasePointAppt>> = BTreeMap::new();
    for appt in &process.release_point_appts {
        by_release_point.entry(appt.release_point_id).or_default().push(appt);
    }

    for (release_point_id, appts) in &by_release_point {
        let Some(release_point) = scope.facility.release_point(*release_point_id) else {
            continue;
        };
        if appts.len() > 1 {
            violations.push(
                Violation::error(ValidationField::ProcessRp, "emissionsProcess.releasePointAppts.duplicate")
                    .with_arg(&release_point.release_point_identifier),
            );
        }
        if operating && !release_point.status.is_operating() {
            violations.push(
                Violation::error(ValidationField::ProcessRp, "emissionsProcess.releasePointAppts.statusTypeCode")
                    .with_arg(&release_point.release_point_identifier)
                    .with_arg(release_point.status.description()),
            );
        }
    }

    for appt in &process.release_point_appts {
        if appt.percent < Decimal::ONE || appt.percent > dec!(100) {
            let identifier = scope
                .facility
                .release_point(appt.release_point_id)
                .map(|rp| rp.release_point_identifier.as_str())
                .unwrap_or_default();
            violations.push(
                Violation::error(ValidationField::ProcessRpPct, "emissionsProcess.releasePointAppts.percent.range")
                    .with_arg(identifier),
            );
        }
    }

    if operating {
        if total_percent(process) != Some(dec!(100)) {
            violations.push(Violation::error(
                ValidationField::ProcessRpPct,
                "emissionsProcess.releasePointAppts.percent.total",
            ));
        }
        if by_release_point.is_empty() {
            violations.push(Violation::error(
                ValidationField::ProcessRp,
                "emissionsProcess.releasePointAppts.required",
            ));
        }
    }
}

/// None when the sum does not fit in a Decimal
fn total_percent(process: &EmissionsProcess) -> Option<Decimal> {
    process
        .release_point_appts
        .iter()
        .try_fold(Decimal::ZERO, |total, appt| total.checked_add(appt.percent))
}

/// Totals identical to last year's, digit for digit, were likely carried over unedited
fn check_copied_totals(
    scope: &ProcessScope<'_>,
    prior: &PriorProcess,
    previous_year: i32,
    violations: &mut Vec<Violation>,
) {
    for period in &scope.process.reporting_periods {
        for emission in &period.emissions {
            let (Some(code), Some(total)) = (emission.pollutant_code(), emission.total_emissions) else {
                continue;
            };
            let copies = prior.emissions.iter().filter(|previous| {
                previous.pollutant_code == code
                    && previous
                        .total_emissions
                        .map(|t| t == total && t.scale() == total.scale())
                        .unwrap_or(false)
            });
            for _ in copies {
                violations.push(
                    Violation::warning(ValidationField::EmissionTotalEmissions, "emission.totalEmissions.copied")
                        .with_detail(emission_detail(scope.unit, scope.process, period, emission))
                        .with_arg(previous_year),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::emission::{Emission, EmissionsUnit, ReportingPeriod};
    use crate::domain::facility::{EmissionsReport, FacilitySite, ReleasePoint};
    use crate::domain::reference::{CodeDescription, Pollutant};
    use crate::domain::types::{EntityType, ValidationStatus};
    use crate::engine::units::UnitConversionTable;
    use crate::repository::lookups::Lookups;
    use crate::repository::prior_year::InMemoryPriorReports;
    use crate::validation::context::ValidationSettings;
    use crate::validation::result::Severity;
    use std::sync::Arc;

    fn release_point(id: i64, identifier: &str, status: OperatingStatus) -> ReleasePoint {
        ReleasePoint {
            id,
            release_point_identifier: identifier.to_string(),
            description: None,
            type_code: Some(CodeDescription::new("1", "Fugitive Area")),
            status,
            status_year: Some(2010),
            stack_height: None,
            stack_height_uom: None,
            stack_diameter: None,
            stack_diameter_uom: None,
            stack_length: None,
            stack_length_uom: None,
            stack_width: None,
            stack_width_uom: None,
            exit_gas_temperature: None,
            exit_gas_velocity: None,
            exit_gas_velocity_uom: None,
            exit_gas_flow_rate: None,
            exit_gas_flow_uom: None,
            fugitive_height: None,
            fugitive_height_uom: None,
            fugitive_length: None,
            fugitive_length_uom: None,
            fugitive_width: None,
            fugitive_width_uom: None,
            fugitive_angle: None,
            fence_line_distance: None,
            fence_line_uom: None,
            latitude: None,
            longitude: None,
        }
    }

    fn appt(id: i64, release_point_id: i64, percent: Decimal) -> ReleasePointAppt {
        ReleasePointAppt {
            id,
            release_point_id,
            control_path_id: None,
            percent,
        }
    }

    fn emission(id: i64, code: &str, total: Decimal) -> Emission {
        Emission {
            id,
            pollutant: Some(Pollutant {
                code: code.to_string(),
                name: code.to_string(),
                last_inventory_year: None,
            }),
            calculation_method: None,
            total_manual_entry: true,
            formula_indicator: false,
            emissions_factor: None,
            emissions_factor_formula: None,
            emissions_factor_text: None,
            emissions_numerator_uom: None,
            emissions_denominator_uom: None,
            emissions_uom: None,
            overall_control_percent: None,
            total_emissions: Some(total),
            calculated_emissions_tons: None,
            comments: None,
            calculation_comment: None,
            variables: vec![],
        }
    }

    fn process(status: OperatingStatus, emissions: Vec<Emission>) -> EmissionsProcess {
        EmissionsProcess {
            id: 30,
            process_identifier: "P1".to_string(),
            description: None,
            status,
            status_year: Some(2015),
            previous_year_status: None,
            scc_code: None,
            release_point_appts: vec![appt(1, 1, dec!(100))],
            reporting_periods: vec![ReportingPeriod {
                id: 100,
                period_type: Some(CodeDescription::new("A", "Annual")),
                operating_type: None,
                calculation_parameter_type: None,
                calculation_parameter_value: None,
                calculation_parameter_uom: None,
                calculation_material: None,
                fuel_use_value: None,
                fuel_use_uom: None,
                emissions,
            }],
        }
    }

    fn report(year: i32, process: EmissionsProcess) -> EmissionsReport {
        EmissionsReport {
            id: year as i64,
            year,
            eis_program_id: "EIS-1".to_string(),
            master_facility_id: 1,
            validation_status: ValidationStatus::Unvalidated,
            facility_site: FacilitySite {
                id: 10,
                name: "Plant".to_string(),
                status: OperatingStatus::Operating,
                status_year: None,
                source_type: None,
                county: None,
                state_code: None,
                postal_code: None,
                mailing_postal_code: None,
                latitude: None,
                longitude: None,
                naics: vec![],
                contacts: vec![],
                emissions_units: vec![EmissionsUnit {
                    id: 20,
                    unit_identifier: "U1".to_string(),
                    description: None,
                    status: OperatingStatus::Operating,
                    status_year: Some(2010),
                    unit_type: None,
                    design_capacity: None,
                    capacity_uom: None,
                    processes: vec![process],
                }],
                release_points: vec![
                    release_point(1, "RP1", OperatingStatus::Operating),
                    release_point(2, "RP2", OperatingStatus::TemporarilyShutdown),
                ],
                controls: vec![],
                control_paths: vec![],
            },
        }
    }

    fn run_with(report: &EmissionsReport, lookups: &Lookups) -> Vec<Violation> {
        let settings = ValidationSettings::default();
        let units = UnitConversionTable::standard();
        let ctx = ValidatorContext::new(&settings, &units, lookups);
        let unit = &report.facility_site.emissions_units[0];
        let scope = ProcessScope {
            report,
            facility: &report.facility_site,
            unit,
            process: &unit.processes[0],
        };
        EmissionsProcessValidator.validate(&scope, &ctx).unwrap()
    }

    fn run(report: &EmissionsReport) -> Vec<Violation> {
        run_with(report, &Lookups::empty())
    }

    fn keys(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.message_key.as_str()).collect()
    }

    #[test]
    fn test_operating_process_passes() {
        let report = report(2020, process(OperatingStatus::Operating, vec![emission(1, "NOX", dec!(1.5))]));
        assert!(run(&report).is_empty());
    }

    #[test]
    fn test_apportionment_rules() {
        let mut p = process(OperatingStatus::Operating, vec![emission(1, "NOX", dec!(1))]);
        p.release_point_appts = vec![appt(1, 1, dec!(40)), appt(2, 1, dec!(40)), appt(3, 2, dec!(0.5))];
        let violations = run(&report(2020, p));
        assert_eq!(
            keys(&violations),
            vec![
                "emissionsProcess.releasePointAppts.duplicate",
                "emissionsProcess.releasePointAppts.statusTypeCode",
                "emissionsProcess.releasePointAppts.percent.range",
                "emissionsProcess.releasePointAppts.percent.total",
            ]
        );
        assert_eq!(violations[1].args, vec!["RP2", "Temporarily Shutdown"]);
    }

    #[test]
    fn test_apportionment_total_past_max_is_not_100() {
        let mut p = process(OperatingStatus::Operating, vec![emission(1, "NOX", dec!(1))]);
        p.release_point_appts = vec![appt(1, 1, Decimal::MAX), appt(2, 1, Decimal::MAX)];
        let violations = run(&report(2020, p));
        assert!(keys(&violations).contains(&"emissionsProcess.releasePointAppts.percent.total"));
    }

    #[test]
    fn test_operating_process_needs_release_point_and_emissions() {
        let mut p = process(OperatingStatus::Operating, vec![]);
        p.release_point_appts.clear();
        assert_eq!(
            keys(&run(&report(2020, p))),
            vec![
                "emissionsProcess.releasePointAppts.percent.total",
                "emissionsProcess.releasePointAppts.required",
                "emissionsProcess.emission.required",
            ]
        );
    }

    #[test]
    fn test_copied_total_warns_only_on_identical_scale() {
        let prior = report(2019, process(OperatingStatus::Operating, vec![emission(1, "NOX", dec!(1.50))]));
        let lookups = Lookups::empty().with_prior_years(Arc::new(InMemoryPriorReports::new(vec![prior])));

        let copied = report(2020, process(OperatingStatus::Operating, vec![emission(2, "NOX", dec!(1.50))]));
        let violations = run_with(&copied, &lookups);
        assert_eq!(keys(&violations), vec!["emission.totalEmissions.copied"]);
        assert_eq!(violations[0].severity, Severity::Warning);
        assert_eq!(violations[0].args, vec!["2019"]);
        assert_eq!(violations[0].detail.as_ref().map(|d| d.entity_type), Some(EntityType::Emission));

        let rescaled = report(2020, process(OperatingStatus::Operating, vec![emission(2, "NOX", dec!(1.5))]));
        assert!(run_with(&rescaled, &lookups).is_empty());
    }

    #[test]
    fn test_shutdown_process_history() {
        let shutdown = |year: Option<i32>| {
            let mut p = process(OperatingStatus::TemporarilyShutdown, vec![]);
            p.status_year = year;
            p
        };
        assert_eq!(
            keys(&run(&report(2020, shutdown(Some(2020))))),
            vec!["emissionsProcess.statusTypeCode.newShutdown"]
        );

        let prior = report(2019, process(OperatingStatus::Operating, vec![]));
        let lookups = Lookups::empty().with_prior_years(Arc::new(InMemoryPriorReports::new(vec![prior])));
        let violations = run_with(&report(2020, shutdown(Some(2015))), &lookups);
        assert_eq!(keys(&violations), vec!["emissionsProcess.statusYear.invalid"]);
        assert_eq!(violations[0].args, vec!["Temporarily Shutdown", "2015"]);
    }

    #[test]
    fn test_reopened_after_permanent_shutdown() {
        let mut p = process(OperatingStatus::Operating, vec![emission(1, "NOX", dec!(1))]);
        p.previous_year_status = Some(OperatingStatus::PermanentlyShutdown);
        assert_eq!(
            keys(&run(&report(2020, p))),
            vec!["emissionsProcess.statusTypeCode.psPreviousYear"]
        );
    }

    #[test]
    fn test_status_year_before_unit_year() {
        let mut p = process(OperatingStatus::Operating, vec![emission(1, "NOX", dec!(1))]);
        p.status_year = Some(2005);
        let violations = run(&report(2020, p));
        assert_eq!(keys(&violations), vec!["emissionsProcess.statusYear.beforeUnitYear"]);
        assert_eq!(violations[0].args, vec!["U1"]);
    }
}
