// ==========================================
// CAERS Core - Control Device Rules
// ==========================================
// Identifier uniqueness, status year, percent ranges,
// PS not-copied and not-on-any-path warnings
// ==========================================

use crate::domain::facility::{Control, FacilitySite};
use crate::validation::context::{ControlScope, Validator, ValidatorContext};
use crate::validation::error::RuleResult;
use crate::validation::federal::format::{in_range, is_duplicate_identifier};
use crate::validation::field::ValidationField;
use crate::validation::result::Violation;
use rust_decimal_macros::dec;

pub struct ControlValidator;

impl<'r> Validator<ControlScope<'r>> for ControlValidator {
    fn name(&self) -> &'static str {
        "federal.control"
    }

    fn validate(&self, scope: &ControlScope<'r>, _ctx: &ValidatorContext<'_>) -> RuleResult<Vec<Violation>> {
        let control = scope.control;
        let year = scope.report.year;
        let mut violations = Vec::new();

        let identifiers = scope.facility.controls.iter().map(|c| c.identifier.as_str());
        if is_duplicate_identifier(&control.identifier, identifiers) {
            violations.push(Violation::error(
                ValidationField::ControlIdentifier,
                "control.controlIdentifier.duplicate",
            ));
        }

        if !control.status.is_operating() && control.status_year.is_none() {
            violations.push(Violation::error(ValidationField::ControlStatusCode, "control.statusTypeCode.required"));
        }

        if let Some(status_year) = control.status_year {
            if !(1900..=year).contains(&status_year) {
                violations.push(
                    Violation::error(ValidationField::ControlStatusYear, "control.statusYear.range").with_arg(year),
                );
            }
        }

        if control.status.is_permanently_shutdown() {
            violations.push(Violation::warning(ValidationField::ControlStatusCode, "control.statusTypeCode.psNotCopied"));
        }

        if control.status.is_operating() {
            check_percents(control, &mut violations);

            if !is_assigned(scope.facility, control) {
                violations.push(
                    Violation::warning(ValidationField::ControlPathWarning, "control.controlPath.warning")
                        .with_arg(&control.identifier),
                );
            }
        }

        Ok(violations)
    }
}

fn check_percents(control: &Control, violations: &mut Vec<Violation>) {
    let out_of_range = |percent: Option<rust_decimal::Decimal>| {
        percent.map(|p| !in_range(p, dec!(1), dec!(100))).unwrap_or(false)
    };
    if out_of_range(control.percent_control) {
        violations.push(Violation::error(ValidationField::ControlPercentControl, "control.percentControl.range"));
    }
    if out_of_range(control.percent_capture) {
        violations.push(Violation::error(ValidationField::ControlPercentCapture, "control.percentCapture.range"));
    }
}

/// Referenced by an assignment on any control path
fn is_assigned(facility: &FacilitySite, control: &Control) -> bool {
    facility
        .control_paths
        .iter()
        .flat_map(|path| path.assignments.iter())
        .any(|assignment| assignment.control_id == Some(control.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facility::{ControlAssignment, ControlPath, EmissionsReport};
    use crate::domain::types::{OperatingStatus, ValidationStatus};
    use crate::engine::units::UnitConversionTable;
    use crate::repository::lookups::Lookups;
    use crate::validation::context::ValidationSettings;
    use crate::validation::result::Severity;

    fn control(id: i64, identifier: &str, status: OperatingStatus) -> Control {
        Control {
            id,
            identifier: identifier.to_string(),
            description: None,
            status,
            status_year: Some(2010),
            percent_control: Some(dec!(90)),
            percent_capture: Some(dec!(95)),
        }
    }

    fn path_for(control_id: i64) -> ControlPath {
        ControlPath {
            id: 50,
            path_identifier: "CP1".to_string(),
            description: None,
            percent_control: Some(dec!(90)),
            assignments: vec![ControlAssignment {
                id: 60,
                sequence_number: 1,
                control_id: Some(control_id),
                control_path_child_id: None,
                percent_apportionment: dec!(100),
            }],
        }
    }

    fn report(controls: Vec<Control>, control_paths: Vec<ControlPath>) -> EmissionsReport {
        EmissionsReport {
            id: 1,
            year: 2020,
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
                emissions_units: vec![],
                release_points: vec![],
                controls,
                control_paths,
            },
        }
    }

    fn run(report: &EmissionsReport) -> Vec<Violation> {
        let settings = ValidationSettings::default();
        let units = UnitConversionTable::standard();
        let lookups = Lookups::empty();
        let ctx = ValidatorContext::new(&settings, &units, &lookups);
        let scope = ControlScope {
            report,
            facility: &report.facility_site,
            control: &report.facility_site.controls[0],
        };
        ControlValidator.validate(&scope, &ctx).unwrap()
    }

    fn keys(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.message_key.as_str()).collect()
    }

    #[test]
    fn test_assigned_control_passes() {
        let report = report(vec![control(1, "C1", OperatingStatus::Operating)], vec![path_for(1)]);
        assert!(run(&report).is_empty());
    }

    #[test]
    fn test_unassigned_control_warns() {
        let report = report(vec![control(1, "C1", OperatingStatus::Operating)], vec![path_for(2)]);
        let violations = run(&report);
        assert_eq!(keys(&violations), vec!["control.controlPath.warning"]);
        assert_eq!(violations[0].severity, Severity::Warning);
    }

    #[test]
    fn test_percent_ranges() {
        let mut c = control(1, "C1", OperatingStatus::Operating);
        c.percent_control = Some(dec!(0.5));
        c.percent_capture = Some(dec!(101));
        assert_eq!(
            keys(&run(&report(vec![c], vec![path_for(1)]))),
            vec!["control.percentControl.range", "control.percentCapture.range"]
        );
    }

    #[test]
    fn test_shutdown_control() {
        let mut c = control(1, "C1", OperatingStatus::PermanentlyShutdown);
        c.status_year = None;
        c.percent_control = Some(dec!(500));
        let violations = run(&report(vec![c], vec![]));
        assert_eq!(
            keys(&violations),
            vec!["control.statusTypeCode.required", "control.statusTypeCode.psNotCopied"]
        );
    }

    #[test]
    fn test_duplicate_identifier() {
        let report = report(
            vec![control(1, "C1", OperatingStatus::Operating), control(2, "c1", OperatingStatus::Operating)],
            vec![path_for(1)],
        );
        assert_eq!(keys(&run(&report)), vec!["control.controlIdentifier.duplicate"]);
    }
}
