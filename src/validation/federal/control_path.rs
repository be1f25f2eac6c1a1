// ==========================================
// CAERS Core - Control Path Rules
// ==========================================
// Identifier uniqueness, percent control range,
// duplicate sequence numbers, and a warning when no
// control device is reachable through the path or its children
// ==========================================

use crate::domain::facility::{ControlPath, FacilitySite};
use crate::validation::context::{ControlPathScope, Validator, ValidatorContext};
use crate::validation::error::RuleResult;
use crate::validation::federal::format::{in_range, is_duplicate_identifier};
use crate::validation::field::ValidationField;
use crate::validation::result::Violation;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, BTreeSet};

pub struct ControlPathValidator;

impl<'r> Validator<ControlPathScope<'r>> for ControlPathValidator {
    fn name(&self) -> &'static str {
        "federal.control_path"
    }

    fn validate(&self, scope: &ControlPathScope<'r>, _ctx: &ValidatorContext<'_>) -> RuleResult<Vec<Violation>> {
        let path = scope.control_path;
        let mut violations = Vec::new();

        let identifiers = scope.facility.control_paths.iter().map(|p| p.path_identifier.as_str());
        if is_duplicate_identifier(&path.path_identifier, identifiers) {
            violations.push(Violation::error(
                ValidationField::ControlPathIdentifier,
                "controlPath.controlPathIdentifier.duplicate",
            ));
        }

        if path.percent_control.map(|p| !in_range(p, dec!(1), dec!(100))).unwrap_or(false) {
            violations.push(Violation::error(
                ValidationField::ControlPathPercentControl,
                "controlPath.percentControl.range",
            ));
        }

        let mut sequence_counts: BTreeMap<i32, usize> = BTreeMap::new();
        for assignment in &path.assignments {
            *sequence_counts.entry(assignment.sequence_number).or_default() += 1;
        }
        for (sequence_number, _) in sequence_counts.iter().filter(|(_, n)| **n > 1) {
            violations.push(
                Violation::error(
                    ValidationField::ControlPathAssignmentSequenceNumber,
                    "controlPath.assignment.sequenceNumber.duplicate",
                )
                .with_arg(sequence_number),
            );
        }

        if !reaches_control(scope.facility, path, &mut BTreeSet::new()) {
            violations.push(
                Violation::warning(
                    ValidationField::ControlPathNoControlDeviceAssignment,
                    "controlPath.assignment.notAssigned",
                )
                .with_arg(&path.path_identifier),
            );
        }

        Ok(violations)
    }
}

/// Depth-first over child paths; `visited` stops assignment cycles
fn reaches_control(facility: &FacilitySite, path: &ControlPath, visited: &mut BTreeSet<i64>) -> bool {
    if !visited.insert(path.id) {
        return false;
    }
    path.assignments.iter().any(|assignment| {
        if assignment.control_id.and_then(|id| facility.control(id)).is_some() {
            return true;
        }
        assignment
            .control_path_child_id
            .and_then(|child_id| facility.control_paths.iter().find(|p| p.id == child_id))
            .map(|child| reaches_control(facility, child, visited))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facility::{Control, ControlAssignment, EmissionsReport};
    use crate::domain::types::{OperatingStatus, ValidationStatus};
    use crate::engine::units::UnitConversionTable;
    use crate::repository::lookups::Lookups;
    use crate::validation::context::ValidationSettings;

    fn assignment(id: i64, sequence_number: i32, control_id: Option<i64>, child: Option<i64>) -> ControlAssignment {
        ControlAssignment {
            id,
            sequence_number,
            control_id,
            control_path_child_id: child,
            percent_apportionment: dec!(100),
        }
    }

    fn path(id: i64, identifier: &str, assignments: Vec<ControlAssignment>) -> ControlPath {
        ControlPath {
            id,
            path_identifier: identifier.to_string(),
            description: None,
            percent_control: Some(dec!(80)),
            assignments,
        }
    }

    fn report(control_paths: Vec<ControlPath>) -> EmissionsReport {
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
                controls: vec![Control {
                    id: 1,
                    identifier: "C1".to_string(),
                    description: None,
                    status: OperatingStatus::Operating,
                    status_year: None,
                    percent_control: None,
                    percent_capture: None,
                }],
                control_paths,
            },
        }
    }

    fn run(report: &EmissionsReport) -> Vec<Violation> {
        let settings = ValidationSettings::default();
        let units = UnitConversionTable::standard();
        let lookups = Lookups::empty();
        let ctx = ValidatorContext::new(&settings, &units, &lookups);
        let scope = ControlPathScope {
            report,
            facility: &report.facility_site,
            control_path: &report.facility_site.control_paths[0],
        };
        ControlPathValidator.validate(&scope, &ctx).unwrap()
    }

    fn keys(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.message_key.as_str()).collect()
    }

    #[test]
    fn test_control_reached_through_child_path() {
        let report = report(vec![
            path(50, "CP1", vec![assignment(1, 1, None, Some(51))]),
            path(51, "CP2", vec![assignment(2, 1, Some(1), None)]),
        ]);
        assert!(run(&report).is_empty());
    }

    #[test]
    fn test_cyclic_paths_without_control_warn() {
        let report = report(vec![
            path(50, "CP1", vec![assignment(1, 1, None, Some(51))]),
            path(51, "CP2", vec![assignment(2, 1, None, Some(50))]),
        ]);
        let violations = run(&report);
        assert_eq!(keys(&violations), vec!["controlPath.assignment.notAssigned"]);
        assert!(!violations[0].is_error());
    }

    #[test]
    fn test_duplicate_sequence_numbers_and_percent() {
        let mut p = path(50, "CP1", vec![assignment(1, 2, Some(1), None), assignment(2, 2, Some(1), None)]);
        p.percent_control = Some(dec!(0));
        let violations = run(&report(vec![p]));
        assert_eq!(
            keys(&violations),
            vec!["controlPath.percentControl.range", "controlPath.assignment.sequenceNumber.duplicate"]
        );
        assert_eq!(violations[1].args, vec!["2"]);
    }

    #[test]
    fn test_duplicate_identifier() {
        let report = report(vec![
            path(50, "CP1", vec![assignment(1, 1, Some(1), None)]),
            path(51, " cp1", vec![assignment(2, 1, Some(1), None)]),
        ]);
        assert_eq!(keys(&run(&report)), vec!["controlPath.controlPathIdentifier.duplicate"]);
    }
}
