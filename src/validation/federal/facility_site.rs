// ==========================================
// CAERS Core - Facility Site Rules
// ==========================================
// Status year, county/state, contact formats, NAICS,
// and the shutdown cascade onto units, release points
// and controls (landfills exempt)
// ==========================================

use crate::domain::facility::{FacilitySite, FacilitySiteContact};
use crate::domain::types::{NaicsCodeType, OperatingStatus, EMISSIONS_INVENTORY_CONTACT_TYPE};
use crate::validation::context::{
    control_detail, release_point_detail, unit_detail, FacilityScope, ValidationScope, Validator,
    ValidatorContext,
};
use crate::validation::error::RuleResult;
use crate::validation::federal::format::{is_blank, is_valid_email, is_valid_phone, is_valid_postal_code};
use crate::validation::field::ValidationField;
use crate::validation::result::{ValidationDetail, Violation};
use std::collections::BTreeMap;

const MIN_STATUS_YEAR: i32 = 1900;

pub struct FacilitySiteValidator;

impl<'r> Validator<FacilityScope<'r>> for FacilitySiteValidator {
    fn name(&self) -> &'static str {
        "federal.facility_site"
    }

    fn validate(&self, scope: &FacilityScope<'r>, _ctx: &ValidatorContext<'_>) -> RuleResult<Vec<Violation>> {
        let facility = scope.facility;
        let year = scope.report.year;
        let contact_detail = contact_detail(scope);
        let mut violations = Vec::new();

        check_status(facility, year, &mut violations);
        check_county(facility, year, &mut violations);

        if let Some(source_type) = facility.source_type.as_ref().filter(|s| s.is_legacy(year)) {
            violations.push(
                Violation::error(ValidationField::FacilitySourceTypeCode, "facilitySite.sourceTypeCode.legacy")
                    .with_arg(&source_type.description),
            );
        }

        check_contact_formats(facility, &contact_detail, &mut violations);
        check_naics(facility, year, &mut violations);
        check_contacts(facility, year, &contact_detail, &mut violations);

        if !facility.is_landfill() {
            check_shutdown_cascade(facility, &mut violations);
        }

        if let (Some(status_year), Some(_)) = (facility.status_year, facility.source_type.as_ref()) {
            if !facility.is_landfill() && status_year <= year && !facility.status.is_operating() {
                violations.push(Violation::warning(
                    ValidationField::FacilityEmissionReported,
                    "facilitysite.reportedEmissions.invalidWarning",
                ));
            }
        }

        if matches!(
            facility.status,
            OperatingStatus::OperatingNonpoint | OperatingStatus::OperatingNotReporting
        ) {
            violations.push(
                Violation::error(ValidationField::FacilityStatus, "facilitySite.status.invalid")
                    .with_arg(facility.status.description()),
            );
        }

        Ok(violations)
    }
}

fn contact_detail(scope: &FacilityScope<'_>) -> ValidationDetail {
    let mut detail = scope.detail();
    detail.description = "Facility Contact".to_string();
    detail
}

fn check_status(facility: &FacilitySite, year: i32, violations: &mut Vec<Violation>) {
    if !facility.status.is_operating() && facility.status_year.is_none() {
        violations.push(Violation::error(ValidationField::FacilityStatus, "facilitysite.status.required"));
    }

    if let Some(status_year) = facility.status_year {
        if !(MIN_STATUS_YEAR..=year).contains(&status_year) {
            violations.push(
                Violation::error(ValidationField::FacilityStatus, "facilitysite.status.range").with_arg(year),
            );
        }
    }
}

fn check_county(facility: &FacilitySite, year: i32, violations: &mut Vec<Violation>) {
    let Some(county) = facility.county.as_ref() else {
        violations.push(Violation::error(ValidationField::FacilityCounty, "facilitySite.county.required"));
        return;
    };

    if facility.state_code.as_deref() != Some(county.state_code.as_str()) {
        violations.push(
            Violation::error(ValidationField::FacilityCounty, "facilitySite.county.invalidState")
                .with_arg(&county.name)
                .with_arg(facility.state_code.as_deref().unwrap_or("")),
        );
    }

    if county.is_legacy(year) {
        violations.push(
            Violation::error(ValidationField::FacilityCounty, "facilitysite.county.legacy").with_arg(&county.name),
        );
    }
}

fn check_contact_formats(facility: &FacilitySite, contact_detail: &ValidationDetail, violations: &mut Vec<Violation>) {
    let contact_error = |field: ValidationField, key: &str| Violation::error(field, key).with_detail(contact_detail.clone());

    for contact in &facility.contacts {
        let phone_ok = contact.phone.as_deref().map(is_valid_phone).unwrap_or(false);
        if !phone_ok {
            violations.push(contact_error(
                ValidationField::FacilityContactPhone,
                "facilitySite.contacts.phoneNumber.requiredFormat",
            ));
        }
    }

    for contact in &facility.contacts {
        for postal in [&contact.postal_code, &contact.mailing_postal_code] {
            if has_bad_postal(postal) {
                violations.push(contact_error(
                    ValidationField::FacilityContactPostal,
                    "facilitySite.contacts.postalCode.requiredFormat",
                ));
            }
        }
    }

    for postal in [&facility.postal_code, &facility.mailing_postal_code] {
        if has_bad_postal(postal) {
            violations.push(Violation::error(
                ValidationField::FacilityContactPostal,
                "facilitysite.postalCode.requiredFormat",
            ));
        }
    }

    for contact in &facility.contacts {
        if let Some(email) = contact.email.as_deref().filter(|e| !e.is_empty()) {
            if !is_valid_email(email) {
                violations.push(contact_error(
                    ValidationField::FacilityEmailAddress,
                    "facilitySite.contacts.emailAddress.requiredFormat",
                ));
            }
        }
    }
}

fn has_bad_postal(postal: &Option<String>) -> bool {
    match postal.as_deref() {
        Some(code) if !code.is_empty() => !is_valid_postal_code(code),
        _ => false,
    }
}

fn check_naics(facility: &FacilitySite, year: i32, violations: &mut Vec<Violation>) {
    if facility.naics.is_empty() {
        violations.push(Violation::error(ValidationField::FacilityNaics, "facilitysite.naics.required"));
    }

    for entry in &facility.naics {
        let naics = &entry.naics;
        if !naics.is_legacy(year) {
            continue;
        }
        let violation = match naics.map_to.as_deref().filter(|m| !m.is_empty()) {
            Some(map_to) => Violation::error(ValidationField::FacilityNaics, "facilitysite.naics.legacy.map")
                .with_arg(&naics.code)
                .with_arg(map_to),
            None => Violation::error(ValidationField::FacilityNaics, "facilitysite.naics.legacy").with_arg(&naics.code),
        };
        violations.push(violation);
    }

    let mut by_code: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in &facility.naics {
        *by_code.entry(entry.naics.code.as_str()).or_default() += 1;
    }
    for (code, _) in by_code.into_iter().filter(|(_, n)| *n > 1) {
        violations.push(Violation::error(ValidationField::FacilityNaics, "facilitysite.naics.duplicate").with_arg(code));
    }

    let primaries = facility
        .naics
        .iter()
        .filter(|n| n.naics_type == NaicsCodeType::Primary)
        .count();
    if primaries != 1 {
        violations.push(Violation::error(ValidationField::FacilityNaics, "facilitysite.naics.primary.required"));
    }
}

fn check_contacts(
    facility: &FacilitySite,
    year: i32,
    contact_detail: &ValidationDetail,
    violations: &mut Vec<Violation>,
) {
    let contact_error = |field: ValidationField, key: &str| Violation::error(field, key).with_detail(contact_detail.clone());

    let has_ei_contact = facility
        .contacts
        .iter()
        .any(|c| c.contact_type == EMISSIONS_INVENTORY_CONTACT_TYPE);
    if !has_ei_contact {
        violations.push(contact_error(ValidationField::FacilityContact, "facilitysite.contacts.required"));
    }

    for contact in &facility.contacts {
        if is_blank(contact.email.as_deref()) {
            violations.push(contact_error(ValidationField::FacilityContact, "facilitysite.contacts.email.required"));
        }
        check_contact_county(contact, year, contact_detail, violations);
    }
}

fn check_contact_county(
    contact: &FacilitySiteContact,
    year: i32,
    contact_detail: &ValidationDetail,
    violations: &mut Vec<Violation>,
) {
    let Some(county) = contact.county.as_ref() else {
        return;
    };

    if contact.state_code.as_deref() != Some(county.state_code.as_str()) {
        violations.push(
            Violation::error(ValidationField::FacilityContactCounty, "facilitySite.contacts.county.invalidState")
                .with_detail(contact_detail.clone())
                .with_arg(&county.name)
                .with_arg(contact.state_code.as_deref().unwrap_or("")),
        );
    }

    if county.is_legacy(year) {
        violations.push(
            Violation::error(ValidationField::FacilityContactCounty, "facilitysite.contacts.county.legacy")
                .with_detail(contact_detail.clone())
                .with_arg(&county.name),
        );
    }
}

/// A shut-down facility cannot keep running children:
/// TS needs every child TS or PS, PS needs every child PS.
fn check_shutdown_cascade(facility: &FacilitySite, violations: &mut Vec<Violation>) {
    let permanent = match facility.status {
        OperatingStatus::TemporarilyShutdown => false,
        OperatingStatus::PermanentlyShutdown => true,
        _ => return,
    };
    let suffix = if permanent { "permanentShutdown" } else { "temporarilyShutdown" };
    let still_running = |status: OperatingStatus| {
        if permanent {
            !status.is_permanently_shutdown()
        } else {
            !status.is_shutdown()
        }
    };

    for unit in facility.emissions_units.iter().filter(|u| still_running(u.status)) {
        violations.push(
            Violation::error(
                ValidationField::EmissionsUnitStatusCode,
                &format!("emissionsUnit.statusTypeCode.{suffix}"),
            )
            .with_detail(unit_detail(unit)),
        );
    }

    for release_point in facility.release_points.iter().filter(|rp| still_running(rp.status)) {
        violations.push(
            Violation::error(ValidationField::RpStatusCode, &format!("releasePoint.statusTypeCode.{suffix}"))
                .with_detail(release_point_detail(release_point)),
        );
    }

    for control in facility.controls.iter().filter(|c| still_running(c.status)) {
        violations.push(
            Violation::error(ValidationField::ControlStatusCode, &format!("control.statusTypeCode.{suffix}"))
                .with_detail(control_detail(control)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facility::{EmissionsReport, FacilityNaics};
    use crate::domain::reference::{CodeDescription, County, NaicsCode};
    use crate::domain::types::ValidationStatus;
    use crate::engine::units::UnitConversionTable;
    use crate::repository::lookups::Lookups;
    use crate::validation::context::ValidationSettings;

    fn naics(code: &str, naics_type: NaicsCodeType) -> FacilityNaics {
        FacilityNaics {
            id: 1,
            naics: NaicsCode {
                code: code.to_string(),
                description: "Industry".to_string(),
                last_inventory_year: None,
                map_to: None,
            },
            naics_type,
        }
    }

    fn contact() -> FacilitySiteContact {
        FacilitySiteContact {
            id: 1,
            contact_type: "EI".to_string(),
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            email: Some("jane.doe@example.com".to_string()),
            phone: Some("9195551234".to_string()),
            postal_code: Some("27711".to_string()),
            mailing_postal_code: None,
            county: None,
            state_code: Some("NC".to_string()),
        }
    }

    fn report() -> EmissionsReport {
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
                status_year: Some(2000),
                source_type: Some(CodeDescription::new("100", "Airport")),
                county: Some(County {
                    code: "37183".to_string(),
                    name: "Wake".to_string(),
                    state_code: "NC".to_string(),
                    last_inventory_year: None,
                }),
                state_code: Some("NC".to_string()),
                postal_code: Some("27711".to_string()),
                mailing_postal_code: None,
                latitude: None,
                longitude: None,
                naics: vec![naics("331110", NaicsCodeType::Primary)],
                contacts: vec![contact()],
                emissions_units: vec![],
                release_points: vec![],
                controls: vec![],
                control_paths: vec![],
            },
        }
    }

    fn run(report: &EmissionsReport) -> Vec<Violation> {
        let settings = ValidationSettings::default();
        let units = UnitConversionTable::standard();
        let lookups = Lookups::empty();
        let ctx = ValidatorContext::new(&settings, &units, &lookups);
        let scope = FacilityScope {
            report,
            facility: &report.facility_site,
        };
        FacilitySiteValidator.validate(&scope, &ctx).unwrap()
    }

    fn keys(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.message_key.as_str()).collect()
    }

    #[test]
    fn test_clean_facility_has_no_violations() {
        assert!(run(&report()).is_empty());
    }

    #[test]
    fn test_two_primary_naics_rejected() {
        let mut report = report();
        report.facility_site.naics.push(naics("331111", NaicsCodeType::Primary));
        let violations = run(&report);
        assert_eq!(keys(&violations), vec!["facilitysite.naics.primary.required"]);
    }

    #[test]
    fn test_duplicate_naics_reported_once_per_code() {
        let mut report = report();
        report.facility_site.naics.push(naics("331110", NaicsCodeType::Secondary));
        let violations = run(&report);
        assert_eq!(keys(&violations), vec!["facilitysite.naics.duplicate"]);
        assert_eq!(violations[0].args, vec!["331110"]);
    }

    #[test]
    fn test_county_state_mismatch() {
        let mut report = report();
        report.facility_site.state_code = Some("VA".to_string());
        let violations = run(&report);
        assert_eq!(keys(&violations), vec!["facilitySite.county.invalidState"]);
        assert_eq!(violations[0].args, vec!["Wake", "VA"]);
    }

    #[test]
    fn test_contact_formats() {
        let mut report = report();
        let contact = &mut report.facility_site.contacts[0];
        contact.phone = Some("555-1234".to_string());
        contact.postal_code = Some("2771".to_string());
        contact.email = Some("not-an-email".to_string());
        let violations = run(&report);
        assert_eq!(
            keys(&violations),
            vec![
                "facilitySite.contacts.phoneNumber.requiredFormat",
                "facilitySite.contacts.postalCode.requiredFormat",
                "facilitySite.contacts.emailAddress.requiredFormat",
            ]
        );
        assert!(violations.iter().all(|v| v.detail.as_ref().unwrap().description == "Facility Contact"));
    }

    #[test]
    fn test_missing_ei_contact() {
        let mut report = report();
        report.facility_site.contacts[0].contact_type = "TECH".to_string();
        assert_eq!(keys(&run(&report)), vec!["facilitysite.contacts.required"]);
    }

    #[test]
    fn test_shutdown_status_needs_year_and_warns() {
        let mut report = report();
        report.facility_site.status = OperatingStatus::PermanentlyShutdown;
        report.facility_site.status_year = None;
        assert_eq!(keys(&run(&report)), vec!["facilitysite.status.required"]);

        report.facility_site.status_year = Some(2019);
        let violations = run(&report);
        assert_eq!(keys(&violations), vec!["facilitysite.reportedEmissions.invalidWarning"]);
        assert!(!violations[0].is_error());
    }

    #[test]
    fn test_nonpoint_status_invalid() {
        let mut report = report();
        report.facility_site.status = OperatingStatus::OperatingNonpoint;
        report.facility_site.status_year = Some(2019);
        let violations = run(&report);
        assert!(keys(&violations).contains(&"facilitySite.status.invalid"));
    }
}
