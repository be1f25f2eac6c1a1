// ==========================================
// CAERS Core - Report Copy Forward
// ==========================================
// Clones a report tree into a new reporting year.
// Dropped: PS release points, PS controls, PS units (landfills keep
// PS units with live processes), PS processes, apportionments to
// dropped release points, control assignments with nothing left to point at.
// Ids come from an IdStrategy; every cross reference is rewritten
// through the remap tables built while copying.
// ==========================================

use crate::domain::emission::{
    Emission, EmissionFormulaVariable, EmissionsProcess, EmissionsUnit, ReleasePointAppt,
    ReportingPeriod,
};
use crate::domain::facility::{
    ControlAssignment, ControlPath, EmissionsReport, FacilitySite,
};
use crate::domain::types::{EntityType, ValidationStatus};
use std::collections::HashMap;
use tracing::info;

// ==========================================
// IdStrategy
// ==========================================

/// Supplies the id of each copied entity
pub trait IdStrategy {
    fn assign(&mut self, entity: EntityType, original_id: i64) -> i64;
}

/// Copy keeps the original ids
#[derive(Debug, Clone, Copy, Default)]
pub struct PreserveIds;

impl IdStrategy for PreserveIds {
    fn assign(&mut self, _entity: EntityType, original_id: i64) -> i64 {
        original_id
    }
}

/// Fresh ids from one counter shared by every entity type
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: i64,
}

impl SequentialIds {
    pub fn starting_at(first: i64) -> Self {
        Self { next: first }
    }
}

impl IdStrategy for SequentialIds {
    fn assign(&mut self, _entity: EntityType, _original_id: i64) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

// ==========================================
// Remap tables
// ==========================================
#[derive(Debug, Default)]
struct IdRemap {
    release_points: HashMap<i64, i64>,
    controls: HashMap<i64, i64>,
    control_paths: HashMap<i64, i64>,
}

// ==========================================
// Copy
// ==========================================

/// Copies `report` into `new_year`; the source is not modified.
pub fn copy_report_forward(
    report: &EmissionsReport,
    new_year: i32,
    ids: &mut dyn IdStrategy,
) -> EmissionsReport {
    let facility_site = copy_facility_site(&report.facility_site, ids);

    info!(
        report_id = report.id,
        from_year = report.year,
        to_year = new_year,
        units = facility_site.emissions_units.len(),
        release_points = facility_site.release_points.len(),
        "report copied forward"
    );

    EmissionsReport {
        id: ids.assign(EntityType::EmissionsReport, report.id),
        year: new_year,
        eis_program_id: report.eis_program_id.clone(),
        master_facility_id: report.master_facility_id,
        validation_status: ValidationStatus::Unvalidated,
        facility_site,
    }
}

fn copy_facility_site(source: &FacilitySite, ids: &mut dyn IdStrategy) -> FacilitySite {
    let mut remap = IdRemap::default();

    let release_points = source
        .release_points
        .iter()
        .filter(|rp| !rp.status.is_permanently_shutdown())
        .map(|rp| {
            let id = ids.assign(EntityType::ReleasePoint, rp.id);
            remap.release_points.insert(rp.id, id);
            let mut copy = rp.clone();
            copy.id = id;
            copy
        })
        .collect();

    // controls and paths first: assignments and apportionments point at them
    let controls = source
        .controls
        .iter()
        .filter(|c| !c.status.is_permanently_shutdown())
        .map(|c| {
            let id = ids.assign(EntityType::Control, c.id);
            remap.controls.insert(c.id, id);
            let mut copy = c.clone();
            copy.id = id;
            copy
        })
        .collect();

    for path in source.control_paths.iter() {
        let id = ids.assign(EntityType::ControlPath, path.id);
        remap.control_paths.insert(path.id, id);
    }
    let control_paths = source
        .control_paths
        .iter()
        .map(|path| copy_control_path(path, &remap, ids))
        .collect();

    let is_landfill = source.is_landfill();
    let emissions_units = source
        .emissions_units
        .iter()
        .filter(|unit| {
            !unit.status.is_permanently_shutdown()
                || (is_landfill
                    && unit
                        .processes
                        .iter()
                        .any(|p| !p.status.is_permanently_shutdown()))
        })
        .map(|unit| copy_unit(unit, &remap, ids))
        .collect();

    let naics = source
        .naics
        .iter()
        .map(|n| {
            let mut copy = n.clone();
            copy.id = ids.assign(EntityType::FacilityNaics, n.id);
            copy
        })
        .collect();

    let contacts = source
        .contacts
        .iter()
        .map(|c| {
            let mut copy = c.clone();
            copy.id = ids.assign(EntityType::FacilitySiteContact, c.id);
            copy
        })
        .collect();

    FacilitySite {
        id: ids.assign(EntityType::FacilitySite, source.id),
        name: source.name.clone(),
        status: source.status,
        status_year: source.status_year,
        source_type: source.source_type.clone(),
        county: source.county.clone(),
        state_code: source.state_code.clone(),
        postal_code: source.postal_code.clone(),
        mailing_postal_code: source.mailing_postal_code.clone(),
        latitude: source.latitude,
        longitude: source.longitude,
        naics,
        contacts,
        emissions_units,
        release_points,
        controls,
        control_paths,
    }
}

fn copy_control_path(path: &ControlPath, remap: &IdRemap, ids: &mut dyn IdStrategy) -> ControlPath {
    let assignments = path
        .assignments
        .iter()
        .filter_map(|assignment| {
            let control_id = assignment
                .control_id
                .and_then(|id| remap.controls.get(&id).copied());
            let control_path_child_id = assignment
                .control_path_child_id
                .and_then(|id| remap.control_paths.get(&id).copied());
            if control_id.is_none() && control_path_child_id.is_none() {
                return None;
            }
            Some(ControlAssignment {
                id: ids.assign(EntityType::ControlAssignment, assignment.id),
                sequence_number: assignment.sequence_number,
                control_id,
                control_path_child_id,
                percent_apportionment: assignment.percent_apportionment,
            })
        })
        .collect();

    ControlPath {
        // assigned up front so child references resolve in any order
        id: remap.control_paths.get(&path.id).copied().unwrap_or(path.id),
        path_identifier: path.path_identifier.clone(),
        description: path.description.clone(),
        percent_control: path.percent_control,
        assignments,
    }
}

fn copy_unit(unit: &EmissionsUnit, remap: &IdRemap, ids: &mut dyn IdStrategy) -> EmissionsUnit {
    let id = ids.assign(EntityType::EmissionsUnit, unit.id);
    let processes = unit
        .processes
        .iter()
        .filter(|p| !p.status.is_permanently_shutdown())
        .map(|p| copy_process(p, remap, ids))
        .collect();

    EmissionsUnit {
        id,
        unit_identifier: unit.unit_identifier.clone(),
        description: unit.description.clone(),
        status: unit.status,
        status_year: unit.status_year,
        unit_type: unit.unit_type.clone(),
        design_capacity: unit.design_capacity,
        capacity_uom: unit.capacity_uom.clone(),
        processes,
    }
}

fn copy_process(process: &EmissionsProcess, remap: &IdRemap, ids: &mut dyn IdStrategy) -> EmissionsProcess {
    let id = ids.assign(EntityType::EmissionsProcess, process.id);

    let release_point_appts = process
        .release_point_appts
        .iter()
        .filter_map(|appt| {
            let release_point_id = remap.release_points.get(&appt.release_point_id).copied()?;
            Some(ReleasePointAppt {
                id: ids.assign(EntityType::ReleasePointAppt, appt.id),
                release_point_id,
                control_path_id: appt
                    .control_path_id
                    .and_then(|path_id| remap.control_paths.get(&path_id).copied()),
                percent: appt.percent,
            })
        })
        .collect();

    let reporting_periods = process
        .reporting_periods
        .iter()
        .map(|period| copy_period(period, ids))
        .collect();

    EmissionsProcess {
        id,
        process_identifier: process.process_identifier.clone(),
        description: process.description.clone(),
        status: process.status,
        status_year: process.status_year,
        previous_year_status: Some(process.status),
        scc_code: process.scc_code.clone(),
        release_point_appts,
        reporting_periods,
    }
}

fn copy_period(period: &ReportingPeriod, ids: &mut dyn IdStrategy) -> ReportingPeriod {
    let id = ids.assign(EntityType::ReportingPeriod, period.id);
    let emissions = period.emissions.iter().map(|e| copy_emission(e, ids)).collect();

    ReportingPeriod {
        id,
        period_type: period.period_type.clone(),
        operating_type: period.operating_type.clone(),
        calculation_parameter_type: period.calculation_parameter_type.clone(),
        calculation_parameter_value: period.calculation_parameter_value,
        calculation_parameter_uom: period.calculation_parameter_uom.clone(),
        calculation_material: period.calculation_material.clone(),
        fuel_use_value: period.fuel_use_value,
        fuel_use_uom: period.fuel_use_uom.clone(),
        emissions,
    }
}

fn copy_emission(emission: &Emission, ids: &mut dyn IdStrategy) -> Emission {
    let id = ids.assign(EntityType::Emission, emission.id);
    let variables = emission
        .variables
        .iter()
        .map(|v| EmissionFormulaVariable {
            id: ids.assign(EntityType::EmissionFormulaVariable, v.id),
            variable_code: v.variable_code.clone(),
            value: v.value,
        })
        .collect();

    Emission {
        id,
        variables,
        ..emission.clone()
    }
}
