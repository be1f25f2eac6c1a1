// ==========================================
// CAERS Core - Bulk Emission Entry
// ==========================================
// Applies entered totals (and throughput edits) to a whole facility,
// then recalculates every other emission in one pass.
// A calculation failure is recorded on its row, never aborts the batch.
// Permanently shutdown processes are skipped.
// ==========================================

use crate::domain::emission::{Emission, EmissionsProcess, ReportingPeriod};
use crate::domain::facility::EmissionsReport;
use crate::engine::emission_calculator::{recalculate_emission_tons, EmissionCalculator};
use crate::engine::units::UnitConversionTable;
use crate::repository::error::{LookupError, LookupResult};
use crate::repository::prior_year::{PriorProcess, PriorYearLookup};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

// ==========================================
// Result rows
// ==========================================

/// One emission after the bulk pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionBulkEntryRow {
    pub emission_id: i64,
    pub pollutant_code: Option<String>,
    pub pollutant_name: String,
    pub total_manual_entry: bool,
    pub total_emissions: Option<Decimal>,
    pub emissions_uom_code: Option<String>,
    pub calculated_emissions_tons: Option<Decimal>,
    pub calculation_failed: bool,
    pub calculation_failure_message: Option<String>,
    pub previous_total_emissions: Option<Decimal>,
    pub previous_emissions_uom_code: Option<String>,
}

/// Rows of one reporting period, with the identifiers a grid displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionBulkEntryHolder {
    pub reporting_period_id: i64,
    pub unit_identifier: String,
    pub process_identifier: String,
    pub period_type_code: Option<String>,
    pub calculation_parameter_value: Option<Decimal>,
    pub emissions: Vec<EmissionBulkEntryRow>,
}

impl EmissionBulkEntryHolder {
    pub fn failed_rows(&self) -> impl Iterator<Item = &EmissionBulkEntryRow> {
        self.emissions.iter().filter(|row| row.calculation_failed)
    }
}

// ==========================================
// Bulk update
// ==========================================

/// Sets entered totals from `updates` (keyed by emission id) and recalculates
/// everything else in the report.
///
/// Entered totals without an entry in `updates` are left as they are.
/// Rows carry the previous year's total for the same pollutant, period type,
/// unit and process when a prior report exists.
pub fn bulk_update(
    report: &mut EmissionsReport,
    updates: &HashMap<i64, Decimal>,
    prior: &dyn PriorYearLookup,
    units: &UnitConversionTable,
) -> LookupResult<Vec<EmissionBulkEntryHolder>> {
    let calculator = EmissionCalculator::new(units);
    let previous_year = prior.previous_report_year(report.master_facility_id, report.year)?;
    let master_facility_id = report.master_facility_id;
    let report_year = report.year;

    let mut holders = Vec::new();
    let mut failed = 0usize;

    for unit in report.facility_site.emissions_units.iter_mut() {
        let unit_identifier = unit.unit_identifier.clone();

        for process in unit
            .processes
            .iter_mut()
            .filter(|p| !p.status.is_permanently_shutdown())
        {
            let prior_process = match previous_year {
                Some(year) => prior.emissions_process(
                    master_facility_id,
                    year,
                    &unit_identifier,
                    &process.process_identifier,
                )?,
                None => None,
            };

            let process_identifier = process.process_identifier.clone();
            for period in process.reporting_periods.iter_mut() {
                let holder = update_period(
                    &calculator,
                    period,
                    updates,
                    prior_process.as_ref(),
                    report_year,
                    &unit_identifier,
                    &process_identifier,
                );
                failed += holder.failed_rows().count();
                holders.push(holder);
            }
        }
    }

    info!(
        report_id = report.id,
        periods = holders.len(),
        failed,
        "bulk emission update finished"
    );
    Ok(holders)
}

/// Sets throughput values (keyed by reporting period id), then runs `bulk_update`
/// with no entered totals so every dependent emission is recalculated.
pub fn bulk_update_throughput(
    report: &mut EmissionsReport,
    throughputs: &HashMap<i64, Decimal>,
    prior: &dyn PriorYearLookup,
    units: &UnitConversionTable,
) -> LookupResult<Vec<EmissionBulkEntryHolder>> {
    // every id must resolve before anything is written
    for period_id in throughputs.keys() {
        let exists = report
            .facility_site
            .reporting_periods()
            .any(|period| period.id == *period_id);
        if !exists {
            return Err(LookupError::NotFound {
                entity: "ReportingPeriod".to_string(),
                key: period_id.to_string(),
            });
        }
    }

    for period in report
        .facility_site
        .emissions_units
        .iter_mut()
        .flat_map(|u| u.processes.iter_mut())
        .flat_map(|p: &mut EmissionsProcess| p.reporting_periods.iter_mut())
    {
        if let Some(value) = throughputs.get(&period.id) {
            period.calculation_parameter_value = Some(*value);
        }
    }

    bulk_update(report, &HashMap::new(), prior, units)
}

fn update_period(
    calculator: &EmissionCalculator<'_>,
    period: &mut ReportingPeriod,
    updates: &HashMap<i64, Decimal>,
    prior_process: Option<&PriorProcess>,
    report_year: i32,
    unit_identifier: &str,
    process_identifier: &str,
) -> EmissionBulkEntryHolder {
    // the calculator reads the period while each emission is mutated
    let mut emissions = std::mem::take(&mut period.emissions);
    let period_type_code = period.period_type.as_ref().map(|t| t.code.clone());
    let basis: &ReportingPeriod = period;

    let rows = emissions
        .iter_mut()
        .map(|emission| {
            let failure = update_emission(calculator, emission, basis, updates, report_year);
            if let Some(message) = failure.as_deref() {
                warn!(
                    emission_id = emission.id,
                    unit = unit_identifier,
                    process = process_identifier,
                    error = message,
                    "emission calculation failed during bulk update"
                );
            }

            let previous = prior_process.and_then(|p| {
                p.emissions.iter().find(|prev| {
                    Some(prev.pollutant_code.as_str()) == emission.pollutant_code()
                        && prev.period_type_code == period_type_code
                })
            });

            EmissionBulkEntryRow {
                emission_id: emission.id,
                pollutant_code: emission.pollutant_code().map(str::to_string),
                pollutant_name: emission.pollutant_name().to_string(),
                total_manual_entry: emission.total_manual_entry,
                total_emissions: emission.total_emissions,
                emissions_uom_code: emission.emissions_uom.as_ref().map(|u| u.code.clone()),
                calculated_emissions_tons: emission.calculated_emissions_tons,
                calculation_failed: failure.is_some(),
                calculation_failure_message: failure,
                previous_total_emissions: previous.and_then(|p| p.total_emissions),
                previous_emissions_uom_code: previous.and_then(|p| p.emissions_uom_code.clone()),
            }
        })
        .collect();

    period.emissions = emissions;

    EmissionBulkEntryHolder {
        reporting_period_id: period.id,
        unit_identifier: unit_identifier.to_string(),
        process_identifier: process_identifier.to_string(),
        period_type_code,
        calculation_parameter_value: period.calculation_parameter_value,
        emissions: rows,
    }
}

/// Returns the failure message when the emission could not be recalculated
fn update_emission(
    calculator: &EmissionCalculator<'_>,
    emission: &mut Emission,
    period: &ReportingPeriod,
    updates: &HashMap<i64, Decimal>,
    report_year: i32,
) -> Option<String> {
    if emission.is_total_entered() {
        if let Some(total) = updates.get(&emission.id) {
            emission.total_emissions = Some(*total);
            recalculate_emission_tons(emission);
        }
        return None;
    }

    calculator
        .calculate_total_emissions(emission, period, report_year)
        .err()
        .map(|e| e.to_string())
}

// ==========================================
// Report-wide tons recalculation
// ==========================================

/// Re-derives calculated_emissions_tons for every emission in the report.
///
/// Returns the ids of the emissions whose tons value changed.
pub fn recalculate_report_emission_tons(report: &mut EmissionsReport) -> Vec<i64> {
    let mut changed = Vec::new();
    for emission in report
        .facility_site
        .emissions_units
        .iter_mut()
        .flat_map(|u| u.processes.iter_mut())
        .flat_map(|p| p.reporting_periods.iter_mut())
        .flat_map(|period| period.emissions.iter_mut())
    {
        let before = emission.calculated_emissions_tons;
        if recalculate_emission_tons(emission) != before {
            changed.push(emission.id);
        }
    }
    changed
}
