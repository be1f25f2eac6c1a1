// ==========================================
// CAERS Core - Prior-Year Report Lookup
// ==========================================
// Year-over-year checks only need "the matching entity for this
// identifier within facility X as of year Y"; this trait is that.
// ==========================================

use crate::domain::facility::EmissionsReport;
use crate::domain::types::OperatingStatus;
use crate::repository::error::LookupResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Status snapshot of a prior-year unit, process or release point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorEntityStatus {
    pub identifier: String,
    pub status: OperatingStatus,
    pub status_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorEmission {
    pub pollutant_code: String,
    pub period_type_code: Option<String>,
    pub total_emissions: Option<Decimal>,
    pub emissions_uom_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorProcess {
    pub status: PriorEntityStatus,
    pub emissions: Vec<PriorEmission>,
}

pub trait PriorYearLookup: Send + Sync {
    /// Most recent report year strictly before `year`
    fn previous_report_year(&self, master_facility_id: i64, year: i32) -> LookupResult<Option<i32>>;

    fn release_point(
        &self,
        master_facility_id: i64,
        year: i32,
        identifier: &str,
    ) -> LookupResult<Option<PriorEntityStatus>>;

    fn emissions_unit(
        &self,
        master_facility_id: i64,
        year: i32,
        unit_identifier: &str,
    ) -> LookupResult<Option<PriorEntityStatus>>;

    fn emissions_process(
        &self,
        master_facility_id: i64,
        year: i32,
        unit_identifier: &str,
        process_identifier: &str,
    ) -> LookupResult<Option<PriorProcess>>;
}

// ==========================================
// InMemoryPriorReports
// ==========================================
// Backed by whole prior-year report trees
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriorReports {
    reports: Vec<EmissionsReport>,
}

impl InMemoryPriorReports {
    pub fn new(reports: Vec<EmissionsReport>) -> Self {
        Self { reports }
    }

    fn report(&self, master_facility_id: i64, year: i32) -> Option<&EmissionsReport> {
        self.reports
            .iter()
            .find(|r| r.master_facility_id == master_facility_id && r.year == year)
    }
}

fn same_identifier(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

impl PriorYearLookup for InMemoryPriorReports {
    fn previous_report_year(&self, master_facility_id: i64, year: i32) -> LookupResult<Option<i32>> {
        Ok(self
            .reports
            .iter()
            .filter(|r| r.master_facility_id == master_facility_id && r.year < year)
            .map(|r| r.year)
            .max())
    }

    fn release_point(
        &self,
        master_facility_id: i64,
        year: i32,
        identifier: &str,
    ) -> LookupResult<Option<PriorEntityStatus>> {
        Ok(self.report(master_facility_id, year).and_then(|report| {
            report
                .facility_site
                .release_points
                .iter()
                .find(|rp| same_identifier(&rp.release_point_identifier, identifier))
                .map(|rp| PriorEntityStatus {
                    identifier: rp.release_point_identifier.clone(),
                    status: rp.status,
                    status_year: rp.status_year,
                })
        }))
    }

    fn emissions_unit(
        &self,
        master_facility_id: i64,
        year: i32,
        unit_identifier: &str,
    ) -> LookupResult<Option<PriorEntityStatus>> {
        Ok(self.report(master_facility_id, year).and_then(|report| {
            report
                .facility_site
                .emissions_units
                .iter()
                .find(|u| same_identifier(&u.unit_identifier, unit_identifier))
                .map(|u| PriorEntityStatus {
                    identifier: u.unit_identifier.clone(),
                    status: u.status,
                    status_year: u.status_year,
                })
        }))
    }

    fn emissions_process(
        &self,
        master_facility_id: i64,
        year: i32,
        unit_identifier: &str,
        process_identifier: &str,
    ) -> LookupResult<Option<PriorProcess>> {
        let Some(report) = self.report(master_facility_id, year) else {
            return Ok(None);
        };
        let process = report
            .facility_site
            .emissions_units
            .iter()
            .filter(|u| same_identifier(&u.unit_identifier, unit_identifier))
            .flat_map(|u| u.processes.iter())
            .find(|p| same_identifier(&p.process_identifier, process_identifier));

        Ok(process.map(|p| PriorProcess {
            status: PriorEntityStatus {
                identifier: p.process_identifier.clone(),
                status: p.status,
                status_year: p.status_year,
            },
            emissions: p
                .reporting_periods
                .iter()
                .flat_map(|period| {
                    period.emissions.iter().filter_map(move |e| {
                        e.pollutant.as_ref().map(|pollutant| PriorEmission {
                            pollutant_code: pollutant.code.clone(),
                            period_type_code: period.period_type.as_ref().map(|t| t.code.clone()),
                            total_emissions: e.total_emissions,
                            emissions_uom_code: e.emissions_uom.as_ref().map(|u| u.code.clone()),
                        })
                    })
                })
                .collect(),
        }))
    }
}
