// ==========================================
// Test data builders - integration tests
// ==========================================
// Defaults describe a report that passes every federal rule;
// each test changes only what it exercises.
// ==========================================

#![allow(dead_code)]

use caers_core::domain::emission::{
    Emission, EmissionFormulaVariable, EmissionsProcess, EmissionsUnit, ReleasePointAppt,
    ReportingPeriod,
};
use caers_core::domain::facility::{
    Control, ControlAssignment, ControlPath, EmissionsReport, FacilityNaics, FacilitySite,
    FacilitySiteContact, ReleasePoint,
};
use caers_core::domain::reference::{
    CalculationMethod, CodeDescription, County, NaicsCode, Pollutant, UnitMeasure,
};
use caers_core::domain::types::{NaicsCodeType, OperatingStatus, UnitType, ValidationStatus};
use caers_core::engine::recalculate_emission_tons;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const MASTER_FACILITY_ID: i64 = 1;
pub const EIS_PROGRAM_ID: &str = "EIS-12345";

// ==========================================
// Unit measures and methods
// ==========================================

pub fn tons() -> UnitMeasure {
    UnitMeasure::new("TON", "Tons", UnitType::Mass, "sTon")
}

pub fn pounds() -> UnitMeasure {
    UnitMeasure::new("LB", "Pounds", UnitType::Mass, "[lb]")
}

pub fn gallons() -> UnitMeasure {
    UnitMeasure::new("E3GAL", "1000 Gallons", UnitType::Volume, "1000*[gall]")
}

pub fn feet() -> UnitMeasure {
    UnitMeasure::new("FT", "Feet", UnitType::Length, "[ft]")
}

pub fn factor_method() -> CalculationMethod {
    CalculationMethod {
        code: "8".to_string(),
        description: "USEPA Emission Factor".to_string(),
        total_direct_entry: false,
        epa_emission_factor: true,
        control_indicator: false,
    }
}

pub fn direct_entry_method() -> CalculationMethod {
    CalculationMethod {
        code: "1".to_string(),
        description: "Continuous Emissions Monitoring System".to_string(),
        total_direct_entry: true,
        epa_emission_factor: false,
        control_indicator: false,
    }
}

pub fn pollutant(code: &str, name: &str) -> Pollutant {
    Pollutant {
        code: code.to_string(),
        name: name.to_string(),
        last_inventory_year: None,
    }
}

// ==========================================
// Emission builder
// ==========================================

/// Defaults: 0.5 LB/TON factor over the 1000 TON default throughput, 500 LB reported
pub struct EmissionBuilder {
    id: i64,
    pollutant: Pollutant,
    method: CalculationMethod,
    total_manual_entry: bool,
    formula: Option<String>,
    factor: Option<Decimal>,
    factor_text: Option<String>,
    numerator_uom: Option<UnitMeasure>,
    denominator_uom: Option<UnitMeasure>,
    emissions_uom: UnitMeasure,
    control_percent: Option<Decimal>,
    total: Option<Decimal>,
    comments: Option<String>,
    variables: Vec<EmissionFormulaVariable>,
}

impl EmissionBuilder {
    pub fn new(id: i64, pollutant_code: &str) -> Self {
        Self {
            id,
            pollutant: pollutant(pollutant_code, pollutant_code),
            method: factor_method(),
            total_manual_entry: false,
            formula: None,
            factor: Some(dec!(0.5)),
            factor_text: Some("AP-42 1.1".to_string()),
            numerator_uom: Some(pounds()),
            denominator_uom: Some(tons()),
            emissions_uom: pounds(),
            control_percent: None,
            total: Some(dec!(500)),
            comments: None,
            variables: vec![],
        }
    }

    pub fn pollutant_name(mut self, name: &str) -> Self {
        self.pollutant.name = name.to_string();
        self
    }

    pub fn factor(mut self, factor: Decimal) -> Self {
        self.factor = Some(factor);
        self
    }

    pub fn total(mut self, total: Decimal) -> Self {
        self.total = Some(total);
        self
    }

    pub fn no_total(mut self) -> Self {
        self.total = None;
        self
    }

    pub fn emissions_uom(mut self, uom: UnitMeasure) -> Self {
        self.emissions_uom = uom;
        self
    }

    pub fn denominator_uom(mut self, uom: UnitMeasure) -> Self {
        self.denominator_uom = Some(uom);
        self
    }

    pub fn control_percent(mut self, percent: Decimal) -> Self {
        self.control_percent = Some(percent);
        self
    }

    /// Totals measured directly: no factor or factor units
    pub fn direct_entry(mut self, total: Decimal) -> Self {
        self.method = direct_entry_method();
        self.factor = None;
        self.factor_text = None;
        self.numerator_uom = None;
        self.denominator_uom = None;
        self.total = Some(total);
        self.comments = Some("Stack test".to_string());
        self
    }

    /// Factor method, total typed in by the preparer
    pub fn manual_total(mut self, total: Decimal) -> Self {
        self.total_manual_entry = true;
        self.total = Some(total);
        self
    }

    pub fn formula(mut self, formula: &str, variables: Vec<EmissionFormulaVariable>) -> Self {
        self.formula = Some(formula.to_string());
        self.variables = variables;
        self
    }

    pub fn build(self) -> Emission {
        let mut emission = Emission {
            id: self.id,
            pollutant: Some(self.pollutant),
            calculation_method: Some(self.method),
            total_manual_entry: self.total_manual_entry,
            formula_indicator: self.formula.is_some(),
            emissions_factor: self.factor,
            emissions_factor_formula: self.formula,
            emissions_factor_text: self.factor_text,
            emissions_numerator_uom: self.numerator_uom,
            emissions_denominator_uom: self.denominator_uom,
            emissions_uom: Some(self.emissions_uom),
            overall_control_percent: self.control_percent,
            total_emissions: self.total,
            calculated_emissions_tons: None,
            comments: self.comments,
            calculation_comment: None,
            variables: self.variables,
        };
        recalculate_emission_tons(&mut emission);
        emission
    }
}

// ==========================================
// Release point builder
// ==========================================

/// Defaults: operating vertical stack, 2 ft diameter (area pi),
/// 10 FPS, 31.4159 ACFS, 0.001 degrees from the facility
pub struct ReleasePointBuilder {
    release_point: ReleasePoint,
}

impl ReleasePointBuilder {
    pub fn stack(id: i64, identifier: &str) -> Self {
        Self {
            release_point: ReleasePoint {
                id,
                release_point_identifier: identifier.to_string(),
                description: Some("Boiler stack".to_string()),
                type_code: Some(CodeDescription::new("2", "Vertical")),
                status: OperatingStatus::Operating,
                status_year: Some(2000),
                stack_height: Some(dec!(50)),
                stack_height_uom: Some(feet()),
                stack_diameter: Some(dec!(2)),
                stack_diameter_uom: Some(feet()),
                stack_length: None,
                stack_length_uom: None,
                stack_width: None,
                stack_width_uom: None,
                exit_gas_temperature: Some(300),
                exit_gas_velocity: Some(dec!(10)),
                exit_gas_velocity_uom: Some(UnitMeasure::new("FPS", "Feet/Second", UnitType::Velocity, "[ft]/[s]")),
                exit_gas_flow_rate: Some(dec!(31.4159)),
                exit_gas_flow_uom: Some(UnitMeasure::new(
                    "ACFS",
                    "Actual Cubic Feet/Second",
                    UnitType::FlowRate,
                    "[ft3]/[s]",
                )),
                fugitive_height: None,
                fugitive_height_uom: None,
                fugitive_length: None,
                fugitive_length_uom: None,
                fugitive_width: None,
                fugitive_width_uom: None,
                fugitive_angle: None,
                fence_line_distance: None,
                fence_line_uom: None,
                latitude: Some(dec!(35.7800)),
                longitude: Some(dec!(-78.6400)),
            },
        }
    }

    pub fn fugitive(id: i64, identifier: &str) -> Self {
        let mut builder = Self::stack(id, identifier);
        let rp = &mut builder.release_point;
        rp.type_code = Some(CodeDescription::new("1", "Fugitive Area"));
        rp.stack_height = None;
        rp.stack_height_uom = None;
        rp.stack_diameter = None;
        rp.stack_diameter_uom = None;
        rp.exit_gas_temperature = None;
        rp.exit_gas_velocity = None;
        rp.exit_gas_velocity_uom = None;
        rp.exit_gas_flow_rate = None;
        rp.exit_gas_flow_uom = None;
        rp.fugitive_height = Some(dec!(10));
        rp.fugitive_height_uom = Some(feet());
        rp.fugitive_length = Some(dec!(100));
        rp.fugitive_length_uom = Some(feet());
        rp.fugitive_width = Some(dec!(50));
        rp.fugitive_width_uom = Some(feet());
        rp.fugitive_angle = Some(0);
        builder
    }

    pub fn status(mut self, status: OperatingStatus, status_year: Option<i32>) -> Self {
        self.release_point.status = status;
        self.release_point.status_year = status_year;
        self
    }

    pub fn coordinates(mut self, latitude: Option<Decimal>, longitude: Option<Decimal>) -> Self {
        self.release_point.latitude = latitude;
        self.release_point.longitude = longitude;
        self
    }

    pub fn exit_gas(mut self, velocity: Option<Decimal>, flow: Option<Decimal>) -> Self {
        self.release_point.exit_gas_velocity = velocity;
        self.release_point.exit_gas_flow_rate = flow;
        self
    }

    pub fn exit_gas_temperature(mut self, temperature: Option<i32>) -> Self {
        self.release_point.exit_gas_temperature = temperature;
        self
    }

    pub fn fugitive_angle(mut self, angle: i32) -> Self {
        self.release_point.fugitive_angle = Some(angle);
        self
    }

    pub fn build(self) -> ReleasePoint {
        self.release_point
    }
}

// ==========================================
// Unit / process / period
// ==========================================

/// Annual period: routine operation, 1000 TON of coal input
pub fn create_test_period(id: i64, emissions: Vec<Emission>) -> ReportingPeriod {
    ReportingPeriod {
        id,
        period_type: Some(CodeDescription::new("A", "Annual")),
        operating_type: Some(CodeDescription::new("R", "Routine")),
        calculation_parameter_type: Some(CodeDescription::new("I", "Input")),
        calculation_parameter_value: Some(dec!(1000)),
        calculation_parameter_uom: Some(tons()),
        calculation_material: Some(CodeDescription::new("200", "Coal")),
        fuel_use_value: None,
        fuel_use_uom: None,
        emissions,
    }
}

/// Operating process, fully apportioned to one release point
pub fn create_test_process(
    id: i64,
    identifier: &str,
    release_point_id: i64,
    periods: Vec<ReportingPeriod>,
) -> EmissionsProcess {
    EmissionsProcess {
        id,
        process_identifier: identifier.to_string(),
        description: Some("Coal combustion".to_string()),
        status: OperatingStatus::Operating,
        status_year: Some(2000),
        previous_year_status: None,
        scc_code: Some("10100202".to_string()),
        release_point_appts: vec![ReleasePointAppt {
            id: id * 10,
            release_point_id,
            control_path_id: None,
            percent: dec!(100),
        }],
        reporting_periods: periods,
    }
}

pub fn create_test_unit(id: i64, identifier: &str, processes: Vec<EmissionsProcess>) -> EmissionsUnit {
    EmissionsUnit {
        id,
        unit_identifier: identifier.to_string(),
        description: Some("Boiler".to_string()),
        status: OperatingStatus::Operating,
        status_year: Some(1995),
        unit_type: Some(CodeDescription::new("100", "Boiler")),
        design_capacity: Some(dec!(250)),
        capacity_uom: Some(UnitMeasure::new("E6BTU/HR", "Million BTU/Hour", UnitType::Power, "1000000*[btu]/[h]")),
        processes,
    }
}

pub fn create_test_control(id: i64, identifier: &str) -> Control {
    Control {
        id,
        identifier: identifier.to_string(),
        description: Some("Baghouse".to_string()),
        status: OperatingStatus::Operating,
        status_year: Some(2000),
        percent_control: Some(dec!(95)),
        percent_capture: Some(dec!(90)),
    }
}

pub fn create_test_control_path(id: i64, identifier: &str, control_ids: &[i64]) -> ControlPath {
    ControlPath {
        id,
        path_identifier: identifier.to_string(),
        description: None,
        percent_control: Some(dec!(95)),
        assignments: control_ids
            .iter()
            .enumerate()
            .map(|(i, control_id)| ControlAssignment {
                id: id * 100 + i as i64,
                sequence_number: i as i32 + 1,
                control_id: Some(*control_id),
                control_path_child_id: None,
                percent_apportionment: dec!(100),
            })
            .collect(),
    }
}

pub fn create_test_contact(id: i64) -> FacilitySiteContact {
    FacilitySiteContact {
        id,
        contact_type: "EI".to_string(),
        first_name: Some("Jane".to_string()),
        last_name: Some("Doe".to_string()),
        email: Some("jane.doe@example.com".to_string()),
        phone: Some("9195551234".to_string()),
        postal_code: Some("27601".to_string()),
        mailing_postal_code: None,
        county: Some(wake_county()),
        state_code: Some("NC".to_string()),
    }
}

pub fn wake_county() -> County {
    County {
        code: "183".to_string(),
        name: "Wake".to_string(),
        state_code: "NC".to_string(),
        last_inventory_year: None,
    }
}

// ==========================================
// Report builder
// ==========================================

/// Defaults: one stack, one control on one path, one unit with one
/// process and one NOX emission. Passes every federal rule.
pub struct ReportBuilder {
    year: i32,
    report_id: i64,
    facility: FacilitySite,
}

impl ReportBuilder {
    pub fn new(year: i32) -> Self {
        caers_core::logging::init_test();
        let emission = EmissionBuilder::new(1, "NOX").pollutant_name("Nitrogen Oxides").build();
        let process = create_test_process(30, "P1", 1, vec![create_test_period(40, vec![emission])]);
        Self {
            year,
            report_id: year as i64,
            facility: FacilitySite {
                id: 10,
                name: "Riverside Power Station".to_string(),
                status: OperatingStatus::Operating,
                status_year: None,
                source_type: Some(CodeDescription::new("125", "Electricity Generation")),
                county: Some(wake_county()),
                state_code: Some("NC".to_string()),
                postal_code: Some("27601".to_string()),
                mailing_postal_code: Some("27601-1234".to_string()),
                latitude: Some(dec!(35.7810)),
                longitude: Some(dec!(-78.6410)),
                naics: vec![FacilityNaics {
                    id: 5,
                    naics: NaicsCode {
                        code: "221112".to_string(),
                        description: "Fossil Fuel Electric Power Generation".to_string(),
                        last_inventory_year: None,
                        map_to: None,
                    },
                    naics_type: NaicsCodeType::Primary,
                }],
                contacts: vec![create_test_contact(6)],
                emissions_units: vec![create_test_unit(20, "U1", vec![process])],
                release_points: vec![ReleasePointBuilder::stack(1, "RP1").build()],
                controls: vec![create_test_control(50, "C1")],
                control_paths: vec![create_test_control_path(60, "CP1", &[50])],
            },
        }
    }

    pub fn report_id(mut self, id: i64) -> Self {
        self.report_id = id;
        self
    }

    pub fn facility(mut self, change: impl FnOnce(&mut FacilitySite)) -> Self {
        change(&mut self.facility);
        self
    }

    pub fn release_points(mut self, release_points: Vec<ReleasePoint>) -> Self {
        self.facility.release_points = release_points;
        self
    }

    pub fn units(mut self, units: Vec<EmissionsUnit>) -> Self {
        self.facility.emissions_units = units;
        self
    }

    /// Replaces the emissions of the default period
    pub fn emissions(mut self, emissions: Vec<Emission>) -> Self {
        if let Some(period) = self
            .facility
            .emissions_units
            .first_mut()
            .and_then(|u| u.processes.first_mut())
            .and_then(|p| p.reporting_periods.first_mut())
        {
            period.emissions = emissions;
        }
        self
    }

    pub fn build(self) -> EmissionsReport {
        EmissionsReport {
            id: self.report_id,
            year: self.year,
            eis_program_id: EIS_PROGRAM_ID.to_string(),
            master_facility_id: MASTER_FACILITY_ID,
            validation_status: ValidationStatus::Unvalidated,
            facility_site: self.facility,
        }
    }
}

// ==========================================
// Convenience
// ==========================================

pub fn create_test_report(year: i32) -> EmissionsReport {
    ReportBuilder::new(year).build()
}

/// First emission of the first period of the first process of the first unit
pub fn first_emission(report: &EmissionsReport) -> &Emission {
    &report.facility_site.emissions_units[0].processes[0].reporting_periods[0].emissions[0]
}

pub fn first_emission_mut(report: &mut EmissionsReport) -> &mut Emission {
    &mut report.facility_site.emissions_units[0].processes[0].reporting_periods[0].emissions[0]
}
