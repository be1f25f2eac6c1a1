// ==========================================
// CAERS Core - Validation Field Catalog
// ==========================================
// Every field a rule can report on, with its stable code
// (RP_GAS_TEMP) and its dotted report path
// (report.facilitySite.releasePoint.exitGasTemperature)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! validation_fields {
    ($($variant:ident => $code:literal, $path:literal;)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum ValidationField {
            $($variant,)+
        }

        impl ValidationField {
            /// Stable code, e.g. "RP_GAS_TEMP"
            pub fn code(&self) -> &'static str {
                match self {
                    $(ValidationField::$variant => $code,)+
                }
            }

            /// Dotted path of the field inside the report
            pub fn value(&self) -> &'static str {
                match self {
                    $(ValidationField::$variant => $path,)+
                }
            }

            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some(ValidationField::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

validation_fields! {
    // ===== Facility site =====
    FacilityEisId => "FACILITY_EIS_ID", "report.facilitySite.eisProgramId";
    FacilityCounty => "FACILITY_COUNTY", "report.facilitySite.countyCode";
    FacilityContact => "FACILITY_CONTACT", "report.facilitySite.contacts";
    FacilityContactCounty => "FACILITY_CONTACT_COUNTY", "report.facilitySite.contacts.countyCode";
    FacilityContactPostal => "FACILITY_CONTACT_POSTAL", "report.facilitySite.contacts.postalCode";
    FacilityContactPhone => "FACILITY_CONTACT_PHONE", "report.facilitySite.contacts.phoneNumber";
    FacilityEmailAddress => "FACILITY_EMAIL_ADDRESS", "report.facilitySite.contacts.emailAddress";
    FacilityStatus => "FACILITY_STATUS", "report.facilitySite.status";
    FacilityNaics => "FACILITY_NAICS", "report.facilitySite.naics";
    FacilitySourceTypeCode => "FACILITY_SOURCE_TYPE_CODE", "report.facilitySite.sourceTypeCode";
    FacilityEmissionReported => "FACILITY_EMISSION_REPORTED", "report.facilitySite.reportedEmissions";

    // ===== Release point =====
    RpIdentifier => "RP_IDENTIFIER", "report.facilitySite.releasePoint.releasePointIdentifier";
    RpStatusCode => "RP_STATUS_CODE", "report.facilitySite.releasePoint.statusTypeCode";
    RpStatusYear => "RP_STATUS_YEAR", "report.facilitySite.releasePoint.statusYear";
    RpGasTemp => "RP_GAS_TEMP", "report.facilitySite.releasePoint.exitGasTemperature";
    RpGasFlow => "RP_GAS_FLOW", "report.facilitySite.releasePoint.exitGasFlowRate";
    RpGasVelocity => "RP_GAS_VELOCITY", "report.facilitySite.releasePoint.exitGasVelocity";
    RpFenceline => "RP_FENCELINE", "report.facilitySite.releasePoint.fenceLine";
    RpUomFt => "RP_UOM_FT", "report.facilitySite.releasePoint.uom";
    RpFugitive => "RP_FUGITIVE", "report.facilitySite.releasePoint.fugitive";
    RpStack => "RP_STACK", "report.facilitySite.releasePoint.stack";
    RpStackWarning => "RP_STACK_WARNING", "report.facilitySite.releasePoint.stackWarning";
    RpCoordinate => "RP_COORDINATE", "report.facilitySite.releasePoint.coordinate";
    RpTypeCode => "RP_TYPE_CODE", "report.facilitySite.releasePoint.releasePointTypeCode";

    // ===== Control / control path =====
    ControlIdentifier => "CONTROL_IDENTIFIER", "report.facilitySite.control.controlIdentifier";
    ControlStatusCode => "CONTROL_STATUS_CODE", "report.facilitySite.control.statusTypeCode";
    ControlStatusYear => "CONTROL_STATUS_YEAR", "report.facilitySite.control.statusYear";
    ControlPercentCapture => "CONTROL_PERCENT_CAPTURE", "report.facilitySite.control.percentCapture";
    ControlPercentControl => "CONTROL_PERCENT_CONTROL", "report.facilitySite.control.percentControl";
    ControlPathWarning => "CONTROL_PATH_WARNING", "report.facilitySite.control.pathWarning";
    ControlPathIdentifier => "CONTROL_PATH_IDENTIFIER", "report.facilitySite.controlPath.controlPathIdentifier";
    ControlPathPercentControl => "CONTROL_PATH_PERCENT_CONTROL", "report.facilitySite.controlPath.percentControl";
    ControlPathAssignmentSequenceNumber => "CONTROL_PATH_ASSIGNMENT_SEQUENCE_NUMBER", "report.facilitySite.controlPath.sequenceNumber";
    ControlPathNoControlDeviceAssignment => "CONTROL_PATH_NO_CONTROL_DEVICE_ASSIGNMENT", "report.facilitySite.controlPath.notAssigned";

    // ===== Emissions unit =====
    EmissionsUnitStatusCode => "EMISSIONS_UNIT_STATUS_CODE", "report.facilitySite.emissionsUnit.statusTypeCode";
    EmissionsUnitStatusYear => "EMISSIONS_UNIT_STATUS_YEAR", "report.facilitySite.emissionsUnit.statusYear";
    EmissionsUnitCapacity => "EMISSIONS_UNIT_CAPACITY", "report.facilitySite.emissionsUnit.capacity";
    EmissionsUnitUom => "EMISSIONS_UNIT_UOM", "report.facilitySite.emissionsUnit.unitOfMeasureCode";
    EmissionsUnitProcess => "EMISSIONS_UNIT_PROCESS", "report.facilitySite.emissionsUnit.emissionsProcess";
    EmissionsUnitIdentifier => "EMISSIONS_UNIT_IDENTIFIER", "report.facilitySite.emissionsUnit.unitIdentifier";

    // ===== Emissions process =====
    ProcessRpPct => "PROCESS_RP_PCT", "report.facilitySite.emissionsUnit.emissionsProcess.releasePointAppts.percent";
    ProcessRp => "PROCESS_RP", "report.facilitySite.emissionsUnit.emissionsProcess.releasePointAppts.required";
    ProcessPeriodEmission => "PROCESS_PERIOD_EMISSION", "report.facilitySite.emissionsUnit.emissionsProcess.emission";
    ProcessStatusCode => "PROCESS_STATUS_CODE", "report.facilitySite.emissionsUnit.emissionsProcess.statusTypeCode";
    ProcessStatusYear => "PROCESS_STATUS_YEAR", "report.facilitySite.emissionsUnit.emissionsProcess.statusYear";

    // ===== Reporting period =====
    PeriodOperatingTypeCode => "PERIOD_OPERATING_TYPE_CODE", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.operatingTypeCode";
    PeriodCalcValue => "PERIOD_CALC_VALUE", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.calculationParameterValue";
    PeriodCalcMatCode => "PERIOD_CALC_MAT_CODE", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.calculationMaterialCode";
    PeriodCalcTypeCode => "PERIOD_CALC_TYPE_CODE", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.calculationParameterTypeCode";
    PeriodCalcUom => "PERIOD_CALC_UOM", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.calculationParameterUom";
    PeriodEmission => "PERIOD_EMISSION", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.emission";
    PeriodFuelUom => "PERIOD_FUEL_UOM", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.fuelUseUom";

    // ===== Emission =====
    EmissionPollutant => "EMISSION_POLLUTANT", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.emission.pollutant";
    EmissionCalcMethod => "EMISSION_CALC_METHOD", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.emission.emissionsCalcMethodCode";
    EmissionComments => "EMISSION_COMMENTS", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.emission.comments";
    EmissionCalcDesc => "EMISSION_CALC_DESC", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.emission.calculationDescription";
    EmissionEf => "EMISSION_EF", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.emission.emissionsFactor";
    EmissionEfText => "EMISSION_EF_TEXT", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.emission.emissionsFactorText";
    EmissionTotalEmissions => "EMISSION_TOTAL_EMISSIONS", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.emission.totalEmissions";
    EmissionControlPercent => "EMISSION_CONTROL_PERCENT", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.emission.controlPercent";
    EmissionUom => "EMISSION_UOM", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.emission.emissionsUomCode";
    EmissionCurieUom => "EMISSION_CURIE_UOM", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.emission.emissionsCurieUom";
    EmissionNumUom => "EMISSION_NUM_UOM", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.emission.emissionsNumeratorUom";
    EmissionDenomUom => "EMISSION_DENOM_UOM", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.emission.emissionsDenominatorUom";
    EmissionFormulaVariable => "EMISSION_FORMULA_VARIABLE", "report.facilitySite.emissionsUnit.emissionsProcess.reportingPeriod.emission.formula.variable";
}

impl fmt::Display for ValidationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_and_path() {
        assert_eq!(ValidationField::RpGasTemp.code(), "RP_GAS_TEMP");
        assert_eq!(
            ValidationField::RpGasTemp.value(),
            "report.facilitySite.releasePoint.exitGasTemperature"
        );
        assert_eq!(
            ValidationField::from_code("FACILITY_NAICS"),
            Some(ValidationField::FacilityNaics)
        );
        assert_eq!(ValidationField::from_code("NOPE"), None);
    }

    #[test]
    fn test_serializes_as_code() {
        let json = serde_json::to_string(&ValidationField::EmissionTotalEmissions).unwrap();
        assert_eq!(json, "\"EMISSION_TOTAL_EMISSIONS\"");
    }
}
