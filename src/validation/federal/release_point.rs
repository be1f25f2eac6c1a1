// ==========================================
// CAERS Core - Release Point Rules
// ==========================================
// Operating release points only:
//   stack: exit gas required/ranges, stack dimensions,
//          area-derived velocity and flow cross-checks
//   fugitive: dimension ranges
//   both: flow/velocity UoM and ranges, fence line,
//         coordinates within the facility tolerance
// Every status: status year, PS warning, duplicate identifier,
// new-but-shutdown against the prior report
// ==========================================

use crate::domain::facility::ReleasePoint;
use crate::domain::reference::UnitMeasure;
use crate::domain::types::{
    OperatingStatus, ACFM_UOM_CODE, ACFS_UOM_CODE, FEET_UOM_CODE, FPM_UOM_CODE, FPS_UOM_CODE,
};
use crate::validation::context::{ReleasePointScope, Validator, ValidatorContext};
use crate::validation::error::RuleResult;
use crate::validation::federal::format::{in_range, is_duplicate_identifier};
use crate::validation::field::ValidationField;
use crate::validation::result::Violation;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

const PI: Decimal = dec!(3.141592653589793);

const DIAMETER_FORMULA: &str = "(Pi * (Stack Diameter /2) ^ 2) for circular stacks";
const LENGTH_WIDTH_FORMULA: &str = "(Stack Length * Stack Width) for rectangular stacks";
const STACK_DIAMETER: &str = "Stack Diameter is";
const STACK_LENGTH_WIDTH: &str = "Stack Length/Stack Width are";

const MIN_STACK_FLOW: Decimal = dec!(0.00000001);

pub struct ReleasePointValidator;

impl<'r> Validator<ReleasePointScope<'r>> for ReleasePointValidator {
    fn name(&self) -> &'static str {
        "federal.release_point"
    }

    fn validate(&self, scope: &ReleasePointScope<'r>, ctx: &ValidatorContext<'_>) -> RuleResult<Vec<Violation>> {
        let rp = scope.release_point;
        let year = scope.report.year;
        let mut violations = Vec::new();

        // Only id, status, status year and type reach the national inventory for shut-down points
        if rp.status.is_operating() {
            if rp.is_fugitive() {
                check_fugitive(rp, &mut violations);
            } else {
                check_stack(rp, &mut violations);
            }
            check_exit_gas(rp, &mut violations);

            if rp.fence_line_distance.map(|d| !in_range(d, dec!(0), dec!(99999))).unwrap_or(false) {
                violations.push(Violation::error(ValidationField::RpFenceline, "releasePoint.fenceLine.range"));
            }
            check_uom_ft(rp.fence_line_distance, rp.fence_line_uom.as_ref(), "Fence Line Distance", &mut violations);

            check_coordinates(scope, ctx, &mut violations);

            if let Some(type_code) = rp.type_code.as_ref().filter(|t| t.is_legacy(year)) {
                violations.push(
                    Violation::error(ValidationField::RpTypeCode, "releasePoint.releasePointTypeCode.legacy")
                        .with_arg(&type_code.description),
                );
            }
        }

        if !rp.status.is_operating() && rp.status_year.is_none() {
            violations.push(Violation::error(ValidationField::RpStatusCode, "releasePoint.statusTypeCode.required"));
        }

        if rp.status == OperatingStatus::PermanentlyShutdown {
            violations.push(Violation::warning(ValidationField::RpStatusCode, "releasePoint.statusTypeCode.psNotCopied"));
        }

        if let Some(status_year) = rp.status_year {
            if !(1900..=year).contains(&status_year) {
                violations.push(
                    Violation::error(ValidationField::RpStatusYear, "releasePoint.statusYear.range").with_arg(year),
                );
            }
        }

        let identifiers = scope
            .facility
            .release_points
            .iter()
            .map(|p| p.release_point_identifier.as_str());
        if is_duplicate_identifier(&rp.release_point_identifier, identifiers) {
            violations.push(Violation::error(
                ValidationField::RpIdentifier,
                "releasePoint.releasePointIdentifier.duplicate",
            ));
        }

        if !rp.status.is_operating() && !existed_last_report(scope, ctx)? {
            violations.push(Violation::error(ValidationField::RpStatusCode, "releasePoint.statusTypeCode.newShutdown"));
        }

        Ok(violations)
    }
}

fn existed_last_report(scope: &ReleasePointScope<'_>, ctx: &ValidatorContext<'_>) -> RuleResult<bool> {
    let Some(previous_year) = ctx.previous_report_year(scope.report)? else {
        return Ok(false);
    };
    let prior = ctx.lookups.prior_years.release_point(
        scope.report.master_facility_id,
        previous_year,
        &scope.release_point.release_point_identifier,
    )?;
    Ok(prior.is_some())
}

// ==========================================
// Stack
// ==========================================
fn check_stack(rp: &ReleasePoint, violations: &mut Vec<Violation>) {
    match rp.exit_gas_temperature {
        None => violations.push(Violation::error(
            ValidationField::RpGasTemp,
            "releasePoint.exitGasTemperature.required",
        )),
        Some(t) if !(-30..=4000).contains(&t) => violations.push(Violation::error(
            ValidationField::RpGasTemp,
            "releasePoint.exitGasTemperature.range",
        )),
        Some(_) => {}
    }

    if rp.exit_gas_velocity.is_none() {
        violations.push(Violation::error(ValidationField::RpGasVelocity, "releasePoint.exitGasVelocity.required"));
    }
    if rp.exit_gas_flow_rate.is_none() {
        violations.push(Violation::error(ValidationField::RpGasFlow, "releasePoint.exitGasFlowRate.required"));
    }

    match rp.stack_height {
        None => violations.push(
            Violation::error(ValidationField::RpStack, "releasePoint.stack.required").with_arg("Stack Height"),
        ),
        Some(h) if !in_range(h, dec!(1), dec!(1300)) => {
            violations.push(Violation::error(ValidationField::RpStack, "releasePoint.stack.heightRange"))
        }
        Some(_) => {}
    }

    let has_rectangle = rp.stack_width.is_some() && rp.stack_length.is_some();
    if rp.stack_diameter.is_none() && !has_rectangle {
        violations.push(Violation::error(ValidationField::RpStack, "releasePoint.stack.diameterOrLengthWidth"));
    } else if rp.stack_diameter.is_some() && (rp.stack_length.is_some() || rp.stack_width.is_some()) {
        violations.push(Violation::error(ValidationField::RpStack, "releasePoint.stack.noDiameterAndLengthWidth"));
    } else {
        check_stack_dimensions(rp, violations);
    }

    check_uom_ft(rp.stack_height, rp.stack_height_uom.as_ref(), "Stack Height", violations);
    check_uom_ft(rp.stack_length, rp.stack_length_uom.as_ref(), "Stack Length", violations);
    check_uom_ft(rp.stack_width, rp.stack_width_uom.as_ref(), "Stack Width", violations);
    check_uom_ft(rp.stack_diameter, rp.stack_diameter_uom.as_ref(), "Stack Diameter", violations);
}

/// Stack cross-section and the labels used when reporting against it
struct StackArea {
    area: Decimal,
    formula: &'static str,
    dimension: &'static str,
}

fn stack_area(rp: &ReleasePoint) -> Option<StackArea> {
    let positive = |v: Option<Decimal>| v.filter(|d| *d > Decimal::ZERO);

    if let Some(diameter) = positive(rp.stack_diameter) {
        let radius = diameter / dec!(2);
        return Some(StackArea {
            area: PI.checked_mul(radius)?.checked_mul(radius)?,
            formula: DIAMETER_FORMULA,
            dimension: STACK_DIAMETER,
        });
    }
    match (positive(rp.stack_width), positive(rp.stack_length)) {
        (Some(width), Some(length)) => Some(StackArea {
            area: width.checked_mul(length)?,
            formula: LENGTH_WIDTH_FORMULA,
            dimension: STACK_LENGTH_WIDTH,
        }),
        _ => None,
    }
}

fn check_stack_dimensions(rp: &ReleasePoint, violations: &mut Vec<Violation>) {
    if let Some(diameter) = rp.stack_diameter {
        if !in_range(diameter, dec!(0.001), dec!(300)) {
            violations.push(Violation::error(ValidationField::RpStack, "releasePoint.stack.diameterRange"));
        }
        if rp.stack_height.map(|h| diameter >= h).unwrap_or(false) {
            violations.push(Violation::warning(
                ValidationField::RpStackWarning,
                "releasePoint.stackWarning.diameterCheck.height",
            ));
        }
    }

    let Some(stack) = stack_area(rp) else {
        return;
    };
    let positive_flow = rp.exit_gas_flow_rate.filter(|f| *f > Decimal::ZERO);

    // Velocity implied by flow / area
    if let Some(flow) = positive_flow {
        let flow_is_acfs = uom_is(rp.exit_gas_flow_uom.as_ref(), ACFS_UOM_CODE).unwrap_or(true);
        let (min, max, uom) = if flow_is_acfs {
            (dec!(0.001), dec!(1500), FPS_UOM_CODE)
        } else {
            (dec!(0.06), dec!(90000), FPM_UOM_CODE)
        };
        let calc_velocity = if stack.area > Decimal::ZERO {
            flow.checked_div(stack.area)
                .unwrap_or(Decimal::MAX)
                .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        } else {
            Decimal::ZERO
        };
        if calc_velocity > max || calc_velocity < min {
            violations.push(
                Violation::error(ValidationField::RpGasVelocity, "releasePoint.exitGasVelocity.range")
                    .with_arg(calc_velocity)
                    .with_arg(uom)
                    .with_arg(stack.dimension)
                    .with_arg(min)
                    .with_arg(max)
                    .with_arg(uom)
                    .with_arg(stack.formula),
            );
        }
    }

    // Flow implied by velocity * area, within 5%
    let positive_velocity = rp.exit_gas_velocity.filter(|v| *v > Decimal::ZERO);
    if let (Some(velocity), Some(flow)) = (positive_velocity, positive_flow) {
        let Some(calc_flow) = velocity.checked_mul(stack.area) else {
            return;
        };
        let velocity_is_fps = uom_is(rp.exit_gas_velocity_uom.as_ref(), FPS_UOM_CODE).unwrap_or(true);
        let uom = if velocity_is_fps { ACFS_UOM_CODE } else { ACFM_UOM_CODE };

        let mut input_flow = flow;
        if let Some(flow_uom) = rp.exit_gas_flow_uom.as_ref() {
            if flow_uom.code != ACFS_UOM_CODE && uom == ACFS_UOM_CODE {
                input_flow = round8(flow / dec!(60));
            } else if flow_uom.code != ACFM_UOM_CODE && uom == ACFM_UOM_CODE {
                input_flow = flow.checked_mul(dec!(60)).unwrap_or(Decimal::MAX);
            }
        }

        let lower = round8(dec!(0.95) * calc_flow);
        let upper = round8(calc_flow.checked_mul(dec!(1.05)).unwrap_or(Decimal::MAX));
        let input_flow = round8(input_flow);
        if input_flow != MIN_STACK_FLOW && (input_flow > upper || input_flow < lower) {
            violations.push(
                Violation::error(ValidationField::RpGasFlow, "releasePoint.exitGasFlowRate.range")
                    .with_arg(round8(calc_flow))
                    .with_arg(uom)
                    .with_arg(stack.dimension)
                    .with_arg(stack.formula),
            );
        }
    }
}

fn round8(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(8, RoundingStrategy::MidpointAwayFromZero)
}

// ==========================================
// Fugitive
// ==========================================
fn check_fugitive(rp: &ReleasePoint, violations: &mut Vec<Violation>) {
    let out_of = |value: Option<Decimal>, min: Decimal, max: Decimal| value.map(|v| !in_range(v, min, max)).unwrap_or(false);

    if out_of(rp.fugitive_height, dec!(0), dec!(500)) {
        violations.push(Violation::error(ValidationField::RpFugitive, "releasePoint.fugitive.heightRange"));
    }
    if out_of(rp.fugitive_length, dec!(1), dec!(10000)) {
        violations.push(Violation::error(ValidationField::RpFugitive, "releasePoint.fugitive.lengthRange"));
    }
    if out_of(rp.fugitive_width, dec!(1), dec!(10000)) {
        violations.push(Violation::error(ValidationField::RpFugitive, "releasePoint.fugitive.widthRange"));
    }
    if rp.fugitive_angle.map(|a| !(0..=89).contains(&a)).unwrap_or(false) {
        violations.push(Violation::error(ValidationField::RpFugitive, "releasePoint.fugitive.angleRange"));
    }

    check_uom_ft(rp.fugitive_length, rp.fugitive_length_uom.as_ref(), "Fugitive Length", violations);
    check_uom_ft(rp.fugitive_width, rp.fugitive_width_uom.as_ref(), "Fugitive Width", violations);
    check_uom_ft(rp.fugitive_height, rp.fugitive_height_uom.as_ref(), "Fugitive Height", violations);
}

// ==========================================
// Exit gas (both types)
// ==========================================
fn check_exit_gas(rp: &ReleasePoint, violations: &mut Vec<Violation>) {
    let fugitive = rp.is_fugitive();

    match (rp.exit_gas_flow_rate, rp.exit_gas_flow_uom.as_ref()) {
        (Some(_), None) | (None, Some(_)) => violations.push(Violation::error(
            ValidationField::RpGasFlow,
            "releasePoint.exitGasFlowRate.uom.required",
        )),
        (_, Some(uom)) if uom.code != ACFS_UOM_CODE && uom.code != ACFM_UOM_CODE => violations.push(
            Violation::error(ValidationField::RpGasFlow, "releasePoint.exitGasFlowRate.requiredUom"),
        ),
        _ => {}
    }

    if let (Some(flow), Some(uom)) = (rp.exit_gas_flow_rate, rp.exit_gas_flow_uom.as_ref()) {
        let acfs = uom.code == ACFS_UOM_CODE;
        let min = if fugitive { Decimal::ZERO } else { MIN_STACK_FLOW };
        let max = if acfs { dec!(200000) } else { dec!(12000000) };
        if !in_range(flow, min, max) {
            let key = match (fugitive, acfs) {
                (true, true) => "releasePoint.exitGasFlowRate.fugitiveACFS.range",
                (true, false) => "releasePoint.exitGasFlowRate.fugitiveACFM.range",
                (false, true) => "releasePoint.exitGasFlowRate.stackACFS.range",
                (false, false) => "releasePoint.exitGasFlowRate.stackACFM.range",
            };
            violations.push(Violation::error(ValidationField::RpGasFlow, key));
        }
    }

    if let (Some(velocity), Some(uom)) = (rp.exit_gas_velocity, rp.exit_gas_velocity_uom.as_ref()) {
        let fps = uom.code == FPS_UOM_CODE;
        let (min, max, key) = match (fugitive, fps) {
            (true, true) => (dec!(0), dec!(400), "releasePoint.exitGasVelocity.fugitiveFPS.range"),
            (true, false) => (dec!(0), dec!(24000), "releasePoint.exitGasVelocity.fugitiveFPM.range"),
            (false, true) => (dec!(0.001), dec!(1500), "releasePoint.exitGasVelocity.stackFPS.range"),
            (false, false) => (dec!(0.06), dec!(90000), "releasePoint.exitGasVelocity.stackFPM.range"),
        };
        if !in_range(velocity, min, max) {
            violations.push(Violation::error(ValidationField::RpGasVelocity, key));
        }
    }

    match (rp.exit_gas_velocity, rp.exit_gas_velocity_uom.as_ref()) {
        (Some(_), None) | (None, Some(_)) => violations.push(Violation::error(
            ValidationField::RpGasVelocity,
            "releasePoint.exitGasVelocity.uom.required",
        )),
        (_, Some(uom)) if uom.code != FPS_UOM_CODE && uom.code != FPM_UOM_CODE => violations.push(
            Violation::error(ValidationField::RpGasVelocity, "releasePoint.exitGasVelocity.requiredUom"),
        ),
        _ => {}
    }
}

/// Linear dimensions must be reported in feet
fn check_uom_ft(measure: Option<Decimal>, uom: Option<&UnitMeasure>, label: &str, violations: &mut Vec<Violation>) {
    let wrong_unit = match uom {
        Some(uom) => uom.code != FEET_UOM_CODE,
        None => measure.is_some(),
    };
    if wrong_unit {
        violations.push(Violation::error(ValidationField::RpUomFt, "releasePoint.uom.ft").with_arg(label));
    }
}

/// `Some(true)` when the unit is present and has the code
fn uom_is(uom: Option<&UnitMeasure>, code: &str) -> Option<bool> {
    uom.map(|u| u.code == code)
}

// ==========================================
// Coordinates
// ==========================================
fn check_coordinates(scope: &ReleasePointScope<'_>, ctx: &ValidatorContext<'_>, violations: &mut Vec<Violation>) {
    let rp = scope.release_point;
    match (rp.latitude, rp.longitude) {
        (Some(latitude), Some(longitude)) => {
            let tolerance = ctx
                .coordinate_tolerance(&scope.report.eis_program_id)
                .round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero);
            let pairs = [
                ("latitude", latitude, scope.facility.latitude),
                ("longitude", longitude, scope.facility.longitude),
            ];
            for (label, coordinate, facility_coordinate) in pairs {
                let Some(facility_coordinate) = facility_coordinate else {
                    continue;
                };
                if !within_tolerance(coordinate, facility_coordinate, tolerance) {
                    violations.push(
                        Violation::error(ValidationField::RpCoordinate, "releasePoint.coordinate.tolerance.facilityRange")
                            .with_arg(label)
                            .with_arg(tolerance.normalize())
                            .with_arg(label)
                            .with_arg(fixed6(facility_coordinate)),
                    );
                }
            }
        }
        (None, None) => {}
        _ => violations.push(Violation::warning(ValidationField::RpCoordinate, "releasePoint.coordinate.warning")),
    }
}

fn within_tolerance(coordinate: Decimal, facility_coordinate: Decimal, tolerance: Decimal) -> bool {
    let coordinate = round6(coordinate);
    let max = round6(facility_coordinate + tolerance);
    let min = round6(facility_coordinate - tolerance);
    coordinate >= min && coordinate <= max
}

fn round6(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounded and padded to six places for display
fn fixed6(value: Decimal) -> Decimal {
    let mut value = round6(value);
    value.rescale(6);
    value
}
