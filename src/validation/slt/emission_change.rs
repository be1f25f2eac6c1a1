// ==========================================
// CAERS Core - Year-over-Year Emission Change
// ==========================================
// Warns when a total moved by more than the configured
// percent against the same pollutant and period type
// in the same process of the previous report
// ==========================================

use crate::domain::emission::Emission;
use crate::engine::mass_units::convert_to_tons;
use crate::repository::prior_year::PriorEmission;
use crate::validation::context::{EmissionScope, Validator, ValidatorContext};
use crate::validation::error::RuleResult;
use crate::validation::feature::ValidationFeature;
use crate::validation::field::ValidationField;
use crate::validation::result::Violation;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::debug;

pub struct EmissionChangeValidator;

impl<'r> Validator<EmissionScope<'r>> for EmissionChangeValidator {
    fn name(&self) -> &'static str {
        "slt.emission_change"
    }

    fn feature(&self) -> ValidationFeature {
        ValidationFeature::Slt
    }

    fn validate(&self, scope: &EmissionScope<'r>, ctx: &ValidatorContext<'_>) -> RuleResult<Vec<Violation>> {
        let emission = scope.emission;
        let (Some(pollutant_code), Some(current)) = (emission.pollutant_code(), emission.total_emissions) else {
            return Ok(vec![]);
        };
        let Some(previous_year) = ctx.previous_report_year(scope.report)? else {
            return Ok(vec![]);
        };
        let Some(prior_process) = ctx.lookups.prior_years.emissions_process(
            scope.report.master_facility_id,
            previous_year,
            &scope.unit.unit_identifier,
            &scope.process.process_identifier,
        )?
        else {
            return Ok(vec![]);
        };

        let period_type = scope.period.period_type.as_ref().map(|t| t.code.as_str());
        let Some(prior) = prior_process
            .emissions
            .iter()
            .find(|p| p.pollutant_code == pollutant_code && p.period_type_code.as_deref() == period_type)
        else {
            return Ok(vec![]);
        };

        let Some((previous, current)) = comparable_totals(prior, emission, current) else {
            debug!(pollutant_code, "prior total not comparable, change check skipped");
            return Ok(vec![]);
        };
        if previous.is_zero() {
            return Ok(vec![]);
        }

        let change = percent_change(previous, current)
            .unwrap_or(Decimal::MAX)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let threshold = ctx.settings.slt_change_threshold;
        if change <= threshold {
            return Ok(vec![]);
        }

        Ok(vec![Violation::warning(
            ValidationField::EmissionTotalEmissions,
            "emission.totalEmissions.sltChange",
        )
        .with_args([previous_year.to_string(), change.normalize().to_string(), threshold.normalize().to_string()])])
    }
}

/// |current - previous| as a percent of previous; None past Decimal::MAX
fn percent_change(previous: Decimal, current: Decimal) -> Option<Decimal> {
    current
        .checked_sub(previous)?
        .abs()
        .checked_div(previous.abs())?
        .checked_mul(dec!(100))
}

/// Both totals in one unit: as reported when the UoM matches, otherwise in tons
fn comparable_totals(prior: &PriorEmission, emission: &Emission, current: Decimal) -> Option<(Decimal, Decimal)> {
    let previous = prior.total_emissions?;
    let prior_uom = prior.emissions_uom_code.as_deref()?;
    let current_uom = emission.emissions_uom.as_ref()?.code.as_str();
    if prior_uom == current_uom {
        return Some((previous, current));
    }
    Some((convert_to_tons(previous, prior_uom)?, convert_to_tons(current, current_uom)?))
}
