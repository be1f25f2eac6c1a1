// ==========================================
// CAERS Core - Validation Engine
// ==========================================
// Depth-first walk of one report:
//   facility → release points → controls → control paths
//            → units → processes → periods → emissions
// Each level runs every registered rule set whose feature is enabled,
// accumulating all violations; nothing short-circuits.
// ==========================================

use crate::domain::facility::EmissionsReport;
use crate::engine::units::UnitConversionTable;
use crate::repository::lookups::Lookups;
use crate::validation::context::{
    ControlPathScope, ControlScope, EmissionScope, FacilityScope, PeriodScope, ProcessScope,
    ReleasePointScope, UnitScope, ValidationScope, ValidationSettings, Validator, ValidatorContext,
};
use crate::validation::error::RuleResult;
use crate::validation::feature::ValidationFeature;
use crate::validation::federal;
use crate::validation::result::{ValidationEntry, ValidationResult};
use crate::validation::slt;
use std::collections::BTreeSet;
use tracing::{debug, info};

type Rules<V> = Vec<Box<V>>;

// ==========================================
// ValidationRegistry
// ==========================================
/// Rule sets per entity level, in registration order
#[derive(Default)]
pub struct ValidationRegistry {
    facility: Rules<dyn for<'r> Validator<FacilityScope<'r>>>,
    release_point: Rules<dyn for<'r> Validator<ReleasePointScope<'r>>>,
    control: Rules<dyn for<'r> Validator<ControlScope<'r>>>,
    control_path: Rules<dyn for<'r> Validator<ControlPathScope<'r>>>,
    unit: Rules<dyn for<'r> Validator<UnitScope<'r>>>,
    process: Rules<dyn for<'r> Validator<ProcessScope<'r>>>,
    period: Rules<dyn for<'r> Validator<PeriodScope<'r>>>,
    emission: Rules<dyn for<'r> Validator<EmissionScope<'r>>>,
}

impl ValidationRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Federal catalog only
    pub fn federal() -> Self {
        let mut registry = Self::default();
        federal::register(&mut registry);
        registry
    }

    /// Federal catalog plus the SLT rule sets
    pub fn standard() -> Self {
        let mut registry = Self::federal();
        slt::register(&mut registry);
        registry
    }

    pub fn register_facility<V>(&mut self, validator: V) -> &mut Self
    where
        V: for<'r> Validator<FacilityScope<'r>> + 'static,
    {
        self.facility.push(Box::new(validator));
        self
    }

    pub fn register_release_point<V>(&mut self, validator: V) -> &mut Self
    where
        V: for<'r> Validator<ReleasePointScope<'r>> + 'static,
    {
        self.release_point.push(Box::new(validator));
        self
    }

    pub fn register_control<V>(&mut self, validator: V) -> &mut Self
    where
        V: for<'r> Validator<ControlScope<'r>> + 'static,
    {
        self.control.push(Box::new(validator));
        self
    }

    pub fn register_control_path<V>(&mut self, validator: V) -> &mut Self
    where
        V: for<'r> Validator<ControlPathScope<'r>> + 'static,
    {
        self.control_path.push(Box::new(validator));
        self
    }

    pub fn register_unit<V>(&mut self, validator: V) -> &mut Self
    where
        V: for<'r> Validator<UnitScope<'r>> + 'static,
    {
        self.unit.push(Box::new(validator));
        self
    }

    pub fn register_process<V>(&mut self, validator: V) -> &mut Self
    where
        V: for<'r> Validator<ProcessScope<'r>> + 'static,
    {
        self.process.push(Box::new(validator));
        self
    }

    pub fn register_period<V>(&mut self, validator: V) -> &mut Self
    where
        V: for<'r> Validator<PeriodScope<'r>> + 'static,
    {
        self.period.push(Box::new(validator));
        self
    }

    pub fn register_emission<V>(&mut self, validator: V) -> &mut Self
    where
        V: for<'r> Validator<EmissionScope<'r>> + 'static,
    {
        self.emission.push(Box::new(validator));
        self
    }

    pub fn len(&self) -> usize {
        self.facility.len()
            + self.release_point.len()
            + self.control.len()
            + self.control_path.len()
            + self.unit.len()
            + self.process.len()
            + self.period.len()
            + self.emission.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ==========================================
// ValidationEngine
// ==========================================
pub struct ValidationEngine {
    registry: ValidationRegistry,
    settings: ValidationSettings,
    units: UnitConversionTable,
    lookups: Lookups,
}

impl ValidationEngine {
    /// Standard registry and unit table
    pub fn new(settings: ValidationSettings, lookups: Lookups) -> Self {
        Self {
            registry: ValidationRegistry::standard(),
            settings,
            units: UnitConversionTable::standard(),
            lookups,
        }
    }

    pub fn with_registry(mut self, registry: ValidationRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_units(mut self, units: UnitConversionTable) -> Self {
        self.units = units;
        self
    }

    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    /// Validates with the features configured in the settings
    pub fn validate_configured(&self, report: &EmissionsReport) -> RuleResult<ValidationResult> {
        self.validate(report, &self.settings.features)
    }

    /// Runs every enabled rule set over the whole report.
    ///
    /// Business-rule violations are entries on the result; `Err` only when a lookup fails.
    pub fn validate(
        &self,
        report: &EmissionsReport,
        features: &BTreeSet<ValidationFeature>,
    ) -> RuleResult<ValidationResult> {
        info!(
            report_id = report.id,
            year = report.year,
            features = ?features,
            "validation started"
        );

        let ctx = ValidatorContext::new(&self.settings, &self.units, &self.lookups);
        let mut result = ValidationResult::new();
        let facility = &report.facility_site;

        let facility_scope = FacilityScope { report, facility };
        apply(&self.registry.facility, &facility_scope, &ctx, features, &mut result)?;

        for release_point in &facility.release_points {
            let scope = ReleasePointScope {
                report,
                facility,
                release_point,
            };
            apply(&self.registry.release_point, &scope, &ctx, features, &mut result)?;
        }

        for control in &facility.controls {
            let scope = ControlScope {
                report,
                facility,
                control,
            };
            apply(&self.registry.control, &scope, &ctx, features, &mut result)?;
        }

        for control_path in &facility.control_paths {
            let scope = ControlPathScope {
                report,
                facility,
                control_path,
            };
            apply(&self.registry.control_path, &scope, &ctx, features, &mut result)?;
        }

        for unit in &facility.emissions_units {
            let unit_scope = UnitScope { report, facility, unit };
            apply(&self.registry.unit, &unit_scope, &ctx, features, &mut result)?;

            for process in &unit.processes {
                let process_scope = ProcessScope {
                    report,
                    facility,
                    unit,
                    process,
                };
                apply(&self.registry.process, &process_scope, &ctx, features, &mut result)?;

                for period in &process.reporting_periods {
                    let period_scope = PeriodScope {
                        report,
                        facility,
                        unit,
                        process,
                        period,
                    };
                    apply(&self.registry.period, &period_scope, &ctx, features, &mut result)?;

                    for emission in &period.emissions {
                        let emission_scope = EmissionScope {
                            report,
                            facility,
                            unit,
                            process,
                            period,
                            emission,
                        };
                        apply(&self.registry.emission, &emission_scope, &ctx, features, &mut result)?;
                    }
                }
            }
        }

        info!(
            report_id = report.id,
            errors = result.error_count(),
            warnings = result.warning_count(),
            status = %result.status(),
            "validation finished"
        );
        Ok(result)
    }

    /// Validates and records the verdict on the report
    pub fn validate_and_mark(
        &self,
        report: &mut EmissionsReport,
        features: &BTreeSet<ValidationFeature>,
    ) -> RuleResult<ValidationResult> {
        let result = self.validate(report, features)?;
        report.validation_status = result.status();
        Ok(result)
    }
}

fn apply<S, V>(
    rules: &[Box<V>],
    scope: &S,
    ctx: &ValidatorContext<'_>,
    features: &BTreeSet<ValidationFeature>,
    result: &mut ValidationResult,
) -> RuleResult<()>
where
    S: ValidationScope,
    V: Validator<S> + ?Sized,
{
    if rules.is_empty() {
        return Ok(());
    }
    let detail = scope.detail();
    for rule in rules.iter().filter(|r| features.contains(&r.feature())) {
        let violations = rule.validate(scope, ctx)?;
        if !violations.is_empty() {
            debug!(rule = rule.name(), entity = %detail.description, count = violations.len(), "rule violations");
        }
        let feature = rule.feature();
        for violation in violations {
            result.add_entry(ValidationEntry::from_violation(violation, &detail, feature));
        }
    }
    Ok(())
}
