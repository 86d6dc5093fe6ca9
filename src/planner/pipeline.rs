//! Synthesis, scoping and validation composed into one run.

use tracing::{info, warn};

use crate::error::Result;
use crate::oscal::{AssessmentPlan, ComponentDefinition};
use crate::scope::{AssessmentScope, ScopeObserver};

use super::synthesis::PlanSynthesizer;
use super::validation::{PlanValidator, ValidationReport};

/// Builds a plan and optionally tailors it to a scope.
#[derive(Debug)]
pub struct TailoringPipeline<S, V> {
    synthesizer: S,
    validator: V,
}

impl<S, V> TailoringPipeline<S, V>
where
    S: PlanSynthesizer,
    V: PlanValidator,
{
    /// Creates a pipeline from its collaborators.
    pub const fn new(synthesizer: S, validator: V) -> Self {
        Self {
            synthesizer,
            validator,
        }
    }

    /// Synthesizes a plan for `framework_id` and applies `scope` when given.
    ///
    /// The plan is validated after synthesis and again after scoping.
    ///
    /// # Errors
    ///
    /// Returns an error if synthesis fails or either validation fails.
    pub fn run<O>(
        &self,
        definitions: &[ComponentDefinition],
        framework_id: &str,
        scope: Option<&AssessmentScope>,
        observer: &mut O,
    ) -> Result<AssessmentPlan>
    where
        O: ScopeObserver + ?Sized,
    {
        let mut plan = self.synthesizer.synthesize(definitions, framework_id)?;
        self.validator.validate(&plan)?;

        if let Some(scope) = scope {
            if scope.framework_id() != framework_id {
                warn!(
                    "Scope targets framework '{}' but the plan is for '{framework_id}'",
                    scope.framework_id()
                );
            }
            tailor_plan(&self.validator, &mut plan, scope, observer)?;
        }

        Ok(plan)
    }
}

/// Applies `scope` to an existing plan and validates the result.
///
/// # Errors
///
/// Returns an error if the tailored plan fails validation.
pub fn tailor_plan<V, O>(
    validator: &V,
    plan: &mut AssessmentPlan,
    scope: &AssessmentScope,
    observer: &mut O,
) -> Result<ValidationReport>
where
    V: PlanValidator + ?Sized,
    O: ScopeObserver + ?Sized,
{
    info!(
        "Applying scope with {} control(s)",
        scope.include_controls().len()
    );
    scope.apply(plan, observer);
    validator.validate(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ComplyTimeError, PlanError};
    use crate::oscal::{ControlSelection, SelectControlById};
    use crate::oscal::testing::{activity, plan};
    use crate::planner::synthesis::MockPlanSynthesizer;
    use crate::planner::synthesis::fixtures::cis_definition;
    use crate::planner::validation::MockPlanValidator;
    use crate::planner::{ComponentDefinitionSynthesizer, StructuralValidator};
    use crate::scope::{NoopObserver, ScopeReport};

    fn synthesized() -> AssessmentPlan {
        plan(
            Some(vec![activity(
                "6c1f4e5d-8a3b-4d2c-9e1f-0a2b3c4d5e6f",
                Some(vec![ControlSelection::with_controls(["ac-1", "ac-2"])]),
                None,
            )]),
            vec![ControlSelection::with_controls(["ac-1", "ac-2"])],
        )
    }

    #[test]
    fn test_run_without_scope_validates_once() {
        let mut synthesizer = MockPlanSynthesizer::new();
        synthesizer
            .expect_synthesize()
            .withf(|definitions, framework| definitions.is_empty() && framework == "cis")
            .times(1)
            .returning(|_, _| Ok(synthesized()));

        let mut validator = MockPlanValidator::new();
        validator
            .expect_validate()
            .times(1)
            .returning(|_| Ok(ValidationReport::default()));

        let pipeline = TailoringPipeline::new(synthesizer, validator);
        let result = pipeline.run(&[], "cis", None, &mut NoopObserver).unwrap();
        assert_eq!(result, synthesized());
    }

    #[test]
    fn test_run_with_scope_validates_twice() {
        let mut synthesizer = MockPlanSynthesizer::new();
        synthesizer
            .expect_synthesize()
            .returning(|_, _| Ok(synthesized()));

        let mut validator = MockPlanValidator::new();
        validator
            .expect_validate()
            .times(2)
            .returning(|_| Ok(ValidationReport::default()));

        let pipeline = TailoringPipeline::new(synthesizer, validator);
        let scope = AssessmentScope::new("cis", ["ac-2"]);
        let mut report = ScopeReport::new();
        let result = pipeline.run(&[], "cis", Some(&scope), &mut report).unwrap();

        assert_eq!(
            result.reviewed_controls.control_selections[0].included_ids(),
            vec!["ac-2"]
        );
        assert_eq!(report.visited(), 2);
    }

    #[test]
    fn test_synthesis_failure_skips_validation() {
        let mut synthesizer = MockPlanSynthesizer::new();
        synthesizer.expect_synthesize().returning(|_, framework| {
            Err(ComplyTimeError::Plan(PlanError::FrameworkNotFound {
                framework_id: framework.to_string(),
            }))
        });

        let mut validator = MockPlanValidator::new();
        validator.expect_validate().never();

        let pipeline = TailoringPipeline::new(synthesizer, validator);
        let result = pipeline.run(&[], "cis", None, &mut NoopObserver);
        assert!(matches!(
            result,
            Err(ComplyTimeError::Plan(PlanError::FrameworkNotFound { .. }))
        ));
    }

    #[test]
    fn test_end_to_end_scope_marks_unrelated_activity_skipped() {
        let pipeline =
            TailoringPipeline::new(ComponentDefinitionSynthesizer::new(), StructuralValidator::new());
        let scope = AssessmentScope::new("cis", ["cis_1.1"]);

        let plan = pipeline
            .run(&[cis_definition()], "cis", Some(&scope), &mut NoopObserver)
            .unwrap();

        assert_eq!(
            plan.reviewed_controls.control_selections[0].included_ids(),
            vec!["cis_1.1"]
        );

        let activities = plan.activities();
        let hashing = &activities[0];
        assert!(!crate::scope::is_skipped(hashing.props.as_deref()));
        assert_eq!(
            hashing.related_controls.as_ref().unwrap().control_selections[0].included_ids(),
            vec!["cis_1.1"]
        );

        let root_login = &activities[1];
        assert!(crate::scope::is_skipped(root_login.props.as_deref()));
        assert!(root_login.related_controls.is_none());
    }

    #[test]
    fn test_tailor_existing_plan() {
        let mut plan = synthesized();
        let scope = AssessmentScope::new("cis", ["ac-3"]);

        let report =
            tailor_plan(&StructuralValidator::new(), &mut plan, &scope, &mut NoopObserver).unwrap();

        assert!(crate::scope::is_skipped(plan.activities()[0].props.as_deref()));
        assert!(report.is_valid());
    }

    #[test]
    fn test_tailor_empty_scope_keeps_top_level_exclusions() {
        let mut selection = ControlSelection::all();
        selection.exclude_controls = Some(vec![SelectControlById::new("ac-3")]);
        let mut plan = plan(None, vec![selection]);
        let scope = AssessmentScope::new("cis", Vec::<String>::new());

        let report =
            tailor_plan(&StructuralValidator::new(), &mut plan, &scope, &mut NoopObserver).unwrap();

        let top = &plan.reviewed_controls.control_selections[0];
        assert!(top.include_all.is_none());
        assert!(top.include_controls.is_none());
        assert_eq!(top.exclude_controls.as_ref().unwrap()[0].control_id, "ac-3");
        assert!(report.is_valid());
        assert!(!report.warnings.is_empty());
    }
}
