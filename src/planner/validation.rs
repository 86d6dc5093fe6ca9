//! Structural validation of assessment plans.
//!
//! Checks the constraints a tailored plan must keep: identifiers are well
//! formed, every activity and step selection still selects something,
//! exclusions sit inside an included range, and skipped branches carry no
//! control references.

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ComplyTimeError, PlanError, Result};
use crate::oscal::{AssessmentPlan, ControlSelection, ReviewedControls};
use crate::scope::{BranchPath, is_skipped};

/// Validates an assessment plan.
#[cfg_attr(test, mockall::automock)]
pub trait PlanValidator {
    /// Validates `plan`, returning the non-fatal findings.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::ValidationFailed`] for the first error found.
    fn validate(&self, plan: &AssessmentPlan) -> Result<ValidationReport>;
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Location in the document.
    pub path: String,
    /// Description of the problem.
    pub message: String,
}

/// All findings for a plan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Violations that make the plan invalid.
    pub errors: Vec<ValidationIssue>,
    /// Suspicious but valid constructs.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true if no errors were found.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validator for the structural rules of tailored plans.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralValidator;

impl StructuralValidator {
    /// Creates a validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Collects every finding without failing.
    #[must_use]
    pub fn inspect(&self, plan: &AssessmentPlan) -> ValidationReport {
        let mut report = ValidationReport::default();

        check_uuid(&mut report, "assessment-plan/uuid", &plan.uuid);
        if plan.metadata.title.trim().is_empty() {
            report.error("assessment-plan/metadata/title", "title cannot be empty");
        }

        for activity in plan.activities() {
            let activity_path = format!("activity {}", activity.uuid);
            check_uuid(&mut report, &activity_path, &activity.uuid);

            let branch = BranchPath::Activity {
                activity: activity.uuid.clone(),
            };
            check_branch(
                &mut report,
                &branch,
                is_skipped(activity.props.as_deref()),
                activity.related_controls.as_ref(),
            );

            for step in activity.steps.iter().flatten() {
                check_uuid(&mut report, &format!("{activity_path}/step {}", step.uuid), &step.uuid);

                let branch = BranchPath::Step {
                    activity: activity.uuid.clone(),
                    step: step.uuid.clone(),
                };
                check_branch(
                    &mut report,
                    &branch,
                    is_skipped(step.props.as_deref()),
                    step.reviewed_controls.as_ref(),
                );
            }
        }

        let branch = BranchPath::Plan;
        for (index, selection) in plan.reviewed_controls.control_selections.iter().enumerate() {
            let path = format!("{branch}/control-selections[{index}]");
            check_selection(&mut report, &path, selection, false);
            if !selection.selects_any() {
                report.warning(path, "selection includes no controls");
            }
        }

        report
    }
}

impl PlanValidator for StructuralValidator {
    fn validate(&self, plan: &AssessmentPlan) -> Result<ValidationReport> {
        let report = self.inspect(plan);

        for issue in &report.warnings {
            warn!("{issue}");
        }

        if let Some(first) = report.errors.first() {
            debug!("Plan validation found {} error(s)", report.errors.len());
            return Err(ComplyTimeError::Plan(PlanError::validation(
                first.message.clone(),
                first.path.clone(),
            )));
        }

        debug!("Plan validation passed");
        Ok(report)
    }
}

fn check_uuid(report: &mut ValidationReport, path: &str, value: &str) {
    if Uuid::parse_str(value).is_err() {
        report.error(path, format!("'{value}' is not a valid UUID"));
    }
}

fn check_branch(
    report: &mut ValidationReport,
    branch: &BranchPath,
    skipped: bool,
    controls: Option<&ReviewedControls>,
) {
    let Some(controls) = controls else {
        return;
    };

    if skipped {
        report.error(branch.to_string(), "skipped branch still references controls");
    }

    if controls.control_selections.is_empty() {
        report.warning(branch.to_string(), "no control selections");
    }

    for (index, selection) in controls.control_selections.iter().enumerate() {
        let path = format!("{branch}/control-selections[{index}]");
        check_selection(report, &path, selection, true);
        if !selection.selects_any() {
            report.error(path, "selection includes no controls");
        }
    }
}

/// Checks control references of one selection.
///
/// Exclusions outside an included range are errors on activity and step
/// branches and warnings on the top-level selections, which a scope may
/// leave empty.
fn check_selection(
    report: &mut ValidationReport,
    path: &str,
    selection: &ControlSelection,
    on_branch: bool,
) {
    let included = selection.include_controls.iter().flatten();
    let excluded = selection.exclude_controls.iter().flatten();
    for control in included.chain(excluded) {
        if control.control_id.trim().is_empty() {
            report.error(path, "control-id cannot be empty");
        }
    }

    let has_exclusions = selection.exclude_controls.as_ref().is_some_and(|e| !e.is_empty());
    if has_exclusions && !selection.selects_any() {
        let message = "exclude-controls must be within a range of included controls";
        if on_branch {
            report.error(path, message);
        } else {
            report.warning(path, message);
        }
    }
}
