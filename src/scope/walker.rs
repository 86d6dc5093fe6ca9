//! Tree walker applying a scope to every control selection of a plan.

use std::collections::BTreeSet;

use tracing::debug;

use crate::oscal::{
    Activity, AssessmentPlan, COMPLYTIME_NS, ControlSelection, Property, ReviewedControls, SKIPPED,
    Step, has_prop,
};

use super::assessment_scope::AssessmentScope;
use super::filter::filter_control_selection;
use super::observer::{BranchPath, ScopeObserver, SelectionLocation};

/// Applies a scope to every control selection reachable from the plan.
///
/// Visits activity `related-controls`, then each step's `reviewed-controls`,
/// for every local activity, and finally the plan's `reviewed-controls`.
/// On an activity or step path, selections left without controls are
/// dropped; when none survive the path is cleared and its owner gets a
/// `skipped` property. Top-level selections are filtered in place only.
pub fn apply_scope<O: ScopeObserver + ?Sized>(
    plan: &mut AssessmentPlan,
    scope: &AssessmentScope,
    observer: &mut O,
) {
    let include = scope.include_controls();
    debug!(
        framework = scope.framework_id(),
        count = include.len(),
        "Found included controls"
    );

    if let Some(activities) = plan
        .local_definitions
        .as_mut()
        .and_then(|l| l.activities.as_mut())
    {
        for activity in activities.iter_mut() {
            scope_activity(activity, include, observer);
        }
    }

    for (index, selection) in plan.reviewed_controls.control_selections.iter_mut().enumerate() {
        let result = filter_control_selection(selection, include);
        let location = SelectionLocation {
            branch: BranchPath::Plan,
            index,
        };
        observer.selection_filtered(&location, &result);
    }
}

fn scope_activity<O: ScopeObserver + ?Sized>(
    activity: &mut Activity,
    include: &BTreeSet<String>,
    observer: &mut O,
) {
    let branch = BranchPath::Activity {
        activity: activity.uuid.clone(),
    };
    let emptied = match activity.related_controls.as_mut() {
        Some(related) => filter_branch(related, include, &branch, observer),
        None => false,
    };
    if emptied {
        activity.related_controls = None;
        mark_skipped(&mut activity.props);
        observer.branch_skipped(&branch);
    }

    let Some(steps) = activity.steps.as_mut() else {
        return;
    };
    for step in steps.iter_mut() {
        scope_step(&activity.uuid, step, include, observer);
    }
}

fn scope_step<O: ScopeObserver + ?Sized>(
    activity_uuid: &str,
    step: &mut Step,
    include: &BTreeSet<String>,
    observer: &mut O,
) {
    let branch = BranchPath::Step {
        activity: activity_uuid.to_string(),
        step: step.uuid.clone(),
    };
    let emptied = match step.reviewed_controls.as_mut() {
        Some(reviewed) => filter_branch(reviewed, include, &branch, observer),
        None => false,
    };
    if emptied {
        step.reviewed_controls = None;
        mark_skipped(&mut step.props);
        observer.branch_skipped(&branch);
    }
}

/// Filters every selection of a branch and prunes the empty ones.
///
/// Returns true if the branch had selections and none of them survived.
fn filter_branch<O: ScopeObserver + ?Sized>(
    reviewed: &mut ReviewedControls,
    include: &BTreeSet<String>,
    branch: &BranchPath,
    observer: &mut O,
) -> bool {
    if reviewed.control_selections.is_empty() {
        return false;
    }

    for (index, selection) in reviewed.control_selections.iter_mut().enumerate() {
        let result = filter_control_selection(selection, include);
        let location = SelectionLocation {
            branch: branch.clone(),
            index,
        };
        observer.selection_filtered(&location, &result);
    }

    reviewed.control_selections.retain(ControlSelection::selects_any);
    reviewed.control_selections.is_empty()
}

/// Adds the tool's `skipped` property to a property list.
///
/// Never adds a second copy.
pub fn mark_skipped(props: &mut Option<Vec<Property>>) {
    let props = props.get_or_insert_with(Vec::new);
    match props.iter_mut().find(|p| p.matches(SKIPPED, Some(COMPLYTIME_NS))) {
        Some(existing) => existing.value = String::from("true"),
        None => props.push(Property::complytime(SKIPPED, "true")),
    }
}

/// Returns true if the properties carry the tool's `skipped` marker.
#[must_use]
pub fn is_skipped(props: Option<&[Property]>) -> bool {
    has_prop(props, SKIPPED, Some(COMPLYTIME_NS), "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oscal::testing::{activity, plan, step};
    use crate::oscal::{IncludeAll, SelectControlById};
    use crate::scope::{NoopObserver, ScopeReport};

    fn scope(ids: &[&str]) -> AssessmentScope {
        AssessmentScope::new("test", ids.iter().copied())
    }

    fn all_selections(plan: &AssessmentPlan) -> Vec<&ControlSelection> {
        let mut out = Vec::new();
        for a in plan.activities() {
            if let Some(related) = &a.related_controls {
                out.extend(related.control_selections.iter());
            }
            for s in a.steps.iter().flatten() {
                if let Some(reviewed) = &s.reviewed_controls {
                    out.extend(reviewed.control_selections.iter());
                }
            }
        }
        out.extend(plan.reviewed_controls.control_selections.iter());
        out
    }

    #[test]
    fn test_top_level_only() {
        let mut p = plan(None, vec![ControlSelection::with_controls(["example-1", "example-2"])]);
        apply_scope(&mut p, &scope(&["example-2"]), &mut NoopObserver);

        let selection = &p.reviewed_controls.control_selections[0];
        assert_eq!(selection.included_ids(), vec!["example-2"]);
    }

    #[test]
    fn test_fully_out_of_scope_top_level() {
        let mut p = plan(None, vec![ControlSelection::with_controls([""])]);
        apply_scope(&mut p, &scope(&[]), &mut NoopObserver);

        let selection = &p.reviewed_controls.control_selections[0];
        assert!(selection.include_controls.is_none());
        assert!(selection.props.is_none());
        assert!(p.local_definitions.is_none());
    }

    #[test]
    fn test_partial_scope_with_nested_activity() {
        let mut p = plan(
            Some(vec![activity(
                "a1",
                Some(vec![ControlSelection::with_controls(["example-1"])]),
                None,
            )]),
            vec![],
        );
        apply_scope(&mut p, &scope(&["example-1", "example-2"]), &mut NoopObserver);

        let a = &p.activities()[0];
        let related = a.related_controls.as_ref().unwrap();
        assert_eq!(related.control_selections[0].included_ids(), vec!["example-1"]);
        assert!(!is_skipped(a.props.as_deref()));
    }

    #[test]
    fn test_activity_fully_excluded() {
        let mut p = plan(
            Some(vec![activity(
                "a1",
                Some(vec![ControlSelection::with_controls(["example-9"])]),
                None,
            )]),
            vec![],
        );
        let mut report = ScopeReport::new();
        apply_scope(&mut p, &scope(&["example-1"]), &mut report);

        let a = &p.activities()[0];
        assert!(a.related_controls.is_none());
        assert!(is_skipped(a.props.as_deref()));
        let prop = &a.props.as_ref().unwrap()[0];
        assert_eq!(prop.name, "skipped");
        assert_eq!(prop.value, "true");
        assert_eq!(prop.ns.as_deref(), Some(COMPLYTIME_NS));

        assert_eq!(report.emptied(), 1);
        assert_eq!(
            report.skipped,
            vec![BranchPath::Activity {
                activity: String::from("a1")
            }]
        );
    }

    #[test]
    fn test_step_fully_excluded() {
        let mut p = plan(
            Some(vec![activity(
                "a1",
                Some(vec![ControlSelection::with_controls(["ac-1"])]),
                Some(vec![
                    step("s1", Some(vec![ControlSelection::with_controls(["ac-9"])])),
                    step("s2", Some(vec![ControlSelection::with_controls(["ac-1", "ac-9"])])),
                ]),
            )]),
            vec![],
        );
        apply_scope(&mut p, &scope(&["ac-1"]), &mut NoopObserver);

        let a = &p.activities()[0];
        assert!(!is_skipped(a.props.as_deref()));
        let steps = a.steps.as_ref().unwrap();
        assert!(steps[0].reviewed_controls.is_none());
        assert!(is_skipped(steps[0].props.as_deref()));
        assert!(!is_skipped(steps[1].props.as_deref()));
        let kept = &steps[1].reviewed_controls.as_ref().unwrap().control_selections[0];
        assert_eq!(kept.included_ids(), vec!["ac-1"]);
    }

    #[test]
    fn test_empty_sibling_selection_is_pruned() {
        let mut p = plan(
            Some(vec![activity(
                "a1",
                Some(vec![
                    ControlSelection::with_controls(["ac-9"]),
                    ControlSelection::with_controls(["ac-1"]),
                ]),
                None,
            )]),
            vec![],
        );
        apply_scope(&mut p, &scope(&["ac-1"]), &mut NoopObserver);

        let a = &p.activities()[0];
        let related = a.related_controls.as_ref().unwrap();
        assert_eq!(related.control_selections.len(), 1);
        assert_eq!(related.control_selections[0].included_ids(), vec!["ac-1"]);
        assert!(a.props.is_none());
    }

    #[test]
    fn test_absent_paths_are_not_visited() {
        let mut p = plan(
            Some(vec![
                activity("a1", None, None),
                activity("a2", Some(vec![]), Some(vec![step("s1", None)])),
            ]),
            vec![],
        );
        let mut report = ScopeReport::new();
        apply_scope(&mut p, &scope(&["ac-1"]), &mut report);

        assert_eq!(report.visited(), 0);
        assert!(report.skipped.is_empty());
        assert!(p.activities().iter().all(|a| a.props.is_none()));
        assert!(p.activities()[1].related_controls.is_some());
    }

    #[test]
    fn test_include_all_always_cleared_and_excludes_kept() {
        let mut with_excludes = ControlSelection::all();
        with_excludes.exclude_controls = Some(vec![SelectControlById::new("ac-3")]);
        let mut p = plan(
            Some(vec![activity(
                "a1",
                Some(vec![ControlSelection::all()]),
                Some(vec![step("s1", Some(vec![ControlSelection::all()]))]),
            )]),
            vec![with_excludes],
        );
        apply_scope(&mut p, &scope(&["ac-1", "ac-3"]), &mut NoopObserver);

        let selections = all_selections(&p);
        assert_eq!(selections.len(), 3);
        assert!(selections.iter().all(|s| s.include_all.is_none()));
        assert!(selections.iter().all(|s| s.included_ids() == vec!["ac-1", "ac-3"]));

        let top = &p.reviewed_controls.control_selections[0];
        assert_eq!(top.exclude_controls, Some(vec![SelectControlById::new("ac-3")]));
        assert_ne!(top.include_all, Some(IncludeAll {}));
    }

    #[test]
    fn test_skipped_branches_have_no_selection() {
        let mut p = plan(
            Some(vec![
                activity(
                    "a1",
                    Some(vec![ControlSelection::all()]),
                    Some(vec![step("s1", Some(vec![ControlSelection::with_controls(["x"])]))]),
                ),
                activity("a2", Some(vec![ControlSelection::with_controls(["y"])]), None),
            ]),
            vec![ControlSelection::all()],
        );
        apply_scope(&mut p, &scope(&[]), &mut NoopObserver);

        for a in p.activities() {
            assert!(is_skipped(a.props.as_deref()));
            assert!(a.related_controls.is_none());
            for s in a.steps.iter().flatten() {
                assert!(is_skipped(s.props.as_deref()));
                assert!(s.reviewed_controls.is_none());
            }
        }
        assert!(p.reviewed_controls.control_selections[0].include_controls.is_none());
    }

    #[test]
    fn test_apply_scope_idempotent() {
        let mut p = plan(
            Some(vec![
                activity(
                    "a1",
                    Some(vec![ControlSelection::with_controls(["ac-1", "ac-2"])]),
                    Some(vec![step("s1", Some(vec![ControlSelection::with_controls(["ac-5"])]))]),
                ),
                activity("a2", Some(vec![ControlSelection::all()]), None),
            ]),
            vec![ControlSelection::with_controls(["ac-1", "ac-5"])],
        );
        let s = scope(&["ac-1", "ac-3"]);
        apply_scope(&mut p, &s, &mut NoopObserver);
        let once = p.clone();
        apply_scope(&mut p, &s, &mut NoopObserver);

        assert_eq!(once, p);
        let step_props = p.activities()[0].steps.as_ref().unwrap()[0].props.as_ref().unwrap();
        assert_eq!(step_props.len(), 1);
    }

    #[test]
    fn test_mark_skipped_does_not_duplicate() {
        let mut props = Some(vec![Property::new("skipped", "false")]);
        mark_skipped(&mut props);
        mark_skipped(&mut props);

        let props = props.unwrap();
        assert_eq!(props.len(), 2);
        assert!(is_skipped(Some(&props)));
        assert_eq!(props[0].value, "false");
    }
}
