//! Assessment plan synthesis from component definitions.
//!
//! Rules and checks are declared as props on components. Props sharing the
//! same `remarks` value form one group: a rule group carries `Rule_Id` and
//! `Rule_Description`, a check group additionally carries `Check_Id` and
//! `Check_Description`. Implemented requirements link controls to rules
//! through their own `Rule_Id` props.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Map;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ComplyTimeError, PlanError, Result};
use crate::oscal::{
    Activity, AssessmentPlan, CHECK_DESCRIPTION, CHECK_ID, ComponentDefinition, ControlSelection,
    ImportSsp, LocalDefinitions, Metadata, Property, RULE_DESCRIPTION, RULE_ID, ReviewedControls,
    Step,
};

/// OSCAL version written into synthesized plans.
pub const OSCAL_VERSION: &str = "1.1.3";

/// Placeholder SSP reference for plans built without a system security plan.
pub const SSP_PLACEHOLDER: &str = "NOT_PROVIDED";

/// Builds an unfiltered assessment plan for a framework.
#[cfg_attr(test, mockall::automock)]
pub trait PlanSynthesizer {
    /// Synthesizes a plan covering every control the definitions implement
    /// for `framework_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when no definitions are given or none implement the
    /// framework.
    fn synthesize(
        &self,
        definitions: &[ComponentDefinition],
        framework_id: &str,
    ) -> Result<AssessmentPlan>;
}

/// Synthesizer reading rules and checks from component definition props.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentDefinitionSynthesizer;

/// A rule gathered from component props.
#[derive(Debug, Default)]
struct RuleInfo {
    description: Option<String>,
    checks: Vec<(String, Option<String>)>,
}

impl ComponentDefinitionSynthesizer {
    /// Creates a synthesizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Indexes rules and their checks across all components.
    fn collect_rules(definitions: &[ComponentDefinition]) -> HashMap<String, RuleInfo> {
        let mut rules: HashMap<String, RuleInfo> = HashMap::new();

        for component in definitions.iter().flat_map(ComponentDefinition::components) {
            let Some(props) = component.props.as_deref() else {
                continue;
            };

            let mut groups: BTreeMap<&str, Vec<&Property>> = BTreeMap::new();
            for prop in props {
                if let Some(remarks) = prop.remarks.as_deref() {
                    groups.entry(remarks).or_default().push(prop);
                }
            }

            for group in groups.values() {
                let value = |name: &str| {
                    group
                        .iter()
                        .find(|p| p.name == name)
                        .map(|p| p.value.clone())
                };
                let Some(rule_id) = value(RULE_ID) else {
                    continue;
                };

                let rule = rules.entry(rule_id).or_default();
                if let Some(check_id) = value(CHECK_ID) {
                    if !rule.checks.iter().any(|(id, _)| *id == check_id) {
                        rule.checks.push((check_id, value(CHECK_DESCRIPTION)));
                    }
                } else if rule.description.is_none() {
                    rule.description = value(RULE_DESCRIPTION);
                }
            }
        }

        rules
    }
}

impl PlanSynthesizer for ComponentDefinitionSynthesizer {
    fn synthesize(
        &self,
        definitions: &[ComponentDefinition],
        framework_id: &str,
    ) -> Result<AssessmentPlan> {
        if definitions.is_empty() {
            return Err(ComplyTimeError::Plan(PlanError::NoComponentDefinitions {
                path: String::from("<input>"),
            }));
        }

        let mut controls: Vec<String> = Vec::new();
        let mut seen_controls = HashSet::new();
        let mut rule_order: Vec<String> = Vec::new();
        let mut rule_controls: HashMap<String, Vec<String>> = HashMap::new();
        let mut matched = 0usize;

        let implementations = definitions
            .iter()
            .flat_map(ComponentDefinition::components)
            .flat_map(|c| c.control_implementations())
            .filter(|ci| ci.targets(framework_id));

        for implementation in implementations {
            matched += 1;
            for requirement in &implementation.implemented_requirements {
                if requirement.control_id.is_empty() {
                    continue;
                }
                if seen_controls.insert(requirement.control_id.clone()) {
                    controls.push(requirement.control_id.clone());
                }

                let rule_ids = requirement
                    .props
                    .iter()
                    .flatten()
                    .filter(|p| p.name == RULE_ID)
                    .map(|p| p.value.clone());
                for rule_id in rule_ids {
                    let linked = rule_controls.entry(rule_id.clone()).or_insert_with(|| {
                        rule_order.push(rule_id);
                        Vec::new()
                    });
                    if !linked.contains(&requirement.control_id) {
                        linked.push(requirement.control_id.clone());
                    }
                }
            }
        }

        if matched == 0 {
            return Err(ComplyTimeError::Plan(PlanError::FrameworkNotFound {
                framework_id: framework_id.to_string(),
            }));
        }
        debug!(
            "Matched {matched} control implementation(s) with {} control(s) for {framework_id}",
            controls.len()
        );

        let mut rules = Self::collect_rules(definitions);
        let activities: Vec<Activity> = rule_order
            .into_iter()
            .map(|rule_id| {
                let info = rules.remove(&rule_id).unwrap_or_default();
                let linked = rule_controls.remove(&rule_id).unwrap_or_default();
                rule_activity(rule_id, info, &linked)
            })
            .collect();

        info!(
            "Synthesized assessment plan for {framework_id}: {} control(s), {} activit(ies)",
            controls.len(),
            activities.len()
        );

        Ok(AssessmentPlan {
            uuid: Uuid::new_v4().to_string(),
            metadata: Metadata::new(format!("Assessment Plan for {framework_id}"), OSCAL_VERSION),
            import_ssp: ImportSsp {
                href: String::from(SSP_PLACEHOLDER),
                extra: Map::new(),
            },
            local_definitions: (!activities.is_empty()).then(|| LocalDefinitions {
                activities: Some(activities),
                extra: Map::new(),
            }),
            reviewed_controls: reviewed_controls(&controls),
            extra: Map::new(),
        })
    }
}

/// Wraps the given controls in a single explicit selection.
fn reviewed_controls(controls: &[String]) -> ReviewedControls {
    ReviewedControls {
        control_selections: vec![ControlSelection::with_controls(controls.iter().cloned())],
        ..ReviewedControls::default()
    }
}

fn rule_activity(rule_id: String, info: RuleInfo, controls: &[String]) -> Activity {
    let steps: Vec<Step> = info
        .checks
        .into_iter()
        .map(|(check_id, description)| Step {
            uuid: Uuid::new_v4().to_string(),
            title: Some(check_id.clone()),
            description: description.unwrap_or_else(|| check_id.clone()),
            props: Some(vec![Property::new(CHECK_ID, check_id)]),
            reviewed_controls: Some(reviewed_controls(controls)),
            extra: Map::new(),
        })
        .collect();

    Activity {
        uuid: Uuid::new_v4().to_string(),
        title: Some(rule_id.clone()),
        description: info.description.unwrap_or_else(|| rule_id.clone()),
        props: Some(vec![Property::new(RULE_ID, rule_id)]),
        steps: (!steps.is_empty()).then_some(steps),
        related_controls: Some(reviewed_controls(controls)),
        extra: Map::new(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::oscal::{ComponentDefinition, ComponentDefinitionDocument};

    /// Two components for `cis`: a service declaring rules and controls,
    /// and a validation component declaring checks.
    pub fn cis_definition() -> ComponentDefinition {
        let document: ComponentDefinitionDocument = serde_json::from_str(
            r#"{
            "component-definition": {
                "uuid": "c14d8812-7098-4a9b-8f89-cba41b6ff0d8",
                "metadata": {
                    "title": "CIS Component Definition",
                    "last-modified": "2024-01-01T00:00:00Z",
                    "version": "1.0.0",
                    "oscal-version": "1.1.3"
                },
                "components": [
                    {
                        "uuid": "4e19131e-b361-4f0e-8262-02bf4456202e",
                        "type": "service",
                        "title": "Linux",
                        "description": "Linux host",
                        "props": [
                            {"name": "Rule_Id", "value": "set_password_hashing", "remarks": "rule_set_0"},
                            {"name": "Rule_Description", "value": "Set password hashing algorithm", "remarks": "rule_set_0"},
                            {"name": "Rule_Id", "value": "disable_root_login", "remarks": "rule_set_1"},
                            {"name": "Rule_Description", "value": "Disable root SSH login", "remarks": "rule_set_1"}
                        ],
                        "control-implementations": [
                            {
                                "uuid": "d0bd8542-a1c5-4b4f-8c6c-6bbb2c3ee5c4",
                                "source": "trestle://profiles/cis/profile.json",
                                "description": "CIS controls",
                                "props": [{"name": "Framework_Short_Name", "value": "cis"}],
                                "implemented-requirements": [
                                    {
                                        "uuid": "a1b5b7d0-6d07-4b1e-9d39-8f3f2f0c1c01",
                                        "control-id": "cis_1.1",
                                        "description": "",
                                        "props": [{"name": "Rule_Id", "value": "set_password_hashing"}]
                                    },
                                    {
                                        "uuid": "a1b5b7d0-6d07-4b1e-9d39-8f3f2f0c1c02",
                                        "control-id": "cis_1.2",
                                        "description": "",
                                        "props": [
                                            {"name": "Rule_Id", "value": "set_password_hashing"},
                                            {"name": "Rule_Id", "value": "disable_root_login"}
                                        ]
                                    },
                                    {
                                        "uuid": "a1b5b7d0-6d07-4b1e-9d39-8f3f2f0c1c03",
                                        "control-id": "cis_1.3",
                                        "description": ""
                                    }
                                ]
                            },
                            {
                                "uuid": "0c3a6c0e-5d2f-4c7e-9a1c-2f0a8f6b2b11",
                                "source": "trestle://profiles/nist.json",
                                "description": "NIST controls",
                                "implemented-requirements": [
                                    {
                                        "uuid": "a1b5b7d0-6d07-4b1e-9d39-8f3f2f0c1c04",
                                        "control-id": "ac-1",
                                        "description": ""
                                    }
                                ]
                            }
                        ]
                    },
                    {
                        "uuid": "7b6a1f7e-2a3b-4f3e-8d0d-1f2e3d4c5b6a",
                        "type": "validation",
                        "title": "OpenSCAP",
                        "description": "Validation component",
                        "props": [
                            {"name": "Rule_Id", "value": "set_password_hashing", "remarks": "rule_set_0"},
                            {"name": "Check_Id", "value": "xccdf_set_password_hashing", "remarks": "rule_set_0"},
                            {"name": "Check_Description", "value": "Check password hashing", "remarks": "rule_set_0"}
                        ]
                    }
                ]
            }
        }"#,
        )
        .expect("fixture is a valid component definition");
        document.component_definition
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::cis_definition;
    use super::*;

    #[test]
    fn test_synthesize_top_level_selection() {
        let plan = ComponentDefinitionSynthesizer::new()
            .synthesize(&[cis_definition()], "cis")
            .unwrap();

        let selections = &plan.reviewed_controls.control_selections;
        assert_eq!(selections.len(), 1);
        assert_eq!(selections[0].included_ids(), vec!["cis_1.1", "cis_1.2", "cis_1.3"]);
        assert_eq!(plan.metadata.oscal_version, OSCAL_VERSION);
    }

    #[test]
    fn test_one_activity_per_rule() {
        let plan = ComponentDefinitionSynthesizer::new()
            .synthesize(&[cis_definition()], "cis")
            .unwrap();

        let activities = plan.activities();
        assert_eq!(activities.len(), 2);

        let hashing = &activities[0];
        assert_eq!(hashing.title.as_deref(), Some("set_password_hashing"));
        assert_eq!(hashing.description, "Set password hashing algorithm");
        let related = hashing.related_controls.as_ref().unwrap();
        assert_eq!(related.control_selections[0].included_ids(), vec!["cis_1.1", "cis_1.2"]);

        let steps = hashing.steps.as_ref().unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].title.as_deref(), Some("xccdf_set_password_hashing"));
        assert_eq!(steps[0].description, "Check password hashing");

        let root_login = &activities[1];
        assert_eq!(root_login.title.as_deref(), Some("disable_root_login"));
        assert!(root_login.steps.is_none());
        let related = root_login.related_controls.as_ref().unwrap();
        assert_eq!(related.control_selections[0].included_ids(), vec!["cis_1.2"]);
    }

    #[test]
    fn test_framework_from_source_stem() {
        let plan = ComponentDefinitionSynthesizer::new()
            .synthesize(&[cis_definition()], "nist")
            .unwrap();

        assert_eq!(
            plan.reviewed_controls.control_selections[0].included_ids(),
            vec!["ac-1"]
        );
        assert!(plan.local_definitions.is_none());
    }

    #[test]
    fn test_unknown_framework() {
        let err = ComponentDefinitionSynthesizer::new()
            .synthesize(&[cis_definition()], "fedramp")
            .unwrap_err();
        assert!(matches!(
            err,
            ComplyTimeError::Plan(PlanError::FrameworkNotFound { .. })
        ));
    }

    #[test]
    fn test_no_definitions() {
        let err = ComponentDefinitionSynthesizer::new()
            .synthesize(&[], "cis")
            .unwrap_err();
        assert!(matches!(
            err,
            ComplyTimeError::Plan(PlanError::NoComponentDefinitions { .. })
        ));
    }
}
