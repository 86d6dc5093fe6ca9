//! Scope templates and framework listings derived from component definitions.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::config::ScopeConfig;
use crate::error::{ComplyTimeError, PlanError, Result};
use crate::oscal::ComponentDefinition;

/// A framework implemented by the available component definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameworkSummary {
    /// Framework identifier.
    pub framework_id: String,
    /// Number of distinct controls implemented.
    pub controls: usize,
    /// Titles of the components implementing it.
    pub components: Vec<String>,
}

/// Builds a scope configuration listing every control the definitions
/// implement for `framework_id`, in document order.
///
/// Users edit the result to narrow the scope of a plan.
///
/// # Errors
///
/// Returns an error if no definitions are given or none implement the
/// framework.
pub fn scope_config_from_definitions(
    framework_id: &str,
    definitions: &[ComponentDefinition],
) -> Result<ScopeConfig> {
    if definitions.is_empty() {
        return Err(ComplyTimeError::Plan(PlanError::NoComponentDefinitions {
            path: String::from("<input>"),
        }));
    }

    let mut matched = false;
    let mut seen = HashSet::new();
    let mut controls = Vec::new();

    let implementations = definitions
        .iter()
        .flat_map(ComponentDefinition::components)
        .flat_map(|c| c.control_implementations())
        .filter(|ci| ci.targets(framework_id));

    for implementation in implementations {
        matched = true;
        for requirement in &implementation.implemented_requirements {
            if !requirement.control_id.is_empty() && seen.insert(requirement.control_id.as_str()) {
                controls.push(requirement.control_id.clone());
            }
        }
    }

    if !matched {
        return Err(ComplyTimeError::Plan(PlanError::FrameworkNotFound {
            framework_id: framework_id.to_string(),
        }));
    }

    debug!("Scope template for {framework_id} lists {} control(s)", controls.len());
    Ok(ScopeConfig {
        framework_id: framework_id.to_string(),
        include_controls: controls,
    })
}

/// Lists the frameworks implemented by the definitions, sorted by id.
#[must_use]
pub fn available_frameworks(definitions: &[ComponentDefinition]) -> Vec<FrameworkSummary> {
    let mut frameworks: BTreeMap<&str, (BTreeSet<&str>, Vec<String>)> = BTreeMap::new();

    for component in definitions.iter().flat_map(ComponentDefinition::components) {
        for implementation in component.control_implementations() {
            let (controls, components) = frameworks
                .entry(implementation.framework_id())
                .or_default();
            controls.extend(
                implementation
                    .implemented_requirements
                    .iter()
                    .map(|r| r.control_id.as_str())
                    .filter(|id| !id.is_empty()),
            );
            if !components.contains(&component.title) {
                components.push(component.title.clone());
            }
        }
    }

    frameworks
        .into_iter()
        .map(|(framework_id, (controls, components))| FrameworkSummary {
            framework_id: framework_id.to_string(),
            controls: controls.len(),
            components,
        })
        .collect()
}
