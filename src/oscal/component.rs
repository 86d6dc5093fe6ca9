//! OSCAL component definition types.
//!
//! Component definitions are the input of plan synthesis. Rules and checks
//! live as props on components, grouped by their `remarks` value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::plan::Metadata;
use super::props::{FRAMEWORK_SHORT_NAME, Property, find_prop};

/// Top-level JSON wrapper of a component definition file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComponentDefinitionDocument {
    /// The wrapped component definition.
    #[serde(rename = "component-definition")]
    pub component_definition: ComponentDefinition,
}

/// An OSCAL component definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ComponentDefinition {
    /// Document identifier.
    pub uuid: String,
    /// Document metadata.
    pub metadata: Metadata,
    /// Defined components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<DefinedComponent>>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A component within a component definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct DefinedComponent {
    /// Component identifier.
    pub uuid: String,
    /// Component type (e.g. `service`, `validation`).
    #[serde(rename = "type")]
    pub component_type: String,
    /// Component title.
    pub title: String,
    /// Component description.
    #[serde(default)]
    pub description: String,
    /// Component properties, including rule and check props.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    /// Control implementations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_implementations: Option<Vec<ControlImplementation>>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A set of implemented requirements for one control source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ControlImplementation {
    /// Implementation identifier.
    pub uuid: String,
    /// Profile or catalog the controls come from.
    pub source: String,
    /// Implementation description.
    #[serde(default)]
    pub description: String,
    /// Implementation properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    /// Implemented requirements.
    #[serde(default)]
    pub implemented_requirements: Vec<ImplementedRequirement>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single implemented control requirement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ImplementedRequirement {
    /// Requirement identifier.
    pub uuid: String,
    /// Implemented control.
    pub control_id: String,
    /// Requirement description.
    #[serde(default)]
    pub description: String,
    /// Requirement properties; `Rule_Id` links rules to the control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComponentDefinition {
    /// Iterates over all defined components.
    pub fn components(&self) -> impl Iterator<Item = &DefinedComponent> {
        self.components.iter().flatten()
    }
}

impl DefinedComponent {
    /// Iterates over all control implementations of the component.
    pub fn control_implementations(&self) -> impl Iterator<Item = &ControlImplementation> {
        self.control_implementations.iter().flatten()
    }
}

impl ControlImplementation {
    /// Returns the framework this implementation targets.
    ///
    /// Uses the `Framework_Short_Name` prop when present.
    #[must_use]
    pub fn framework(&self) -> Option<&str> {
        find_prop(self.props.as_deref(), FRAMEWORK_SHORT_NAME, None).map(|p| p.value.as_str())
    }

    /// Returns the framework identifier of this implementation.
    ///
    /// Falls back to the trailing segment of `source` without extension.
    #[must_use]
    pub fn framework_id(&self) -> &str {
        if let Some(framework) = self.framework() {
            return framework;
        }
        let file = self.source.rsplit('/').next().unwrap_or(&self.source);
        file.split('.').next().unwrap_or(file)
    }

    /// Returns true if this implementation belongs to the given framework.
    #[must_use]
    pub fn targets(&self, framework_id: &str) -> bool {
        self.framework_id() == framework_id
    }
}
