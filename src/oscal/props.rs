//! OSCAL properties and the property names the tool relies on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Namespace for properties generated by this tool.
///
/// Keeps tool annotations apart from user- and framework-authored props.
pub const COMPLYTIME_NS: &str = "https://complytime.dev/ns/oscal";

/// Property marking an activity or step that has no in-scope controls.
pub const SKIPPED: &str = "skipped";

/// Component-definition property naming the framework a control implementation targets.
pub const FRAMEWORK_SHORT_NAME: &str = "Framework_Short_Name";

/// Rule identifier property.
pub const RULE_ID: &str = "Rule_Id";

/// Rule description property.
pub const RULE_DESCRIPTION: &str = "Rule_Description";

/// Check identifier property.
pub const CHECK_ID: &str = "Check_Id";

/// Check description property.
pub const CHECK_DESCRIPTION: &str = "Check_Description";

/// An OSCAL name/value property.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Property value.
    pub value: String,
    /// Namespace qualifying the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ns: Option<String>,
    /// Free-form remarks; component definitions use it to group rule props.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Property {
    /// Creates a property without a namespace.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ns: None,
            remarks: None,
            extra: Map::new(),
        }
    }

    /// Creates a property in the tool namespace.
    #[must_use]
    pub fn complytime(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            ns: Some(COMPLYTIME_NS.to_string()),
            ..Self::new(name, value)
        }
    }

    /// Returns true if this property has the given name and namespace.
    #[must_use]
    pub fn matches(&self, name: &str, ns: Option<&str>) -> bool {
        self.name == name && self.ns.as_deref() == ns
    }
}

/// Finds the first property with the given name and namespace.
#[must_use]
pub fn find_prop<'a>(props: Option<&'a [Property]>, name: &str, ns: Option<&str>) -> Option<&'a Property> {
    props?.iter().find(|p| p.matches(name, ns))
}

/// Returns true if a property with the given name, namespace and value exists.
#[must_use]
pub fn has_prop(props: Option<&[Property]>, name: &str, ns: Option<&str>, value: &str) -> bool {
    find_prop(props, name, ns).is_some_and(|p| p.value == value)
}
