//! OSCAL assessment plan types.
//!
//! Only the paths the scope engine walks are typed:
//!
//! ```text
//! assessment-plan
//! ├── local-definitions?/activities?[]
//! │   ├── related-controls?/control-selections[]
//! │   └── steps?[]/reviewed-controls?/control-selections[]
//! └── reviewed-controls/control-selections[]
//! ```

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::props::Property;

/// Top-level JSON wrapper of an assessment plan file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanDocument {
    /// The wrapped plan.
    #[serde(rename = "assessment-plan")]
    pub assessment_plan: AssessmentPlan,
}

/// An OSCAL assessment plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct AssessmentPlan {
    /// Document identifier.
    pub uuid: String,
    /// Document metadata.
    pub metadata: Metadata,
    /// Reference to the system security plan.
    pub import_ssp: ImportSsp,
    /// Locally defined activities, components and subjects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_definitions: Option<LocalDefinitions>,
    /// Controls under review for the whole plan.
    pub reviewed_controls: ReviewedControls,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Document metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Metadata {
    /// Document title.
    pub title: String,
    /// Last modification timestamp (RFC 3339).
    #[serde(default)]
    pub last_modified: String,
    /// Document version.
    #[serde(default)]
    pub version: String,
    /// OSCAL version the document conforms to.
    #[serde(default)]
    pub oscal_version: String,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Import of the system security plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ImportSsp {
    /// Location of the SSP.
    pub href: String,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Local definitions of an assessment plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LocalDefinitions {
    /// Assessment activities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<Activity>>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An assessment activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Activity {
    /// Activity identifier.
    pub uuid: String,
    /// Activity title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Activity description.
    #[serde(default)]
    pub description: String,
    /// Activity properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    /// Ordered steps of the activity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Step>>,
    /// Controls this activity assesses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_controls: Option<ReviewedControls>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A step of an assessment activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Step {
    /// Step identifier.
    pub uuid: String,
    /// Step title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Step description.
    #[serde(default)]
    pub description: String,
    /// Step properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    /// Controls this step reviews.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_controls: Option<ReviewedControls>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A set of reviewed controls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ReviewedControls {
    /// Description of the reviewed controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    /// Control selections.
    #[serde(default)]
    pub control_selections: Vec<ControlSelection>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Selects controls by explicit include/exclude lists or include-all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ControlSelection {
    /// Description of the selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    /// Present when every control of the framework is selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_all: Option<IncludeAll>,
    /// Explicitly included controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_controls: Option<Vec<SelectControlById>>,
    /// Explicitly excluded controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_controls: Option<Vec<SelectControlById>>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Marker object for `include-all`; serializes as `{}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct IncludeAll {}

/// A control referenced by identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct SelectControlById {
    /// Control identifier.
    pub control_id: String,
    /// Statements of the control to include.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_ids: Option<Vec<String>>,
}

impl PlanDocument {
    /// Parses a plan document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe an assessment plan.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Serializes the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<AssessmentPlan> for PlanDocument {
    fn from(assessment_plan: AssessmentPlan) -> Self {
        Self { assessment_plan }
    }
}

impl AssessmentPlan {
    /// Returns the local activities, if any.
    #[must_use]
    pub fn activities(&self) -> &[Activity] {
        self.local_definitions
            .as_ref()
            .and_then(|l| l.activities.as_deref())
            .unwrap_or_default()
    }
}

impl Metadata {
    /// Creates metadata with the given title, stamped with the current time.
    #[must_use]
    pub fn new(title: impl Into<String>, oscal_version: impl Into<String>) -> Self {
        let mut metadata = Self {
            title: title.into(),
            last_modified: String::new(),
            version: String::from("0.1.0"),
            oscal_version: oscal_version.into(),
            extra: Map::new(),
        };
        metadata.touch();
        metadata
    }

    /// Sets `last-modified` to the current UTC time.
    pub fn touch(&mut self) {
        self.last_modified = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    }
}

impl ControlSelection {
    /// Creates a selection over explicit control identifiers.
    #[must_use]
    pub fn with_controls<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include_controls: Some(ids.into_iter().map(SelectControlById::new).collect()),
            ..Self::default()
        }
    }

    /// Creates a selection including every control.
    #[must_use]
    pub fn all() -> Self {
        Self {
            include_all: Some(IncludeAll {}),
            ..Self::default()
        }
    }

    /// Returns true if the selection includes at least one control.
    #[must_use]
    pub fn selects_any(&self) -> bool {
        self.include_all.is_some() || self.include_controls.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Returns the explicitly included control identifiers.
    #[must_use]
    pub fn included_ids(&self) -> Vec<&str> {
        self.include_controls
            .iter()
            .flatten()
            .map(|c| c.control_id.as_str())
            .collect()
    }
}

impl SelectControlById {
    /// Creates a reference to a whole control.
    #[must_use]
    pub fn new(control_id: impl Into<String>) -> Self {
        Self {
            control_id: control_id.into(),
            statement_ids: None,
        }
    }
}
