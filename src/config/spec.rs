//! Scope configuration types.
//!
//! This module defines the struct that maps to `assessment-plan-filter.yml`,
//! the file users edit to pick which controls stay in an assessment plan.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Scope configuration for tailoring an assessment plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ScopeConfig {
    /// Identifier of the compliance framework the plan targets.
    #[serde(rename = "frameworkId", alias = "frameworkID", alias = "assessment_plan")]
    pub framework_id: String,
    /// Controls to keep in scope.
    #[serde(
        rename = "includeControls",
        alias = "IncludeControls",
        alias = "controls",
        default
    )]
    pub include_controls: Vec<String>,
}

impl ScopeConfig {
    /// Creates a scope configuration.
    #[must_use]
    pub fn new(framework_id: impl Into<String>, include_controls: Vec<String>) -> Self {
        let mut config = Self {
            framework_id: framework_id.into(),
            include_controls,
        };
        config.dedup_controls();
        config
    }

    /// Removes repeated control identifiers, keeping the first occurrence.
    ///
    /// Returns the number of entries removed.
    pub fn dedup_controls(&mut self) -> usize {
        let before = self.include_controls.len();
        let mut seen = HashSet::new();
        self.include_controls.retain(|id| seen.insert(id.clone()));
        before - self.include_controls.len()
    }
}
