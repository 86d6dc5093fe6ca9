//! The assessment scope value object.

use std::collections::BTreeSet;

use crate::config::ScopeConfig;
use crate::oscal::AssessmentPlan;

use super::observer::ScopeObserver;
use super::walker::apply_scope;

/// The controls a user wants kept in an assessment plan.
///
/// Constructed once per tailoring operation and read-only afterwards. An
/// empty include set is valid and strips every control from the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentScope {
    /// Framework the plan targets.
    framework_id: String,
    /// Control identifiers to keep.
    include_controls: BTreeSet<String>,
}

impl AssessmentScope {
    /// Creates a scope for a framework and a set of control identifiers.
    ///
    /// Duplicate identifiers collapse.
    #[must_use]
    pub fn new<I, S>(framework_id: impl Into<String>, include_controls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            framework_id: framework_id.into(),
            include_controls: include_controls.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the framework identifier.
    #[must_use]
    pub fn framework_id(&self) -> &str {
        &self.framework_id
    }

    /// Returns the included control identifiers.
    #[must_use]
    pub const fn include_controls(&self) -> &BTreeSet<String> {
        &self.include_controls
    }

    /// Returns true if the given control is in scope.
    #[must_use]
    pub fn contains(&self, control_id: &str) -> bool {
        self.include_controls.contains(control_id)
    }

    /// Returns true if no control is in scope.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include_controls.is_empty()
    }

    /// Tailors the plan in place to this scope.
    pub fn apply<O: ScopeObserver + ?Sized>(&self, plan: &mut AssessmentPlan, observer: &mut O) {
        apply_scope(plan, self, observer);
    }
}

impl From<&ScopeConfig> for AssessmentScope {
    fn from(config: &ScopeConfig) -> Self {
        Self::new(config.framework_id.clone(), config.include_controls.iter().cloned())
    }
}
