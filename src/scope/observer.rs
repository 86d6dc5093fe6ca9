//! Observation of the scope walk.
//!
//! The walker reports what it does through a [`ScopeObserver`] passed in by
//! the caller instead of logging through process-wide state.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use super::filter::FilterResult;

/// A branch of the plan that holds control selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BranchPath {
    /// `related-controls` of a local activity.
    Activity {
        /// Activity uuid.
        activity: String,
    },
    /// `reviewed-controls` of an activity step.
    Step {
        /// Owning activity uuid.
        activity: String,
        /// Step uuid.
        step: String,
    },
    /// The plan's top-level `reviewed-controls`.
    Plan,
}

/// Position of one control selection in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionLocation {
    /// Branch holding the selection.
    pub branch: BranchPath,
    /// Index within `control-selections`.
    pub index: usize,
}

/// Receives events while a scope is applied.
pub trait ScopeObserver {
    /// Called after a control selection was filtered.
    fn selection_filtered(&mut self, _location: &SelectionLocation, _result: &FilterResult) {}

    /// Called when a branch lost all of its controls and was marked skipped.
    fn branch_skipped(&mut self, _branch: &BranchPath) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScopeObserver for NoopObserver {}

/// Observer that emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ScopeObserver for TracingObserver {
    fn selection_filtered(&mut self, location: &SelectionLocation, result: &FilterResult) {
        debug!(
            location = %location,
            include_all = result.had_include_all,
            before = result.before,
            after = result.included.len(),
            "Filtered control selection"
        );
    }

    fn branch_skipped(&mut self, branch: &BranchPath) {
        info!("No controls in scope for {branch}, marked skipped");
    }
}

impl<A: ScopeObserver, B: ScopeObserver> ScopeObserver for (A, B) {
    fn selection_filtered(&mut self, location: &SelectionLocation, result: &FilterResult) {
        self.0.selection_filtered(location, result);
        self.1.selection_filtered(location, result);
    }

    fn branch_skipped(&mut self, branch: &BranchPath) {
        self.0.branch_skipped(branch);
        self.1.branch_skipped(branch);
    }
}

impl<O: ScopeObserver + ?Sized> ScopeObserver for &mut O {
    fn selection_filtered(&mut self, location: &SelectionLocation, result: &FilterResult) {
        (**self).selection_filtered(location, result);
    }

    fn branch_skipped(&mut self, branch: &BranchPath) {
        (**self).branch_skipped(branch);
    }
}

/// One filtered selection in a [`ScopeReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeReportEntry {
    /// Where the selection lives.
    pub location: SelectionLocation,
    /// Explicit includes before filtering; `None` when it was `include-all`.
    pub before: Option<usize>,
    /// Controls kept.
    pub included: Vec<String>,
}

/// Observer that records the outcome of a scope walk.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ScopeReport {
    /// Filtered selections in visit order.
    pub entries: Vec<ScopeReportEntry>,
    /// Branches marked skipped.
    pub skipped: Vec<BranchPath>,
}

impl ScopeReport {
    /// Creates an empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Returns the number of selections visited.
    #[must_use]
    pub const fn visited(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of selections left without controls.
    #[must_use]
    pub fn emptied(&self) -> usize {
        self.entries.iter().filter(|e| e.included.is_empty()).count()
    }

    /// Returns the distinct controls still selected anywhere in the plan.
    #[must_use]
    pub fn retained_controls(&self) -> BTreeSet<&str> {
        self.entries
            .iter()
            .flat_map(|e| e.included.iter().map(String::as_str))
            .collect()
    }
}

impl ScopeObserver for ScopeReport {
    fn selection_filtered(&mut self, location: &SelectionLocation, result: &FilterResult) {
        self.entries.push(ScopeReportEntry {
            location: location.clone(),
            before: (!result.had_include_all).then_some(result.before),
            included: result.included.clone(),
        });
    }

    fn branch_skipped(&mut self, branch: &BranchPath) {
        self.skipped.push(branch.clone());
    }
}

impl fmt::Display for BranchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Activity { activity } => write!(f, "activity {activity}/related-controls"),
            Self::Step { activity, step } => {
                write!(f, "activity {activity}/step {step}/reviewed-controls")
            }
            Self::Plan => write!(f, "reviewed-controls"),
        }
    }
}

impl fmt::Display for SelectionLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/control-selections[{}]", self.branch, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(included: &[&str], had_include_all: bool) -> FilterResult {
        FilterResult {
            included: included.iter().map(|s| (*s).to_string()).collect(),
            before: 3,
            had_include_all,
            became_empty: included.is_empty(),
        }
    }

    #[test]
    fn test_report_counts() {
        let mut report = ScopeReport::new();
        let location = SelectionLocation {
            branch: BranchPath::Plan,
            index: 0,
        };
        report.selection_filtered(&location, &result(&["a", "b"], false));
        report.selection_filtered(&location, &result(&[], true));
        report.selection_filtered(&location, &result(&["b"], false));

        assert_eq!(report.visited(), 3);
        assert_eq!(report.emptied(), 1);
        assert_eq!(report.retained_controls().into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(report.entries[1].before, None);
        assert_eq!(report.entries[0].before, Some(3));
    }

    #[test]
    fn test_tuple_observer_forwards_to_both() {
        let mut pair = (ScopeReport::new(), ScopeReport::new());
        let branch = BranchPath::Activity {
            activity: String::from("a1"),
        };
        pair.branch_skipped(&branch);

        assert_eq!(pair.0.skipped, vec![branch.clone()]);
        assert_eq!(pair.1.skipped, vec![branch]);
    }

    #[test]
    fn test_location_display() {
        let location = SelectionLocation {
            branch: BranchPath::Step {
                activity: String::from("a1"),
                step: String::from("s1"),
            },
            index: 2,
        };
        assert_eq!(
            location.to_string(),
            "activity a1/step s1/reviewed-controls/control-selections[2]"
        );
    }
}
