//! Control-selection filter.

use std::collections::{BTreeSet, HashSet};

use crate::oscal::{ControlSelection, SelectControlById};

/// Outcome of filtering one control selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
    /// Control identifiers the selection includes after filtering.
    pub included: Vec<String>,
    /// Number of explicit includes before filtering.
    pub before: usize,
    /// Whether the selection carried `include-all` before filtering.
    pub had_include_all: bool,
    /// Whether no control survived.
    pub became_empty: bool,
}

/// Narrows a control selection to the given include set.
///
/// With `include-all` the include set replaces the selection wholesale, since
/// the full framework catalog is not available here. Otherwise the explicit
/// includes are intersected with the set, keeping document order and
/// statement ids. `include-all` is always cleared, `exclude-controls` is never
/// touched, and an empty result leaves `include-controls` absent.
///
/// Applying the filter to its own output with the same set changes nothing.
pub fn filter_control_selection(
    selection: &mut ControlSelection,
    include: &BTreeSet<String>,
) -> FilterResult {
    let had_include_all = selection.include_all.take().is_some();
    let original = selection.include_controls.take().unwrap_or_default();
    let before = original.len();

    let kept: Vec<SelectControlById> = if had_include_all {
        include.iter().map(SelectControlById::new).collect()
    } else {
        let mut seen = HashSet::new();
        original
            .into_iter()
            .filter(|c| include.contains(&c.control_id) && seen.insert(c.control_id.clone()))
            .collect()
    };

    let included: Vec<String> = kept.iter().map(|c| c.control_id.clone()).collect();
    let became_empty = kept.is_empty();
    if !became_empty {
        selection.include_controls = Some(kept);
    }

    FilterResult {
        included,
        before,
        had_include_all,
        became_empty,
    }
}
