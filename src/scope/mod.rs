//! Scope filtering engine.
//!
//! Tailors a fully-populated assessment plan to the controls a user keeps in
//! scope. Every control selection reachable from the plan is narrowed to the
//! intersection of what it selected and what the scope includes; activities
//! and steps left without controls are marked skipped.
//!
//! The engine is synchronous, holds no state between calls and never fails:
//! absent branches of the plan are simply not visited.

mod assessment_scope;
mod filter;
mod observer;
mod walker;

pub use assessment_scope::AssessmentScope;
pub use filter::{FilterResult, filter_control_selection};
pub use observer::{
    BranchPath, NoopObserver, ScopeObserver, ScopeReport, ScopeReportEntry, SelectionLocation,
    TracingObserver,
};
pub use walker::{apply_scope, is_skipped, mark_skipped};
