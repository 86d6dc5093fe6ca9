//! Planning module for assessment plans.
//!
//! This module builds assessment plans from component definitions, derives
//! scope templates, validates plan structure and composes these steps with
//! the scope engine.

mod dry_run;
mod pipeline;
mod synthesis;
mod validation;

pub use dry_run::{FrameworkSummary, available_frameworks, scope_config_from_definitions};
pub use pipeline::{TailoringPipeline, tailor_plan};
pub use synthesis::{ComponentDefinitionSynthesizer, OSCAL_VERSION, PlanSynthesizer, SSP_PLACEHOLDER};
pub use validation::{PlanValidator, StructuralValidator, ValidationIssue, ValidationReport};
