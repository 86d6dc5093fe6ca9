// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # ComplyTime
//!
//! Generation and tailoring of OSCAL assessment plans.
//!
//! ## Overview
//!
//! ComplyTime builds an assessment plan from a bundle of component
//! definitions and lets users narrow it to the controls they care about:
//!
//! - Synthesize a plan for a compliance framework
//! - Print a scope template listing every control of the framework
//! - Tailor the plan to an edited scope configuration
//! - Validate the structure of the resulting plan
//!
//! ## Architecture
//!
//! Tailoring is done by the scope engine:
//!
//! 1. **Scope**: The set of control identifiers to keep
//! 2. **Filter**: Rewrites one control selection to its intersection with the scope
//! 3. **Walker**: Visits every control selection of the plan and marks
//!    activities and steps left without controls as skipped
//!
//! ## Modules
//!
//! - [`oscal`]: Assessment plan and component definition documents
//! - [`scope`]: Scope filtering engine
//! - [`planner`]: Plan synthesis, scope templates and validation
//! - [`config`]: Scope configuration parsing and validation
//! - [`workspace`]: Plan storage, locking and bundle discovery
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! # assessment-plan-filter.yml
//! frameworkId: anssi_bp28_minimal
//! includeControls:
//!   - R1
//!   - R2
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod oscal;
pub mod planner;
pub mod scope;
pub mod workspace;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, ScopeConfig, ScopeConfigValidator};
pub use error::{ComplyTimeError, Result};
pub use oscal::{AssessmentPlan, ComponentDefinition, ControlSelection};
pub use planner::{
    ComponentDefinitionSynthesizer, PlanSynthesizer, PlanValidator, StructuralValidator,
    TailoringPipeline,
};
pub use scope::{AssessmentScope, ScopeObserver, ScopeReport, apply_scope, filter_control_selection};
pub use workspace::{LocalWorkspace, PlanStore};
