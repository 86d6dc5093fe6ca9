//! OSCAL document model.
//!
//! This module maps the parts of OSCAL assessment plans and component
//! definitions that the tool reads or rewrites. Every struct keeps the
//! fields it does not understand in a flattened map so documents
//! round-trip without loss.

mod component;
mod plan;
mod props;
#[cfg(test)]
pub(crate) mod testing;

pub use component::{
    ComponentDefinition, ComponentDefinitionDocument, ControlImplementation, DefinedComponent,
    ImplementedRequirement,
};
pub use plan::{
    Activity, AssessmentPlan, ControlSelection, ImportSsp, IncludeAll, LocalDefinitions, Metadata,
    PlanDocument, ReviewedControls, SelectControlById, Step,
};
pub use props::{
    COMPLYTIME_NS, CHECK_DESCRIPTION, CHECK_ID, FRAMEWORK_SHORT_NAME, Property, RULE_DESCRIPTION,
    RULE_ID, SKIPPED, find_prop, has_prop,
};
