//! Configuration module for ComplyTime plan tailoring.
//!
//! This module handles the scope configuration users edit to tailor a plan:
//! - Parsing and deserializing `assessment-plan-filter.yml`
//! - Environment and `.env` overrides
//! - Validation of configuration values

mod parser;
mod spec;
mod validator;

pub use parser::{
    ConfigParser, DEFAULT_CONFIG_FILES, ENV_FRAMEWORK_ID, ENV_INCLUDE_CONTROLS, find_config_file,
};
pub use spec::ScopeConfig;
pub use validator::{ScopeConfigValidator, ValidationError, ValidationResult};
