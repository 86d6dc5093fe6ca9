//! CLI module for the ComplyTime tool.
//!
//! This module provides the command-line interface for generating and
//! tailoring assessment plans.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
