//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::workspace::DEFAULT_WORKSPACE;

/// ComplyTime - Assessment plan generation and tailoring.
#[derive(Parser, Debug)]
#[command(name = "complytime")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Workspace directory holding the assessment plan.
    #[arg(short, long, global = true, env = "COMPLYTIME_WORKSPACE", default_value = DEFAULT_WORKSPACE)]
    pub workspace: PathBuf,

    /// Directory of component definition bundles.
    #[arg(long, global = true, env = "COMPLYTIME_BUNDLE_DIR")]
    pub bundle_dir: Option<PathBuf>,

    /// Enable debug output.
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new assessment plan for a compliance framework.
    Plan {
        /// Framework identifier.
        framework_id: String,

        /// Print the default scope configuration instead of writing a plan.
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Tailor the plan with the workspace scope configuration.
        #[arg(short, long)]
        load_config: bool,
    },

    /// Tailor the workspace assessment plan to a scope configuration.
    Tailor {
        /// Scope configuration file (defaults to the one in the workspace).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate the workspace assessment plan.
    Validate {
        /// Show all warnings, not just errors.
        #[arg(long)]
        warnings: bool,
    },

    /// List frameworks available in the bundle directory.
    List,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
