//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::planner::{FrameworkSummary, ValidationReport};
use crate::scope::ScopeReport;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Filtered selection row for table display.
#[derive(Tabled)]
struct SelectionRow {
    #[tabled(rename = "Selection")]
    location: String,
    #[tabled(rename = "Before")]
    before: String,
    #[tabled(rename = "Kept")]
    kept: usize,
    #[tabled(rename = "Controls")]
    controls: String,
}

/// Framework row for table display.
#[derive(Tabled)]
struct FrameworkRow {
    #[tabled(rename = "Framework")]
    framework: String,
    #[tabled(rename = "Controls")]
    controls: usize,
    #[tabled(rename = "Components")]
    components: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the outcome of applying a scope.
    #[must_use]
    pub fn format_scope_report(&self, report: &ScopeReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => Self::format_scope_report_text(report),
        }
    }

    fn format_scope_report_text(report: &ScopeReport) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "\nScope applied");

        let rows: Vec<SelectionRow> = report
            .entries
            .iter()
            .map(|entry| SelectionRow {
                location: entry.location.to_string(),
                before: entry
                    .before
                    .map_or_else(|| String::from("all"), |n| n.to_string()),
                kept: entry.included.len(),
                controls: Self::truncate(&entry.included.join(", "), 40),
            })
            .collect();

        if !rows.is_empty() {
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        let _ = writeln!(
            output,
            "\n{} selection(s) filtered, {} left empty, {} control(s) retained",
            report.visited(),
            report.emptied().to_string().yellow(),
            report.retained_controls().len().to_string().green()
        );

        if !report.skipped.is_empty() {
            let _ = writeln!(output, "\n{} Skipped:", "⚠".yellow());
            for branch in &report.skipped {
                let _ = writeln!(output, "   - {branch}");
            }
        }

        output
    }

    /// Formats a plan validation report.
    #[must_use]
    pub fn format_validation(&self, report: &ValidationReport, show_warnings: bool) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = if report.is_valid() {
                    format!("{} Assessment plan is valid\n", "✓".green())
                } else {
                    let mut output = format!(
                        "{} Assessment plan has {} error(s):\n",
                        "✗".red(),
                        report.errors.len()
                    );
                    for issue in &report.errors {
                        let _ = writeln!(output, "   - {issue}");
                    }
                    output
                };

                if show_warnings && !report.warnings.is_empty() {
                    let _ = writeln!(output, "\n{} Warnings:", "⚠".yellow());
                    for issue in &report.warnings {
                        let _ = writeln!(output, "   - {issue}");
                    }
                }

                output
            }
        }
    }

    /// Formats the frameworks available in the bundle directory.
    #[must_use]
    pub fn format_frameworks(&self, frameworks: &[FrameworkSummary]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(frameworks).unwrap_or_default(),
            OutputFormat::Text => {
                if frameworks.is_empty() {
                    return String::from("No frameworks found.\n");
                }

                let rows: Vec<FrameworkRow> = frameworks
                    .iter()
                    .map(|f| FrameworkRow {
                        framework: f.framework_id.clone(),
                        controls: f.controls,
                        components: Self::truncate(&f.components.join(", "), 40),
                    })
                    .collect();

                let mut output = Table::new(rows).to_string();
                output.push('\n');
                output
            }
        }
    }

    /// Formats a success message.
    #[must_use]
    pub fn success(&self, message: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({ "status": "success", "message": message });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => format!("{} {message}", "✓".green()),
        }
    }

    /// Truncates a string to a maximum number of characters.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{head}...")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::ValidationIssue;
    use crate::scope::{BranchPath, ScopeReportEntry, SelectionLocation};

    fn report() -> ScopeReport {
        ScopeReport {
            entries: vec![ScopeReportEntry {
                location: SelectionLocation {
                    branch: BranchPath::Plan,
                    index: 0,
                },
                before: None,
                included: vec![String::from("ac-1")],
            }],
            skipped: vec![BranchPath::Activity {
                activity: String::from("a1"),
            }],
        }
    }

    #[test]
    fn test_scope_report_text() {
        colored::control::set_override(false);
        let text = OutputFormatter::new(OutputFormat::Text).format_scope_report(&report());
        assert!(text.contains("reviewed-controls/control-selections[0]"));
        assert!(text.contains("all"));
        assert!(text.contains("activity a1/related-controls"));
    }

    #[test]
    fn test_scope_report_json() {
        let json = OutputFormatter::new(OutputFormat::Json).format_scope_report(&report());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["skipped"][0]["kind"], "activity");
        assert_eq!(value["entries"][0]["included"][0], "ac-1");
    }

    #[test]
    fn test_validation_text_lists_errors() {
        colored::control::set_override(false);
        let report = ValidationReport {
            errors: vec![ValidationIssue {
                path: String::from("assessment-plan/uuid"),
                message: String::from("'x' is not a valid UUID"),
            }],
            warnings: vec![],
        };
        let text = OutputFormatter::new(OutputFormat::Text).format_validation(&report, false);
        assert!(text.contains("1 error(s)"));
        assert!(text.contains("assessment-plan/uuid: 'x' is not a valid UUID"));
    }

    #[test]
    fn test_frameworks_json() {
        let frameworks = vec![FrameworkSummary {
            framework_id: String::from("cis"),
            controls: 3,
            components: vec![String::from("Linux")],
        }];
        let json = OutputFormatter::new(OutputFormat::Json).format_frameworks(&frameworks);
        assert!(json.contains("\"framework_id\": \"cis\""));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(OutputFormatter::truncate("short", 10), "short");
        assert_eq!(OutputFormatter::truncate("abcdefghijkl", 8), "abcde...");
    }
}
