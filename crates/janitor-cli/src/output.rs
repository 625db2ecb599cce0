//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use janitor_core::ScanReport;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// One row of `list` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listed {
    /// Scope key (`account/region`)
    pub scope: String,
    /// Resource type name
    pub resource_type: &'static str,
    /// Resource key
    pub key: String,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the result of a sweep or purge.
    pub fn format_report(&self, report: &ScanReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Quiet => Ok(format!(
                "deleted={} eligible={} pruned={} errors={}",
                report.total_deleted(),
                report.total_eligible(),
                report.total_pruned(),
                report.error_count()
            )),
        }
    }

    fn format_report_table(&self, report: &ScanReport) -> String {
        if report.scopes.is_empty() {
            return self.warning("No scopes scanned.");
        }

        let mut builder = Builder::default();
        builder.push_record([
            "Scope", "Type", "Seen", "Eligible", "Deleted", "Gone", "Failed", "Skipped", "Exempt",
        ]);
        for scope in &report.scopes {
            for sweep in &scope.sweeps {
                builder.push_record([
                    scope.scope.clone(),
                    sweep.resource_type.to_string(),
                    sweep.marked.to_string(),
                    sweep.eligible.to_string(),
                    sweep.deleted.to_string(),
                    sweep.already_gone.to_string(),
                    sweep.failed.to_string(),
                    sweep.skipped.to_string(),
                    sweep.exempt.to_string(),
                ]);
            }
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut lines = vec![table.to_string()];
        for scope in &report.scopes {
            if scope.dry_run {
                lines.push(self.info(&format!("{}: dry run, nothing deleted", scope.scope)));
            }
            if scope.cancelled {
                lines.push(self.warning(&format!("{}: cancelled", scope.scope)));
            }
            for error in &scope.errors {
                lines.push(self.error(&error.to_string()));
            }
        }

        let totals = format!(
            "{} deleted, {} pruned, {} error(s) across {} scope(s)",
            report.total_deleted(),
            report.total_pruned(),
            report.error_count(),
            report.scopes.len()
        );
        lines.push(if report.is_success() {
            self.success(&totals)
        } else {
            self.error(&totals)
        });
        lines.join("\n")
    }

    /// Format `list` output.
    pub fn format_inventory(&self, listed: &[Listed]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(listed)?),
            OutputFormat::Quiet => Ok(listed
                .iter()
                .map(|l| l.key.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if listed.is_empty() {
                    return Ok(self.warning("No resources found."));
                }
                let mut builder = Builder::default();
                builder.push_record(["Scope", "Type", "Resource"]);
                for l in listed {
                    builder.push_record([l.scope.as_str(), l.resource_type, l.key.as_str()]);
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
