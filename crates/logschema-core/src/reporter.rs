//! Human-readable and machine-readable rendering of validation outcomes.
//!
//! - `Display` for [`ValidationOutcome`]: one-line summary
//! - [`ValidationReport`]: JSON artifact with per-record entries and totals
//! - [`render_report_md`]: Markdown summary for CI comments

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::engine::{ValidationLevel, ValidationOutcome};

/// Version of the report artifact layout.
pub const REPORT_SCHEMA_VERSION: &str = "1.0";

impl ValidationOutcome {
    /// Format identifier for display, `unset` when no format is declared.
    pub fn format_label(&self) -> &str {
        self.format.as_ref().map(|f| f.as_str()).unwrap_or("unset")
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            write!(
                f,
                "[{}/{}] ✓ valid ({:?})",
                self.level,
                self.format_label(),
                self.elapsed
            )
        } else {
            write!(
                f,
                "[{}/{}] ✗ invalid: {}",
                self.level,
                self.format_label(),
                self.errors.join("; ")
            )
        }
    }
}

/// Summary line followed by one indented line per error.
pub fn render_outcome(outcome: &ValidationOutcome) -> String {
    let mut out = format!("→ {}\n", outcome);
    for err in &outcome.errors {
        out.push_str(&format!("    ✗ {}\n", err));
    }
    out
}

/// One validated record in the report artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportEntry {
    /// Caller-chosen record label, e.g. the run name or `task[2]`.
    pub label: String,
    pub level: ValidationLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub valid: bool,
    pub errors: Vec<String>,
    pub elapsed_us: u64,
}

impl ReportEntry {
    pub fn new(label: impl Into<String>, outcome: &ValidationOutcome) -> Self {
        Self {
            label: label.into(),
            level: outcome.level,
            format: outcome.format.as_ref().map(|f| f.to_string()),
            valid: outcome.valid,
            errors: outcome.errors.clone(),
            elapsed_us: outcome.elapsed.as_micros() as u64,
        }
    }
}

/// Totals section of the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub all_valid: bool,
}

/// Validation report artifact written for CI consumers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub entries: Vec<ReportEntry>,
}

impl ValidationReport {
    pub fn new(entries: Vec<ReportEntry>) -> Self {
        let total = entries.len();
        let valid = entries.iter().filter(|e| e.valid).count();
        Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            summary: ReportSummary {
                total,
                valid,
                invalid: total - valid,
                all_valid: valid == total,
            },
            entries,
        }
    }
}

/// Render the report as Markdown.
pub fn render_report_md(report: &ValidationReport) -> String {
    let mut out = String::new();
    out.push_str("# Structured Log Validation\n\n");
    out.push_str(&format!(
        "- records: {}\n- valid: {}\n- invalid: {}\n",
        report.summary.total, report.summary.valid, report.summary.invalid
    ));

    if report.entries.is_empty() {
        out.push_str("\nNo structured logs to validate.\n");
        return out;
    }

    out.push_str("\n| Record | Level | Format | Result |\n");
    out.push_str("|--------|-------|--------|--------|\n");
    for entry in &report.entries {
        out.push_str(&format!(
            "| `{}` | {} | {} | {} |\n",
            entry.label,
            entry.level,
            entry.format.as_deref().unwrap_or("unset"),
            if entry.valid { "✓ valid" } else { "✗ invalid" }
        ));
    }

    let failures: Vec<&ReportEntry> = report.entries.iter().filter(|e| !e.valid).collect();
    if !failures.is_empty() {
        out.push_str("\n## Errors\n\n");
        for entry in failures {
            for err in &entry.errors {
                out.push_str(&format!("- `{}`: {}\n", entry.label, err));
            }
        }
    }
    out
}

/// Write the report in pretty JSON format.
pub fn write_report_json(path: &Path, report: &ValidationReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report).context("serialize validation report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Write the Markdown rendering of the report.
pub fn write_report_md(path: &Path, report: &ValidationReport) -> Result<()> {
    let md = render_report_md(report);
    std::fs::write(path, md).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
