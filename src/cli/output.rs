//! Output formatting for scan reports and configuration
//!
//! JSON and YAML serialize the report as-is; the human format is a short
//! summary meant for terminals.
//!
//! # Example
//!
//! ```ignore
//! use text_finder::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! let output = formatter.format(&report)?;
//! println!("{}", output);
//! ```

use anyhow::{Context, Result};
use std::fmt::Write as _;

use crate::config::TextFinderConfig;
use crate::finder::MatchSource;
use crate::report::{FinderAction, FinderReport, ScanReport};

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, report: &ScanReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_json(report),
            OutputFormat::Yaml => self.format_yaml(report),
            OutputFormat::Human => Ok(self.format_human(report)),
        }
    }

    pub fn format_config(&self, config: &TextFinderConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config.to_display_map())
                .context("Failed to serialize configuration to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(&config.to_display_map())
                .context("Failed to serialize configuration to YAML"),
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn format_json(&self, report: &ScanReport) -> Result<String> {
        serde_json::to_string_pretty(report).context("Failed to serialize scan report to JSON")
    }

    fn format_yaml(&self, report: &ScanReport) -> Result<String> {
        serde_yaml::to_string(report).context("Failed to serialize scan report to YAML")
    }

    fn format_human(&self, report: &ScanReport) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Text Finder v{}", report.version);
        let _ = writeln!(out, "Workspace:   {}", report.workspace.display());
        if let Some(ref log) = report.console_log {
            let _ = writeln!(out, "Console log: {}", log.display());
        }
        let elapsed = report.finished_at - report.started_at;
        let _ = writeln!(out, "Duration:    {}ms", elapsed.num_milliseconds());
        out.push('\n');

        for (index, finder) in report.finders.iter().enumerate() {
            format_finder(&mut out, index + 1, finder);
        }

        if report.result_changed() {
            let _ = writeln!(
                out,
                "Build result: {} (was {})",
                report.final_result, report.initial_result
            );
        } else {
            let _ = writeln!(out, "Build result: {}", report.final_result);
        }
        out
    }
}

fn format_finder(out: &mut String, number: usize, report: &FinderReport) {
    let finder = &report.finder;
    let _ = writeln!(out, "#{} {}", number, finder.label());
    let _ = writeln!(out, "  Pattern:   {}", finder.regexp());
    if let Some(file_set) = finder.file_set() {
        let _ = writeln!(out, "  Files:     {} ({} scanned)", file_set, report.files_scanned);
    }
    if finder.also_check_console_output() {
        let _ = writeln!(out, "  Console:   yes");
    }
    let _ = writeln!(out, "  Condition: {}", finder.change_condition().description());
    let _ = writeln!(out, "  Found:     {}", if report.found { "yes" } else { "no" });

    let action = match report.action {
        FinderAction::Unchanged => "no change".to_string(),
        FinderAction::Combined => format!(
            "{} -> {} (requested {})",
            report.result_before,
            report.result_after,
            finder.build_result()
        ),
        FinderAction::Forced => format!(
            "{} -> {} (forced)",
            report.result_before, report.result_after
        ),
    };
    let _ = writeln!(out, "  Result:    {}", action);

    for record in &report.matches {
        match &record.source {
            MatchSource::Console => {
                let _ = writeln!(out, "    console:{}: {}", record.line_number, record.line);
            }
            MatchSource::File(path) => {
                let _ = writeln!(
                    out,
                    "    {}:{}: {}",
                    path.display(),
                    record.line_number,
                    record.line
                );
            }
        }
    }
    if report.matches_truncated {
        let _ = writeln!(out, "    ... more matches not shown");
    }
    out.push('\n');
}
