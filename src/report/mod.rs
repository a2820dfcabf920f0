//! Report module - rendering an `AnalysisReport` as text, JSON or CSV

mod table;
mod text;

use crate::pipeline::AnalysisReport;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub use table::{summary_frame, write_csv};
pub use text::render_text;

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable tables (default)
    #[default]
    Text,
    /// Full report as JSON
    Json,
    /// Summary statistics as CSV
    Csv,
}

/// Render the report in the requested format.
pub fn render(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
        }
        OutputFormat::Csv => {
            let mut df = summary_frame(report).context("Failed to build summary table")?;
            write_csv(&mut df).context("Failed to write summary CSV")
        }
    }
}
