//! Markdown and JSON report generation.
//!
//! This module renders a dashboard report as a Markdown document with one
//! section per chart slot, or as pretty-printed JSON.

use super::{DashboardReport, ReportMetadata};
use crate::charts::{ChartSlot, ChartSpec, DataTable, Mark, Overlay};
use crate::cli::OutputFormat;
use crate::models::ReportSelection;
use anyhow::{Context, Result};
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &DashboardReport, max_rows: usize) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("# {}\n\n", report.metadata.title));

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));

    // Selection
    output.push_str(&generate_selection_section(report.dashboard.selection.as_ref()));

    // Charts
    for (index, slot) in report.dashboard.slots.iter().enumerate() {
        output.push_str(&generate_slot_section(index + 1, slot, max_rows));
    }

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Data Source:** {}\n", metadata.data_source));
    section.push_str(&format!("- **Records Loaded:** {}\n", metadata.records_loaded));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push('\n');

    section
}

/// Generate the selection section.
fn generate_selection_section(selection: Option<&ReportSelection>) -> String {
    let mut section = String::new();

    section.push_str("## Selection\n\n");
    match selection {
        Some(selection) => {
            section.push_str(&format!("- **Report Type:** {}\n", selection.report_type));
            section.push_str(&format!("- **Year:** {}\n\n", selection.year));
        }
        None => section.push_str("No valid selection; all charts are empty.\n\n"),
    }

    section
}

/// Generate the section for one chart slot.
fn generate_slot_section(position: usize, slot: &ChartSlot, max_rows: usize) -> String {
    let mut section = String::new();

    match slot.chart() {
        None => {
            section.push_str(&format!("## Plot {}\n\n_(empty)_\n\n", position));
        }
        Some(chart) => {
            section.push_str(&format!("## Plot {}: {}\n\n", position, chart.title));
            section.push_str(&generate_chart_summary(chart));
            section.push_str(&generate_table(&chart.data, max_rows));
            for overlay in &chart.overlays {
                section.push_str(&generate_overlay_section(overlay, max_rows));
            }
        }
    }

    section
}

/// Describe the chart kind and its encodings.
fn generate_chart_summary(chart: &ChartSpec) -> String {
    let encoding = match &chart.mark {
        Mark::Bar { x, y, color } | Mark::Line { x, y, color } | Mark::Scatter { x, y, color } => {
            format!("x=`{}`, y=`{}`, color=`{}`", x, y, color)
        }
        Mark::Pie { values, names } => format!("values=`{}`, names=`{}`", values, names),
        Mark::Choropleth {
            locations,
            color,
            color_scale,
            range_color,
            ..
        } => format!(
            "locations=`{}`, color=`{}`, scale `{}` over [{}, {}]",
            locations, color, color_scale, range_color[0], range_color[1]
        ),
        Mark::Treemap {
            path,
            values,
            color_scale,
            ..
        } => format!(
            "path=`{}`, values=`{}`, scale `{}`",
            path.join(" > "),
            values,
            color_scale
        ),
    };

    format!("*Chart: {} | {}*\n\n", chart.mark.name(), encoding)
}

fn generate_overlay_section(overlay: &Overlay, max_rows: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "### Series: {} ({})\n\n",
        overlay.name, overlay.color
    ));
    section.push_str(&generate_table(&overlay.data, max_rows));

    section
}

/// Render a data table, truncated to `max_rows`.
fn generate_table(table: &DataTable, max_rows: usize) -> String {
    if table.is_empty() {
        return "No data for this selection.\n\n".to_string();
    }

    let mut section = String::new();

    section.push_str(&format!("| {} |\n", table.columns.join(" | ")));
    section.push_str(&format!(
        "|{}\n",
        table.columns.iter().map(|_| ":---|").collect::<String>()
    ));

    for row in table.rows.iter().take(max_rows) {
        let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        section.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    if table.len() > max_rows {
        section.push_str(&format!(
            "\n*... {} more rows*\n",
            table.len() - max_rows
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by flightdash*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Render the report in `format` and write it to `path`.
pub fn write_report(
    report: &DashboardReport,
    format: OutputFormat,
    max_rows: usize,
    path: &Path,
) -> Result<()> {
    let content = match format {
        OutputFormat::Json => generate_json_report(report)?,
        OutputFormat::Markdown => generate_markdown_report(report, max_rows),
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
