//! Text and JSON rendering of command results.

use crate::component::Component;
use crate::error::ApiError;
use crate::import::ImportReport;
use crate::sync::SyncReport;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn push_messages(out: &mut String, title: &str, messages: &[String]) {
    if messages.is_empty() {
        return;
    }
    out.push_str(&format!("\n{}\n", format_section_heading(title)));
    for message in messages {
        out.push_str(&format!("  - {}\n", message));
    }
}

pub fn format_import_report(report: &ImportReport, format: OutputFormat) -> Result<String, ApiError> {
    if format == OutputFormat::Json {
        return to_json(report);
    }
    let heading = if report.dry_run {
        "Import Preview"
    } else {
        "Import Summary"
    };
    let mut out = format!("{}\n\n", format_section_heading(heading));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Kind", "Count"]);
    table.add_row(vec!["agent_config".to_string(), report.counts.agent_configs.to_string()]);
    table.add_row(vec!["prompt".to_string(), report.counts.prompts.to_string()]);
    table.add_row(vec!["model_profile".to_string(), report.counts.model_profiles.to_string()]);
    table.add_row(vec!["project_config".to_string(), report.counts.project_configs.to_string()]);
    out.push_str(&format!("{}\n\n", table));

    if report.dry_run {
        out.push_str(&format!("{} entities would be imported.\n", report.counts.total()));
    } else {
        let total = report.counts.total();
        out.push_str(&format!(
            "{} entities imported ({} written, {} unchanged).\n",
            total,
            total.saturating_sub(report.unchanged),
            report.unchanged
        ));
    }
    push_messages(&mut out, "Skipped", &report.errors);
    push_messages(&mut out, "Warnings", &report.warnings);
    Ok(out)
}

pub fn format_sync_report(report: &SyncReport, format: OutputFormat) -> Result<String, ApiError> {
    if format == OutputFormat::Json {
        return to_json(report);
    }
    let heading = if report.dry_run { "Sync Preview" } else { "Sync Summary" };
    let mut out = format!("{}\n\n", format_section_heading(heading));
    for path in &report.files_written {
        out.push_str(&format!("  {}\n", path.display()));
    }
    if report.dry_run {
        out.push_str(&format!("\n{} files would be written.\n", report.written_count));
    } else {
        out.push_str(&format!(
            "\n{} files written ({} backed up, concurrency {}).\n",
            report.written_count,
            report.backups.len(),
            report.concurrency
        ));
    }
    push_messages(&mut out, "Errors", &report.errors);
    push_messages(&mut out, "Warnings", &report.warnings);
    Ok(out)
}

pub fn format_component_list(components: &[Component], format: OutputFormat) -> Result<String, ApiError> {
    if format == OutputFormat::Json {
        let rows: Vec<_> = components
            .iter()
            .map(|c| {
                json!({
                    "kind": c.kind,
                    "name": c.name,
                    "description": c.description,
                    "enabled": c.enabled,
                    "updatedAt": c.updated_at.to_rfc3339(),
                })
            })
            .collect();
        return to_json(&rows);
    }
    let mut out = format!("{}\n\n", format_section_heading("Components"));
    if components.is_empty() {
        out.push_str("No components stored.\n");
        return Ok(out);
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Kind", "Name", "Enabled", "Description"]);
    for c in components {
        table.add_row(vec![
            c.kind.to_string(),
            c.name.clone(),
            if c.enabled { "yes" } else { "no" }.to_string(),
            c.description.clone(),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!("Total: {} components.\n", components.len()));
    Ok(out)
}

pub fn format_component(component: &Component, format: OutputFormat) -> Result<String, ApiError> {
    let payload: serde_json::Value = serde_json::from_str(&component.config)?;
    if format == OutputFormat::Json {
        let mut value = serde_json::to_value(component)?;
        value["config"] = payload;
        return to_json(&value);
    }
    let mut out = format!(
        "{}\n\n",
        format_section_heading(&format!("{} {}", component.kind, component.name))
    );
    out.push_str(&format!("  Description: {}\n", component.description));
    out.push_str(&format!("  Enabled: {}\n", if component.enabled { "yes" } else { "no" }));
    if !component.tags.is_empty() {
        out.push_str(&format!("  Tags: {}\n", component.tags.join(", ")));
    }
    if let Some(version) = &component.version {
        out.push_str(&format!("  Version: {}\n", version));
    }
    if let Some(url) = &component.source_url {
        out.push_str(&format!("  Source: {}\n", url));
    }
    out.push_str(&format!("  Created: {}\n", component.created_at.to_rfc3339()));
    out.push_str(&format!("  Updated: {}\n\n", component.updated_at.to_rfc3339()));
    out.push_str(&serde_json::to_string_pretty(&payload)?);
    out.push('\n');
    Ok(out)
}
