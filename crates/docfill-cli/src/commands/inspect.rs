//! Implementation of the `docfill inspect` command.

use tracing::instrument;

use docfill_adapters::DocxCodec;
use docfill_core::application::{TemplateDetails, TemplateService};

use crate::{
    cli::{InspectArgs, global::GlobalArgs},
    commands::{filesystem, open_store},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(template = %args.template))]
pub fn execute(
    args: InspectArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let resolved = open_store(&args.template, &global, &config)?;
    let service = TemplateService::new(resolved.store, Box::new(DocxCodec::new()), filesystem());
    let details = service.describe(&resolved.name)?;

    if output.is_json() {
        output.json(&details)?;
        return Ok(());
    }

    for line in describe_lines(&details) {
        output.print(&line)?;
    }
    for name in &details.unused_defaults {
        output.warning(&format!("Default '{name}' is not used by any placeholder"))?;
    }
    Ok(())
}

/// Human rendering, one placeholder per line with its default if any.
fn describe_lines(details: &TemplateDetails) -> Vec<String> {
    let info = &details.info;
    let mut lines = vec![format!("{} ({})", info.id, info.source)];
    if let Some(description) = &info.description {
        lines.push(format!("  {description}"));
    }
    lines.push(String::new());

    if details.placeholders.is_empty() {
        lines.push("No placeholders".into());
        return lines;
    }

    lines.push("Placeholders:".into());
    let width = details.placeholders.iter().map(String::len).max().unwrap_or(0);
    for name in &details.placeholders {
        let line = match info.defaults.get(name) {
            Some(value) => format!("  {name:<width$}  = {value}"),
            None => format!("  {name:<width$}  (no default)"),
        };
        lines.push(line);
    }
    lines
}
