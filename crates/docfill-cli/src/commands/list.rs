//! Implementation of the `docfill list` command.

use docfill_core::application::{TemplateInfo, TemplateService};
use docfill_adapters::DocxCodec;

use crate::{
    cli::{ListArgs, ListFormat, global::GlobalArgs},
    commands::{filesystem, open_library},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    args: ListArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let store = open_library(&global, &config)?;
    let service = TemplateService::new(store, Box::new(DocxCodec::new()), filesystem());

    let templates = match &args.category {
        Some(category) => service.in_category(category)?,
        None => service.list()?,
    };

    match args.format {
        ListFormat::Table => {
            if templates.is_empty() {
                output.info("No templates found")?;
                return Ok(());
            }
            output.header("Available Templates:")?;
            let width = templates.iter().map(|t| t.id.len()).max().unwrap_or(0);
            for template in &templates {
                output.print(&format!(
                    "  {:<width$}  {}",
                    template.id,
                    template.description.as_deref().unwrap_or("")
                ))?;
            }
        }
        ListFormat::Json => {
            // Bypasses --quiet: JSON must stay parseable in pipes.
            output.json(&templates)?;
        }
        ListFormat::List => {
            for t in &templates {
                output.raw(&t.id)?;
            }
        }
        ListFormat::Csv => {
            output.raw("id,name,category,description")?;
            for t in &templates {
                output.raw(&csv_row(t))?;
            }
        }
    }
    Ok(())
}

fn csv_row(t: &TemplateInfo) -> String {
    [
        t.id.as_str(),
        t.name.as_str(),
        t.category.as_deref().unwrap_or(""),
        t.description.as_deref().unwrap_or(""),
    ]
    .map(csv_field)
    .join(",")
}

/// Quote a field when it contains a delimiter, quote or newline.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
