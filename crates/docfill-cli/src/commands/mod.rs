//! Subcommand handlers.
//!
//! Each handler translates parsed arguments into core service calls and
//! renders the result. Adapter wiring shared by several commands lives here.

use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate};
use tracing::debug;

use docfill_adapters::{FilesystemTemplateLoader, LocalFilesystem};
use docfill_core::{
    application::TemplateStore,
    domain::{TemplateRegistry, VariableMap},
};

use crate::{
    cli::GlobalArgs,
    config::AppConfig,
    error::{CliError, CliResult},
};

pub mod completions;
pub mod config;
pub mod generate;
pub mod init;
pub mod inspect;
pub mod list;

/// A template store plus the name to ask it for.
pub(crate) struct ResolvedStore {
    pub store: Box<dyn TemplateStore>,
    pub name: String,
}

/// `--templates-dir` wins over `templates.dir` from the config.
pub(crate) fn templates_dir(global: &GlobalArgs, config: &AppConfig) -> PathBuf {
    global
        .templates_dir
        .clone()
        .unwrap_or_else(|| config.templates.dir.clone())
}

/// `true` when a TEMPLATE argument names a `.docx` file rather than a
/// registry entry.
pub(crate) fn is_docx_path(template: &str) -> bool {
    Path::new(template)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx"))
}

/// Build the store a TEMPLATE argument refers to.
///
/// A `.docx` path becomes a one-entry registry; anything else is looked up
/// in the template library.
pub(crate) fn open_store(
    template: &str,
    global: &GlobalArgs,
    config: &AppConfig,
) -> CliResult<ResolvedStore> {
    if is_docx_path(template) {
        let loaded = FilesystemTemplateLoader::load_file(Path::new(template))?;
        let name = loaded.id();
        debug!(path = template, id = %name, "Using template file");
        let registry =
            TemplateRegistry::from_templates([loaded]).map_err(|e| CliError::Core(e.into()))?;
        return Ok(ResolvedStore {
            store: Box::new(registry),
            name,
        });
    }

    Ok(ResolvedStore {
        store: open_library(global, config)?,
        name: template.to_owned(),
    })
}

/// Load the whole template library.
pub(crate) fn open_library(
    global: &GlobalArgs,
    config: &AppConfig,
) -> CliResult<Box<dyn TemplateStore>> {
    let dir = templates_dir(global, config);
    let library = FilesystemTemplateLoader::new(dir).load_library()?;
    Ok(Box::new(library))
}

pub(crate) fn filesystem() -> Box<LocalFilesystem> {
    Box::new(LocalFilesystem::new())
}

/// `DATE` and `YEAR` for `today`, or nothing when disabled.
pub(crate) fn builtin_variables(enabled: bool, today: NaiveDate) -> CliResult<VariableMap> {
    if !enabled {
        return Ok(VariableMap::new());
    }
    VariableMap::from_pairs([
        ("DATE", today.format("%Y-%m-%d").to_string()),
        ("YEAR", today.year().to_string()),
    ])
    .map_err(|e| CliError::Core(e.into()))
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
