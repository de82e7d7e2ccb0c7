//! Filesystem-based template library.
//!
//! Discovers `.docx` templates in a directory tree and reads their optional
//! sidecar manifests, producing a [`TemplateLibrary`] ready for use by the
//! application services.
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── memo.docx               ← id "memo"
//! ├── official/
//! │   ├── notice.docx         ← id "official/notice"
//! │   └── notice.toml         ← sidecar manifest (optional)
//! └── contracts/housing/
//!     └── lease.docx          ← id "contracts/housing/lease"
//! ```
//!
//! # Sidecar format
//!
//! ```toml
//! [template]
//! name        = "notice"          # optional, defaults to the file stem
//! description = "Annual notice"   # optional
//! category    = "official"        # optional, defaults to the parent directory
//!
//! [defaults]
//! title  = "默认标题"
//! author = "默认作者"
//! year   = 2026                   # coerced to "2026"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use docfill_core::{
    application::{ApplicationError, ports::TemplateStore},
    domain::{DomainError, Template, TemplateContent, TemplateRegistry, VariableMap},
    error::{DocfillError, DocfillResult},
};

use crate::variables_file::coerce_toml;

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised sidecar manifest.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct TemplateManifest {
    #[serde(default)]
    pub template: TemplateSection,
    /// Raw default values, coerced to strings when the template is built.
    #[serde(default)]
    pub defaults: toml::Table,
}

/// `[template]` section.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct TemplateSection {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl TemplateManifest {
    /// Parse manifest text; `origin` is only used in error messages.
    pub fn parse(raw: &str, origin: &Path) -> Result<Self, DomainError> {
        toml::from_str(raw).map_err(|e| {
            DomainError::InvalidTemplate(format!("failed to parse '{}': {e}", origin.display()))
        })
    }

    fn defaults(&self, origin: &Path) -> Result<VariableMap, DomainError> {
        let mut map = VariableMap::new();
        for (key, value) in &self.defaults {
            let value = coerce_toml(key, value).map_err(|reason| {
                DomainError::InvalidTemplate(format!("{}: {reason}", origin.display()))
            })?;
            map.insert(key, value)?;
        }
        Ok(map)
    }
}

// ── Library ───────────────────────────────────────────────────────────────────

/// A template that was found on disk but could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenTemplate {
    /// Id derived from the file location.
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub reason: String,
}

/// Loaded templates plus the ones whose sidecar was invalid.
///
/// Broken templates are left out of listings. Asking for one by name reports
/// why it failed instead of "not found".
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    registry: TemplateRegistry,
    broken: Vec<BrokenTemplate>,
}

impl TemplateLibrary {
    pub fn new(registry: TemplateRegistry, broken: Vec<BrokenTemplate>) -> Self {
        Self { registry, broken }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn broken(&self) -> &[BrokenTemplate] {
        &self.broken
    }

    fn find_broken(&self, name: &str) -> Option<&BrokenTemplate> {
        let name = name.trim().trim_matches('/');
        self.broken
            .iter()
            .find(|b| b.id == name)
            .or_else(|| self.broken.iter().find(|b| b.name == name))
    }
}

impl TemplateStore for TemplateLibrary {
    fn get(&self, name: &str) -> DocfillResult<Template> {
        match self.registry.get(name) {
            Ok(t) => Ok(t.clone()),
            Err(e @ DomainError::TemplateNotFound { .. }) => match self.find_broken(name) {
                Some(b) => Err(DomainError::InvalidTemplate(b.reason.clone()).into()),
                None => Err(e.into()),
            },
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> DocfillResult<Vec<Template>> {
        Ok(self.registry.iter().cloned().collect())
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads templates from a directory tree of `.docx` files.
///
/// # Example
///
/// ```no_run
/// use docfill_adapters::template_loader::FilesystemTemplateLoader;
///
/// let library = FilesystemTemplateLoader::new("./templates").load_library()?;
/// println!("Loaded {} templates", library.registry().len());
/// # Ok::<(), docfill_core::error::DocfillError>(())
/// ```
pub struct FilesystemTemplateLoader {
    templates_dir: PathBuf,
}

impl FilesystemTemplateLoader {
    /// Create a loader pointed at `templates_dir`.
    ///
    /// The directory does not need to exist yet; [`Self::load_library`]
    /// fails if it is missing when called.
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
        }
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    /// Load every template under the templates directory.
    ///
    /// Files are visited in path order. A template whose sidecar is invalid
    /// is logged at `WARN` and recorded as broken; it does not stop the
    /// others from loading. Two templates resolving to the same id fail the
    /// whole load.
    #[instrument(skip(self), fields(dir = %self.templates_dir.display()))]
    pub fn load_library(&self) -> DocfillResult<TemplateLibrary> {
        if !self.templates_dir.is_dir() {
            return Err(self.library_error("templates directory not found".into()));
        }

        let mut templates = Vec::new();
        let mut broken = Vec::new();

        let walker = WalkDir::new(&self.templates_dir)
            .min_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry =
                entry.map_err(|e| self.library_error(format!("directory walk error: {e}")))?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_template_file(path) {
                continue;
            }

            let category = self.category_of(path);
            match load_template(path, category.as_deref()) {
                Ok(template) => {
                    debug!(id = %template.id(), "loaded template");
                    templates.push(template);
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping template due to load error"
                    );
                    let name = file_stem(path);
                    broken.push(BrokenTemplate {
                        id: match &category {
                            Some(c) => format!("{c}/{name}"),
                            None => name.clone(),
                        },
                        name,
                        path: path.to_path_buf(),
                        reason: match e {
                            DomainError::InvalidTemplate(reason) => reason,
                            other => other.to_string(),
                        },
                    });
                }
            }
        }

        debug!(
            count = templates.len(),
            broken = broken.len(),
            "finished loading templates"
        );
        let registry = TemplateRegistry::from_templates(templates)?;
        Ok(TemplateLibrary::new(registry, broken))
    }

    /// Load one `.docx` file given directly on the command line.
    ///
    /// Its sidecar, if any, is read the same way; errors are not skipped.
    #[instrument]
    pub fn load_file(path: &Path) -> DocfillResult<Template> {
        if !path.is_file() {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "template file not found".into(),
            }
            .into());
        }
        Ok(load_template(path, None)?)
    }

    /// Parent directory relative to the templates root, `/`-separated.
    fn category_of(&self, path: &Path) -> Option<String> {
        let parent = path.parent()?.strip_prefix(&self.templates_dir).ok()?;
        let category = normalize_path(&parent.to_string_lossy());
        (!category.is_empty()).then_some(category)
    }

    fn library_error(&self, reason: String) -> DocfillError {
        ApplicationError::TemplateLibrary {
            path: self.templates_dir.clone(),
            reason,
        }
        .into()
    }
}

/// `*.docx`, excluding Word's `~$` lock files.
fn is_template_file(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    !file_name.starts_with("~$")
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("docx"))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn sidecar_path(path: &Path) -> PathBuf {
    path.with_extension("toml")
}

/// Build a template from a document path and its optional sidecar.
fn load_template(path: &Path, category: Option<&str>) -> Result<Template, DomainError> {
    let sidecar = sidecar_path(path);
    let manifest = if sidecar.is_file() {
        let raw = fs::read_to_string(&sidecar).map_err(|e| {
            DomainError::InvalidTemplate(format!("failed to read '{}': {e}", sidecar.display()))
        })?;
        TemplateManifest::parse(&raw, &sidecar)?
    } else {
        TemplateManifest::default()
    };

    let defaults = manifest.defaults(&sidecar)?;
    let section = manifest.template;

    let mut builder = Template::builder()
        .name(section.name.unwrap_or_else(|| file_stem(path)))
        .defaults(defaults)
        .content(TemplateContent::File(path.to_path_buf()));
    if let Some(category) = section.category.as_deref().or(category) {
        builder = builder.category(category);
    }
    if let Some(description) = section.description {
        builder = builder.description(description);
    }
    builder.build()
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
