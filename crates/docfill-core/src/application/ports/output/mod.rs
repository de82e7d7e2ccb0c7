//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `docfill-adapters` crate provides implementations.

use std::collections::BTreeSet;
use std::path::Path;

use crate::domain::{MissingPolicy, SubstitutionReport, Template, TemplateRegistry, VariableMap};
use crate::error::DocfillResult;

/// Port for template lookup.
///
/// Implemented by:
/// - [`TemplateRegistry`] (the registry built at start-up)
#[cfg_attr(test, mockall::automock)]
pub trait TemplateStore: Send + Sync {
    /// Get a template by qualified id or bare name.
    fn get(&self, name: &str) -> DocfillResult<Template>;

    /// List all available templates, sorted by id.
    fn list(&self) -> DocfillResult<Vec<Template>>;
}

impl TemplateStore for TemplateRegistry {
    fn get(&self, name: &str) -> DocfillResult<Template> {
        Ok(TemplateRegistry::get(self, name)?.clone())
    }

    fn list(&self) -> DocfillResult<Vec<Template>> {
        Ok(self.iter().cloned().collect())
    }
}

/// A filled document, ready to be written.
#[derive(Debug, Clone)]
pub struct FilledDocument {
    pub bytes: Vec<u8>,
    pub report: SubstitutionReport,
}

/// Port for document formats.
///
/// Implemented by:
/// - `docfill_adapters::docx::DocxCodec` (Word .docx)
#[cfg_attr(test, mockall::automock)]
pub trait DocumentCodec: Send + Sync {
    /// Distinct placeholder names found anywhere in the document.
    fn placeholders(&self, document: &[u8]) -> DocfillResult<BTreeSet<String>>;

    /// Produce a copy of `document` with placeholders substituted.
    fn fill(
        &self,
        document: &[u8],
        variables: &VariableMap,
        policy: MissingPolicy,
    ) -> DocfillResult<FilledDocument>;
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `docfill_adapters::filesystem::LocalFilesystem` (production)
/// - `docfill_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Read a whole file.
    fn read(&self, path: &Path) -> DocfillResult<Vec<u8>>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Write `bytes` to `path` so that either the complete file appears or
    /// nothing changes.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> DocfillResult<()>;
}
