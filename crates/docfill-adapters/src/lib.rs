//! Infrastructure adapters for docfill.
//!
//! This crate implements the ports defined in `docfill_core::application::ports`.
//! It contains all archive handling, XML rewriting and file I/O.

pub mod docx;
pub mod filesystem;
pub mod template_loader;
pub mod variables_file;

// Re-export commonly used adapters
pub use docx::DocxCodec;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use template_loader::{BrokenTemplate, FilesystemTemplateLoader, TemplateLibrary};
pub use variables_file::{VarsFormat, load_variables_file};
