//! Application layer errors.
//!
//! These errors represent failures in orchestration and in the ports
//! (document codec, filesystem, template library), not business rules.
//! Business rule errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// The template file is not a usable document.
    #[error("Invalid document: {reason}")]
    InvalidDocument { reason: String },

    /// Substitution could not be applied to the document.
    #[error("Rendering failed: {reason}")]
    RenderingFailed { reason: String },

    /// The output file exists and overwriting was not requested.
    #[error("Output already exists at {path}")]
    OutputExists { path: PathBuf },

    /// A `--vars` file could not be read or parsed.
    #[error("Invalid variables file {path}: {reason}")]
    InvalidVariablesFile { path: PathBuf, reason: String },

    /// The template library directory is missing or unreadable.
    #[error("Template library unavailable at {path}: {reason}")]
    TemplateLibrary { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check file permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::InvalidDocument { .. } => vec![
                "Templates must be Word .docx files (Office Open XML)".into(),
                "Legacy .doc files must be re-saved as .docx first".into(),
            ],
            Self::OutputExists { path } => vec![
                format!("File already exists: {}", path.display()),
                "Use --force to overwrite it".into(),
                "Or choose another path with --output".into(),
            ],
            Self::InvalidVariablesFile { .. } => vec![
                "Variables files are flat tables of name = value".into(),
                "Use .toml or .json; nested tables and arrays are not supported".into(),
            ],
            Self::TemplateLibrary { path, .. } => vec![
                format!("Expected templates under: {}", path.display()),
                "Point at another directory with --templates-dir".into(),
                "Or set [templates].dir in the config file".into(),
            ],
            Self::RenderingFailed { .. } => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } | Self::RenderingFailed { .. } => ErrorCategory::Internal,
            Self::InvalidDocument { .. }
            | Self::OutputExists { .. }
            | Self::InvalidVariablesFile { .. } => ErrorCategory::Validation,
            Self::TemplateLibrary { .. } => ErrorCategory::Configuration,
        }
    }
}
