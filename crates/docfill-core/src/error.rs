//! Unified error handling for docfill core.
//!
//! Wraps domain and application errors behind one type with a category
//! (for exit codes) and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for docfill core operations.
#[derive(Debug, Error, Clone)]
pub enum DocfillError {
    /// Errors from the domain layer (rule violations, lookups).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Errors from the application layer (ports, orchestration).
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl DocfillError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec![
                "This appears to be a bug in docfill".into(),
                "Please report this issue at: https://github.com/cosecruz/docfill/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
            },
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type DocfillResult<T> = Result<T, DocfillError>;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn malformed_override_is_validation() {
        let err: DocfillError = DomainError::MalformedOverride {
            raw: "novalue".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.to_string().contains("novalue"));
    }

    #[test]
    fn not_found_category() {
        let err: DocfillError = DomainError::TemplateNotFound { name: "x".into() }.into();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(err.suggestions().iter().any(|s| s.contains("docfill list")));
    }

    #[test]
    fn io_failure_is_internal() {
        let err: DocfillError = ApplicationError::FilesystemError {
            path: PathBuf::from("/ro/out.docx"),
            reason: "permission denied".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn output_exists_suggests_force() {
        let err: DocfillError = ApplicationError::OutputExists {
            path: PathBuf::from("output.docx"),
        }
        .into();
        assert!(err.suggestions().iter().any(|s| s.contains("--force")));
    }
}
