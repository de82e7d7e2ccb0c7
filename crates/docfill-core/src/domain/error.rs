// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (so a registry lookup failure can be reported twice)
/// - Categorizable (for CLI display and exit codes)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    // ========================================================================
    // Invalid-argument errors
    // ========================================================================
    #[error("malformed variable override '{raw}': expected key=value")]
    MalformedOverride { raw: String },

    #[error("invalid variable name '{name}': {reason}")]
    InvalidVariableName { name: String, reason: String },

    // ========================================================================
    // Template errors
    // ========================================================================
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Duplicate template id: {id}")]
    DuplicateTemplate { id: String },

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    #[error("Template name '{name}' is ambiguous, candidates: {}", candidates.join(", "))]
    AmbiguousTemplate {
        name: String,
        candidates: Vec<String>,
    },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MalformedOverride { raw } => vec![
                format!("'{raw}' has no '=' separator"),
                "Pass variables as --var key=value (values may contain '=')".into(),
                "Example: docfill generate notice --var title=年度通知".into(),
            ],
            Self::InvalidVariableName { name, .. } => vec![
                format!("'{name}' can never match a {{{{placeholder}}}}"),
                "Variable names use letters, digits and underscores only".into(),
            ],
            Self::InvalidTemplate(msg) => vec![
                format!("Details: {msg}"),
                "Check the template's sidecar .toml manifest".into(),
            ],
            Self::DuplicateTemplate { id } => vec![
                format!("Two templates resolve to the id '{id}'"),
                "Rename one of the files or set [template].name in its manifest".into(),
            ],
            Self::TemplateNotFound { name } => vec![
                format!("No template named '{name}' in the template library"),
                "List available templates: docfill list".into(),
                "Point at another library with --templates-dir".into(),
            ],
            Self::AmbiguousTemplate { candidates, .. } => {
                let mut out = vec!["Use the qualified id instead:".to_string()];
                out.extend(candidates.iter().map(|c| format!("  • {c}")));
                out
            }
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedOverride { .. } | Self::InvalidVariableName { .. } => {
                ErrorCategory::Validation
            }
            Self::InvalidTemplate(_) | Self::DuplicateTemplate { .. } => {
                ErrorCategory::Validation
            }
            Self::TemplateNotFound { .. } | Self::AmbiguousTemplate { .. } => {
                ErrorCategory::NotFound
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
}
